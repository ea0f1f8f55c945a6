//! Native versus variational backend comparison on the cantilever beam.
//!
//! Both scene nodes share one mesh, one material and the same constraint and
//! load regions; only the element formulation and the local node order of the
//! cells differ. After every step the controller reports the mean, over all
//! moving points, of
//!
//! ```text
//! |x_native - x_variational| / |x_native - x_rest|
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use beam_io::{MeshData, VtkWriter};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::forcefield::{HyperelasticForceField, VariationalForceField};
use crate::materials::{MaterialConfig, MaterialModel};
use crate::mesh::Mesh;
use crate::mesh_builder::{BoxMesh, MeshBuilder, mesh_to_data};
use crate::ordering::{ElementConfig, ResolvedElement, reorder_cells};
use crate::scene::{BoxRoi, ConstantForceField, Controller, FixedConstraint, Simulation, SimulationNode, StaticSolver};
use crate::variational::VariationalElement;

pub const NATIVE_NODE: &str = "native_node";
pub const VARIATIONAL_NODE: &str = "variational_node";

/// Relative error of every point that moved in the native solution
pub fn relative_errors(
    native_current: &[Vector3<f64>],
    variational_current: &[Vector3<f64>],
    native_rest: &[Vector3<f64>],
) -> Vec<f64> {
    native_current
        .iter()
        .zip(variational_current)
        .zip(native_rest)
        .filter_map(|((xn, xv), x0)| {
            let reference = (xn - x0).norm();
            (reference != 0.0).then(|| (xn - xv).norm() / reference)
        })
        .collect()
}

/// Mean of [`relative_errors`]; 0.0 when no point moved
pub fn mean_relative_error(
    native_current: &[Vector3<f64>],
    variational_current: &[Vector3<f64>],
    native_rest: &[Vector3<f64>],
) -> f64 {
    let errors = relative_errors(native_current, variational_current, native_rest);
    if errors.is_empty() {
        0.0
    } else {
        errors.iter().sum::<f64>() / errors.len() as f64
    }
}

/// Prints the mean relative error after every step and keeps its history
#[derive(Debug, Clone, Default)]
pub struct ComparisonController {
    native_rest: Vec<Vector3<f64>>,
    variational_rest: Vec<Vector3<f64>>,
    history: Vec<f64>,
    quiet: bool,
}

impl ComparisonController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the history without printing
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Mean relative error of every completed step
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn native_rest(&self) -> &[Vector3<f64>] {
        &self.native_rest
    }

    pub fn variational_rest(&self) -> &[Vector3<f64>] {
        &self.variational_rest
    }
}

fn find<'n>(nodes: &'n [SimulationNode], name: &str) -> Result<&'n SimulationNode> {
    nodes
        .iter()
        .find(|n| n.name() == name)
        .ok_or_else(|| crate::error::SolverError::UnknownNode(name.to_string()))
}

impl Controller for ComparisonController {
    fn on_init_done(&mut self, nodes: &[SimulationNode]) -> Result<()> {
        self.native_rest = find(nodes, NATIVE_NODE)?.state().positions();
        self.variational_rest = find(nodes, VARIATIONAL_NODE)?.state().positions();
        Ok(())
    }

    fn on_animate_end(&mut self, time: f64, nodes: &[SimulationNode]) -> Result<()> {
        let native = find(nodes, NATIVE_NODE)?.state().positions();
        let variational = find(nodes, VARIATIONAL_NODE)?.state().positions();
        let mean = mean_relative_error(&native, &variational, &self.native_rest);
        log::info!("t = {:.3}: mean relative error {:.6e}", time, mean);
        if !self.quiet {
            println!("Relative Mean Error: {} %", 100.0 * mean);
        }
        self.history.push(mean);
        Ok(())
    }
}

/// Settings of the comparison scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub element: ElementConfig,
    pub material: MaterialConfig,
    pub total_force: [f64; 3],
    pub fixed_roi: BoxRoi,
    pub load_roi: BoxRoi,
    /// Directory holding `beam_{p1,p2,q1,q2}.vtu`
    pub mesh_dir: PathBuf,
    /// Beam used when no mesh file is found
    pub fallback_mesh: BoxMesh,
    pub solver: StaticSolver,
    pub steps: usize,
    pub dt: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            element: ElementConfig::default(),
            material: MaterialConfig::default(),
            total_force: [0.0, -2000.0, 0.0],
            fixed_roi: BoxRoi::new([-7.5, -7.5, -0.9], [7.5, 7.5, 0.1]),
            load_roi: BoxRoi::new([-7.5, -7.5, 79.9], [7.5, 7.5, 80.1]),
            mesh_dir: PathBuf::from("./meshes"),
            fallback_mesh: BoxMesh {
                min: [-7.5, -7.5, 0.0],
                max: [7.5, 7.5, 80.0],
                divisions: [3, 3, 20],
            },
            solver: StaticSolver::default(),
            steps: 10,
            dt: crate::scene::DEFAULT_DT,
        }
    }
}

/// Read the configured mesh, trying `.vtu` then `.vtk`, else generate the beam.
pub fn load_comparison_mesh(config: &ComparisonConfig, resolved: &ResolvedElement) -> Result<MeshData> {
    let vtu = config.mesh_dir.join(resolved.mesh_file);
    let vtk = vtu.with_extension("vtk");
    for path in [&vtu, &vtk] {
        if path.is_file() {
            log::info!("reading mesh {}", path.display());
            return Ok(beam_io::read_mesh(path)?);
        }
    }
    log::warn!(
        "{} not found, generating a {:?} beam",
        vtu.display(),
        config.fallback_mesh.divisions
    );
    config.fallback_mesh.generate(resolved.cell_kind)
}

/// Build the two-node scene on `mesh`, cells in native order.
pub fn build_comparison_scene(
    config: &ComparisonConfig,
    resolved: &ResolvedElement,
    mesh: Arc<Mesh>,
    controller: ComparisonController,
) -> Result<Simulation<ComparisonController>> {
    let material = config.material.build()?;
    if matches!(material, MaterialModel::FiberReinforced(_)) {
        return Err(ConfigError::InvalidParameter(format!(
            "material model '{}' is not available in the comparison",
            config.material.model
        ))
        .into());
    }
    let native_cells = mesh.connectivity();
    let variational_cells = reorder_cells(&native_cells, resolved.permutation);
    let element = VariationalElement::new(resolved.variational)?;

    let points = mesh.positions();
    let fixed = FixedConstraint::from_roi(&config.fixed_roi, &points);
    let load = ConstantForceField::from_roi(&config.load_roi, &points, Vector3::from(config.total_force));
    log::info!(
        "{:?} / {}: {} fixed points, {} loaded points, {} material",
        resolved.native,
        element.kind().name(),
        fixed.indices.len(),
        load.indices.len(),
        config.material.model
    );

    let native = SimulationNode::new(
        NATIVE_NODE,
        Arc::clone(&mesh),
        Box::new(HyperelasticForceField::new(resolved.native, native_cells, material)),
    );
    let variational = SimulationNode::new(
        VARIATIONAL_NODE,
        mesh,
        Box::new(VariationalForceField::new(element, variational_cells, material)),
    );

    let mut sim = Simulation::new(controller).with_dt(config.dt);
    for node in [native, variational] {
        sim.add_node(
            node.with_solver(config.solver)
                .with_fixed(fixed.clone())
                .with_load(load.clone()),
        );
    }
    Ok(sim)
}

/// Outcome of a comparison run
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub native_element: String,
    pub variational_element: String,
    pub num_points: usize,
    /// Mean relative error after every step
    pub history: Vec<f64>,
    /// Minimum displacement of each backend along the load, per component
    pub native_min_displacement: [f64; 3],
    pub variational_min_displacement: [f64; 3],
}

impl ComparisonReport {
    pub fn final_error(&self) -> f64 {
        self.history.last().copied().unwrap_or(0.0)
    }
}

fn min_components(node: &SimulationNode) -> [f64; 3] {
    let u = node.state().displacement();
    let mut min = [f64::INFINITY; 3];
    for (i, v) in u.iter().enumerate() {
        min[i % 3] = min[i % 3].min(*v);
    }
    min
}

/// Load the mesh, build the scene and run `config.steps` steps.
pub fn run_comparison(config: &ComparisonConfig, export_dir: Option<&Path>) -> Result<ComparisonReport> {
    run_comparison_with(config, export_dir, ComparisonController::new())
}

/// [`run_comparison`] observed by `controller`
pub fn run_comparison_with(
    config: &ComparisonConfig,
    export_dir: Option<&Path>,
    controller: ComparisonController,
) -> Result<ComparisonReport> {
    let resolved = config.element.resolve()?;
    let data = load_comparison_mesh(config, &resolved)?;
    let mesh = Arc::new(MeshBuilder::build_from_data(&data, resolved.cell_kind)?);

    let mut sim = build_comparison_scene(config, &resolved, Arc::clone(&mesh), controller)?;
    sim.init()?;
    sim.run(config.steps)?;

    let native = sim.node(NATIVE_NODE)?;
    let variational = sim.node(VARIATIONAL_NODE)?;
    if let Some(dir) = export_dir {
        export_displacements(&mesh, &[native, variational], dir)?;
    }
    let native_min_displacement = min_components(native);
    let variational_min_displacement = min_components(variational);
    Ok(ComparisonReport {
        native_element: format!("{:?}", resolved.native),
        variational_element: resolved.variational.name().to_string(),
        num_points: mesh.nodes.len(),
        history: sim.into_controller().history,
        native_min_displacement,
        variational_min_displacement,
    })
}

/// Write each node's displacement as `<dir>/<node>.vtk`.
pub fn export_displacements(mesh: &Mesh, nodes: &[&SimulationNode], dir: &Path) -> Result<()> {
    let data = mesh_to_data(mesh);
    for node in nodes {
        let state = node.state();
        let values: Vec<[f64; 3]> = (0..state.num_points())
            .map(|i| state.point_displacement(i).into())
            .collect();
        let path = dir.join(format!("{}.vtk", node.name()));
        VtkWriter::new(&data)
            .with_title(format!("{} displacement", node.name()))
            .with_vectors("displacement", &values)?
            .write_vtk(&path)?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmoved_points_are_skipped() {
        let rest = vec![Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0)];
        let native = vec![Vector3::zeros(), Vector3::new(1.0, -2.0, 0.0)];
        let variational = vec![Vector3::new(5.0, 0.0, 0.0), Vector3::new(1.0, -1.0, 0.0)];
        assert_eq!(relative_errors(&native, &variational, &rest), vec![0.5]);
        assert_eq!(mean_relative_error(&native, &variational, &rest), 0.5);
    }

    #[test]
    fn no_motion_gives_zero() {
        let rest = vec![Vector3::new(0.0, 1.0, 2.0); 4];
        assert_eq!(mean_relative_error(&rest, &rest, &rest), 0.0);
        assert_eq!(mean_relative_error(&[], &[], &[]), 0.0);
    }

    #[test]
    fn default_config_matches_beam() {
        let config = ComparisonConfig::default();
        assert_eq!(config.steps, 10);
        assert_eq!(config.material.model, "NeoHookean");
        assert!(config.fixed_roi.contains(&Vector3::new(7.5, -7.5, 0.0)));
        assert!(config.load_roi.contains(&Vector3::new(0.0, 0.0, 80.0)));
        let json = serde_json::to_string(&config).unwrap();
        let back: ComparisonConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

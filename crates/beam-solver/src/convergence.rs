//! Mesh-convergence sweep of the fiber-reinforced cantilever.
//!
//! For every `nz` a box `[-H, -W, 0] × [H, W, L]` is meshed with `nx × ny × nz`
//! grid cells. Facets at `z = 0` get tag 1 and are clamped; facets at `z = L`
//! get tag 2 and carry a dead-load traction. The Newton solve must converge
//! before the minimum of the reported displacement component is written to
//! `displacement_<num_dofs>.txt`.

use std::path::{Path, PathBuf};

use nalgebra::{DVector, Vector3};
use serde::{Deserialize, Serialize};

use crate::bc_builder::BCBuilder;
use crate::error::{ConfigError, Result};
use crate::forcefield::{ForceField, VariationalForceField};
use crate::materials::{FiberReinforced, MaterialModel};
use crate::mesh::{DOFS_PER_NODE, Mesh};
use crate::mesh_builder::{BoxMesh, MeshBuilder};
use crate::nonlinear_solver::{NonlinearConfig, NonlinearResults, NonlinearSolver};
use crate::ordering::{ElementConfig, reorder_cells};
use crate::sets::{FacetTags, boundary_facets, locate_boundary_facets};
use crate::variational::VariationalElement;

pub const CLAMPED_TAG: i32 = 1;
pub const LOADED_TAG: i32 = 2;

/// Settings of the sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceConfig {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub nx: usize,
    pub ny: usize,
    /// Divisions along the beam axis, one solve each
    pub nz_values: Vec<usize>,
    pub element: ElementConfig,
    pub quadrature_degree: usize,
    pub material: FiberReinforced,
    /// Traction on the loaded end, per unit reference area
    pub traction: [f64; 3],
    pub body_force: [f64; 3],
    pub newton: NonlinearConfig,
    /// Displacement component whose minimum is reported
    pub reported_axis: usize,
    pub output_dir: PathBuf,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            length: 80.0,
            width: 7.5,
            height: 7.5,
            nx: 10,
            ny: 10,
            nz_values: (940..1600).step_by(100).collect(),
            element: ElementConfig::default(),
            quadrature_degree: 2,
            material: FiberReinforced::default(),
            traction: [0.0, -10.0, 0.0],
            body_force: [0.0; 3],
            newton: NonlinearConfig::incremental(1e-5, 1e-10),
            reported_axis: 2,
            output_dir: PathBuf::from("./convergence_study/beam"),
        }
    }
}

impl ConvergenceConfig {
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.reported_axis > 2 {
            return Err(ConfigError::InvalidParameter(format!(
                "reported_axis must be 0, 1 or 2, got {}",
                self.reported_axis
            )));
        }
        if self.quadrature_degree == 0 {
            return Err(ConfigError::InvalidParameter("quadrature_degree must be positive".into()));
        }
        Ok(())
    }

    fn box_mesh(&self, nz: usize) -> std::result::Result<BoxMesh, ConfigError> {
        BoxMesh::new(
            [-self.height, -self.width, 0.0],
            [self.height, self.width, self.length],
            [self.nx, self.ny, nz],
        )
    }
}

/// One solved resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    pub nz: usize,
    pub num_dofs: usize,
    pub newton_iterations: usize,
    pub min_displacement: f64,
    /// Result file, if written
    pub path: Option<PathBuf>,
}

/// Mesh, tags and Newton outcome of one resolution
pub struct ResolutionSolution {
    pub mesh: Mesh,
    pub tags: FacetTags,
    pub results: NonlinearResults,
}

/// `numpy.isclose` with its default tolerances
fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}

/// Tag 1 on the `z = 0` facets and tag 2 on the `z = length` facets
pub fn tag_beam_ends(mesh: &Mesh, length: f64) -> FacetTags {
    let boundary = boundary_facets(mesh);
    let clamped = locate_boundary_facets(mesh, &boundary, |x| is_close(x.z, 0.0));
    let loaded = locate_boundary_facets(mesh, &boundary, |x| is_close(x.z, length));
    FacetTags::new(
        boundary,
        &[(clamped.as_slice(), CLAMPED_TAG), (loaded.as_slice(), LOADED_TAG)],
    )
}

/// Build and solve one resolution; the result may be unconverged.
pub fn solve_resolution(config: &ConvergenceConfig, nz: usize) -> Result<ResolutionSolution> {
    config.validate()?;
    let resolved = config.element.resolve()?;
    let data = config.box_mesh(nz)?.generate(resolved.cell_kind)?;
    let mesh = MeshBuilder::build_from_data(&data, resolved.cell_kind)?;
    let tags = tag_beam_ends(&mesh, config.length);

    let element = VariationalElement::new(resolved.variational)?.with_quadrature_degree(config.quadrature_degree);
    let cells = reorder_cells(&mesh.connectivity(), resolved.permutation);
    let mut forcefield = VariationalForceField::new(element, cells, MaterialModel::FiberReinforced(config.material))
        .with_body_force(Vector3::from(config.body_force));
    forcefield.init(&mesh.positions())?;

    let bcs = BCBuilder::new(&mesh)
        .fix_tagged(&tags, CLAMPED_TAG)
        .traction(&tags, LOADED_TAG, Vector3::from(config.traction), config.quadrature_degree)
        .build()?;

    log::info!(
        "nz = {}: {} nodes, {} cells, {} dofs",
        nz,
        mesh.nodes.len(),
        mesh.elements.len(),
        mesh.num_dofs
    );
    let results = NonlinearSolver::new(&forcefield, &bcs, config.newton).solve(DVector::zeros(mesh.num_dofs))?;
    Ok(ResolutionSolution { mesh, tags, results })
}

/// Smallest value of displacement component `axis` over all nodes
pub fn min_component(displacement: &DVector<f64>, axis: usize) -> f64 {
    displacement
        .iter()
        .skip(axis)
        .step_by(DOFS_PER_NODE)
        .copied()
        .fold(f64::INFINITY, f64::min)
}

/// Path of the result file of a system with `num_dofs` unknowns
pub fn result_path(dir: &Path, num_dofs: usize) -> PathBuf {
    dir.join(format!("displacement_{}.txt", num_dofs))
}

/// Solve every resolution in order, writing one file per converged solve.
///
/// The first solve that does not converge aborts the sweep with
/// [`crate::SolverError::NotConverged`]; nothing is written for it.
pub fn run_convergence_study(config: &ConvergenceConfig) -> Result<Vec<ConvergencePoint>> {
    let mut points = Vec::with_capacity(config.nz_values.len());
    for &nz in &config.nz_values {
        let solution = solve_resolution(config, nz)?;
        let results = solution.results.into_converged()?;

        let num_dofs = results.displacement.len();
        let min_displacement = min_component(&results.displacement, config.reported_axis);
        println!("{}", min_displacement);

        let path = result_path(&config.output_dir, num_dofs);
        beam_io::write_scalar_result(&path, min_displacement)?;
        log::info!(
            "nz = {}: {} Newton iterations, min u[{}] = {:.9e} -> {}",
            nz,
            results.num_iterations,
            config.reported_axis,
            min_displacement,
            path.display()
        );
        points.push(ConvergencePoint {
            nz,
            num_dofs,
            newton_iterations: results.num_iterations,
            min_displacement,
            path: Some(path),
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_beam_setup() {
        let config = ConvergenceConfig::default();
        assert_eq!(config.nz_values, vec![940, 1040, 1140, 1240, 1340, 1440, 1540]);
        assert_eq!(config.reported_axis, 2);
        assert_eq!(config.material.bulk_modulus, 1e9);
        assert!(config.output_dir.ends_with("convergence_study/beam"));
    }

    #[test]
    fn min_component_picks_the_axis() {
        let u = DVector::from_vec(vec![0.0, -1.0, 5.0, -3.0, 2.0, -0.5]);
        assert_eq!(min_component(&u, 0), -3.0);
        assert_eq!(min_component(&u, 1), -1.0);
        assert_eq!(min_component(&u, 2), -0.5);
    }

    #[test]
    fn beam_ends_are_tagged() {
        let config = ConvergenceConfig {
            nx: 1,
            ny: 1,
            ..ConvergenceConfig::default()
        };
        let data = config.box_mesh(3).unwrap().tetrahedra();
        let mesh = MeshBuilder::build_from_data(&data, beam_io::CellKind::Tetra).unwrap();
        let tags = tag_beam_ends(&mesh, config.length);
        assert_eq!(tags.find(CLAMPED_TAG).len(), 2);
        assert_eq!(tags.find(LOADED_TAG).len(), 2);
        assert_eq!(tags.nodes(CLAMPED_TAG), vec![0, 1, 2, 3]);
    }

    #[test]
    fn invalid_axis_is_rejected() {
        let config = ConvergenceConfig {
            reported_axis: 3,
            ..ConvergenceConfig::default()
        };
        assert!(solve_resolution(&config, 1).is_err());
    }
}

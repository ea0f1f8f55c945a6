//! Mesh construction: solver meshes from interchange data, and structured box
//! meshes for the beam studies.
//!
//! Generated meshes use VTK local node order. Tetrahedral boxes split every
//! grid cell into six tetrahedra sharing its main diagonal, which keeps the
//! triangulation conforming across cells.

use std::collections::HashMap;

use beam_io::{CellKind, MeshData};
use serde::{Deserialize, Serialize};

use crate::elements::solid10::C3D10_EDGES;
use crate::elements::solid20::C3D20_EDGES;
use crate::error::{ConfigError, Result, SolverError};
use crate::mesh::{ElementType, Mesh};

/// Builds a solver mesh from interchange data
pub struct MeshBuilder {
    mesh: Mesh,
    errors: Vec<String>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            mesh: Mesh::new(),
            errors: Vec::new(),
        }
    }

    /// Build a mesh from the `kind` cell block of `data`; other blocks are ignored.
    pub fn build_from_data(data: &MeshData, kind: CellKind) -> Result<Mesh> {
        let cells = data
            .cells_of(kind)
            .ok_or_else(|| ConfigError::MissingCells(kind.name().to_string()))?;

        let mut builder = Self::new();
        for p in &data.points {
            builder.mesh.add_node(p[0], p[1], p[2]);
        }
        let element_type = ElementType::from_cell_kind(kind);
        for (c, cell) in cells.iter().enumerate() {
            if let Err(e) = builder.mesh.add_element(element_type, cell.clone()) {
                builder.errors.push(format!("cell {}: {}", c, e));
            }
        }
        builder.finish()
    }

    fn finish(mut self) -> Result<Mesh> {
        if !self.errors.is_empty() {
            return Err(SolverError::Mesh(format!(
                "Mesh building encountered {} errors:\n{}",
                self.errors.len(),
                self.errors.join("\n")
            )));
        }
        self.mesh.validate()?;
        self.mesh.calculate_dofs();
        log::debug!("{}", self.mesh.statistics().format());
        Ok(self.mesh)
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Interchange form of a solver mesh, one block per element type
pub fn mesh_to_data(mesh: &Mesh) -> MeshData {
    let mut data = MeshData::new(mesh.nodes.iter().map(|n| n.coords()).collect());
    for element in &mesh.elements {
        data.push_cell(element.element_type.cell_kind(), element.nodes.clone());
    }
    data
}

/// Axis-aligned box split into a structured grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxMesh {
    pub min: [f64; 3],
    pub max: [f64; 3],
    /// Grid cells along x, y and z
    pub divisions: [usize; 3],
}

impl BoxMesh {
    pub fn new(min: [f64; 3], max: [f64; 3], divisions: [usize; 3]) -> std::result::Result<Self, ConfigError> {
        if divisions.contains(&0) {
            return Err(ConfigError::InvalidParameter(format!(
                "box divisions must be positive, got {:?}",
                divisions
            )));
        }
        if (0..3).any(|a| max[a] <= min[a]) {
            return Err(ConfigError::InvalidParameter(format!(
                "empty box {:?} .. {:?}",
                min, max
            )));
        }
        Ok(Self { min, max, divisions })
    }

    fn vertex(&self, i: usize, j: usize, k: usize) -> usize {
        let [nx, ny, _] = self.divisions;
        (k * (ny + 1) + j) * (nx + 1) + i
    }

    fn grid_points(&self) -> Vec<[f64; 3]> {
        let [nx, ny, nz] = self.divisions;
        let coord = |a: usize, i: usize| {
            let t = i as f64 / self.divisions[a] as f64;
            self.min[a] + t * (self.max[a] - self.min[a])
        };
        let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    points.push([coord(0, i), coord(1, j), coord(2, k)]);
                }
            }
        }
        points
    }

    /// Grid cell corners in VTK hexahedron order
    fn cell_corners(&self, i: usize, j: usize, k: usize) -> [usize; 8] {
        [
            self.vertex(i, j, k),
            self.vertex(i + 1, j, k),
            self.vertex(i + 1, j + 1, k),
            self.vertex(i, j + 1, k),
            self.vertex(i, j, k + 1),
            self.vertex(i + 1, j, k + 1),
            self.vertex(i + 1, j + 1, k + 1),
            self.vertex(i, j + 1, k + 1),
        ]
    }

    fn for_each_cell(&self, mut f: impl FnMut(usize, usize, usize)) {
        let [nx, ny, nz] = self.divisions;
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    f(i, j, k);
                }
            }
        }
    }

    /// Eight-node bricks
    pub fn hexahedra(&self) -> MeshData {
        let mut data = MeshData::new(self.grid_points());
        self.for_each_cell(|i, j, k| data.push_cell(CellKind::Hexahedron, self.cell_corners(i, j, k).to_vec()));
        data
    }

    /// Six positively oriented tetrahedra per grid cell
    pub fn tetrahedra(&self) -> MeshData {
        // Corner bit pattern x + 2y + 4z, walked from 0 to 7 one axis at a time
        const PATHS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        let points = self.grid_points();
        let mut data = MeshData::new(points);
        self.for_each_cell(|i, j, k| {
            let corner = |bits: usize| self.vertex(i + (bits & 1), j + ((bits >> 1) & 1), k + ((bits >> 2) & 1));
            for path in PATHS {
                let mut bits = 0;
                let mut tet = vec![corner(0)];
                for axis in path {
                    bits |= 1 << axis;
                    tet.push(corner(bits));
                }
                if signed_volume(&data.points, &tet) < 0.0 {
                    tet.swap(1, 2);
                }
                data.push_cell(CellKind::Tetra, tet);
            }
        });
        data
    }

    /// Box mesh of the requested cell kind, elevating linear cells when needed
    pub fn generate(&self, kind: CellKind) -> Result<MeshData> {
        let data = match kind {
            CellKind::Tetra => self.tetrahedra(),
            CellKind::Hexahedron => self.hexahedra(),
            CellKind::Tetra10 => elevate_quadratic(&self.tetrahedra())?,
            CellKind::Hexahedron20 => elevate_quadratic(&self.hexahedra())?,
        };
        log::info!(
            "generated {} box mesh {:?}: {} points, {} cells",
            kind.name(),
            self.divisions,
            data.points.len(),
            data.num_cells()
        );
        Ok(data)
    }
}

fn signed_volume(points: &[[f64; 3]], tet: &[usize]) -> f64 {
    let p = |n: usize| nalgebra::Vector3::from(points[tet[n]]);
    let (a, b, c) = (p(1) - p(0), p(2) - p(0), p(3) - p(0));
    a.cross(&b).dot(&c) / 6.0
}

/// Add mid-edge nodes to linear tetrahedra and hexahedra.
///
/// Edges shared between cells get a single node; the new nodes follow the
/// existing points in first-seen order.
pub fn elevate_quadratic(data: &MeshData) -> Result<MeshData> {
    data.validate()?;
    let mut out = MeshData::new(data.points.clone());
    let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();

    for block in &data.blocks {
        let (target, edges): (CellKind, &[(usize, usize)]) = match block.kind {
            CellKind::Tetra => (CellKind::Tetra10, C3D10_EDGES.as_slice()),
            CellKind::Hexahedron => (CellKind::Hexahedron20, C3D20_EDGES.as_slice()),
            other => {
                return Err(ConfigError::InvalidParameter(format!(
                    "cannot elevate {} cells",
                    other.name()
                ))
                .into());
            }
        };
        for cell in &block.cells {
            let mut quadratic = cell.clone();
            for &(a, b) in edges {
                let (na, nb) = (cell[a], cell[b]);
                let key = (na.min(nb), na.max(nb));
                let node = *midpoints.entry(key).or_insert_with(|| {
                    let (pa, pb) = (out.points[na], out.points[nb]);
                    out.points.push([
                        0.5 * (pa[0] + pb[0]),
                        0.5 * (pa[1] + pb[1]),
                        0.5 * (pa[2] + pb[2]),
                    ]);
                    out.points.len() - 1
                });
                quadratic.push(node);
            }
            out.push_cell(target, quadratic);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box(n: [usize; 3]) -> BoxMesh {
        BoxMesh::new([0.0, 0.0, 0.0], [1.0, 2.0, 3.0], n).unwrap()
    }

    #[test]
    fn tetrahedra_fill_the_box_with_positive_volume() {
        let data = unit_box([2, 1, 3]).tetrahedra();
        let cells = data.cells_of(CellKind::Tetra).unwrap();
        assert_eq!(cells.len(), 6 * 6);
        let volumes: Vec<f64> = cells.iter().map(|t| signed_volume(&data.points, t)).collect();
        assert!(volumes.iter().all(|&v| v > 0.0));
        assert_relative_eq!(volumes.iter().sum::<f64>(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn tetrahedral_faces_are_conforming() {
        let data = unit_box([2, 2, 2]).tetrahedra();
        let mesh = MeshBuilder::build_from_data(&data, CellKind::Tetra).unwrap();
        // Only the 6 box sides can be boundary: 2 triangles per grid square
        let boundary = crate::sets::boundary_facets(&mesh);
        assert_eq!(boundary.len(), 6 * 4 * 2);
    }

    #[test]
    fn elevation_shares_edge_nodes() {
        let data = unit_box([2, 1, 1]).hexahedra();
        let quadratic = elevate_quadratic(&data).unwrap();
        // 3x2x2 grid points plus 8 + 6 + 6 unique edges in x, y and z
        assert_eq!(quadratic.points.len(), 12 + 8 + 6 + 6);
        let cells = quadratic.cells_of(CellKind::Hexahedron20).unwrap();
        assert_eq!(cells.len(), 2);
        let p = quadratic.points[cells[0][8]];
        assert_relative_eq!(p[0], 0.25);
        assert!(elevate_quadratic(&quadratic).is_err());
    }

    #[test]
    fn build_from_data_checks_block() {
        let data = unit_box([1, 1, 1]).hexahedra();
        let mesh = MeshBuilder::build_from_data(&data, CellKind::Hexahedron).unwrap();
        assert_eq!(mesh.num_dofs, 24);
        assert_eq!(mesh_to_data(&mesh), data);
        assert!(matches!(
            MeshBuilder::build_from_data(&data, CellKind::Tetra),
            Err(SolverError::Config(ConfigError::MissingCells(_)))
        ));
    }

    #[test]
    fn invalid_boxes_are_rejected() {
        assert!(BoxMesh::new([0.0; 3], [1.0; 3], [1, 0, 1]).is_err());
        assert!(BoxMesh::new([0.0; 3], [1.0, 0.0, 1.0], [1, 1, 1]).is_err());
    }
}

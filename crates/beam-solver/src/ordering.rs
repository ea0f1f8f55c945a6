//! Node-index remapping between the native (VTK) and variational local orders.
//!
//! A permutation table `perm` reads: variational local node `k` is native local
//! node `perm[k]`. Applying it row-wise to native connectivity gives the
//! connectivity the variational backend expects, on the same point array.

use beam_io::CellKind;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mesh::ElementType;
use crate::variational::VariationalElementKind;

pub const TETRA_P1: [usize; 4] = [0, 1, 2, 3];

pub const TETRA_P2: [usize; 10] = [0, 1, 2, 3, 9, 8, 5, 7, 6, 4];

pub const HEXA_Q1: [usize; 8] = [4, 5, 0, 1, 7, 6, 3, 2];

pub const HEXA_Q2: [usize; 20] = [
    4, 5, 0, 1, 7, 6, 3, 2, 12, 16, 15, 17, 13, 8, 11, 9, 14, 19, 18, 10,
];

/// Cell family of the beam mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementFamily {
    Tetrahedron,
    Hexahedron,
}

/// Element family and approximation degree chosen for a comparison run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    pub element: ElementFamily,
    pub degree: u8,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            element: ElementFamily::Tetrahedron,
            degree: 1,
        }
    }
}

/// Everything a comparison run derives from an [`ElementConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedElement {
    /// Mesh file name inside the mesh directory
    pub mesh_file: &'static str,
    /// Cell block to read from the mesh
    pub cell_kind: CellKind,
    pub native: ElementType,
    pub variational: VariationalElementKind,
    pub permutation: &'static [usize],
}

impl ElementConfig {
    pub fn new(element: ElementFamily, degree: u8) -> Self {
        Self { element, degree }
    }

    /// Resolve the (family, degree) pair, rejecting unsupported combinations.
    pub fn resolve(&self) -> Result<ResolvedElement, ConfigError> {
        let resolved = match (self.element, self.degree) {
            (ElementFamily::Tetrahedron, 1) => ResolvedElement {
                mesh_file: "beam_p1.vtu",
                cell_kind: CellKind::Tetra,
                native: ElementType::C3D4,
                variational: VariationalElementKind::P1Tetrahedron,
                permutation: &TETRA_P1,
            },
            (ElementFamily::Tetrahedron, 2) => ResolvedElement {
                mesh_file: "beam_p2.vtu",
                cell_kind: CellKind::Tetra10,
                native: ElementType::C3D10,
                variational: VariationalElementKind::P2Tetrahedron,
                permutation: &TETRA_P2,
            },
            (ElementFamily::Hexahedron, 1) => ResolvedElement {
                mesh_file: "beam_q1.vtu",
                cell_kind: CellKind::Hexahedron,
                native: ElementType::C3D8,
                variational: VariationalElementKind::Q1Hexahedron,
                permutation: &HEXA_Q1,
            },
            (ElementFamily::Hexahedron, 2) => ResolvedElement {
                mesh_file: "beam_q2.vtu",
                cell_kind: CellKind::Hexahedron20,
                native: ElementType::C3D20,
                variational: VariationalElementKind::S2Hexahedron,
                permutation: &HEXA_Q2,
            },
            (element, degree) => {
                return Err(ConfigError::UnsupportedElement {
                    element: format!("{:?}", element),
                    degree,
                });
            }
        };
        Ok(resolved)
    }
}

/// Apply `perm` to every cell: `out[c][k] = cells[c][perm[k]]`.
pub fn reorder_cells(cells: &[Vec<usize>], perm: &[usize]) -> Vec<Vec<usize>> {
    cells
        .iter()
        .map(|cell| perm.iter().map(|&k| cell[k]).collect())
        .collect()
}

/// Recover a permutation table from reference node geometry.
///
/// `map` sends a variational reference point to the native reference cell.
/// Returns `None` if some variational node has no native counterpart.
pub fn derive_permutation<F>(
    native_nodes: &[Vector3<f64>],
    variational_nodes: &[Vector3<f64>],
    map: F,
) -> Option<Vec<usize>>
where
    F: Fn(&Vector3<f64>) -> Vector3<f64>,
{
    variational_nodes
        .iter()
        .map(|x| {
            let y = map(x);
            native_nodes.iter().position(|n| (n - y).norm() < 1e-12)
        })
        .collect()
}

/// Affine map from the unit cube of the variational hexahedra to the native
/// `[-1, 1]³` cell, orientation preserving.
pub fn unit_cube_to_native(p: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(2.0 * p.x - 1.0, 2.0 * p.z - 1.0, 1.0 - 2.0 * p.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Element, native_element};
    use crate::variational::VariationalElement;

    fn all_configs() -> Vec<ElementConfig> {
        let mut configs = Vec::new();
        for family in [ElementFamily::Tetrahedron, ElementFamily::Hexahedron] {
            for degree in [1, 2] {
                configs.push(ElementConfig::new(family, degree));
            }
        }
        configs
    }

    fn reference_map(family: ElementFamily) -> fn(&Vector3<f64>) -> Vector3<f64> {
        match family {
            ElementFamily::Tetrahedron => |p| *p,
            ElementFamily::Hexahedron => unit_cube_to_native,
        }
    }

    #[test]
    fn tetra_p1_is_identity() {
        let resolved = ElementConfig::default().resolve().unwrap();
        assert_eq!(resolved.permutation, &[0, 1, 2, 3]);
        let cells = vec![vec![7, 3, 9, 1], vec![0, 1, 2, 3]];
        assert_eq!(reorder_cells(&cells, resolved.permutation), cells);
    }

    #[test]
    fn tetra_p2_reorders_edge_nodes() {
        let resolved = ElementConfig::new(ElementFamily::Tetrahedron, 2)
            .resolve()
            .unwrap();
        let native = vec![(10..20).collect::<Vec<usize>>()];
        let reordered = reorder_cells(&native, resolved.permutation);
        assert_eq!(reordered[0], vec![10, 11, 12, 13, 19, 18, 15, 17, 16, 14]);
    }

    #[test]
    fn unsupported_degree_is_rejected() {
        let err = ElementConfig::new(ElementFamily::Hexahedron, 3)
            .resolve()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedElement {
                element: "Hexahedron".to_string(),
                degree: 3
            }
        );
    }

    #[test]
    fn tables_follow_from_element_geometry() {
        for config in all_configs() {
            let resolved = config.resolve().unwrap();
            let native = native_element(resolved.native).reference_nodes();
            let variational = resolved.variational.reference_nodes();
            let derived = derive_permutation(&native, &variational, reference_map(config.element));
            assert_eq!(
                derived.as_deref(),
                Some(resolved.permutation),
                "{:?}",
                config
            );
        }
    }

    #[test]
    fn permuted_shape_functions_coincide() {
        let probe = Vector3::new(0.15, 0.3, 0.2);
        for config in all_configs() {
            let resolved = config.resolve().unwrap();
            let native = native_element(resolved.native);
            let variational = VariationalElement::new(resolved.variational).unwrap();
            let map = reference_map(config.element);

            let nv = variational.shape_functions(&probe);
            let nn = native.shape_functions(&map(&probe));
            for (k, &j) in resolved.permutation.iter().enumerate() {
                assert!((nv[k] - nn[j]).abs() < 1e-12, "{:?} node {}", config, k);
            }
        }
    }

    #[test]
    fn cube_map_preserves_orientation() {
        let e = [Vector3::x(), Vector3::y(), Vector3::z()];
        let o = unit_cube_to_native(&Vector3::zeros());
        let cols: Vec<Vector3<f64>> = e.iter().map(|v| unit_cube_to_native(v) - o).collect();
        let a = nalgebra::Matrix3::from_columns(&cols);
        assert!((a.determinant() - 8.0).abs() < 1e-12);
    }
}

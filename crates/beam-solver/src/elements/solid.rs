//! C3D8: 8-node hexahedral (brick) element with trilinear shape functions
//!
//! Node ordering (VTK convention):
//! ```text
//!        7----------6
//!       /|         /|
//!      / |        / |
//!     4----------5  |
//!     |  3-------|--2
//!     | /        | /
//!     |/         |/
//!     0----------1
//! ```
//!
//! - Bottom face: nodes 0,1,2,3 (ζ = -1 in local coords)
//! - Top face: nodes 4,5,6,7 (ζ = +1 in local coords)
//! - Local coordinates: ξ, η, ζ ∈ [-1, 1]³
//! - Integration: 2×2×2 Gauss quadrature (8 integration points)

use nalgebra::Vector3;

use super::Element;
use crate::quadrature::{self, CubeDomain, QuadraturePoint};

/// Natural coordinates of the 8 corner nodes
pub(crate) const HEX_CORNERS: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// C3D8: 8-node hexahedral (brick) element
#[derive(Debug, Clone, Copy, Default)]
pub struct C3D8;

impl Element for C3D8 {
    fn name(&self) -> &'static str {
        "C3D8"
    }

    fn num_nodes(&self) -> usize {
        8
    }

    fn reference_nodes(&self) -> Vec<Vector3<f64>> {
        HEX_CORNERS.iter().map(|c| Vector3::new(c[0], c[1], c[2])).collect()
    }

    /// N_i = (1 + ξξ_i)(1 + ηη_i)(1 + ζζ_i) / 8
    fn shape_functions(&self, xi: &Vector3<f64>) -> Vec<f64> {
        HEX_CORNERS
            .iter()
            .map(|n| (1.0 + xi.x * n[0]) * (1.0 + xi.y * n[1]) * (1.0 + xi.z * n[2]) / 8.0)
            .collect()
    }

    fn shape_derivatives(&self, xi: &Vector3<f64>) -> Vec<Vector3<f64>> {
        HEX_CORNERS
            .iter()
            .map(|n| {
                let (a, b, c) = (1.0 + xi.x * n[0], 1.0 + xi.y * n[1], 1.0 + xi.z * n[2]);
                // dN_i/dξ = ξ_i(1 + ηη_i)(1 + ζζ_i) / 8, and cyclic
                Vector3::new(n[0] * b * c, a * n[1] * c, a * b * n[2]) / 8.0
            })
            .collect()
    }

    fn quadrature(&self) -> Vec<QuadraturePoint> {
        quadrature::hexahedron(2, CubeDomain::Symmetric)
    }
}

//! C3D20: 20-node quadratic serendipity hexahedral element
//!
//! - Corners 0-7 as C3D8
//! - Mid-edge nodes 8-19, bottom ring, top ring, then verticals:
//!   (0,1) (1,2) (2,3) (3,0) | (4,5) (5,6) (6,7) (7,4) | (0,4) (1,5) (2,6) (3,7)
//! - Integration: 3×3×3 Gauss quadrature (27 points)

use nalgebra::Vector3;

use super::Element;
use super::solid::HEX_CORNERS;
use crate::quadrature::{self, CubeDomain, QuadraturePoint};

/// Corner pairs of the mid-edge nodes 8..19
pub const C3D20_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// C3D20: 20-node serendipity brick
#[derive(Debug, Clone, Copy, Default)]
pub struct C3D20;

impl C3D20 {
    fn node_coords() -> [[f64; 3]; 20] {
        let mut nodes = [[0.0; 3]; 20];
        nodes[..8].copy_from_slice(&HEX_CORNERS);
        for (k, &(a, b)) in C3D20_EDGES.iter().enumerate() {
            for d in 0..3 {
                nodes[8 + k][d] = 0.5 * (HEX_CORNERS[a][d] + HEX_CORNERS[b][d]);
            }
        }
        nodes
    }
}

/// Serendipity shape function of the node at `n` (entries in {-1, 0, 1}) and
/// its gradient, evaluated at `xi` in `[-1, 1]³`.
fn serendipity(n: &[f64; 3], xi: &Vector3<f64>) -> (f64, Vector3<f64>) {
    let p = [xi.x, xi.y, xi.z];
    match n.iter().position(|&c| c == 0.0) {
        None => {
            // Corner: (1+ξξi)(1+ηηi)(1+ζζi)(ξξi+ηηi+ζζi-2)/8
            let f = [1.0 + p[0] * n[0], 1.0 + p[1] * n[1], 1.0 + p[2] * n[2]];
            let s = p[0] * n[0] + p[1] * n[1] + p[2] * n[2];
            let value = f[0] * f[1] * f[2] * (s - 2.0) / 8.0;
            let mut grad = Vector3::zeros();
            for d in 0..3 {
                let others = f[(d + 1) % 3] * f[(d + 2) % 3];
                grad[d] = n[d] * others * (p[d] * n[d] + s - 1.0) / 8.0;
            }
            (value, grad)
        }
        Some(m) => {
            // Mid-edge along axis m: (1-ξm²)(1+ξjξj,i)(1+ξkξk,i)/4
            let (j, k) = ((m + 1) % 3, (m + 2) % 3);
            let bubble = 1.0 - p[m] * p[m];
            let fj = 1.0 + p[j] * n[j];
            let fk = 1.0 + p[k] * n[k];
            let mut grad = Vector3::zeros();
            grad[m] = -2.0 * p[m] * fj * fk / 4.0;
            grad[j] = bubble * n[j] * fk / 4.0;
            grad[k] = bubble * fj * n[k] / 4.0;
            (bubble * fj * fk / 4.0, grad)
        }
    }
}

impl Element for C3D20 {
    fn name(&self) -> &'static str {
        "C3D20"
    }

    fn num_nodes(&self) -> usize {
        20
    }

    fn reference_nodes(&self) -> Vec<Vector3<f64>> {
        Self::node_coords()
            .iter()
            .map(|c| Vector3::new(c[0], c[1], c[2]))
            .collect()
    }

    fn shape_functions(&self, xi: &Vector3<f64>) -> Vec<f64> {
        Self::node_coords()
            .iter()
            .map(|n| serendipity(n, xi).0)
            .collect()
    }

    fn shape_derivatives(&self, xi: &Vector3<f64>) -> Vec<Vector3<f64>> {
        Self::node_coords()
            .iter()
            .map(|n| serendipity(n, xi).1)
            .collect()
    }

    fn quadrature(&self) -> Vec<QuadraturePoint> {
        quadrature::hexahedron(3, CubeDomain::Symmetric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::test_support::check_reference_element;
    use approx::assert_relative_eq;

    #[test]
    fn reference_properties() {
        check_reference_element(&C3D20, Vector3::new(0.3, -0.6, 0.45));
    }

    #[test]
    fn mid_edge_nodes() {
        let nodes = C3D20.reference_nodes();
        assert_relative_eq!(nodes[8], Vector3::new(0.0, -1.0, -1.0));
        assert_relative_eq!(nodes[11], Vector3::new(-1.0, 0.0, -1.0));
        assert_relative_eq!(nodes[18], Vector3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn reference_volume() {
        let coords = C3D20.reference_nodes();
        assert_relative_eq!(C3D20.volume(&coords).unwrap(), 8.0, epsilon = 1e-12);
    }
}

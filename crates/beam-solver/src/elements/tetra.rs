//! C3D4: 4-node linear tetrahedral solid element
//!
//! Node numbering (VTK convention) on the unit tetrahedron:
//!
//! - Node 0 at the origin, nodes 1, 2, 3 on the ξ, η, ζ axes
//! - Barycentric coordinates: L0 = 1 - ξ - η - ζ, L1 = ξ, L2 = η, L3 = ζ
//! - Integration: 1-point centroid rule (exact for the constant gradients)

use nalgebra::Vector3;

use super::Element;
use crate::quadrature::{self, QuadraturePoint};

/// Barycentric coordinates of `xi` on the unit tetrahedron
pub(crate) fn barycentric(xi: &Vector3<f64>) -> [f64; 4] {
    [1.0 - xi.x - xi.y - xi.z, xi.x, xi.y, xi.z]
}

/// Reference gradients of the barycentric coordinates
pub(crate) fn barycentric_gradients() -> [Vector3<f64>; 4] {
    [
        Vector3::new(-1.0, -1.0, -1.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
    ]
}

/// Vertices of the unit tetrahedron
pub(crate) fn unit_tet_vertices() -> [Vector3<f64>; 4] {
    [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
    ]
}

/// C3D4: 4-node linear tetrahedron
#[derive(Debug, Clone, Copy, Default)]
pub struct C3D4;

impl Element for C3D4 {
    fn name(&self) -> &'static str {
        "C3D4"
    }

    fn num_nodes(&self) -> usize {
        4
    }

    fn reference_nodes(&self) -> Vec<Vector3<f64>> {
        unit_tet_vertices().to_vec()
    }

    fn shape_functions(&self, xi: &Vector3<f64>) -> Vec<f64> {
        barycentric(xi).to_vec()
    }

    fn shape_derivatives(&self, _xi: &Vector3<f64>) -> Vec<Vector3<f64>> {
        barycentric_gradients().to_vec()
    }

    fn quadrature(&self) -> Vec<QuadraturePoint> {
        quadrature::tetrahedron(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::test_support::{affine_coords, check_reference_element};
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    #[test]
    fn reference_properties() {
        check_reference_element(&C3D4, Vector3::new(0.2, 0.3, 0.1));
    }

    #[test]
    fn volume_of_scaled_tet() {
        let a = Matrix3::from_diagonal(&Vector3::new(2.0, 3.0, 4.0));
        let coords = affine_coords(&C3D4, &a, &Vector3::new(1.0, -1.0, 5.0));
        assert_relative_eq!(C3D4.volume(&coords).unwrap(), 4.0, epsilon = 1e-12);
    }
}

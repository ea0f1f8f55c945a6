//! C3D10: 10-node quadratic tetrahedral solid element
//!
//! - 4 corner nodes + 6 mid-edge nodes
//! - Quadratic shape functions in barycentric coordinates
//! - 3 DOFs per node (ux, uy, uz)
//! - 4-point integration (exact for the quadratic-gradient products of the
//!   small-strain stiffness)
//!
//! Node numbering (VTK convention):
//! ```text
//! Nodes 0-3: corners of the unit tetrahedron
//! Nodes 4-9: mid-edge (4: 0-1, 5: 1-2, 6: 0-2, 7: 0-3, 8: 1-3, 9: 2-3)
//! ```

use nalgebra::Vector3;

use super::Element;
use super::tetra::{barycentric, barycentric_gradients, unit_tet_vertices};
use crate::quadrature::{self, QuadraturePoint};

/// Corner pairs of the mid-edge nodes 4..9
pub const C3D10_EDGES: [(usize, usize); 6] = [(0, 1), (1, 2), (0, 2), (0, 3), (1, 3), (2, 3)];

/// C3D10: 10-node quadratic tetrahedral element
#[derive(Debug, Clone, Copy, Default)]
pub struct C3D10;

impl Element for C3D10 {
    fn name(&self) -> &'static str {
        "C3D10"
    }

    fn num_nodes(&self) -> usize {
        10
    }

    fn reference_nodes(&self) -> Vec<Vector3<f64>> {
        let v = unit_tet_vertices();
        let mut nodes = v.to_vec();
        nodes.extend(C3D10_EDGES.iter().map(|&(a, b)| (v[a] + v[b]) * 0.5));
        nodes
    }

    fn shape_functions(&self, xi: &Vector3<f64>) -> Vec<f64> {
        let l = barycentric(xi);
        let mut n = Vec::with_capacity(10);
        // Corner nodes
        for &li in &l {
            n.push(li * (2.0 * li - 1.0));
        }
        // Mid-edge nodes
        for &(a, b) in &C3D10_EDGES {
            n.push(4.0 * l[a] * l[b]);
        }
        n
    }

    fn shape_derivatives(&self, xi: &Vector3<f64>) -> Vec<Vector3<f64>> {
        let l = barycentric(xi);
        let dl = barycentric_gradients();
        let mut dn = Vec::with_capacity(10);
        for i in 0..4 {
            dn.push(dl[i] * (4.0 * l[i] - 1.0));
        }
        for &(a, b) in &C3D10_EDGES {
            dn.push((dl[b] * l[a] + dl[a] * l[b]) * 4.0);
        }
        dn
    }

    fn quadrature(&self) -> Vec<QuadraturePoint> {
        quadrature::tetrahedron(2)
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
        check_reference_element(&C3D10, Vector3::new(0.15, 0.25, 0.35));
    }

    #[test]
    fn edge_nodes_sit_at_midpoints() {
        let nodes = C3D10.reference_nodes();
        assert_relative_eq!(nodes[4], Vector3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(nodes[5], Vector3::new(0.5, 0.5, 0.0));
        assert_relative_eq!(nodes[9], Vector3::new(0.0, 0.5, 0.5));
    }

    #[test]
    fn gradients_reproduce_quadratic_field() {
        // u = x² + yz is reproduced exactly by the quadratic basis
        let a = Matrix3::new(2.0, 0.3, 0.0, 0.0, 1.5, 0.2, 0.1, 0.0, 3.0);
        let coords = affine_coords(&C3D10, &a, &Vector3::new(0.5, 0.0, -1.0));
        let values: Vec<f64> = coords.iter().map(|x| x.x * x.x + x.y * x.z).collect();

        let xi = Vector3::new(0.2, 0.1, 0.3);
        let (grads, _) = C3D10.physical_gradients(&coords, &xi).unwrap();
        let n = C3D10.shape_functions(&xi);
        let x: Vector3<f64> = coords.iter().zip(&n).map(|(c, &w)| c * w).sum();

        let grad: Vector3<f64> = grads.iter().zip(&values).map(|(g, &v)| g * v).sum();
        assert_relative_eq!(grad, Vector3::new(2.0 * x.x, x.z, x.y), epsilon = 1e-10);
    }
}

//! Reference element library.
//!
//! An [`Element`] knows its reference cell: node coordinates, shape functions
//! and their derivatives, and the quadrature rule used to integrate over it.
//! Everything physical (Jacobians, gradients in the rest configuration) is
//! derived from those through the provided trait methods, so force fields can
//! treat every element type alike.
//!
//! Native elements use VTK local node order on the symmetric reference cells.
//! The variational elements live in [`crate::variational`].

use nalgebra::{Matrix3, Vector3};

use crate::error::ElementError;
use crate::quadrature::QuadraturePoint;

pub mod factory;
pub mod solid;
pub mod solid10;
pub mod solid20;
pub mod tetra;

pub use factory::native_element;
pub use solid::C3D8;
pub use solid10::C3D10;
pub use solid20::C3D20;
pub use tetra::C3D4;

/// Reference element interface
pub trait Element: Send + Sync {
    /// Short element name for logs and errors
    fn name(&self) -> &'static str;

    /// Get the number of nodes for this element type
    fn num_nodes(&self) -> usize;

    /// Get the number of degrees of freedom per node
    fn dofs_per_node(&self) -> usize {
        3
    }

    /// Node coordinates in the reference cell, in local node order
    fn reference_nodes(&self) -> Vec<Vector3<f64>>;

    /// Shape function values at reference point `xi`
    fn shape_functions(&self, xi: &Vector3<f64>) -> Vec<f64>;

    /// Shape function gradients with respect to the reference coordinates
    fn shape_derivatives(&self, xi: &Vector3<f64>) -> Vec<Vector3<f64>>;

    /// Integration points and weights on the reference cell
    fn quadrature(&self) -> Vec<QuadraturePoint>;

    /// Jacobian `J[(r, c)] = Σ_a ∂N_a/∂ξ_r x_a,c`
    fn jacobian(
        &self,
        coords: &[Vector3<f64>],
        xi: &Vector3<f64>,
    ) -> Result<Matrix3<f64>, ElementError> {
        check_node_count(self.num_nodes(), coords)?;
        let dn = self.shape_derivatives(xi);
        Ok(jacobian_from(&dn, coords))
    }

    /// Shape gradients with respect to `coords` and the Jacobian determinant.
    fn physical_gradients(
        &self,
        coords: &[Vector3<f64>],
        xi: &Vector3<f64>,
    ) -> Result<(Vec<Vector3<f64>>, f64), ElementError> {
        check_node_count(self.num_nodes(), coords)?;
        let dn = self.shape_derivatives(xi);
        let j = jacobian_from(&dn, coords);
        let det_j = j.determinant();
        if det_j <= 0.0 {
            return Err(ElementError::NonPositiveJacobian(det_j));
        }
        let j_inv = j
            .try_inverse()
            .ok_or(ElementError::NonPositiveJacobian(det_j))?;
        Ok((dn.iter().map(|d| j_inv * d).collect(), det_j))
    }

    /// Volume of the element spanned by `coords`
    fn volume(&self, coords: &[Vector3<f64>]) -> Result<f64, ElementError> {
        let mut volume = 0.0;
        for qp in self.quadrature() {
            let (_, det_j) = self.physical_gradients(coords, &qp.xi)?;
            volume += qp.weight * det_j;
        }
        Ok(volume)
    }

    /// Get the global DOF indices for this element
    fn global_dof_indices(&self, connectivity: &[usize]) -> Vec<usize> {
        let dofs_per_node = self.dofs_per_node();
        let mut indices = Vec::with_capacity(connectivity.len() * dofs_per_node);
        for &node in connectivity {
            let base_dof = node * dofs_per_node;
            for local_dof in 0..dofs_per_node {
                indices.push(base_dof + local_dof);
            }
        }
        indices
    }
}

fn check_node_count(expected: usize, coords: &[Vector3<f64>]) -> Result<(), ElementError> {
    if coords.len() != expected {
        return Err(ElementError::NodeCount {
            expected,
            actual: coords.len(),
        });
    }
    Ok(())
}

fn jacobian_from(dn: &[Vector3<f64>], coords: &[Vector3<f64>]) -> Matrix3<f64> {
    let mut j = Matrix3::zeros();
    for (d, x) in dn.iter().zip(coords) {
        j += d * x.transpose();
    }
    j
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_dof_indices_interleave_components() {
        let elem = C3D4;
        assert_eq!(
            elem.global_dof_indices(&[0, 4, 1, 2]),
            vec![0, 1, 2, 12, 13, 14, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn wrong_coordinate_count_is_rejected() {
        let elem = C3D8;
        let coords = vec![Vector3::zeros(); 4];
        let err = elem
            .physical_gradients(&coords, &Vector3::zeros())
            .unwrap_err();
        assert_eq!(
            err,
            ElementError::NodeCount {
                expected: 8,
                actual: 4
            }
        );
    }

    #[test]
    fn inverted_element_is_rejected() {
        let elem = C3D4;
        let mut coords = elem.reference_nodes();
        coords.swap(1, 2);
        let err = elem
            .physical_gradients(&coords, &Vector3::new(0.25, 0.25, 0.25))
            .unwrap_err();
        assert!(matches!(err, ElementError::NonPositiveJacobian(d) if d < 0.0));
    }
}

//! Hyperelastic force fields.
//!
//! A [`ForceField`] caches reference-configuration data when the simulation is
//! initialised and then evaluates the internal force `f(u)` and its tangent
//! `K = ∂f/∂u` for any displacement. Two formulations are provided:
//!
//! - [`HyperelasticForceField`]: total Lagrangian, Voigt B-matrices, native
//!   elements in VTK order
//! - [`VariationalForceField`]: first Piola stress and first elasticity tensor,
//!   variational elements in their own order, optional body force

use nalgebra::{DVector, Matrix3, Vector3};
use rayon::prelude::*;

use crate::assembly::AssembledSystem;
use crate::elements::Element;
use crate::error::{Result, SolverError};
use crate::mesh::DOFS_PER_NODE;

pub mod hyperelastic;
pub mod variational;

pub use hyperelastic::HyperelasticForceField;
pub use variational::VariationalForceField;

/// Internal force provider
pub trait ForceField: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cache shape gradients and weights on the rest configuration.
    fn init(&mut self, rest: &[Vector3<f64>]) -> Result<()>;

    /// Internal force and, when requested, tangent at `displacement`.
    fn assemble(&self, displacement: &DVector<f64>, with_tangent: bool) -> Result<AssembledSystem>;
}

/// Rest-configuration data at one integration point
#[derive(Debug, Clone)]
pub struct GaussData {
    /// Quadrature weight times `det J`
    pub weight: f64,
    pub values: Vec<f64>,
    /// Shape gradients with respect to rest coordinates
    pub gradients: Vec<Vector3<f64>>,
}

/// Gauss data of every cell, computed in parallel.
pub fn precompute(
    element: &dyn Element,
    rest: &[Vector3<f64>],
    cells: &[Vec<usize>],
) -> Result<Vec<Vec<GaussData>>> {
    let quadrature = element.quadrature();
    cells
        .par_iter()
        .enumerate()
        .map(|(e, cell)| -> Result<Vec<GaussData>> {
            let coords = cell
                .iter()
                .map(|&n| {
                    rest.get(n).copied().ok_or_else(|| {
                        SolverError::Mesh(format!("cell {} references missing point {}", e, n))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            quadrature
                .iter()
                .map(|qp| {
                    let (gradients, det_j) = element
                        .physical_gradients(&coords, &qp.xi)
                        .map_err(|source| SolverError::Element { element: e, source })?;
                    Ok(GaussData {
                        weight: qp.weight * det_j,
                        values: element.shape_functions(&qp.xi),
                        gradients,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

/// Nodal displacements of one cell
pub fn cell_displacements(cell: &[usize], u: &DVector<f64>) -> Vec<Vector3<f64>> {
    cell.iter()
        .map(|&n| {
            let b = DOFS_PER_NODE * n;
            Vector3::new(u[b], u[b + 1], u[b + 2])
        })
        .collect()
}

/// `F = I + Σ_a u_a ⊗ ∇N_a`
pub fn deformation_gradient(u: &[Vector3<f64>], gradients: &[Vector3<f64>]) -> Matrix3<f64> {
    let mut f = Matrix3::identity();
    for (ua, ga) in u.iter().zip(gradients) {
        f += ua * ga.transpose();
    }
    f
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::C3D8;
    use approx::assert_relative_eq;

    #[test]
    fn gauss_weights_sum_to_volume() {
        let rest: Vec<Vector3<f64>> = C3D8.reference_nodes().iter().map(|x| x * 2.0).collect();
        let data = precompute(&C3D8, &rest, &[(0..8).collect()]).unwrap();
        let volume: f64 = data[0].iter().map(|g| g.weight).sum();
        assert_relative_eq!(volume, 64.0, epsilon = 1e-12);
    }

    #[test]
    fn homogeneous_stretch_is_recovered() {
        let rest = C3D8.reference_nodes();
        let data = precompute(&C3D8, &rest, &[(0..8).collect()]).unwrap();
        let a = Matrix3::new(0.1, 0.02, 0.0, 0.0, -0.05, 0.03, 0.01, 0.0, 0.2);
        let u: Vec<Vector3<f64>> = rest.iter().map(|x| a * x).collect();
        for g in &data[0] {
            let f = deformation_gradient(&u, &g.gradients);
            assert_relative_eq!(f, Matrix3::identity() + a, epsilon = 1e-13);
        }
    }

    #[test]
    fn missing_points_are_reported() {
        let rest = C3D8.reference_nodes();
        let err = precompute(&C3D8, &rest, &[(1..9).collect()]).unwrap_err();
        assert!(matches!(err, SolverError::Mesh(_)));
    }
}

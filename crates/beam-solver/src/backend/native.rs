//! Native backend using nalgebra-sparse.
//!
//! Assembles the COO triplets into CSC storage and factors with the sparse
//! Cholesky of nalgebra-sparse. Requires a symmetric positive definite
//! tangent.

use super::traits::*;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix};

/// Sparse Cholesky backend built on nalgebra-sparse.
pub struct NativeBackend;

impl LinearSolver for NativeBackend {
    fn solve_linear(
        &self,
        system: &LinearSystemData,
    ) -> Result<(DVector<f64>, SolveInfo), BackendError> {
        check_system(system)?;
        let n = system.num_dofs;

        let coo = CooMatrix::try_from_triplets(
            n,
            n,
            system.stiffness.row_indices.clone(),
            system.stiffness.col_indices.clone(),
            system.stiffness.values.clone(),
        )
        .map_err(|e| BackendError(format!("invalid triplets: {}", e)))?;
        let k = CscMatrix::from(&coo);

        let chol = CscCholesky::factor(&k)
            .map_err(|e| BackendError(format!("Cholesky factorization failed: {:?}", e)))?;

        let rhs = DMatrix::from_column_slice(n, 1, system.force.as_slice());
        let x = chol.solve(&rhs);
        let u = DVector::from_column_slice(x.as_slice());
        check_solution(&u)?;

        let residual = system.stiffness.mul_vec(&u) - &system.force;

        Ok((
            u,
            SolveInfo {
                iterations: 1,
                residual_norm: Some(residual.norm()),
                solver_name: "nalgebra-sparse-Cholesky".to_string(),
            },
        ))
    }
}

impl SolverBackend for NativeBackend {
    fn name(&self) -> &str {
        "native-nalgebra-sparse"
    }
}

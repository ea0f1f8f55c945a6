//! Sparse LDLᵀ backend using `sprs-ldl`.
//!
//! Direct factorization with reverse Cuthill-McKee fill-in reduction. Works
//! for symmetric indefinite tangents, so it is the default for Newton solves
//! far from equilibrium.

use super::traits::*;
use nalgebra::DVector;
use sprs::{CsMat, FillInReduction, SymmetryCheck, TriMat};
use sprs_ldl::Ldl;

/// Sparse LDLᵀ solver backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseLdlBackend;

impl LinearSolver for SparseLdlBackend {
    fn solve_linear(
        &self,
        system: &LinearSystemData,
    ) -> Result<(DVector<f64>, SolveInfo), BackendError> {
        check_system(system)?;
        let n = system.num_dofs;

        let triplets = TriMat::from_triplets(
            (n, n),
            system.stiffness.row_indices.clone(),
            system.stiffness.col_indices.clone(),
            system.stiffness.values.clone(),
        );
        let k: CsMat<f64> = triplets.to_csc();

        let ldl = Ldl::new()
            .fill_in_reduction(FillInReduction::ReverseCuthillMcKee)
            .check_symmetry(SymmetryCheck::DontCheckSymmetry)
            .numeric(k.view())
            .map_err(|e| BackendError(format!("LDL factorization failed: {:?}", e)))?;

        if let Some(i) = ldl.d().iter().position(|&d| d == 0.0) {
            return Err(BackendError(format!("zero pivot at row {} (singular matrix)", i)));
        }

        let u = DVector::from_vec(ldl.solve(system.force.as_slice()));
        check_solution(&u)?;

        let residual = system.stiffness.mul_vec(&u) - &system.force;

        Ok((
            u,
            SolveInfo {
                iterations: 1,
                residual_norm: Some(residual.norm()),
                solver_name: "sprs-LDL".to_string(),
            },
        ))
    }
}

impl SolverBackend for SparseLdlBackend {
    fn name(&self) -> &str {
        "sprs-ldl"
    }
}

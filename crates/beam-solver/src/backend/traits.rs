//! Backend trait definitions for the linear solves inside Newton iterations.
//!
//! Element-level computations stay in nalgebra (small, dense matrices);
//! the global tangent travels to the backend as COO triplets.

use nalgebra::DVector;

/// Error type for backend operations.
#[derive(Debug, Clone)]
pub struct BackendError(pub String);

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BackendError {}

impl From<String> for BackendError {
    fn from(s: String) -> Self {
        BackendError(s)
    }
}

impl From<&str> for BackendError {
    fn from(s: &str) -> Self {
        BackendError(s.to_string())
    }
}

/// Sparse matrix in COO (coordinate/triplet) format.
///
/// Duplicate entries are allowed and summed by every consumer.
#[derive(Debug, Clone, Default)]
pub struct SparseTripletsF64 {
    pub nrows: usize,
    pub ncols: usize,
    pub row_indices: Vec<usize>,
    pub col_indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseTripletsF64 {
    /// Empty square matrix.
    pub fn new(n: usize) -> Self {
        Self {
            nrows: n,
            ncols: n,
            ..Default::default()
        }
    }

    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        self.row_indices.push(row);
        self.col_indices.push(col);
        self.values.push(value);
    }

    /// Number of stored entries (duplicates counted).
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// y = A x, summing duplicates.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        let mut y = DVector::zeros(self.nrows);
        for i in 0..self.nnz() {
            y[self.row_indices[i]] += self.values[i] * x[self.col_indices[i]];
        }
        y
    }

    /// Zero constrained rows and columns and put 1 on their diagonal.
    pub fn project_out(&mut self, constrained: &[bool]) {
        let mut k = 0;
        for i in 0..self.nnz() {
            let (r, c) = (self.row_indices[i], self.col_indices[i]);
            if constrained[r] || constrained[c] {
                continue;
            }
            self.row_indices[k] = r;
            self.col_indices[k] = c;
            self.values[k] = self.values[i];
            k += 1;
        }
        self.row_indices.truncate(k);
        self.col_indices.truncate(k);
        self.values.truncate(k);

        for (dof, &fixed) in constrained.iter().enumerate() {
            if fixed {
                self.push(dof, dof, 1.0);
            }
        }
    }
}

/// A linear system ready for solving: K * u = F.
///
/// Boundary conditions are already applied to K and F.
pub struct LinearSystemData {
    /// Tangent matrix in COO triplet format
    pub stiffness: SparseTripletsF64,
    /// Right-hand side
    pub force: DVector<f64>,
    /// Total number of degrees of freedom
    pub num_dofs: usize,
    /// Indices of constrained DOFs (for diagnostics)
    pub constrained_dofs: Vec<usize>,
}

/// Solver diagnostic info.
#[derive(Debug, Clone)]
pub struct SolveInfo {
    /// Number of iterations (1 for direct solvers)
    pub iterations: usize,
    /// Final residual norm ‖K u − F‖
    pub residual_norm: Option<f64>,
    /// Human-readable solver name (e.g., "sprs-LDL")
    pub solver_name: String,
}

/// Trait for a linear solver backend.
pub trait LinearSolver: Send + Sync {
    /// Solve K * u = F and return the solution vector.
    fn solve_linear(
        &self,
        system: &LinearSystemData,
    ) -> Result<(DVector<f64>, SolveInfo), BackendError>;
}

/// A named linear solver backend.
pub trait SolverBackend: LinearSolver {
    /// Human-readable name of this backend.
    fn name(&self) -> &str;
}

pub(crate) fn check_system(system: &LinearSystemData) -> Result<(), BackendError> {
    let n = system.num_dofs;
    if system.stiffness.nrows != n || system.stiffness.ncols != n || system.force.len() != n {
        return Err(BackendError(format!(
            "inconsistent system: {}x{} matrix, {} rhs entries, {} dofs",
            system.stiffness.nrows,
            system.stiffness.ncols,
            system.force.len(),
            n
        )));
    }
    if n == 0 {
        return Err("empty system".into());
    }
    Ok(())
}

pub(crate) fn check_solution(u: &DVector<f64>) -> Result<(), BackendError> {
    if u.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err("solution contains non-finite values (singular matrix?)".into())
    }
}

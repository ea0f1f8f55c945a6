//! Global assembly of nonlinear element contributions.
//!
//! ## Assembly Process
//!
//! 1. Compute every element's force vector and tangent in parallel (`rayon`)
//! 2. Scatter them, in element order, into a global force vector and COO triplets
//! 3. Apply Dirichlet constraints by projection before the linear solve
//!
//! Duplicate `(i, j)` triplets are summed by the linear backends, or when the
//! tangent is converted to CSR.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rayon::prelude::*;

use crate::backend::SparseTripletsF64;
use crate::error::{Result, SolverError};
use crate::mesh::DOFS_PER_NODE;

/// Force and tangent of one element, in local interleaved DOF order
#[derive(Debug, Clone)]
pub struct ElementContribution {
    /// Global node indices of the element, matching the local order
    pub nodes: Vec<usize>,
    pub force: DVector<f64>,
    pub stiffness: Option<DMatrix<f64>>,
}

impl ElementContribution {
    pub fn new(nodes: Vec<usize>, with_tangent: bool) -> Self {
        let n = nodes.len() * DOFS_PER_NODE;
        Self {
            nodes,
            force: DVector::zeros(n),
            stiffness: with_tangent.then(|| DMatrix::zeros(n, n)),
        }
    }

    fn global_dofs(&self) -> Vec<usize> {
        self.nodes
            .iter()
            .flat_map(|&n| (0..DOFS_PER_NODE).map(move |c| DOFS_PER_NODE * n + c))
            .collect()
    }
}

/// Global force vector and (optionally) tangent
#[derive(Debug, Clone)]
pub struct AssembledSystem {
    pub force: DVector<f64>,
    pub tangent: Option<SparseTripletsF64>,
}

impl AssembledSystem {
    pub fn zeros(num_dofs: usize, with_tangent: bool) -> Self {
        Self {
            force: DVector::zeros(num_dofs),
            tangent: with_tangent.then(|| SparseTripletsF64::new(num_dofs)),
        }
    }

    pub fn num_dofs(&self) -> usize {
        self.force.len()
    }

    /// Scatter one element into the global system.
    pub fn add(&mut self, contribution: &ElementContribution) {
        let dofs = contribution.global_dofs();
        for (i_local, &i_global) in dofs.iter().enumerate() {
            self.force[i_global] += contribution.force[i_local];
        }
        if let (Some(tangent), Some(k_e)) = (self.tangent.as_mut(), contribution.stiffness.as_ref()) {
            for (i_local, &i_global) in dofs.iter().enumerate() {
                for (j_local, &j_global) in dofs.iter().enumerate() {
                    let v = k_e[(i_local, j_local)];
                    if v != 0.0 {
                        tangent.push(i_global, j_global, v);
                    }
                }
            }
        }
    }

    /// Add another system of the same size (used to combine force fields).
    pub fn merge(&mut self, other: AssembledSystem) {
        self.force += other.force;
        if let (Some(tangent), Some(extra)) = (self.tangent.as_mut(), other.tangent) {
            tangent.row_indices.extend(extra.row_indices);
            tangent.col_indices.extend(extra.col_indices);
            tangent.values.extend(extra.values);
        }
    }

    /// Zero the constrained residual entries and project the tangent.
    pub fn apply_dirichlet(&mut self, constrained: &[bool]) {
        for (dof, &fixed) in constrained.iter().enumerate() {
            if fixed {
                self.force[dof] = 0.0;
            }
        }
        if let Some(tangent) = self.tangent.as_mut() {
            tangent.project_out(constrained);
        }
    }

    /// Tangent converted to CSR, duplicates summed.
    pub fn tangent_csr(&self) -> Option<CsrMatrix<f64>> {
        let t = self.tangent.as_ref()?;
        let coo = CooMatrix::try_from_triplets(
            t.nrows,
            t.ncols,
            t.row_indices.clone(),
            t.col_indices.clone(),
            t.values.clone(),
        )
        .ok()?;
        Some(CsrMatrix::from(&coo))
    }
}

/// Evaluate `compute` for every element in parallel and assemble the results.
pub fn assemble_elements<F>(
    num_dofs: usize,
    num_elements: usize,
    with_tangent: bool,
    compute: F,
) -> Result<AssembledSystem>
where
    F: Fn(usize) -> Result<ElementContribution> + Send + Sync,
{
    let contributions = (0..num_elements)
        .into_par_iter()
        .map(compute)
        .collect::<Result<Vec<_>>>()?;

    let mut system = AssembledSystem::zeros(num_dofs, with_tangent);
    for c in &contributions {
        if let Some(&bad) = c.nodes.iter().find(|&&n| DOFS_PER_NODE * n >= num_dofs) {
            return Err(SolverError::Mesh(format!(
                "node {} outside a system of {} dofs",
                bad, num_dofs
            )));
        }
        system.add(c);
    }
    Ok(system)
}

/// Boolean DOF mask from a list of constrained DOFs
pub fn constrained_mask(num_dofs: usize, dofs: &[usize]) -> Vec<bool> {
    let mut mask = vec![false; num_dofs];
    for &d in dofs {
        if d < num_dofs {
            mask[d] = true;
        }
    }
    mask
}

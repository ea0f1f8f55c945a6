//! Nonlinear static solver using Newton-Raphson iteration.
//!
//! Solves the equilibrium equation
//! R(u) = F_int(u) - F_ext = 0
//!
//! where:
//! - F_int = internal forces of the force field
//! - F_ext = dead loads from the boundary conditions
//! - u = displacement vector, prescribed values already imposed
//!
//! # Newton-Raphson Method
//!
//! 1. Assemble R(u_i) and the tangent K_T = ∂F_int/∂u
//! 2. Project out constrained DOFs
//! 3. Solve: K_T * Δu = -R(u_i)
//! 4. Update: u_{i+1} = u_i + α Δu (α = 1 without line search)
//! 5. Check convergence
//!
//! # Convergence Criteria
//!
//! - **Residual**: ||R|| < abs, ||R|| / ||R_0|| < rel, or ||Δu|| / ||u|| < correction
//! - **Incremental**: ||Δu|| < atol, or ||Δu|| / ||Δu_0|| < rtol

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::backend::{BackendKind, LinearSystemData, SolverBackend, make_backend};
use crate::boundary_conditions::BoundaryConditions;
use crate::error::{Result, SolverError};
use crate::forcefield::ForceField;

const LINE_SEARCH_STEPS: [f64; 5] = [1.0, 0.5, 0.25, 0.125, 0.0625];

/// When a Newton iteration counts as converged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConvergenceCriterion {
    /// Residual norms and the relative correction
    Residual {
        absolute: f64,
        relative: f64,
        correction: f64,
    },
    /// Norm of the Newton correction, absolute or relative to the first one
    Incremental { atol: f64, rtol: f64 },
}

/// Nonlinear solver configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NonlinearConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,
    pub criterion: ConvergenceCriterion,
    /// Backtrack on the residual norm
    pub line_search: bool,
    pub backend: BackendKind,
}

impl Default for NonlinearConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            criterion: ConvergenceCriterion::Residual {
                absolute: 1e-15,
                relative: 1e-10,
                correction: 1e-15,
            },
            line_search: false,
            backend: BackendKind::default(),
        }
    }
}

impl NonlinearConfig {
    /// Correction-norm criterion with a 50 iteration cap
    pub fn incremental(atol: f64, rtol: f64) -> Self {
        Self {
            max_iterations: 50,
            criterion: ConvergenceCriterion::Incremental { atol, rtol },
            ..Self::default()
        }
    }
}

/// Convergence status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceStatus {
    /// Met the configured criterion
    Converged,
    /// Ran out of iterations
    NotConverged,
}

/// Nonlinear analysis results
#[derive(Debug, Clone)]
pub struct NonlinearResults {
    /// Final displacement solution
    pub displacement: DVector<f64>,
    /// Number of Newton corrections applied
    pub num_iterations: usize,
    pub converged: bool,
    pub status: ConvergenceStatus,
    /// Final residual norm, constrained entries excluded
    pub residual_norm: f64,
    /// Residual norm before every iteration, then the final one
    pub iteration_history: Vec<f64>,
    /// Norm of every applied correction
    pub correction_history: Vec<f64>,
}

impl NonlinearResults {
    /// Turn a non-converged run into [`SolverError::NotConverged`].
    pub fn into_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(SolverError::NotConverged {
                iterations: self.num_iterations,
                norm: self.residual_norm,
            })
        }
    }
}

/// Nonlinear static solver for one force field
pub struct NonlinearSolver<'a> {
    forcefield: &'a dyn ForceField,
    bcs: &'a BoundaryConditions,
    config: NonlinearConfig,
    backend: Box<dyn SolverBackend>,
}

impl<'a> NonlinearSolver<'a> {
    pub fn new(forcefield: &'a dyn ForceField, bcs: &'a BoundaryConditions, config: NonlinearConfig) -> Self {
        Self {
            forcefield,
            bcs,
            config,
            backend: make_backend(config.backend),
        }
    }

    pub fn config(&self) -> &NonlinearConfig {
        &self.config
    }

    /// Residual R(u) and, if requested, the tangent, both projected
    fn residual(
        &self,
        u: &DVector<f64>,
        f_ext: &DVector<f64>,
        constrained: &[bool],
        with_tangent: bool,
    ) -> Result<crate::assembly::AssembledSystem> {
        let mut system = self.forcefield.assemble(u, with_tangent)?;
        system.force -= f_ext;
        system.apply_dirichlet(constrained);
        Ok(system)
    }

    /// Solve starting from `initial`; prescribed values are imposed first.
    ///
    /// Running out of iterations is not an error: the returned results carry
    /// `converged == false`. A non-finite norm is reported as divergence.
    pub fn solve(&self, initial: DVector<f64>) -> Result<NonlinearResults> {
        let num_dofs = initial.len();
        let constrained = self.bcs.constrained_mask(num_dofs);
        let constrained_dofs = self.bcs.constrained_dofs(num_dofs);
        let f_ext = self.bcs.load_vector(num_dofs);

        let mut u = initial;
        self.bcs.impose(&mut u);

        let mut system = self.residual(&u, &f_ext, &constrained, true)?;
        let r0 = system.force.norm();
        let mut r_norm = r0;
        let mut iteration_history = vec![r0];
        let mut correction_history = Vec::new();
        let mut first_correction = None;

        let mut converged = match self.config.criterion {
            ConvergenceCriterion::Residual { absolute, .. } => r0 <= absolute,
            ConvergenceCriterion::Incremental { .. } => false,
        };
        let mut iterations = 0;

        while !converged && iterations < self.config.max_iterations {
            let tangent = system
                .tangent
                .take()
                .ok_or_else(|| SolverError::Mesh("force field returned no tangent".into()))?;
            let linear = LinearSystemData {
                stiffness: tangent,
                force: -&system.force,
                num_dofs,
                constrained_dofs: constrained_dofs.clone(),
            };
            let (du, info) = self.backend.solve_linear(&linear)?;
            let du_norm = du.norm();
            if !du_norm.is_finite() {
                return Err(SolverError::Diverged {
                    iteration: iterations + 1,
                });
            }

            let alpha = if self.config.line_search {
                self.line_search(&u, &du, &f_ext, &constrained, r_norm)?
            } else {
                1.0
            };
            u.axpy(alpha, &du, 1.0);
            iterations += 1;
            let step_norm = alpha * du_norm;
            correction_history.push(step_norm);

            system = self.residual(&u, &f_ext, &constrained, true)?;
            r_norm = system.force.norm();
            if !r_norm.is_finite() {
                return Err(SolverError::Diverged { iteration: iterations });
            }
            iteration_history.push(r_norm);

            converged = match self.config.criterion {
                ConvergenceCriterion::Residual {
                    absolute,
                    relative,
                    correction,
                } => {
                    let u_norm = u.norm();
                    r_norm <= absolute
                        || (r0 > 0.0 && r_norm / r0 < relative)
                        || (u_norm > 0.0 && step_norm / u_norm < correction)
                }
                ConvergenceCriterion::Incremental { atol, rtol } => {
                    let d0 = *first_correction.get_or_insert(step_norm);
                    step_norm < atol || d0 == 0.0 || step_norm / d0 < rtol
                }
            };

            log::debug!(
                "Newton iteration {}: |R| = {:.6e}, |du| = {:.6e}, alpha = {} ({})",
                iterations,
                r_norm,
                step_norm,
                alpha,
                info.solver_name
            );
        }

        let status = if converged {
            ConvergenceStatus::Converged
        } else {
            ConvergenceStatus::NotConverged
        };
        if converged {
            log::info!(
                "{}: converged in {} iterations, |R| = {:.3e}",
                self.forcefield.name(),
                iterations,
                r_norm
            );
        } else {
            log::warn!(
                "{}: no convergence after {} iterations, |R| = {:.3e}",
                self.forcefield.name(),
                iterations,
                r_norm
            );
        }

        Ok(NonlinearResults {
            displacement: u,
            num_iterations: iterations,
            converged,
            status,
            residual_norm: r_norm,
            iteration_history,
            correction_history,
        })
    }

    /// First step length that lowers the residual norm, else the full step
    fn line_search(
        &self,
        u: &DVector<f64>,
        du: &DVector<f64>,
        f_ext: &DVector<f64>,
        constrained: &[bool],
        r_norm: f64,
    ) -> Result<f64> {
        for &alpha in &LINE_SEARCH_STEPS {
            let trial = u + du * alpha;
            match self.residual(&trial, f_ext, constrained, false) {
                Ok(r) if r.force.norm() < r_norm => return Ok(alpha),
                Ok(_) | Err(SolverError::InvertedElement { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(1.0)
    }
}

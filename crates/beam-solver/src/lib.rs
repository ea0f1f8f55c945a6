//! Hyperelastic cantilever beam solver.
//!
//! Two studies run on the same compact finite-element engine:
//!
//! - **Backend comparison** ([`comparison`]): a native total-Lagrangian force
//!   field and a variational force field are stepped side by side on one mesh,
//!   and the mean relative displacement error is reported after every step.
//! - **Mesh convergence** ([`convergence`]): a fiber-reinforced beam is solved
//!   by Newton iteration for a sweep of resolutions, one scalar written per
//!   resolution.
//!
//! The engine provides reference elements in two local node orders, the
//! permutation tables between them ([`ordering`]), hyperelastic materials,
//! parallel assembly, Dirichlet projection and sparse direct solvers.

pub mod assembly;
pub mod backend;
pub mod bc_builder;
pub mod boundary_conditions;
pub mod comparison;
pub mod config;
pub mod convergence;
pub mod distributed_loads;
pub mod elements;
pub mod error;
pub mod forcefield;
pub mod materials;
pub mod mesh;
pub mod mesh_builder;
pub mod nonlinear_solver;
pub mod ordering;
pub mod quadrature;
pub mod scene;
pub mod sets;
pub mod variational;

pub use assembly::{AssembledSystem, ElementContribution};
pub use backend::{
    BackendKind, LinearSolver, LinearSystemData, NativeBackend, SolveInfo, SolverBackend, SparseLdlBackend,
    SparseTripletsF64,
};
pub use bc_builder::BCBuilder;
pub use boundary_conditions::{BoundaryConditions, ConcentratedLoad, DisplacementBC, DofId};
pub use comparison::{
    ComparisonConfig, ComparisonController, ComparisonReport, mean_relative_error, relative_errors, run_comparison,
    run_comparison_with,
};
pub use config::{load_config, save_config};
pub use convergence::{ConvergenceConfig, ConvergencePoint, run_convergence_study};
pub use distributed_loads::DistributedLoadConverter;
pub use elements::Element as ElementTrait;
pub use error::{ConfigError, ElementError, Result, SolverError};
pub use forcefield::{ForceField, HyperelasticForceField, VariationalForceField};
pub use materials::{FiberReinforced, HyperelasticLaw, MaterialConfig, MaterialModel, NeoHookean, SaintVenantKirchhoff};
pub use mesh::{Element, ElementType, Mesh, MeshStatistics, Node};
pub use mesh_builder::{BoxMesh, MeshBuilder};
pub use nonlinear_solver::{ConvergenceCriterion, ConvergenceStatus, NonlinearConfig, NonlinearResults, NonlinearSolver};
pub use ordering::{ElementConfig, ElementFamily, ResolvedElement, reorder_cells};
pub use scene::{Controller, Simulation, SimulationNode};
pub use sets::{FacetTags, NodeSet};
pub use variational::{VariationalElement, VariationalElementKind};

//! Minimal scene graph for static simulations.
//!
//! A [`Simulation`] holds [`SimulationNode`]s, each owning a mechanical state, a
//! force field, constraints, loads and a Newton static solver. Points come from
//! a shared topology. A [`Controller`] observes the nodes after initialisation
//! and around every step.

pub mod constraints;
pub mod node;
pub mod roi;
pub mod simulation;

pub use constraints::{ConstantForceField, FixedConstraint};
pub use node::{MechanicalObject, SimulationNode, StaticSolver};
pub use roi::BoxRoi;
pub use simulation::{Controller, DEFAULT_DT, Simulation};

//! Error types for beam-solver

use thiserror::Error;

use crate::backend::BackendError;

/// Invalid study configuration, detected before any work starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unsupported element '{element}' with degree {degree}")]
    UnsupportedElement { element: String, degree: u8 },

    #[error("unknown material model '{0}'")]
    UnknownMaterial(String),

    #[error("mesh has no '{0}' cells")]
    MissingCells(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Failure inside a reference-element evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    #[error("expected {expected} nodes, got {actual}")]
    NodeCount { expected: usize, actual: usize },

    #[error("non-positive Jacobian determinant {0:.3e}")]
    NonPositiveJacobian(f64),

    #[error("{0}: nodal basis is singular")]
    SingularBasis(&'static str),
}

#[derive(Error, Debug)]
pub enum SolverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] beam_io::IoError),

    #[error("linear solve failed: {0}")]
    Backend(#[from] BackendError),

    #[error("element {element}: {source}")]
    Element {
        element: usize,
        #[source]
        source: ElementError,
    },

    #[error("reference element: {0}")]
    Reference(#[from] ElementError),

    #[error("element {element}: inverted deformation (J = {j:.3e})")]
    InvertedElement { element: usize, j: f64 },

    #[error("invalid mesh: {0}")]
    Mesh(String),

    #[error("Newton iteration did not converge in {iterations} iterations (last norm {norm:.3e})")]
    NotConverged { iterations: usize, norm: f64 },

    #[error("Newton iteration diverged at iteration {iteration}")]
    Diverged { iteration: usize },

    #[error("simulation node '{0}' not found")]
    UnknownNode(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

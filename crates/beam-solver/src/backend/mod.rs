//! Linear solver backend abstraction layer.
//!
//! The assembly layer produces COO triplets and a right-hand side; a
//! [`LinearSolver`] turns them into a Newton correction.
//!
//! # Backends
//!
//! - **Sparse LDLᵀ** (default): `sprs-ldl`, symmetric indefinite capable.
//! - **Native**: nalgebra-sparse Cholesky, symmetric positive definite only.
//!
//! ```text
//! Element kernels (nalgebra, small dense)
//!         │
//!         ▼
//! Assembly (COO triplets + residual)
//!         │
//!         ▼
//!   LinearSolver trait
//!    ┌────┴────┐
//!    ▼         ▼
//!  LDLᵀ     Cholesky
//! ```

pub mod ldl;
pub mod native;
pub mod traits;

use serde::{Deserialize, Serialize};

pub use ldl::SparseLdlBackend;
pub use native::NativeBackend;
pub use traits::*;

/// Backend selector used in study configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendKind {
    #[default]
    SparseLdl,
    Cholesky,
}

/// Instantiate the backend named by `kind`.
pub fn make_backend(kind: BackendKind) -> Box<dyn SolverBackend> {
    match kind {
        BackendKind::SparseLdl => Box::new(SparseLdlBackend),
        BackendKind::Cholesky => Box::new(NativeBackend),
    }
}

//! Reference elements of the variational backend.
//!
//! These elements are built independently of the native library: their shape
//! functions come from a monomial space and a node set on the variational
//! reference cells (unit simplex, unit cube with lexicographic vertices), and
//! their local node order differs from VTK. [`crate::ordering`] holds the tables
//! that relate the two orders.

pub mod basis;
pub mod element;

pub use basis::NodalBasis;
pub use element::{HEX_EDGES, TET_EDGES, VariationalElement, VariationalElementKind};

//! I/O support for the hyperelastic beam studies.
//!
//! This crate provides:
//! - **Mesh interchange** ([`MeshData`]): points plus cell blocks keyed by kind
//! - **VTU/VTK reading** through `vtkio`
//! - **Legacy VTK export** of meshes and nodal fields for ParaView
//! - **Result files**: one-float text results and JSON settings

pub mod error;
pub mod mesh_data;
pub mod results;
pub mod vtk_writer;
pub mod vtu_reader;

pub use error::{IoError, Result};
pub use mesh_data::{CellBlock, CellKind, MeshData};
pub use results::{load_json, read_scalar_result, save_json, write_scalar_result};
pub use vtk_writer::VtkWriter;
pub use vtu_reader::read_mesh;

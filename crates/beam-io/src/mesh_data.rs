//! In-memory mesh interchange structure.
//!
//! Points are stored once; cells are grouped into blocks by cell kind, each
//! block holding connectivity in VTK local node order with 0-based point
//! indices. `cells_of` mirrors meshio's `cells_dict[kind]` lookup.

use serde::{Deserialize, Serialize};

use crate::error::{IoError, Result};

/// Volume cell kinds handled by the beam studies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// 4-node tetrahedron
    Tetra,
    /// 10-node tetrahedron
    Tetra10,
    /// 8-node hexahedron
    Hexahedron,
    /// 20-node hexahedron
    Hexahedron20,
}

impl CellKind {
    /// Number of nodes per cell
    pub fn num_nodes(&self) -> usize {
        match self {
            CellKind::Tetra => 4,
            CellKind::Tetra10 => 10,
            CellKind::Hexahedron => 8,
            CellKind::Hexahedron20 => 20,
        }
    }

    /// meshio block name
    pub fn name(&self) -> &'static str {
        match self {
            CellKind::Tetra => "tetra",
            CellKind::Tetra10 => "tetra10",
            CellKind::Hexahedron => "hexahedron",
            CellKind::Hexahedron20 => "hexahedron20",
        }
    }

    /// Parse a meshio block name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tetra" => Some(CellKind::Tetra),
            "tetra10" => Some(CellKind::Tetra10),
            "hexahedron" => Some(CellKind::Hexahedron),
            "hexahedron20" => Some(CellKind::Hexahedron20),
            _ => None,
        }
    }

    /// VTK cell type code
    pub fn vtk_code(&self) -> u8 {
        match self {
            CellKind::Tetra => 10,
            CellKind::Tetra10 => 24,
            CellKind::Hexahedron => 12,
            CellKind::Hexahedron20 => 25,
        }
    }

    /// Inverse of [`CellKind::vtk_code`]
    pub fn from_vtk_code(code: u8) -> Option<Self> {
        match code {
            10 => Some(CellKind::Tetra),
            24 => Some(CellKind::Tetra10),
            12 => Some(CellKind::Hexahedron),
            25 => Some(CellKind::Hexahedron20),
            _ => None,
        }
    }
}

/// All cells of one kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellBlock {
    pub kind: CellKind,
    pub cells: Vec<Vec<usize>>,
}

/// Points plus cell blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub points: Vec<[f64; 3]>,
    pub blocks: Vec<CellBlock>,
}

impl MeshData {
    pub fn new(points: Vec<[f64; 3]>) -> Self {
        Self {
            points,
            blocks: Vec::new(),
        }
    }

    /// Append a cell, creating its block on first use.
    pub fn push_cell(&mut self, kind: CellKind, cell: Vec<usize>) {
        match self.blocks.iter_mut().find(|b| b.kind == kind) {
            Some(block) => block.cells.push(cell),
            None => self.blocks.push(CellBlock {
                kind,
                cells: vec![cell],
            }),
        }
    }

    /// Cells of the given kind, if the mesh has any.
    pub fn cells_of(&self, kind: CellKind) -> Option<&[Vec<usize>]> {
        self.blocks
            .iter()
            .find(|b| b.kind == kind)
            .map(|b| b.cells.as_slice())
    }

    pub fn num_cells(&self) -> usize {
        self.blocks.iter().map(|b| b.cells.len()).sum()
    }

    /// Check node counts and point indices of every block.
    pub fn validate(&self) -> Result<()> {
        let num_points = self.points.len();
        for block in &self.blocks {
            let expected = block.kind.num_nodes();
            for (c, cell) in block.cells.iter().enumerate() {
                if cell.len() != expected {
                    return Err(IoError::InvalidData(format!(
                        "{} cell {} has {} nodes but expected {}",
                        block.kind.name(),
                        c,
                        cell.len(),
                        expected
                    )));
                }
                if let Some(&bad) = cell.iter().find(|&&p| p >= num_points) {
                    return Err(IoError::InvalidData(format!(
                        "{} cell {} references point {} (mesh has {} points)",
                        block.kind.name(),
                        c,
                        bad,
                        num_points
                    )));
                }
            }
        }
        Ok(())
    }
}

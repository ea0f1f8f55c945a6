//! Unstructured-grid reader built on `vtkio`.
//!
//! Accepts XML `.vtu` files and legacy `.vtk` files. Every volume cell of a
//! supported kind is sorted into its [`CellBlock`](crate::CellBlock); surface
//! and line cells are skipped so meshes exported together with their boundary
//! still load.

use std::path::Path;

use log::{debug, warn};
use vtkio::model::{CellType, DataSet, IOBuffer, Piece, UnstructuredGridPiece, VertexNumbers};
use vtkio::Vtk;

use crate::error::{IoError, Result};
use crate::mesh_data::{CellKind, MeshData};

/// Read a mesh file into [`MeshData`].
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<MeshData> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound(path.display().to_string()));
    }

    let vtk = Vtk::import(path).map_err(|err| IoError::Vtk(format!("{:?}", err)))?;

    let mut pieces = Vec::new();
    collect_pieces(vtk.data, &mut pieces)?;
    if pieces.is_empty() {
        return Err(IoError::UnsupportedDataset(format!(
            "{} contains no unstructured grid piece",
            path.display()
        )));
    }

    let mut mesh = MeshData::default();
    let mut skipped = 0usize;
    for piece in pieces {
        let offset = mesh.points.len();
        mesh.points.extend(points_of(&piece.points)?);

        let connectivity = cell_connectivity(&piece.cells.cell_verts)?;
        if connectivity.len() != piece.cells.types.len() {
            return Err(IoError::InvalidData(format!(
                "{} cells but {} cell types",
                connectivity.len(),
                piece.cells.types.len()
            )));
        }

        for (cell, cell_type) in connectivity.into_iter().zip(piece.cells.types.iter()) {
            match cell_kind(cell_type) {
                Some(kind) => {
                    mesh.push_cell(kind, cell.into_iter().map(|p| p + offset).collect());
                }
                None => skipped += 1,
            }
        }
    }

    if skipped > 0 {
        debug!("skipped {} non-volume cells in {}", skipped, path.display());
    }
    if mesh.blocks.is_empty() {
        warn!("{} has no supported volume cells", path.display());
    }

    mesh.validate()?;
    Ok(mesh)
}

fn collect_pieces(data: DataSet, out: &mut Vec<UnstructuredGridPiece>) -> Result<()> {
    match data {
        DataSet::UnstructuredGrid { pieces, .. } => {
            for piece in pieces {
                match piece {
                    Piece::Inline(piece) => out.push(*piece),
                    Piece::Loaded(data) => collect_pieces(*data, out)?,
                    Piece::Source(source, _) => {
                        return Err(IoError::UnsupportedDataset(format!(
                            "external piece source '{}'",
                            source
                        )));
                    }
                }
            }
            Ok(())
        }
        _ => Err(IoError::UnsupportedDataset(
            "expected an unstructured grid".to_string(),
        )),
    }
}

fn points_of(buffer: &IOBuffer) -> Result<Vec<[f64; 3]>> {
    let flat: Vec<f64> = match buffer {
        IOBuffer::F64(v) => v.clone(),
        IOBuffer::F32(v) => v.iter().map(|&x| x as f64).collect(),
        _ => {
            return Err(IoError::InvalidData(
                "point coordinates must be floating point".to_string(),
            ));
        }
    };
    if flat.len() % 3 != 0 {
        return Err(IoError::InvalidData(format!(
            "point buffer length {} is not a multiple of 3",
            flat.len()
        )));
    }
    Ok(flat.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect())
}

/// Split either vertex-number layout into one index list per cell.
fn cell_connectivity(verts: &VertexNumbers) -> Result<Vec<Vec<usize>>> {
    match verts {
        VertexNumbers::Legacy {
            num_cells,
            vertices,
        } => {
            let mut cells = Vec::with_capacity(*num_cells as usize);
            let mut i = 0usize;
            while i < vertices.len() {
                let n = vertices[i] as usize;
                let end = i + 1 + n;
                if end > vertices.len() {
                    return Err(IoError::InvalidData(
                        "truncated legacy cell list".to_string(),
                    ));
                }
                cells.push(vertices[i + 1..end].iter().map(|&v| v as usize).collect());
                i = end;
            }
            Ok(cells)
        }
        VertexNumbers::XML {
            connectivity,
            offsets,
        } => {
            let mut cells = Vec::with_capacity(offsets.len());
            let mut begin = 0usize;
            for &end in offsets {
                let end = end as usize;
                if end < begin || end > connectivity.len() {
                    return Err(IoError::InvalidData(format!(
                        "cell offset {} out of range",
                        end
                    )));
                }
                cells.push(connectivity[begin..end].iter().map(|&v| v as usize).collect());
                begin = end;
            }
            Ok(cells)
        }
    }
}

fn cell_kind(cell_type: &CellType) -> Option<CellKind> {
    match cell_type {
        CellType::Tetra => Some(CellKind::Tetra),
        CellType::QuadraticTetra => Some(CellKind::Tetra10),
        CellType::Hexahedron => Some(CellKind::Hexahedron),
        CellType::QuadraticHexahedron => Some(CellKind::Hexahedron20),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_vertex_numbers_split_per_cell() {
        let verts = VertexNumbers::Legacy {
            num_cells: 2,
            vertices: vec![4, 0, 1, 2, 3, 4, 1, 2, 3, 4],
        };
        let cells = cell_connectivity(&verts).unwrap();
        assert_eq!(cells, vec![vec![0, 1, 2, 3], vec![1, 2, 3, 4]]);
    }

    #[test]
    fn xml_vertex_numbers_split_by_offsets() {
        let verts = VertexNumbers::XML {
            connectivity: vec![0, 1, 2, 3, 1, 2, 3, 4],
            offsets: vec![4, 8],
        };
        let cells = cell_connectivity(&verts).unwrap();
        assert_eq!(cells, vec![vec![0, 1, 2, 3], vec![1, 2, 3, 4]]);
    }

    #[test]
    fn truncated_legacy_list_is_rejected() {
        let verts = VertexNumbers::Legacy {
            num_cells: 1,
            vertices: vec![4, 0, 1],
        };
        assert!(cell_connectivity(&verts).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_mesh("/definitely/not/here/beam_p1.vtu").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound(_)));
    }
}

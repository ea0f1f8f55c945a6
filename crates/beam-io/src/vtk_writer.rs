//! Legacy VTK writer for ParaView visualization.
//!
//! Writes a [`MeshData`] as an ASCII `UNSTRUCTURED_GRID` together with any
//! number of nodal scalar or vector fields (displacements, error maps).
//! The output is also readable by [`read_mesh`](crate::read_mesh), which is
//! how generated beam meshes are handed to the comparison study.
//!
//! ```rust,no_run
//! use beam_io::{MeshData, VtkWriter};
//!
//! # fn example(mesh: &MeshData, u: &[[f64; 3]]) -> beam_io::Result<()> {
//! VtkWriter::new(mesh)
//!     .with_vectors("displacement", u)?
//!     .write_vtk("out/beam.vtk")?;
//! # Ok(())
//! # }
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{IoError, Result};
use crate::mesh_data::MeshData;

/// Nodal field attached to the written grid
#[derive(Debug, Clone)]
enum PointField {
    Scalars { name: String, values: Vec<f64> },
    Vectors { name: String, values: Vec<[f64; 3]> },
}

/// Legacy VTK writer for a mesh and its nodal fields
pub struct VtkWriter<'a> {
    mesh: &'a MeshData,
    title: String,
    fields: Vec<PointField>,
}

impl<'a> VtkWriter<'a> {
    pub fn new(mesh: &'a MeshData) -> Self {
        Self {
            mesh,
            title: "Hyperelastic beam".to_string(),
            fields: Vec::new(),
        }
    }

    /// Replace the header title line.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into().replace('\n', " ");
        self
    }

    /// Attach a nodal scalar field.
    pub fn with_scalars(mut self, name: &str, values: &[f64]) -> Result<Self> {
        self.check_len(name, values.len())?;
        self.fields.push(PointField::Scalars {
            name: name.to_string(),
            values: values.to_vec(),
        });
        Ok(self)
    }

    /// Attach a nodal vector field.
    pub fn with_vectors(mut self, name: &str, values: &[[f64; 3]]) -> Result<Self> {
        self.check_len(name, values.len())?;
        self.fields.push(PointField::Vectors {
            name: name.to_string(),
            values: values.to_vec(),
        });
        Ok(self)
    }

    /// Write the legacy ASCII file, creating parent directories as needed.
    pub fn write_vtk<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = BufWriter::new(File::create(path)?);
        self.write_header(&mut file)?;
        self.write_points(&mut file)?;
        self.write_cells(&mut file)?;
        self.write_point_data(&mut file)?;
        file.flush()?;
        Ok(())
    }

    fn check_len(&self, name: &str, len: usize) -> Result<()> {
        if len != self.mesh.points.len() {
            return Err(IoError::InvalidData(format!(
                "field '{}' has {} values for {} points",
                name,
                len,
                self.mesh.points.len()
            )));
        }
        Ok(())
    }

    fn write_header<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "# vtk DataFile Version 3.0")?;
        writeln!(out, "{}", self.title)?;
        writeln!(out, "ASCII")?;
        writeln!(out, "DATASET UNSTRUCTURED_GRID")?;
        Ok(())
    }

    fn write_points<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "POINTS {} double", self.mesh.points.len())?;
        for p in &self.mesh.points {
            writeln!(out, "{} {} {}", p[0], p[1], p[2])?;
        }
        Ok(())
    }

    fn write_cells<W: Write>(&self, out: &mut W) -> Result<()> {
        let num_cells = self.mesh.num_cells();
        // Each cell: count followed by its point indices
        let total_size: usize = self
            .mesh
            .blocks
            .iter()
            .map(|b| b.cells.len() * (1 + b.kind.num_nodes()))
            .sum();

        writeln!(out, "CELLS {} {}", num_cells, total_size)?;
        for block in &self.mesh.blocks {
            for cell in &block.cells {
                write!(out, "{}", cell.len())?;
                for &p in cell {
                    write!(out, " {}", p)?;
                }
                writeln!(out)?;
            }
        }

        writeln!(out, "CELL_TYPES {}", num_cells)?;
        for block in &self.mesh.blocks {
            let code = block.kind.vtk_code();
            for _ in &block.cells {
                writeln!(out, "{}", code)?;
            }
        }
        Ok(())
    }

    fn write_point_data<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.fields.is_empty() {
            return Ok(());
        }

        writeln!(out, "POINT_DATA {}", self.mesh.points.len())?;
        for field in &self.fields {
            match field {
                PointField::Scalars { name, values } => {
                    writeln!(out, "SCALARS {} double 1", name)?;
                    writeln!(out, "LOOKUP_TABLE default")?;
                    for v in values {
                        writeln!(out, "{}", v)?;
                    }
                }
                PointField::Vectors { name, values } => {
                    writeln!(out, "VECTORS {} double", name)?;
                    for v in values {
                        writeln!(out, "{} {} {}", v[0], v[1], v[2])?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::CellKind;

    fn unit_tet() -> MeshData {
        let mut mesh = MeshData::new(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ]);
        mesh.push_cell(CellKind::Tetra, vec![0, 1, 2, 3]);
        mesh
    }

    #[test]
    fn field_length_must_match_points() {
        let mesh = unit_tet();
        let result = VtkWriter::new(&mesh).with_scalars("error", &[0.0, 1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn writes_cells_and_vectors() {
        let mesh = unit_tet();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tet.vtk");

        VtkWriter::new(&mesh)
            .with_vectors("displacement", &[[0.0, -1.0, 0.0]; 4])
            .unwrap()
            .write_vtk(&path)
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# vtk DataFile Version 3.0"));
        assert!(text.contains("CELLS 1 5"));
        assert!(text.contains("4 0 1 2 3"));
        assert!(text.contains("CELL_TYPES 1\n10"));
        assert!(text.contains("VECTORS displacement double"));
    }
}

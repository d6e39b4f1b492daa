use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use thiserror::Error;

use eddy_fluids::ScalarGrid;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// ParaView-compatible output: one VTK XML ImageData (`.vti`) file per field
/// per sampled step, indexed by a `.pvd` collection keyed on simulation time.
///
/// Payloads go out as raw appended binary: a little-endian `u32` byte count
/// followed by the grid values in storage order (x fastest), which is already
/// the order VTK expects.
pub struct VtkWriter {
    dir: PathBuf,
    base_name: String,
    spacing: (f32, f32),
    pvd_entries: Vec<(f64, String)>,
    finalized: bool,
}

impl VtkWriter {
    pub fn new(
        dir: impl Into<PathBuf>,
        base_name: impl Into<String>,
        spacing: (f32, f32),
    ) -> Result<VtkWriter, WriteError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(VtkWriter {
            dir,
            base_name: base_name.into(),
            spacing,
            pvd_entries: Vec::new(),
            finalized: false,
        })
    }

    /// Writes one cell-centered grid as a `.vti` file and records it in the
    /// collection under `time`. Writes after `finish` are dropped.
    pub fn write_grid(
        &mut self,
        grid: &ScalarGrid,
        field: &str,
        step: usize,
        time: f64,
    ) -> Result<(), WriteError> {
        if self.finalized {
            return Ok(());
        }

        let file_name = format!("{}_{field}_{step:06}.vti", self.base_name);
        let mut out = BufWriter::new(File::create(self.dir.join(&file_name))?);

        let (nx, ny) = (grid.nx(), grid.ny());
        let (sx, sy) = self.spacing;

        write!(
            out,
            "<?xml version=\"1.0\"?>\n\
             <VTKFile type=\"ImageData\" version=\"0.1\" byte_order=\"LittleEndian\">\n\
             \x20 <ImageData WholeExtent=\"0 {} 0 {} 0 0\" Origin=\"0.0 0.0 0.0\" Spacing=\"{sx} {sy} 1.0\">\n\
             \x20   <Piece Extent=\"0 {} 0 {} 0 0\">\n\
             \x20     <PointData Scalars=\"{field}\">\n\
             \x20       <DataArray type=\"Float32\" Name=\"{field}\" NumberOfComponents=\"1\" format=\"appended\" offset=\"0\"/>\n\
             \x20     </PointData>\n\
             \x20   </Piece>\n\
             \x20 </ImageData>\n\
             \x20 <AppendedData encoding=\"raw\">\n\
             \x20 _",
            nx - 1,
            ny - 1,
            nx - 1,
            ny - 1,
        )?;

        let values = grid.values();
        let byte_count = (values.len() * std::mem::size_of::<f32>()) as u32;
        out.write_all(&byte_count.to_le_bytes())?;
        for value in values {
            out.write_all(&value.to_le_bytes())?;
        }

        write!(out, "\n  </AppendedData>\n</VTKFile>\n")?;
        out.flush()?;

        self.pvd_entries.push((time, file_name));
        Ok(())
    }

    /// Writes the `.pvd` collection file indexing every grid written so far.
    pub fn finish(&mut self) -> Result<(), WriteError> {
        if self.finalized {
            return Ok(());
        }

        let path = self.dir.join(format!("{}.pvd", self.base_name));
        let mut out = BufWriter::new(File::create(path)?);

        write!(
            out,
            "<VTKFile type=\"Collection\" version=\"0.1\" byte_order=\"LittleEndian\">\n\
             \x20 <Collection>\n"
        )?;
        // scientific notation: fixed-point would collapse the sub-microsecond
        // timesteps this solver runs at into identical entries
        for (time, file_name) in &self.pvd_entries {
            writeln!(
                out,
                "      <DataSet timestep=\"{time:e}\" file=\"{file_name}\"/>"
            )?;
        }
        write!(out, "  </Collection>\n</VTKFile>\n")?;
        out.flush()?;

        self.finalized = true;
        Ok(())
    }
}

use super::Mesh;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Defines the interface for writing mesh file formats.
pub trait MeshWriter {
    /// Writes a mesh to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if any write to `writer` fails.
    fn write_to(mesh: &Mesh, writer: &mut impl Write) -> io::Result<()>;

    /// Writes a mesh to a file path, creating or truncating the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(mesh: &Mesh, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(mesh, &mut writer)?;
        writer.flush()
    }
}

/// Native SU2 ASCII mesh format.
pub struct Su2MeshFile;

fn write_section(writer: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(writer, "%")?;
    writeln!(writer, "% {}", title)?;
    writeln!(writer, "%")
}

fn join_tab(values: impl IntoIterator<Item = String>) -> String {
    values.into_iter().collect::<Vec<_>>().join(" \t ")
}

impl MeshWriter for Su2MeshFile {
    fn write_to(mesh: &Mesh, writer: &mut impl Write) -> io::Result<()> {
        write_section(writer, "Problem dimension")?;
        writeln!(writer, "NDIME={}", mesh.dimension)?;

        write_section(writer, "Inner elements")?;
        writeln!(writer, "NELEM={}", mesh.elements.len())?;
        for (idx, element) in mesh.elements.iter().enumerate() {
            let fields = std::iter::once(element.kind.to_string())
                .chain(element.nodes.iter().map(usize::to_string))
                .chain(std::iter::once(idx.to_string()));
            writeln!(writer, "{}", join_tab(fields))?;
        }

        writeln!(writer, "%")?;
        writeln!(writer, "NPOIN={}", mesh.points.len())?;
        for (idx, point) in mesh.points.iter().enumerate() {
            writeln!(writer, "{:15.14} \t {:15.14} \t {}", point.x, point.y, idx)?;
        }

        write_section(writer, "Boundary elements")?;
        writeln!(writer, "NMARK={}", mesh.markers.len())?;
        for marker in &mesh.markers {
            writeln!(writer, "MARKER_TAG= {}", marker.tag)?;
            writeln!(writer, "MARKER_ELEMS={}", marker.elements.len())?;
            for element in &marker.elements {
                let fields = std::iter::once(element.kind.to_string())
                    .chain(element.nodes.iter().map(usize::to_string));
                writeln!(writer, "{}", join_tab(fields))?;
            }
        }
        Ok(())
    }
}

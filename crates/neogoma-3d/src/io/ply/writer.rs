use std::io::Write;

use super::PlyError;
use crate::pointcloud::PointCloudRecord;

/// The header of an ASCII PLY point cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyHeader {
    /// The number of vertices that will follow the header.
    pub vertex_count: usize,
    /// Whether the vertices carry `blue`, `green`, `red` properties.
    pub with_color: bool,
    /// Free text comment lines.
    pub comments: Vec<String>,
}

impl PlyHeader {
    /// Create a header without comments.
    pub fn new(vertex_count: usize, with_color: bool) -> Self {
        Self {
            vertex_count,
            with_color,
            comments: Vec::new(),
        }
    }

    /// Add a comment line to the header.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), PlyError> {
        writeln!(writer, "ply")?;
        writeln!(writer, "format ascii 1.0")?;
        for comment in &self.comments {
            writeln!(writer, "comment {comment}")?;
        }
        writeln!(writer, "element vertex {}", self.vertex_count)?;
        writeln!(writer, "property float x")?;
        writeln!(writer, "property float y")?;
        writeln!(writer, "property float z")?;
        if self.with_color {
            writeln!(writer, "property uchar blue")?;
            writeln!(writer, "property uchar green")?;
            writeln!(writer, "property uchar red")?;
        }
        writeln!(writer, "end_header")?;
        Ok(())
    }
}

/// Streams point cloud records to an ASCII PLY sink.
///
/// The header is written on creation, so the vertex count has to be known up front.
/// [`PlyWriter::finish`] checks that exactly that many records were written.
pub struct PlyWriter<W: Write> {
    writer: W,
    header: PlyHeader,
    written: usize,
}

impl<W: Write> PlyWriter<W> {
    /// Create the writer and write the header to the sink.
    pub fn new(mut writer: W, header: PlyHeader) -> Result<Self, PlyError> {
        header.write_to(&mut writer)?;
        Ok(Self {
            writer,
            header,
            written: 0,
        })
    }

    /// Write one vertex line.
    ///
    /// The record must carry a color if and only if the header declares color properties.
    pub fn write_record(&mut self, record: &PointCloudRecord) -> Result<(), PlyError> {
        if self.written >= self.header.vertex_count {
            return Err(PlyError::VertexCountMismatch {
                declared: self.header.vertex_count,
                written: self.written + 1,
            });
        }

        let [x, y, z] = record.point;
        match (self.header.with_color, record.color) {
            (false, None) => writeln!(self.writer, "{x} {y} {z}")?,
            (true, Some([b, g, r])) => writeln!(self.writer, "{x} {y} {z} {b} {g} {r}")?,
            (expected, _) => return Err(PlyError::ColorMismatch(expected)),
        }

        self.written += 1;
        Ok(())
    }

    /// Get the number of vertices written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush the sink and return it.
    ///
    /// Fails if the number of written vertices differs from the declared count.
    pub fn finish(mut self) -> Result<W, PlyError> {
        self.writer.flush()?;
        if self.written != self.header.vertex_count {
            return Err(PlyError::VertexCountMismatch {
                declared: self.header.vertex_count,
                written: self.written,
            });
        }
        Ok(self.writer)
    }
}

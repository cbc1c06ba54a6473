use std::io::Write;

use crate::pointcloud::PointCloudRecord;

/// Error types for the CSV module.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    /// Failed to write CSV file
    #[error("Failed to write CSV file")]
    Io(#[from] std::io::Error),

    /// The record color does not match the header columns
    #[error("CSV record color presence does not match the header (color expected: {0})")]
    ColorMismatch(bool),
}

/// Streams point cloud records to a CSV sink.
///
/// The header row is `x,y,z`, or `x,y,z,b,g,r` when colors are written.
pub struct CsvWriter<W: Write> {
    writer: W,
    with_color: bool,
    rows: usize,
}

impl<W: Write> CsvWriter<W> {
    /// Create the writer and write the header row.
    pub fn new(mut writer: W, with_color: bool) -> Result<Self, CsvError> {
        match with_color {
            true => writeln!(writer, "x,y,z,b,g,r")?,
            false => writeln!(writer, "x,y,z")?,
        }
        Ok(Self {
            writer,
            with_color,
            rows: 0,
        })
    }

    /// Write one row.
    pub fn write_record(&mut self, record: &PointCloudRecord) -> Result<(), CsvError> {
        let [x, y, z] = record.point;
        match (self.with_color, record.color) {
            (false, None) => writeln!(self.writer, "{x},{y},{z}")?,
            (true, Some([b, g, r])) => writeln!(self.writer, "{x},{y},{z},{b},{g},{r}")?,
            (expected, _) => return Err(CsvError::ColorMismatch(expected)),
        }
        self.rows += 1;
        Ok(())
    }

    /// Get the number of data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush the sink and return it.
    pub fn finish(mut self) -> Result<W, CsvError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

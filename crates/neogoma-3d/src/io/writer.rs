use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use super::{
    csv::{CsvError, CsvWriter},
    ply::{PlyError, PlyHeader, PlyWriter},
};
use crate::pointcloud::PointCloudRecord;

/// Name of the PLY file written by [`PointCloudWriter`].
pub const PLY_FILE_NAME: &str = "point_cloud.ply";

/// Name of the CSV file written by [`PointCloudWriter`].
pub const CSV_FILE_NAME: &str = "point_cloud.csv";

/// Comment written in the PLY header.
pub const PLY_COMMENT: &str = "This point cloud has been generated with the software sfm-neogoma.";

/// Error types for writing point cloud files.
#[derive(Debug, thiserror::Error)]
pub enum CloudWriteError {
    /// Failed to create an output file
    #[error("Failed to create {0}. {1}")]
    Create(PathBuf, std::io::Error),

    /// Failed to write the PLY file
    #[error(transparent)]
    Ply(#[from] PlyError),

    /// Failed to write the CSV file
    #[error(transparent)]
    Csv(#[from] CsvError),
}

/// Writes the same stream of records to `point_cloud.ply` and `point_cloud.csv`.
///
/// Records are written in the order they are given.
pub struct PointCloudWriter {
    ply: PlyWriter<BufWriter<File>>,
    csv: CsvWriter<BufWriter<File>>,
    ply_path: PathBuf,
    csv_path: PathBuf,
}

impl PointCloudWriter {
    /// Create both files under `dir` and write their headers.
    ///
    /// # Arguments
    ///
    /// * `dir` - The folder where the files are created.
    /// * `vertex_count` - The number of records that will be written.
    /// * `with_color` - Whether records carry a color.
    pub fn create(
        dir: impl AsRef<Path>,
        vertex_count: usize,
        with_color: bool,
    ) -> Result<Self, CloudWriteError> {
        let dir = dir.as_ref();
        let ply_path = dir.join(PLY_FILE_NAME);
        let csv_path = dir.join(CSV_FILE_NAME);

        let create = |path: &Path| {
            File::create(path)
                .map(BufWriter::new)
                .map_err(|e| CloudWriteError::Create(path.to_path_buf(), e))
        };

        let header = PlyHeader::new(vertex_count, with_color).with_comment(PLY_COMMENT);
        let ply = PlyWriter::new(create(&ply_path)?, header)?;
        let csv = CsvWriter::new(create(&csv_path)?, with_color)?;

        Ok(Self {
            ply,
            csv,
            ply_path,
            csv_path,
        })
    }

    /// Write one record to both files.
    pub fn write(&mut self, record: &PointCloudRecord) -> Result<(), CloudWriteError> {
        self.ply.write_record(record)?;
        self.csv.write_record(record)?;
        Ok(())
    }

    /// Get the path of the PLY file.
    pub fn ply_path(&self) -> &Path {
        &self.ply_path
    }

    /// Get the path of the CSV file.
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// Flush both files and return the number of records written.
    pub fn finish(self) -> Result<usize, CloudWriteError> {
        let rows = self.csv.rows();
        self.ply.finish()?;
        self.csv.finish()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ply_and_csv_agree() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let records = [
            PointCloudRecord::with_color([0.0, 0.0, 0.0], [1, 2, 3]),
            PointCloudRecord::with_color([1.0, 1.0, 1.0], [4, 5, 6]),
            PointCloudRecord::with_color([2.0, 2.0, 2.0], [7, 8, 9]),
        ];

        let mut writer = PointCloudWriter::create(tmp_dir.path(), records.len(), true)?;
        assert_eq!(writer.ply_path(), tmp_dir.path().join(PLY_FILE_NAME));
        assert_eq!(writer.csv_path(), tmp_dir.path().join(CSV_FILE_NAME));
        for record in &records {
            writer.write(record)?;
        }
        assert_eq!(writer.finish()?, 3);

        let ply = std::fs::read_to_string(tmp_dir.path().join(PLY_FILE_NAME))?;
        let csv = std::fs::read_to_string(tmp_dir.path().join(CSV_FILE_NAME))?;

        assert!(ply.contains(&format!("comment {PLY_COMMENT}\n")));
        assert!(ply.contains("element vertex 3\n"));

        let ply_rows = ply.split("end_header\n").nth(1).unwrap().lines().collect::<Vec<_>>();
        let csv_rows = csv.lines().skip(1).collect::<Vec<_>>();
        assert_eq!(ply_rows.len(), csv_rows.len());
        for (ply_row, csv_row) in ply_rows.iter().zip(csv_rows.iter()) {
            assert_eq!(ply_row.replace(' ', ","), *csv_row);
        }
        assert_eq!(csv_rows, vec!["0,0,0,1,2,3", "1,1,1,4,5,6", "2,2,2,7,8,9"]);
        Ok(())
    }

    #[test]
    fn test_create_in_missing_folder() {
        let res = PointCloudWriter::create("/definitely/missing/folder", 0, false);
        assert!(matches!(res, Err(CloudWriteError::Create(..))));
    }
}

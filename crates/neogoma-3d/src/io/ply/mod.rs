mod writer;

pub use writer::*;

/// Error types for the PLY module.
#[derive(Debug, thiserror::Error)]
pub enum PlyError {
    /// Failed to write PLY file
    #[error("Failed to write PLY file")]
    Io(#[from] std::io::Error),

    /// The number of written vertices differs from the header
    #[error("PLY header declares {declared} vertices but {written} were written")]
    VertexCountMismatch {
        /// vertex count declared in the header
        declared: usize,
        /// vertices written
        written: usize,
    },

    /// The record color does not match the header properties
    #[error("PLY record color presence does not match the header (color expected: {0})")]
    ColorMismatch(bool),
}

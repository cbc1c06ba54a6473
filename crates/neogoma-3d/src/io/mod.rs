/// Colmap reader module.
pub mod colmap;

/// CSV writer module.
pub mod csv;

/// PLY writer module.
pub mod ply;

mod writer;
pub use writer::*;

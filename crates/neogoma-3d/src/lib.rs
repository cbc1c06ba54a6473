#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Pinhole camera intrinsics, extrinsics and reconstructed camera poses.
pub mod camera;

/// Point colorization by back-projection into the nearest camera.
pub mod colorize;

/// I/O utilities for reading and writing 3D data.
pub mod io;

/// Operations on 3D data processing.
pub mod ops;

/// Point cloud record types.
pub mod pointcloud;

/// Structure-from-motion reconstruction results and backends.
pub mod reconstruct;

/// 3D transforms algorithms.
pub mod transforms;

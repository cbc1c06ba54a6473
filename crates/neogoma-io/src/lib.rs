#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access, decoding failures and image set
/// preparation.
pub mod error;

/// High-level image reading functions.
///
/// See [`functional::read_image_any_bgr8`] for automatic format detection.
pub mod functional;

/// Ordered image sets built from a folder and a file extension.
///
/// See [`image_set::ImageSet::build`].
pub mod image_set;

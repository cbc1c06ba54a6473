#![deny(missing_docs)]
//! Image types used to sample pixel colors from the reconstruction images.

/// image representation for computer vision purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};

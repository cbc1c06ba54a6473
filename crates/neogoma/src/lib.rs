#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use neogoma_image as image;

#[doc(inline)]
pub use neogoma_io as io;

#[doc(inline)]
pub use neogoma_3d as k3d;

/// End-to-end point cloud generation from a folder of images.
pub mod pipeline;

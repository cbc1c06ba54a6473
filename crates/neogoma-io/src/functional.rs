use std::path::Path;

use neogoma_image::{Image, ImageSize};

use crate::error::IoError;

/// Reads an image from the given file path into a 3-channel image in blue, green, red order.
///
/// The method tries to read from any image format supported by the image crate. Grayscale and
/// alpha images are converted to 3 channels before the channel swap.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the image data with interleaved BGR channels.
pub fn read_image_any_bgr8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| IoError::ImageDecodeError(file_path.to_path_buf(), e))?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    let mut data = img.into_rgb8().into_raw();
    data.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));

    Ok(Image::new(size, data)?)
}

/// Reads only the size of the image stored at the given path.
///
/// The image header is parsed but the pixels are not decoded.
pub fn read_image_size(file_path: impl AsRef<Path>) -> Result<ImageSize, IoError> {
    let file_path = file_path.as_ref();

    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let (width, height) = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| IoError::ImageDecodeError(file_path.to_path_buf(), e))?;

    Ok(ImageSize {
        width: width as usize,
        height: height as usize,
    })
}

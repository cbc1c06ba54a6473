/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to walk the image folder.
    #[error("Failed to walk the image folder. {0}")]
    WalkDirError(#[from] walkdir::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] neogoma_image::ImageError),

    /// Error to decode the image.
    #[error("Failed to decode the image {0}. {1}")]
    ImageDecodeError(std::path::PathBuf, image::ImageError),

    /// The image manifest could not be read back.
    #[error("Unable to read file: {0}. {1}")]
    ManifestUnreadable(std::path::PathBuf, std::io::Error),

    /// No file with the requested extension was found.
    #[error("No images with extension '{1}' found in {0}")]
    NoImagesFound(std::path::PathBuf, String),

    /// The requested 1-based image range is not valid.
    #[error("Invalid image range [{first}, {last}] for {count} images")]
    InvalidRange {
        /// first requested image, 1-based
        first: usize,
        /// last requested image, 1-based
        last: usize,
        /// number of available images
        count: usize,
    },
}

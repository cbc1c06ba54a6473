use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use neogoma_3d::{
    camera::CameraIntrinsic,
    colorize::{ColorizeError, PointColorizer},
    io::{CloudWriteError, PointCloudWriter},
    pointcloud::PointCloudRecord,
    reconstruct::{ReconstructError, ReconstructOptions, Reconstructor},
};
use neogoma_io::{error::IoError, functional::read_image_size, image_set::ImageSet};

/// Number of points colorized at once by default.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Error types for the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to prepare or read the images
    #[error(transparent)]
    Io(#[from] IoError),

    /// The reconstruction failed
    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),

    /// A point could not be colorized
    #[error(transparent)]
    Colorize(#[from] ColorizeError),

    /// The point cloud could not be written
    #[error(transparent)]
    Write(#[from] CloudWriteError),
}

/// The parameters of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// The folder with the images. The outputs are written here too.
    pub folder: PathBuf,
    /// The image extension without the dot, e.g. `jpg`.
    pub extension: String,
    /// The first image to use, 1-based.
    pub first: usize,
    /// The last image to use, 1-based and inclusive.
    pub last: usize,
    /// The focal length in pixels, `0` for the default.
    pub focal_length: f64,
    /// The principal point x coordinate, `0` for the image center.
    pub cx: f64,
    /// The principal point y coordinate, `0` for the image center.
    pub cy: f64,
    /// Whether to colorize the points.
    pub with_color: bool,
    /// The number of points colorized at once.
    pub chunk_size: usize,
}

impl PipelineConfig {
    /// Create a configuration for all the images of `folder`, with default intrinsics and
    /// colorization enabled.
    pub fn new(folder: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            extension: extension.into(),
            first: 1,
            last: usize::MAX,
            focal_length: 0.0,
            cx: 0.0,
            cy: 0.0,
            with_color: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// The number of images in the image set.
    pub num_images: usize,
    /// The number of reconstructed cameras.
    pub num_cameras: usize,
    /// The number of points written.
    pub num_points: usize,
    /// The intrinsics used by the reconstruction.
    pub intrinsic: CameraIntrinsic,
    /// The image manifest.
    pub manifest_path: PathBuf,
    /// The PLY output.
    pub ply_path: PathBuf,
    /// The CSV output.
    pub csv_path: PathBuf,
    /// The wall time of the run.
    pub elapsed: Duration,
}

/// Format a duration as `Xh: Ym: Zs`, truncating to whole seconds.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}h: {}m: {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Run the whole pipeline: image set, intrinsics, reconstruction, colorization and export.
///
/// Progress is printed to stdout. The image manifest, `point_cloud.ply` and
/// `point_cloud.csv` are written under `config.folder`.
pub fn run(
    config: &PipelineConfig,
    reconstructor: &dyn Reconstructor,
) -> Result<PipelineSummary, PipelineError> {
    let start = Instant::now();

    let image_set = ImageSet::build(&config.folder, &config.extension, config.first, config.last)?;
    let first_image = image_set
        .paths()
        .first()
        .ok_or(ReconstructError::EmptyImageSet)?;

    let image_size = read_image_size(first_image)?;
    log::debug!("First image size: {image_size}");

    let intrinsic =
        CameraIntrinsic::resolve(config.focal_length, config.cx, config.cy, image_size);
    log::info!("Reconstructing {} images", image_set.len());

    let reconstruction =
        reconstructor.reconstruct(image_set.paths(), &intrinsic, &ReconstructOptions::default())?;

    println!("\n----------------------------\n");
    println!("Reconstruction: ");
    println!("============================");
    println!("Estimated 3D points: {}", reconstruction.num_points());
    println!("Estimated cameras: {}", reconstruction.num_cameras());
    println!("Refined intrinsics: \n{}\n", reconstruction.intrinsic());
    println!("Writing 3D Point Cloud to files: ");
    println!("============================");
    println!("Recovering points  ... ");

    let colorizer = if config.with_color {
        Some(PointColorizer::new(&reconstruction, image_set.paths())?)
    } else {
        None
    };

    let points = reconstruction.points();
    let mut writer = PointCloudWriter::create(&config.folder, points.len(), config.with_color)?;

    for chunk in points.chunks(config.chunk_size.max(1)) {
        match &colorizer {
            Some(colorizer) => {
                let colors = colorizer.colorize_points(chunk)?;
                for (point, color) in chunk.iter().zip(colors) {
                    writer.write(&PointCloudRecord::with_color(*point, color))?;
                }
            }
            None => {
                for point in chunk {
                    writer.write(&PointCloudRecord::new(*point))?;
                }
            }
        }
        log::debug!("Wrote {} points", chunk.len());
    }

    let ply_path = writer.ply_path().to_path_buf();
    let csv_path = writer.csv_path().to_path_buf();
    let num_points = writer.finish()?;

    if num_points > 0 {
        println!("Point cloud has {num_points} points");
    } else {
        println!("Empty pointcloud");
    }

    Ok(PipelineSummary {
        num_images: image_set.len(),
        num_cameras: reconstruction.num_cameras(),
        num_points,
        intrinsic: *reconstruction.intrinsic(),
        manifest_path: image_set.manifest_path().to_path_buf(),
        ply_path,
        csv_path,
        elapsed: start.elapsed(),
    })
}

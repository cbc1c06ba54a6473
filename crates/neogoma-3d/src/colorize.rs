use std::{
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use neogoma_image::Image;
use neogoma_io::{error::IoError, functional::read_image_any_bgr8};
use rayon::prelude::*;

use crate::{
    camera::CameraExtrinsic,
    ops::{euclidean_distance, PinholeProjection},
    pointcloud::{Bgr8, BLACK},
    reconstruct::Reconstruction,
    transforms::{rotation_matrix_to_rotation_vector, rotation_vector_to_rotation_matrix},
};

/// Error types for the colorize module.
#[derive(Debug, thiserror::Error)]
pub enum ColorizeError {
    /// The image of a camera could not be read
    #[error("Failed to load image {path} of camera {camera}")]
    ImageLoad {
        /// The index of the camera
        camera: usize,
        /// The path of the image
        path: PathBuf,
        /// The underlying error
        #[source]
        source: IoError,
    },

    /// A camera refers to an image that is not in the image list
    #[error("Camera {camera} refers to image {image_index}, but only {num_images} images were given")]
    MissingImage {
        /// The index of the camera
        camera: usize,
        /// The image index of the camera
        image_index: usize,
        /// The number of images given
        num_images: usize,
    },
}

/// Find the camera center closest to `point`.
///
/// Returns `None` when there are no cameras. When several centers are at the same
/// distance, the first one wins.
///
/// Example:
///
/// ```
/// use neogoma_3d::colorize::nearest_camera;
///
/// let centers = [[10.0, 0.0, 0.0], [1.0, 0.0, 0.0], [5.0, 0.0, 0.0]];
/// assert_eq!(nearest_camera(&[0.0, 0.0, 0.0], &centers), Some(1));
/// ```
pub fn nearest_camera(point: &[f64; 3], centers: &[[f64; 3]]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, center) in centers.iter().enumerate() {
        let dist = euclidean_distance(point, center);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Sample the color at sub-pixel position `(u, v)`.
///
/// The position must lie strictly inside the image, `0 < u < width` and `0 < v < height`,
/// and is truncated to the pixel grid. Anything else, including NaN, is black.
pub fn sample_pixel(image: &Image<u8, 3>, u: f64, v: f64) -> Bgr8 {
    let inside = u > 0.0 && u < image.width() as f64 && v > 0.0 && v < image.height() as f64;
    if !inside {
        return BLACK;
    }
    image.get_pixel(u as usize, v as usize).unwrap_or(BLACK)
}

/// Number of decoded images kept by default.
pub const DEFAULT_IMAGE_CACHE_CAPACITY: usize = 8;

/// Decoded camera images, loaded on first use and evicted least recently used first.
///
/// At most `capacity` images are retained. Images handed out by [`ImageCache::get`] stay alive
/// while the caller holds them, even after eviction.
pub struct ImageCache {
    paths: Vec<PathBuf>,
    capacity: usize,
    // most recently used last
    entries: Mutex<Vec<(usize, Arc<Image<u8, 3>>)>>,
}

impl ImageCache {
    /// Create an empty cache over `paths` retaining at most `capacity` images.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(paths: Vec<PathBuf>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            paths,
            capacity,
            entries: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<(usize, Arc<Image<u8, 3>>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the image of slot `index`, decoding it if it is not cached.
    ///
    /// PRECONDITION: `index` is lower than the number of paths.
    pub fn get(&self, index: usize) -> Result<Arc<Image<u8, 3>>, ColorizeError> {
        {
            let mut entries = self.entries();
            if let Some(pos) = entries.iter().position(|(i, _)| *i == index) {
                let entry = entries.remove(pos);
                let image = entry.1.clone();
                entries.push(entry);
                return Ok(image);
            }
        }

        // decode without holding the lock
        let path = &self.paths[index];
        log::debug!("Loading image {} for camera {index}", path.display());
        let image = read_image_any_bgr8(path).map_err(|source| ColorizeError::ImageLoad {
            camera: index,
            path: path.clone(),
            source,
        })?;

        let mut entries = self.entries();
        if let Some((_, cached)) = entries.iter().find(|(i, _)| *i == index) {
            return Ok(cached.clone());
        }
        let image = Arc::new(image);
        if entries.len() == self.capacity {
            let (evicted, _) = entries.remove(0);
            log::debug!("Evicting image of camera {evicted}");
        }
        entries.push((index, image.clone()));
        Ok(image)
    }

    /// Get the maximum number of retained images.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of images currently retained.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Check if no image is retained.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Colors reconstructed points by reprojecting them into the nearest camera.
pub struct PointColorizer {
    centers: Vec<[f64; 3]>,
    projections: Vec<PinholeProjection>,
    cache: ImageCache,
}

impl PointColorizer {
    /// Prepare the colorizer for a reconstruction.
    ///
    /// # Arguments
    ///
    /// * `reconstruction` - The cameras and intrinsics to project with.
    /// * `image_paths` - The image set the reconstruction was computed from.
    ///
    /// # Errors
    ///
    /// Fails if a camera refers to an image outside of `image_paths`.
    pub fn new(
        reconstruction: &Reconstruction,
        image_paths: &[PathBuf],
    ) -> Result<Self, ColorizeError> {
        let poses = reconstruction.poses();
        if poses.is_empty() {
            log::warn!("No reconstructed camera, every point will be black");
        }

        let mut centers = Vec::with_capacity(poses.len());
        let mut projections = Vec::with_capacity(poses.len());
        let mut paths = Vec::with_capacity(poses.len());

        for (camera, pose) in poses.iter().enumerate() {
            let path = image_paths
                .get(pose.image_index)
                .ok_or(ColorizeError::MissingImage {
                    camera,
                    image_index: pose.image_index,
                    num_images: image_paths.len(),
                })?;

            // project through the axis-angle form of the rotation
            let rvec = rotation_matrix_to_rotation_vector(&pose.rotation);
            let extrinsic = CameraExtrinsic {
                rotation: rotation_vector_to_rotation_matrix(&rvec),
                translation: pose.translation,
            };

            centers.push(pose.center());
            projections.push(PinholeProjection::new(reconstruction.intrinsic(), &extrinsic));
            paths.push(path.clone());
        }

        Ok(Self {
            centers,
            projections,
            cache: ImageCache::new(paths, DEFAULT_IMAGE_CACHE_CAPACITY),
        })
    }

    /// Set the number of decoded images kept between calls.
    pub fn with_cache_capacity(self, capacity: usize) -> Self {
        let paths = self.cache.paths;
        Self {
            cache: ImageCache::new(paths, capacity),
            ..self
        }
    }

    /// Get the camera centers in world coordinates.
    pub fn centers(&self) -> &[[f64; 3]] {
        &self.centers
    }

    /// Get the cache of decoded images.
    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Find the nearest camera of `point` and the image position it projects to.
    fn locate(&self, point: &[f32; 3]) -> Option<(usize, [f64; 2])> {
        let point = point.map(f64::from);
        let camera = nearest_camera(&point, &self.centers)?;
        Some((camera, self.projections[camera].project(&point)))
    }

    /// Compute the color of one point.
    ///
    /// Points without any camera or reprojecting outside of the image of their nearest camera
    /// are black.
    pub fn colorize(&self, point: &[f32; 3]) -> Result<Bgr8, ColorizeError> {
        let Some((camera, [u, v])) = self.locate(point) else {
            return Ok(BLACK);
        };
        let image = self.cache.get(camera)?;
        Ok(sample_pixel(&image, u, v))
    }

    /// Compute the colors of many points in parallel.
    ///
    /// The points are grouped by nearest camera so that each image is fetched once per call,
    /// and the colors are returned in the order of `points`.
    pub fn colorize_points(&self, points: &[[f32; 3]]) -> Result<Vec<Bgr8>, ColorizeError> {
        let located = points
            .par_iter()
            .map(|p| self.locate(p))
            .collect::<Vec<_>>();

        let mut groups = vec![Vec::new(); self.centers.len()];
        for (i, hit) in located.into_iter().enumerate() {
            if let Some((camera, uv)) = hit {
                groups[camera].push((i, uv));
            }
        }

        let sampled = groups
            .par_iter()
            .enumerate()
            .filter(|(_, group)| !group.is_empty())
            .map(|(camera, group)| -> Result<Vec<(usize, Bgr8)>, ColorizeError> {
                let image = self.cache.get(camera)?;
                Ok(group
                    .iter()
                    .map(|&(i, [u, v])| (i, sample_pixel(&image, u, v)))
                    .collect::<Vec<_>>())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut colors = vec![BLACK; points.len()];
        for (i, color) in sampled.into_iter().flatten() {
            colors[i] = color;
        }
        Ok(colors)
    }
}

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    camera::{CameraIntrinsic, CameraPose},
    io::colmap::{
        read_cameras_txt, read_images_txt, read_points3d_txt, CameraModelId, ColmapCamera,
        ColmapError,
    },
    transforms::{is_rotation_matrix, quaternion_to_rotation_matrix},
};

/// Tolerance used to accept a camera rotation as orthonormal.
pub const ROTATION_TOLERANCE: f64 = 1e-3;

/// Error types for the reconstruction module.
#[derive(Debug, thiserror::Error)]
pub enum ReconstructError {
    /// No image was given to the reconstructor
    #[error("Cannot reconstruct from an empty image set")]
    EmptyImageSet,

    /// Only projective reconstructions are supported
    #[error("Affine reconstruction is not supported")]
    AffineUnsupported,

    /// The sparse model folder could not be found
    #[error("Sparse model not found at {0}")]
    ModelNotFound(PathBuf),

    /// Failed to read the sparse model
    #[error(transparent)]
    Colmap(#[from] ColmapError),

    /// A camera rotation is not orthonormal
    #[error("The rotation of camera {0} is not orthonormal")]
    InvalidRotation(usize),

    /// A camera refers to an image outside of the image set
    #[error("Camera {camera} refers to image {image_index}, but only {num_images} images exist")]
    ImageIndexOutOfRange {
        /// The index of the camera in the pose list
        camera: usize,
        /// The image index of the camera
        image_index: usize,
        /// The number of images in the set
        num_images: usize,
    },

    /// Camera poses are not in ascending image order
    #[error("Camera {0} is not in ascending image order")]
    UnorderedPoses(usize),
}

/// The result of a structure-from-motion run.
///
/// The value is validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    poses: Vec<CameraPose>,
    points: Vec<[f32; 3]>,
    intrinsic: CameraIntrinsic,
}

impl Reconstruction {
    /// Create a new reconstruction.
    ///
    /// # Arguments
    ///
    /// * `poses` - The reconstructed cameras, in ascending image order.
    /// * `points` - The triangulated points in world coordinates.
    /// * `intrinsic` - The intrinsics the cameras were estimated with.
    /// * `num_images` - The number of images the reconstruction was computed from.
    ///
    /// # Errors
    ///
    /// Fails if a rotation is not orthonormal, or if the image indices are out of range or
    /// not strictly ascending.
    pub fn new(
        poses: Vec<CameraPose>,
        points: Vec<[f32; 3]>,
        intrinsic: CameraIntrinsic,
        num_images: usize,
    ) -> Result<Self, ReconstructError> {
        for (i, pose) in poses.iter().enumerate() {
            if !is_rotation_matrix(&pose.rotation, ROTATION_TOLERANCE) {
                return Err(ReconstructError::InvalidRotation(i));
            }
            if pose.image_index >= num_images {
                return Err(ReconstructError::ImageIndexOutOfRange {
                    camera: i,
                    image_index: pose.image_index,
                    num_images,
                });
            }
        }

        if let Some(i) = poses
            .windows(2)
            .position(|w| w[0].image_index >= w[1].image_index)
        {
            return Err(ReconstructError::UnorderedPoses(i + 1));
        }

        Ok(Self {
            poses,
            points,
            intrinsic,
        })
    }

    /// Get the reconstructed camera poses.
    pub fn poses(&self) -> &[CameraPose] {
        &self.poses
    }

    /// Get the triangulated points.
    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    /// Get the intrinsics used by the reconstruction.
    pub fn intrinsic(&self) -> &CameraIntrinsic {
        &self.intrinsic
    }

    /// Get the number of reconstructed cameras.
    pub fn num_cameras(&self) -> usize {
        self.poses.len()
    }

    /// Get the number of triangulated points.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }
}

/// Options passed to a [`Reconstructor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructOptions {
    /// Request a projective (calibrated pinhole) reconstruction.
    pub is_projective: bool,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            is_projective: true,
        }
    }
}

/// A structure-from-motion backend.
///
/// Implementations estimate the camera poses and a sparse point cloud from an ordered list
/// of images sharing the same intrinsics.
pub trait Reconstructor {
    /// Reconstruct the scene seen by `image_paths`.
    ///
    /// The returned poses refer to `image_paths` through [`CameraPose::image_index`].
    fn reconstruct(
        &self,
        image_paths: &[PathBuf],
        intrinsic: &CameraIntrinsic,
        options: &ReconstructOptions,
    ) -> Result<Reconstruction, ReconstructError>;
}

/// A [`Reconstructor`] importing the sparse text model of an external COLMAP run.
///
/// The model folder must hold `cameras.txt`, `images.txt` and `points3D.txt`.
#[derive(Debug, Clone)]
pub struct ColmapReconstructor {
    model_dir: PathBuf,
}

impl ColmapReconstructor {
    /// Create a reconstructor reading the model from `model_dir`.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    /// Look for the sparse model under `root`, in `sparse/0` first and then in `sparse`.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self, ReconstructError> {
        let sparse = root.as_ref().join("sparse");
        [sparse.join("0"), sparse.clone()]
            .into_iter()
            .find(|dir| dir.join("images.txt").is_file())
            .map(Self::new)
            .ok_or(ReconstructError::ModelNotFound(sparse))
    }

    /// Get the folder the model is read from.
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }
}

fn file_name_key(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

fn camera_intrinsic(camera: &ColmapCamera) -> Option<CameraIntrinsic> {
    match (camera.model_id, camera.params.as_slice()) {
        (CameraModelId::CameraModelSimplePinhole, [f, cx, cy, ..]) => {
            Some(CameraIntrinsic::new(*f, *cx, *cy))
        }
        (CameraModelId::CameraModelPinhole, [fx, fy, cx, cy, ..]) => Some(CameraIntrinsic {
            fx: *fx,
            fy: *fy,
            cx: *cx,
            cy: *cy,
        }),
        _ => None,
    }
}

impl Reconstructor for ColmapReconstructor {
    fn reconstruct(
        &self,
        image_paths: &[PathBuf],
        intrinsic: &CameraIntrinsic,
        options: &ReconstructOptions,
    ) -> Result<Reconstruction, ReconstructError> {
        if !options.is_projective {
            return Err(ReconstructError::AffineUnsupported);
        }
        if image_paths.is_empty() {
            return Err(ReconstructError::EmptyImageSet);
        }
        if !self.model_dir.is_dir() {
            return Err(ReconstructError::ModelNotFound(self.model_dir.clone()));
        }

        log::debug!("Reading sparse model from {}", self.model_dir.display());
        let cameras = read_cameras_txt(self.model_dir.join("cameras.txt"))?;
        let images = read_images_txt(self.model_dir.join("images.txt"))?;
        let points = read_points3d_txt(self.model_dir.join("points3D.txt"))?;

        let image_index = image_paths
            .iter()
            .enumerate()
            .filter_map(|(i, path)| file_name_key(path).map(|key| (key, i)))
            .collect::<HashMap<_, _>>();

        let mut matched = images
            .iter()
            .filter_map(|image| {
                let index = file_name_key(Path::new(&image.name))
                    .and_then(|key| image_index.get(&key).copied());
                if index.is_none() {
                    log::debug!("Skipping image {} not in the image set", image.name);
                }
                index.map(|index| (index, image))
            })
            .collect::<Vec<_>>();

        matched.sort_by_key(|(index, _)| *index);
        matched.dedup_by_key(|(index, _)| *index);

        if matched.len() < image_paths.len() {
            log::warn!(
                "{} of {} images have no reconstructed camera",
                image_paths.len() - matched.len(),
                image_paths.len()
            );
        }

        // the refined intrinsics are only used when all cameras share one pinhole model
        let mut camera_ids = matched.iter().map(|(_, image)| image.camera_id);
        let refined = match camera_ids.next() {
            Some(first) if camera_ids.all(|id| id == first) => cameras
                .iter()
                .find(|camera| camera.camera_id == first)
                .and_then(camera_intrinsic),
            _ => None,
        };
        let intrinsic = match refined {
            Some(refined) => {
                log::debug!("Using refined intrinsics from the sparse model");
                refined
            }
            None => *intrinsic,
        };

        let poses = matched
            .iter()
            .map(|(index, image)| {
                CameraPose::new(
                    quaternion_to_rotation_matrix(&image.rotation),
                    image.translation,
                    *index,
                )
            })
            .collect();

        let points = points
            .iter()
            .map(|p| p.xyz.map(|v| v as f32))
            .collect();

        Reconstruction::new(poses, points, intrinsic, image_paths.len())
    }
}

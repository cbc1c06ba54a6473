use neogoma_image::ImageSize;

/// Focal length in pixels used when the user passes `0`.
pub const DEFAULT_FOCAL_LENGTH: f64 = 800.0;

/// Represents the instrinsic parameters of a pinhole camera
///
/// # Fields
///
/// * `fx` - The focal length in the x direction
/// * `fy` - The focal length in the y direction
/// * `cx` - The x coordinate of the principal point
/// * `cy` - The y coordinate of the principal point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsic {
    /// The focal length in the x direction
    pub fx: f64,
    /// The focal length in the y direction
    pub fy: f64,
    /// The x coordinate of the principal point
    pub cx: f64,
    /// The y coordinate of the principal point
    pub cy: f64,
}

impl CameraIntrinsic {
    /// Create the intrinsics of a camera with square pixels.
    pub fn new(focal_length: f64, cx: f64, cy: f64) -> Self {
        Self {
            fx: focal_length,
            fy: focal_length,
            cx,
            cy,
        }
    }

    /// Resolve the user supplied intrinsics against the size of the first image.
    ///
    /// A principal point coordinate equal to `0` is replaced by half the image width (or
    /// height), and a focal length equal to `0` by [`DEFAULT_FOCAL_LENGTH`]. The values are
    /// not checked for physical plausibility.
    ///
    /// Example:
    ///
    /// ```
    /// use neogoma_3d::camera::CameraIntrinsic;
    /// use neogoma_image::ImageSize;
    ///
    /// let size = ImageSize { width: 641, height: 480 };
    /// let intrinsic = CameraIntrinsic::resolve(0.0, 0.0, 100.0, size);
    /// assert_eq!(intrinsic, CameraIntrinsic::new(800.0, 320.0, 100.0));
    /// ```
    pub fn resolve(focal_length: f64, cx: f64, cy: f64, image_size: ImageSize) -> Self {
        // NOTE: the half size is computed in integer pixels
        let cx = if cx == 0.0 {
            (image_size.width / 2) as f64
        } else {
            cx
        };
        let cy = if cy == 0.0 {
            (image_size.height / 2) as f64
        } else {
            cy
        };
        let focal_length = if focal_length == 0.0 {
            DEFAULT_FOCAL_LENGTH
        } else {
            focal_length
        };

        Self::new(focal_length, cx, cy)
    }

    /// Returns the camera matrix `K` as a row-major 3x3 array.
    pub fn camera_matrix(&self) -> [[f64; 3]; 3] {
        [
            [self.fx, 0.0, self.cx],
            [0.0, self.fy, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }
}

impl std::fmt::Display for CameraIntrinsic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let k = self.camera_matrix();
        write!(
            f,
            "[{}, {}, {};\n {}, {}, {};\n {}, {}, {}]",
            k[0][0], k[0][1], k[0][2], k[1][0], k[1][1], k[1][2], k[2][0], k[2][1], k[2][2]
        )
    }
}

/// Represents the extrinsic parameters of a pinhole camera
///
/// The transform maps world points into the camera frame: `p_camera = R * p_world + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraExtrinsic {
    /// The rotation matrix of the camera 3x3
    pub rotation: [[f64; 3]; 3],
    /// The translation vector of the camera 3x1
    pub translation: [f64; 3],
}

/// The pose of one reconstructed camera.
///
/// The pose holds the world-to-camera transform and the index of the source image in the
/// image set. A reconstructor may drop cameras it could not localize, so the position of a
/// pose in the pose list is not necessarily its image index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// The world-to-camera rotation, orthonormal.
    pub rotation: [[f64; 3]; 3],
    /// The world-to-camera translation.
    pub translation: [f64; 3],
    /// The index of the image this camera was estimated from.
    pub image_index: usize,
}

impl CameraPose {
    /// Create a new camera pose.
    pub fn new(rotation: [[f64; 3]; 3], translation: [f64; 3], image_index: usize) -> Self {
        Self {
            rotation,
            translation,
            image_index,
        }
    }

    /// Compute the position of the camera center in world coordinates.
    ///
    /// The camera center is the world point mapped to the camera origin, `c = -R^T * t`.
    pub fn center(&self) -> [f64; 3] {
        let r = &self.rotation;
        let t = &self.translation;
        let mut center = [0.0; 3];
        for (i, c) in center.iter_mut().enumerate() {
            *c = -(r[0][i] * t[0] + r[1][i] * t[1] + r[2][i] * t[2]);
        }
        center
    }
}

use glam::{DMat3, DVec3};

use crate::camera::{CameraExtrinsic, CameraIntrinsic};

/// Utility function to compute the Euclidean distance between two points.
///
/// # Arguments
///
/// * `a` - A point in 3D space.
/// * `b` - Another point in 3D space.
///
/// # Returns
///
/// The Euclidean distance between the two points.
///
/// Example:
/// ```
/// use neogoma_3d::ops::euclidean_distance;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 5.0, 6.0];
/// let dst = euclidean_distance(&a, &b);
/// ```
pub fn euclidean_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

/// Precomputed pinhole projection for one camera without lens distortion.
#[derive(Debug, Clone, Copy)]
pub struct PinholeProjection {
    rotation: DMat3,
    translation: DVec3,
    intr_x: DVec3,
    intr_y: DVec3,
}

impl PinholeProjection {
    /// Build the projection from the camera intrinsics and extrinsics.
    pub fn new(intrinsic: &CameraIntrinsic, extrinsic: &CameraExtrinsic) -> Self {
        // glam is column-major, the rotation is stored row-major
        let rotation = DMat3::from_cols_array_2d(&extrinsic.rotation).transpose();
        let translation = DVec3::from_array(extrinsic.translation);

        Self {
            rotation,
            translation,
            intr_x: DVec3::new(intrinsic.fx, 0.0, intrinsic.cx),
            intr_y: DVec3::new(0.0, intrinsic.fy, intrinsic.cy),
        }
    }

    /// Project a world point to sub-pixel image coordinates `[u, v]`.
    ///
    /// The camera coordinates are divided by their depth as they are, so points behind the
    /// camera are mirrored through the optical center. A point at depth zero is divided by one.
    ///
    /// Example:
    ///
    /// ```
    /// use neogoma_3d::camera::{CameraExtrinsic, CameraIntrinsic};
    /// use neogoma_3d::ops::PinholeProjection;
    ///
    /// let intrinsic = CameraIntrinsic::new(500.0, 320.0, 240.0);
    /// let extrinsic = CameraExtrinsic {
    ///     rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    ///     translation: [0.0, 0.0, 0.0],
    /// };
    ///
    /// let projection = PinholeProjection::new(&intrinsic, &extrinsic);
    /// assert_eq!(projection.project(&[1.0, 2.0, 2.0]), [570.0, 740.0]);
    /// ```
    #[inline]
    pub fn project(&self, point: &[f64; 3]) -> [f64; 2] {
        // transform to camera coordinates: pc = R * pw + t
        let pc = self.rotation * DVec3::from_array(*point) + self.translation;

        let inv_z = if pc.z != 0.0 { 1.0 / pc.z } else { 1.0 };
        [self.intr_x.dot(pc) * inv_z, self.intr_y.dot(pc) * inv_z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn intrinsic() -> CameraIntrinsic {
        CameraIntrinsic::new(500.0, 320.0, 240.0)
    }

    #[test]
    fn test_euclidean_distance() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert_relative_eq!(euclidean_distance(&a, &b), 5.196152, epsilon = 1e-6);
        assert_eq!(euclidean_distance(&a, &a), 0.0);
    }

    fn identity() -> CameraExtrinsic {
        CameraExtrinsic {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn test_project_no_distortion() {
        let projection = PinholeProjection::new(&intrinsic(), &identity());

        // [0, 0, 5] should project to [cx, cy] = [320, 240]
        let p0 = projection.project(&[0.0, 0.0, 5.0]);
        assert_relative_eq!(p0[0], 320.0, epsilon = 1e-9);
        assert_relative_eq!(p0[1], 240.0, epsilon = 1e-9);

        // [1, 2, 10] should project to [fx*1/10 + cx, fy*2/10 + cy]
        let p1 = projection.project(&[1.0, 2.0, 10.0]);
        assert_relative_eq!(p1[0], 500.0 * 1.0 / 10.0 + 320.0, epsilon = 1e-9);
        assert_relative_eq!(p1[1], 500.0 * 2.0 / 10.0 + 240.0, epsilon = 1e-9);
    }

    #[test]
    fn test_project_behind_camera_is_mirrored() {
        let projection = PinholeProjection::new(&intrinsic(), &identity());

        // divided by the negative depth: [1, 2] / -5
        let p = projection.project(&[1.0, 2.0, -5.0]);
        assert_relative_eq!(p[0], 500.0 * -0.2 + 320.0, epsilon = 1e-9);
        assert_relative_eq!(p[1], 500.0 * -0.4 + 240.0, epsilon = 1e-9);

        // the optical axis behind the camera still hits the principal point
        let p = projection.project(&[0.0, 0.0, -5.0]);
        assert_relative_eq!(p[0], 320.0, epsilon = 1e-9);
        assert_relative_eq!(p[1], 240.0, epsilon = 1e-9);
    }

    #[test]
    fn test_project_zero_depth_divides_by_one() {
        let projection = PinholeProjection::new(&intrinsic(), &identity());
        assert_eq!(projection.project(&[0.0, 0.0, 0.0]), [0.0, 0.0]);
        assert_eq!(projection.project(&[1.0, -1.0, 0.0]), [500.0, -500.0]);
    }

    #[test]
    fn test_project_with_rotation() {
        // 90 degree rotation around Z axis
        let extrinsic = CameraExtrinsic {
            rotation: [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0, 0.0, 0.0],
        };

        let p = PinholeProjection::new(&intrinsic(), &extrinsic).project(&[1.0, 0.0, 5.0]);
        // After rotation, [1, 0, 5] becomes [0, 1, 5] in camera frame
        assert_relative_eq!(p[0], 320.0, epsilon = 1e-9);
        assert_relative_eq!(p[1], 500.0 * 1.0 / 5.0 + 240.0, epsilon = 1e-9);
    }

    #[test]
    fn test_project_on_optical_axis_of_moved_camera() {
        // camera rotated 90 degrees around Y and moved, looking at the world +X axis
        let rotation = [[0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]];
        let center = [-2.0, 1.0, 3.0];
        // t = -R * c
        let translation = [
            -(rotation[0][0] * center[0] + rotation[0][1] * center[1] + rotation[0][2] * center[2]),
            -(rotation[1][0] * center[0] + rotation[1][1] * center[1] + rotation[1][2] * center[2]),
            -(rotation[2][0] * center[0] + rotation[2][1] * center[1] + rotation[2][2] * center[2]),
        ];
        let extrinsic = CameraExtrinsic {
            rotation,
            translation,
        };

        // 7 units in front of the camera along its optical axis
        let point = [center[0] + 7.0, center[1], center[2]];
        let p = PinholeProjection::new(&intrinsic(), &extrinsic).project(&point);
        assert_relative_eq!(p[0], 320.0, epsilon = 1e-9);
        assert_relative_eq!(p[1], 240.0, epsilon = 1e-9);
    }
}

const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Compute the rotation matrix from an axis and angle.
///
/// # Arguments
///
/// * `axis` - The axis of rotation.
/// * `angle` - The angle of rotation.
///
/// # Returns
///
/// The rotation matrix.
///
/// PRECONDITION: axis is a non zero vector.
///
/// Example:
///
/// ```
/// use neogoma_3d::transforms::axis_angle_to_rotation_matrix;
///
/// let axis = [1.0, 0.0, 0.0];
/// let angle = std::f64::consts::PI / 2.0;
/// let rotation = axis_angle_to_rotation_matrix(&axis, angle).unwrap();
/// assert!((rotation[1][2] + 1.0).abs() < 1e-12);
/// ```
pub fn axis_angle_to_rotation_matrix(
    axis: &[f64; 3],
    angle: f64,
) -> Result<[[f64; 3]; 3], &'static str> {
    // normalize the vector
    let axis_norm = {
        let magnitude = (axis[0].powi(2) + axis[1].powi(2) + axis[2].powi(2)).sqrt();
        match magnitude < 1e-10 {
            true => return Err("cannot compute rotation matrix from a zero vector"),
            false => [
                axis[0] / magnitude,
                axis[1] / magnitude,
                axis[2] / magnitude,
            ],
        }
    };

    let x = axis_norm[0];
    let y = axis_norm[1];
    let z = axis_norm[2];

    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;

    let m00 = c + x * x * t;
    let m11 = c + y * y * t;
    let m22 = c + z * z * t;

    let tmp1 = x * y * t;
    let tmp2 = z * s;

    let m10 = tmp1 + tmp2;
    let m01 = tmp1 - tmp2;

    let tmp3 = x * z * t;
    let tmp4 = y * s;

    let m20 = tmp3 - tmp4;
    let m02 = tmp3 + tmp4;

    let tmp5 = y * z * t;
    let tmp6 = x * s;

    let m12 = tmp5 - tmp6;
    let m21 = tmp5 + tmp6;

    Ok([[m00, m01, m02], [m10, m11, m12], [m20, m21, m22]])
}

/// Convert a rotation vector (axis scaled by the angle in radians) to a rotation matrix.
///
/// A zero vector maps to the identity.
pub fn rotation_vector_to_rotation_matrix(rvec: &[f64; 3]) -> [[f64; 3]; 3] {
    let angle = (rvec[0].powi(2) + rvec[1].powi(2) + rvec[2].powi(2)).sqrt();
    axis_angle_to_rotation_matrix(rvec, angle).unwrap_or(IDENTITY)
}

/// Convert a rotation matrix to its rotation vector (Rodrigues) representation.
///
/// The returned vector is the rotation axis scaled by the rotation angle in `[0, pi]`.
///
/// PRECONDITION: rotation is orthonormal with determinant 1.
///
/// Example:
///
/// ```
/// use neogoma_3d::transforms::rotation_matrix_to_rotation_vector;
///
/// let rotation = [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
/// let rvec = rotation_matrix_to_rotation_vector(&rotation);
/// assert!((rvec[2] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
pub fn rotation_matrix_to_rotation_vector(rotation: &[[f64; 3]; 3]) -> [f64; 3] {
    let r = rotation;
    let trace = r[0][0] + r[1][1] + r[2][2];
    let cos_theta = (trace - 1.0) * 0.5;

    // the antisymmetric part of R is sin(theta) * [axis]_x
    let w = [r[2][1] - r[1][2], r[0][2] - r[2][0], r[1][0] - r[0][1]];
    let sin_theta = 0.5 * (w[0].powi(2) + w[1].powi(2) + w[2].powi(2)).sqrt();

    // acos loses half of the digits close to 0 and pi
    let theta = sin_theta.atan2(cos_theta);

    if sin_theta > 1e-5 {
        let scale = theta / (2.0 * sin_theta);
        return w.map(|v| v * scale);
    }

    if cos_theta > 0.0 {
        // small angle, theta ~ sin(theta)
        return w.map(|v| v * 0.5);
    }

    // theta ~ pi: the symmetric part of R + I is (1 + cos) * I + (1 - cos) * n * n^T,
    // its column with the largest diagonal entry is parallel to the axis
    let s = |i: usize, j: usize| 0.5 * (r[i][j] + r[j][i]) + if i == j { 1.0 } else { 0.0 };
    let k = (0..3)
        .max_by(|&a, &b| s(a, a).total_cmp(&s(b, b)))
        .unwrap_or(0);
    let column = [s(0, k), s(1, k), s(2, k)];
    let norm = (column[0].powi(2) + column[1].powi(2) + column[2].powi(2)).sqrt();
    let mut axis = column.map(|v| v / norm);

    // keep the sign given by the antisymmetric part, if any is left
    if axis[0] * w[0] + axis[1] * w[1] + axis[2] * w[2] < 0.0 {
        axis = axis.map(|v| -v);
    }

    axis.map(|v| v * theta)
}

/// Convert a unit quaternion `[qw, qx, qy, qz]` to a rotation matrix.
///
/// The quaternion is normalized first.
pub fn quaternion_to_rotation_matrix(quaternion: &[f64; 4]) -> [[f64; 3]; 3] {
    let norm = quaternion.iter().map(|q| q * q).sum::<f64>().sqrt();
    if norm < 1e-12 {
        return IDENTITY;
    }
    let [w, x, y, z] = quaternion.map(|q| q / norm);

    [
        [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - z * w),
            2.0 * (x * z + y * w),
        ],
        [
            2.0 * (x * y + z * w),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - x * w),
        ],
        [
            2.0 * (x * z - y * w),
            2.0 * (y * z + x * w),
            1.0 - 2.0 * (x * x + y * y),
        ],
    ]
}

/// Check whether the matrix is a rotation: `R * R^T = I` and `det(R) = 1` within `tolerance`.
pub fn is_rotation_matrix(rotation: &[[f64; 3]; 3], tolerance: f64) -> bool {
    let r = rotation;
    for i in 0..3 {
        for j in 0..3 {
            let dot = r[i][0] * r[j][0] + r[i][1] * r[j][1] + r[i][2] * r[j][2];
            let expected = if i == j { 1.0 } else { 0.0 };
            if (dot - expected).abs() > tolerance || dot.is_nan() {
                return false;
            }
        }
    }

    let det = r[0][0] * (r[1][1] * r[2][2] - r[1][2] * r[2][1])
        - r[0][1] * (r[1][0] * r[2][2] - r[1][2] * r[2][0])
        + r[0][2] * (r[1][0] * r[2][1] - r[1][1] * r[2][0]);

    (det - 1.0).abs() <= tolerance
}

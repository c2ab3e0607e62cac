use glam::{DMat3, DQuat, DVec3};
use surgnav_calib::CameraExtrinsic;

pub(crate) fn mat3_from_array(m: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(m[0][0], m[1][0], m[2][0]),
        DVec3::new(m[0][1], m[1][1], m[2][1]),
        DVec3::new(m[0][2], m[1][2], m[2][2]),
    )
}

pub(crate) fn mat3_to_array(m: &DMat3) -> [[f64; 3]; 3] {
    [
        [m.x_axis.x, m.y_axis.x, m.z_axis.x],
        [m.x_axis.y, m.y_axis.y, m.z_axis.y],
        [m.x_axis.z, m.y_axis.z, m.z_axis.z],
    ]
}

/// Split a 4x4 rigid transform into its rotation and translation parts.
///
/// # Arguments
///
/// * `transform` - A 4x4 rigid transform, row major.
///
/// # Returns
///
/// The upper-left 3x3 rotation block and the top three entries of the last
/// column as a [`CameraExtrinsic`].
pub fn decompose_transform(transform: &[[f64; 4]; 4]) -> CameraExtrinsic {
    let mut rotation = [[0.0; 3]; 3];
    for (dst, src) in rotation.iter_mut().zip(transform.iter()) {
        dst.copy_from_slice(&src[0..3]);
    }
    let translation = [transform[0][3], transform[1][3], transform[2][3]];
    CameraExtrinsic {
        rotation,
        translation,
    }
}

/// Compute the rotation matrix encoded by a rotation vector.
///
/// The direction of `rvec` is the rotation axis and its magnitude the
/// rotation angle in radians (Rodrigues form). The zero vector encodes the
/// identity rotation.
///
/// # Arguments
///
/// * `rvec` - The rotation vector.
///
/// # Returns
///
/// The rotation matrix.
///
/// Example:
///
/// ```
/// use surgnav_projection::transforms::rotation_vector_to_matrix;
///
/// let rvec = [std::f64::consts::FRAC_PI_2, 0.0, 0.0];
/// let rotation = rotation_vector_to_matrix(&rvec);
/// assert!((rotation[1][2] - (-1.0)).abs() < 1e-12);
/// assert!((rotation[2][1] - 1.0).abs() < 1e-12);
/// ```
pub fn rotation_vector_to_matrix(rvec: &[f64; 3]) -> [[f64; 3]; 3] {
    let angle = (rvec[0].powi(2) + rvec[1].powi(2) + rvec[2].powi(2)).sqrt();
    if angle < 1e-10 {
        return [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    }

    let x = rvec[0] / angle;
    let y = rvec[1] / angle;
    let z = rvec[2] / angle;

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

    [[m00, m01, m02], [m10, m11, m12], [m20, m21, m22]]
}

/// Compute the rotation vector encoding a rotation matrix.
///
/// Goes through a unit quaternion rather than direct trigonometry, which
/// stays stable near the identity and near half-turn rotations. Inverse of
/// [`rotation_vector_to_matrix`] up to numerical precision.
///
/// # Arguments
///
/// * `rotation` - The rotation matrix.
///
/// # Returns
///
/// The rotation vector, with angle wrapped to `(-pi, pi]`.
pub fn rotation_matrix_to_vector(rotation: &[[f64; 3]; 3]) -> [f64; 3] {
    let q = DQuat::from_mat3(&mat3_from_array(rotation)).normalize();
    let (axis, angle) = q.to_axis_angle();
    let angle = if angle > std::f64::consts::PI {
        angle - 2.0 * std::f64::consts::PI
    } else {
        angle
    };
    (axis * angle).to_array()
}

/// Build a 4x4 rigid transform from a 6-DOF parameter list.
///
/// `params` is `[rx, ry, rz, tx, ty, tz]` with rotations in degrees and
/// translations in the linear unit of the scene (typically millimetres).
/// The rotation is composed as `Rz * Ry * Rx`.
///
/// # Arguments
///
/// * `params` - The 6-DOF pose parameters.
///
/// # Returns
///
/// The 4x4 rigid transform, row major.
pub fn rigid_from_euler(params: &[f64; 6]) -> [[f64; 4]; 4] {
    let rx = rotation_vector_to_matrix(&[params[0].to_radians(), 0.0, 0.0]);
    let ry = rotation_vector_to_matrix(&[0.0, params[1].to_radians(), 0.0]);
    let rz = rotation_vector_to_matrix(&[0.0, 0.0, params[2].to_radians()]);
    let rotation =
        mat3_to_array(&(mat3_from_array(&rz) * mat3_from_array(&ry) * mat3_from_array(&rx)));

    let mut transform = [[0.0; 4]; 4];
    for (dst, src) in transform.iter_mut().zip(rotation.iter()) {
        dst[0..3].copy_from_slice(src);
    }
    transform[0][3] = params[3];
    transform[1][3] = params[4];
    transform[2][3] = params[5];
    transform[3][3] = 1.0;
    transform
}

/// Determinant threshold below which a transform is treated as singular.
const SINGULARITY_EPSILON: f64 = 1e-12;

/// Transform a set of points into another frame using a rotation and
/// translation.
///
/// # Arguments
///
/// * `points` - The points to be transformed.
/// * `rotation` - A 3x3 rotation matrix, row major.
/// * `translation` - A translation vector.
/// * `transformed` - A pre-allocated slice to store the transformed points.
///
/// PRECONDITION: `transformed` has the same length as `points`.
///
/// Example:
///
/// ```
/// use surgnav_projection::linalg::transform_points;
///
/// let points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let translation = [0.0, 0.0, 0.0];
/// let mut transformed = vec![[0.0; 3]; points.len()];
/// transform_points(&points, &rotation, &translation, &mut transformed);
/// assert_eq!(transformed, points);
/// ```
pub fn transform_points(
    points: &[[f64; 3]],
    rotation: &[[f64; 3]; 3],
    translation: &[f64; 3],
    transformed: &mut [[f64; 3]],
) {
    assert_eq!(points.len(), transformed.len());

    let rotation_mat = {
        let rotation_slice = unsafe {
            std::slice::from_raw_parts(rotation.as_ptr() as *const f64, rotation.len() * 3)
        };
        faer::mat::from_row_major_slice(rotation_slice, 3, 3)
    };

    // view of the source points as an Nx3 matrix
    let points_mat = {
        let points_slice = unsafe {
            std::slice::from_raw_parts(points.as_ptr() as *const f64, points.len() * 3)
        };
        faer::mat::from_row_major_slice(points_slice, points.len(), 3)
    };

    // mutable 3xN view of the destination, one point per column
    let mut transformed_mat = {
        let transformed_slice = unsafe {
            std::slice::from_raw_parts_mut(
                transformed.as_mut_ptr() as *mut f64,
                transformed.len() * 3,
            )
        };
        faer::mat::from_column_major_slice_mut(transformed_slice, 3, transformed.len())
    };

    faer::linalg::matmul::matmul(
        &mut transformed_mat,
        rotation_mat,
        points_mat.transpose(),
        None,
        1.0,
        faer::Parallelism::None,
    );

    let (tx, ty, tz) = (translation[0], translation[1], translation[2]);
    for mut col in transformed_mat.col_iter_mut() {
        // SAFETY: every column has exactly 3 rows
        unsafe {
            col.write_unchecked(0, col.read_unchecked(0) + tx);
            col.write_unchecked(1, col.read_unchecked(1) + ty);
            col.write_unchecked(2, col.read_unchecked(2) + tz);
        }
    }
}

/// Determinant of a 4x4 transform.
pub fn determinant(m: &[[f64; 4]; 4]) -> f64 {
    let s0 = m[2][2] * m[3][3] - m[2][3] * m[3][2];
    let s1 = m[2][1] * m[3][3] - m[2][3] * m[3][1];
    let s2 = m[2][1] * m[3][2] - m[2][2] * m[3][1];
    let s3 = m[2][0] * m[3][3] - m[2][3] * m[3][0];
    let s4 = m[2][0] * m[3][2] - m[2][2] * m[3][0];
    let s5 = m[2][0] * m[3][1] - m[2][1] * m[3][0];

    m[0][0] * (m[1][1] * s0 - m[1][2] * s1 + m[1][3] * s2)
        - m[0][1] * (m[1][0] * s0 - m[1][2] * s3 + m[1][3] * s4)
        + m[0][2] * (m[1][0] * s1 - m[1][1] * s3 + m[1][3] * s5)
        - m[0][3] * (m[1][0] * s2 - m[1][1] * s4 + m[1][2] * s5)
}

/// Invert a 4x4 transform.
///
/// Computes the full cofactor inverse rather than exploiting rigid-transform
/// structure, so a degenerate input is detected instead of silently producing
/// garbage. Returns `None` when the determinant falls below the singularity
/// threshold.
///
/// # Arguments
///
/// * `m` - A 4x4 transform, row major.
///
/// # Returns
///
/// The inverse transform, or `None` if `m` is singular.
pub fn invert_transform(m: &[[f64; 4]; 4]) -> Option<[[f64; 4]; 4]> {
    // pairwise 2x2 subfactors of the lower two and middle two row pairs
    let a2323 = m[2][2] * m[3][3] - m[2][3] * m[3][2];
    let a1323 = m[2][1] * m[3][3] - m[2][3] * m[3][1];
    let a1223 = m[2][1] * m[3][2] - m[2][2] * m[3][1];
    let a0323 = m[2][0] * m[3][3] - m[2][3] * m[3][0];
    let a0223 = m[2][0] * m[3][2] - m[2][2] * m[3][0];
    let a0123 = m[2][0] * m[3][1] - m[2][1] * m[3][0];
    let a2313 = m[1][2] * m[3][3] - m[1][3] * m[3][2];
    let a1313 = m[1][1] * m[3][3] - m[1][3] * m[3][1];
    let a1213 = m[1][1] * m[3][2] - m[1][2] * m[3][1];
    let a2312 = m[1][2] * m[2][3] - m[1][3] * m[2][2];
    let a1312 = m[1][1] * m[2][3] - m[1][3] * m[2][1];
    let a1212 = m[1][1] * m[2][2] - m[1][2] * m[2][1];
    let a0313 = m[1][0] * m[3][3] - m[1][3] * m[3][0];
    let a0213 = m[1][0] * m[3][2] - m[1][2] * m[3][0];
    let a0312 = m[1][0] * m[2][3] - m[1][3] * m[2][0];
    let a0212 = m[1][0] * m[2][2] - m[1][2] * m[2][0];
    let a0113 = m[1][0] * m[3][1] - m[1][1] * m[3][0];
    let a0112 = m[1][0] * m[2][1] - m[1][1] * m[2][0];

    let det = m[0][0] * (m[1][1] * a2323 - m[1][2] * a1323 + m[1][3] * a1223)
        - m[0][1] * (m[1][0] * a2323 - m[1][2] * a0323 + m[1][3] * a0223)
        + m[0][2] * (m[1][0] * a1323 - m[1][1] * a0323 + m[1][3] * a0123)
        - m[0][3] * (m[1][0] * a1223 - m[1][1] * a0223 + m[1][2] * a0123);

    if det.abs() < SINGULARITY_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let mut inv = [[0.0; 4]; 4];
    inv[0][0] = inv_det * (m[1][1] * a2323 - m[1][2] * a1323 + m[1][3] * a1223);
    inv[0][1] = -inv_det * (m[0][1] * a2323 - m[0][2] * a1323 + m[0][3] * a1223);
    inv[0][2] = inv_det * (m[0][1] * a2313 - m[0][2] * a1313 + m[0][3] * a1213);
    inv[0][3] = -inv_det * (m[0][1] * a2312 - m[0][2] * a1312 + m[0][3] * a1212);
    inv[1][0] = -inv_det * (m[1][0] * a2323 - m[1][2] * a0323 + m[1][3] * a0223);
    inv[1][1] = inv_det * (m[0][0] * a2323 - m[0][2] * a0323 + m[0][3] * a0223);
    inv[1][2] = -inv_det * (m[0][0] * a2313 - m[0][2] * a0313 + m[0][3] * a0213);
    inv[1][3] = inv_det * (m[0][0] * a2312 - m[0][2] * a0312 + m[0][3] * a0212);
    inv[2][0] = inv_det * (m[1][0] * a1323 - m[1][1] * a0323 + m[1][3] * a0123);
    inv[2][1] = -inv_det * (m[0][0] * a1323 - m[0][1] * a0323 + m[0][3] * a0123);
    inv[2][2] = inv_det * (m[0][0] * a1313 - m[0][1] * a0313 + m[0][3] * a0113);
    inv[2][3] = -inv_det * (m[0][0] * a1312 - m[0][1] * a0312 + m[0][3] * a0112);
    inv[3][0] = -inv_det * (m[1][0] * a1223 - m[1][1] * a0223 + m[1][2] * a0123);
    inv[3][1] = inv_det * (m[0][0] * a1223 - m[0][1] * a0223 + m[0][2] * a0123);
    inv[3][2] = -inv_det * (m[0][0] * a1213 - m[0][1] * a0213 + m[0][2] * a0113);
    inv[3][3] = inv_det * (m[0][0] * a1212 - m[0][1] * a0212 + m[0][2] * a0112);

    Some(inv)
}

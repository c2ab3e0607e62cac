use glam::DVec3;
use surgnav_calib::CameraProjection;

use crate::{linalg, transforms, validation, ProjectionError};

/// Result of a facing-point projection.
///
/// Both vectors have the same length and keep the relative order of the
/// original batch.
#[derive(Debug, Clone)]
pub struct FacingPoints {
    /// Pixel coordinates of the facing points.
    pub pixels: Vec<[f64; 2]>,
    /// The facing points themselves, in world coordinates.
    pub points: Vec<[f64; 3]>,
}

/// Projects all 3D points to 2D.
///
/// The transform is decomposed into a rotation vector and translation, and
/// every point is mapped into camera space and through the pinhole model,
/// applying distortion when coefficients are given. No clipping is
/// performed: points behind the camera or outside any notional image bounds
/// still produce coordinates, and filtering them is the caller's concern.
///
/// # Arguments
///
/// * `points` - 3D points, typically in millimetres.
/// * `world_to_camera` - 4x4 rigid transform from world to camera space, row major.
/// * `camera_matrix` - 3x3 pinhole intrinsics matrix.
/// * `distortion` - Optional distortion coefficients `[k1, k2, p1, p2, (k3, (k4, k5, k6))]`.
///
/// # Returns
///
/// Pixel coordinates, one per input point, in input order.
///
/// Example:
///
/// ```
/// use surgnav_projection::ops::project_points;
///
/// let points = vec![[0.0, 0.0, 100.0]];
/// let world_to_camera = [
///     [1.0, 0.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0, 0.0],
///     [0.0, 0.0, 1.0, 0.0],
///     [0.0, 0.0, 0.0, 1.0],
/// ];
/// let camera_matrix = [
///     [1000.0, 0.0, 960.0],
///     [0.0, 1000.0, 540.0],
///     [0.0, 0.0, 1.0],
/// ];
/// let pixels = project_points(&points, &world_to_camera, &camera_matrix, None)?;
/// assert_eq!(pixels, vec![[960.0, 540.0]]);
/// # Ok::<(), surgnav_projection::ProjectionError>(())
/// ```
pub fn project_points(
    points: &[[f64; 3]],
    world_to_camera: &[[f64; 4]; 4],
    camera_matrix: &[[f64; 3]; 3],
    distortion: Option<&[f64]>,
) -> Result<Vec<[f64; 2]>, ProjectionError> {
    let camera = validation::validate_camera(camera_matrix, distortion)?;

    let pose = transforms::decompose_transform(world_to_camera);
    let rvec = transforms::rotation_matrix_to_vector(&pose.rotation);

    Ok(project_points_with_pose(
        points,
        &rvec,
        &pose.translation,
        &camera,
    ))
}

/// Projects 3D points posed by a rotation vector and translation through a
/// camera model.
///
/// # Arguments
///
/// * `points` - 3D points, typically in millimetres.
/// * `rvec` - Rotation vector (axis-angle) of the world-to-camera rotation.
/// * `tvec` - Translation of the world-to-camera transform.
/// * `camera` - The projection strategy mapping camera-space points to pixels.
pub fn project_points_with_pose(
    points: &[[f64; 3]],
    rvec: &[f64; 3],
    tvec: &[f64; 3],
    camera: &impl CameraProjection,
) -> Vec<[f64; 2]> {
    let rotation = transforms::rotation_vector_to_matrix(rvec);

    let mut camera_points = vec![[0.0; 3]; points.len()];
    linalg::transform_points(points, &rotation, tvec, &mut camera_points);

    camera_points
        .iter()
        .map(|point| camera.project_camera_point(point))
        .collect()
}

/// Projects the 3D points that face the camera to 2D pixels.
///
/// This assumes:
///
///   Camera direction is a unit vector from the camera, towards focal point.
///   Surface normal is a unit vector pointing out from the surface.
///
/// Vectors are not checked for unit length. A point faces the camera when
/// the cosine of the angle between its normal and the viewing direction
/// falls below `upper_cos_theta`; the conventional threshold is `0.0`,
/// keeping normals that point back towards the camera (cosine in `[-1, 0)`).
///
/// # Arguments
///
/// * `points` - 3D points, typically in millimetres.
/// * `normals` - Outward unit normals, one per point.
/// * `world_to_camera` - 4x4 rigid transform from world to camera space, row major.
/// * `camera_matrix` - 3x3 pinhole intrinsics matrix.
/// * `distortion` - Optional distortion coefficients `[k1, k2, p1, p2, (k3, (k4, k5, k6))]`.
/// * `upper_cos_theta` - Upper limit for the normal/viewing-direction cosine.
///
/// # Returns
///
/// The projected pixels and the surviving 3D points, order preserving.
///
/// Example:
///
/// ```
/// use surgnav_projection::ops::project_facing_points;
///
/// let points = vec![[0.0, 0.0, 100.0], [0.0, 0.0, 200.0]];
/// let normals = vec![[0.0, 0.0, -1.0], [0.0, 0.0, 1.0]];
/// let world_to_camera = [
///     [1.0, 0.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0, 0.0],
///     [0.0, 0.0, 1.0, 0.0],
///     [0.0, 0.0, 0.0, 1.0],
/// ];
/// let camera_matrix = [
///     [1000.0, 0.0, 960.0],
///     [0.0, 1000.0, 540.0],
///     [0.0, 0.0, 1.0],
/// ];
/// let facing = project_facing_points(
///     &points,
///     &normals,
///     &world_to_camera,
///     &camera_matrix,
///     None,
///     0.0,
/// )?;
/// assert_eq!(facing.points, vec![[0.0, 0.0, 100.0]]);
/// # Ok::<(), surgnav_projection::ProjectionError>(())
/// ```
pub fn project_facing_points(
    points: &[[f64; 3]],
    normals: &[[f64; 3]],
    world_to_camera: &[[f64; 4]; 4],
    camera_matrix: &[[f64; 3]; 3],
    distortion: Option<&[f64]>,
    upper_cos_theta: f64,
) -> Result<FacingPoints, ProjectionError> {
    let camera = validation::validate_camera(camera_matrix, distortion)?;
    validation::validate_normals(points, normals)?;

    let camera_to_world = linalg::invert_transform(world_to_camera).ok_or_else(|| {
        ProjectionError::SingularTransform {
            det: linalg::determinant(world_to_camera),
        }
    })?;

    // Map the camera origin and focal point into world space through the
    // rotation block alone; the translation cancels in the difference.
    let rotation_to_world =
        transforms::mat3_from_array(&transforms::decompose_transform(&camera_to_world).rotation);
    let origin_in_world = rotation_to_world * DVec3::ZERO;
    let focal_in_world = rotation_to_world * DVec3::Z;
    let viewing_direction = focal_in_world - origin_in_world;

    let facing_points: Vec<[f64; 3]> = points
        .iter()
        .zip(normals.iter())
        .filter(|(_, normal)| DVec3::from_array(**normal).dot(viewing_direction) < upper_cos_theta)
        .map(|(point, _)| *point)
        .collect();

    log::debug!(
        "{} of {} points face the camera",
        facing_points.len(),
        points.len()
    );

    let pose = transforms::decompose_transform(world_to_camera);
    let rvec = transforms::rotation_matrix_to_vector(&pose.rotation);
    let pixels = project_points_with_pose(&facing_points, &rvec, &pose.translation, &camera);

    Ok(FacingPoints {
        pixels,
        points: facing_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const IDENTITY4: [[f64; 4]; 4] = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];

    const K: [[f64; 3]; 3] = [
        [500.0, 0.0, 320.0],
        [0.0, 500.0, 240.0],
        [0.0, 0.0, 1.0],
    ];

    #[test]
    fn test_project_points_no_distortion() {
        let points = vec![[0.0, 0.0, 5.0], [1.0, 2.0, 10.0]];
        let pixels = project_points(&points, &IDENTITY4, &K, None).unwrap();
        assert_eq!(pixels.len(), 2);

        assert_relative_eq!(pixels[0][0], 320.0, epsilon = 1e-9);
        assert_relative_eq!(pixels[0][1], 240.0, epsilon = 1e-9);

        assert_relative_eq!(pixels[1][0], 500.0 * 1.0 / 10.0 + 320.0, epsilon = 1e-9);
        assert_relative_eq!(pixels[1][1], 500.0 * 2.0 / 10.0 + 240.0, epsilon = 1e-9);
    }

    #[test]
    fn test_project_points_with_rotation() {
        // quarter turn about z sends [1, 0, 5] to [0, 1, 5] in camera space
        let world_to_camera = [
            [0.0, -1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let pixels = project_points(&[[1.0, 0.0, 5.0]], &world_to_camera, &K, None).unwrap();
        assert_relative_eq!(pixels[0][0], 320.0, epsilon = 1e-9);
        assert_relative_eq!(pixels[0][1], 500.0 * 1.0 / 5.0 + 240.0, epsilon = 1e-9);
    }

    #[test]
    fn test_project_points_with_translation() {
        let mut world_to_camera = IDENTITY4;
        world_to_camera[0][3] = 1.0;
        world_to_camera[1][3] = 2.0;
        let pixels = project_points(&[[0.0, 0.0, 5.0]], &world_to_camera, &K, None).unwrap();
        assert_relative_eq!(pixels[0][0], 500.0 * 1.0 / 5.0 + 320.0, epsilon = 1e-9);
        assert_relative_eq!(pixels[0][1], 500.0 * 2.0 / 5.0 + 240.0, epsilon = 1e-9);
    }

    #[test]
    fn test_project_points_with_distortion_moves_off_center_point() {
        let point = [[2.0, 1.0, 10.0]];
        let undistorted = project_points(&point, &IDENTITY4, &K, None).unwrap();
        let distorted =
            project_points(&point, &IDENTITY4, &K, Some(&[0.1, 0.0, 0.0, 0.0])).unwrap();
        assert!((distorted[0][0] - undistorted[0][0]).abs() > 1e-3);
        assert!((distorted[0][1] - undistorted[0][1]).abs() > 1e-3);
    }

    #[test]
    fn test_project_points_empty() {
        let pixels = project_points(&[], &IDENTITY4, &K, None).unwrap();
        assert!(pixels.is_empty());
    }

    #[test]
    fn test_project_points_rejects_invalid_camera_matrix() {
        let mut k = K;
        k[1][0] = 3.0;
        assert!(matches!(
            project_points(&[[0.0, 0.0, 5.0]], &IDENTITY4, &k, None),
            Err(ProjectionError::Camera(_))
        ));
    }

    #[test]
    fn test_project_points_does_not_invert_the_transform() {
        // a singular transform is fine here, only the facing filter inverts
        let singular = [[0.0; 4]; 4];
        let pixels = project_points(&[[0.0, 0.0, 5.0]], &singular, &K, None).unwrap();
        assert_eq!(pixels.len(), 1);
    }

    #[test]
    fn test_project_facing_points_culls_back_faces() {
        let points = vec![[0.0, 0.0, 100.0], [0.0, 0.0, 200.0]];
        let normals = vec![[0.0, 0.0, -1.0], [0.0, 0.0, 1.0]];
        let facing =
            project_facing_points(&points, &normals, &IDENTITY4, &K, None, 0.0).unwrap();

        assert_eq!(facing.points, vec![[0.0, 0.0, 100.0]]);
        assert_eq!(facing.pixels.len(), 1);
        assert_relative_eq!(facing.pixels[0][0], 320.0, epsilon = 1e-9);
        assert_relative_eq!(facing.pixels[0][1], 240.0, epsilon = 1e-9);
    }

    #[test]
    fn test_project_facing_points_all_culled() {
        let points = vec![[0.0, 0.0, 100.0], [1.0, 0.0, 100.0]];
        let normals = vec![[0.0, 0.0, 1.0], [0.0, 0.0, 1.0]];
        let facing =
            project_facing_points(&points, &normals, &IDENTITY4, &K, None, 0.0).unwrap();
        assert!(facing.pixels.is_empty());
        assert!(facing.points.is_empty());
    }

    #[test]
    fn test_project_facing_points_empty_input() {
        let facing = project_facing_points(&[], &[], &IDENTITY4, &K, None, 0.0).unwrap();
        assert!(facing.pixels.is_empty());
        assert!(facing.points.is_empty());
    }

    #[test]
    fn test_project_facing_points_threshold_widens_selection() {
        // a sideways normal has cosine 0 and is culled at the default
        // threshold, kept at a permissive one
        let points = vec![[0.0, 0.0, 100.0]];
        let normals = vec![[1.0, 0.0, 0.0]];
        let strict =
            project_facing_points(&points, &normals, &IDENTITY4, &K, None, 0.0).unwrap();
        assert!(strict.points.is_empty());

        let permissive =
            project_facing_points(&points, &normals, &IDENTITY4, &K, None, 0.5).unwrap();
        assert_eq!(permissive.points.len(), 1);
    }

    #[test]
    fn test_project_facing_points_mismatched_normals() {
        let points = vec![[0.0, 0.0, 100.0], [0.0, 0.0, 200.0]];
        let normals = vec![[0.0, 0.0, -1.0]];
        assert!(matches!(
            project_facing_points(&points, &normals, &IDENTITY4, &K, None, 0.0),
            Err(ProjectionError::MismatchedArrayLengths { .. })
        ));
    }

    #[test]
    fn test_project_facing_points_singular_transform() {
        let mut singular = IDENTITY4;
        singular[0][0] = 0.0;
        singular[1][1] = 0.0;
        singular[2][2] = 0.0;
        let points = vec![[0.0, 0.0, 100.0]];
        let normals = vec![[0.0, 0.0, -1.0]];
        assert!(matches!(
            project_facing_points(&points, &normals, &singular, &K, None, 0.0),
            Err(ProjectionError::SingularTransform { .. })
        ));
    }
}

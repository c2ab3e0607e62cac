//! Shared input validation for the projection entry points.
//!
//! Structural invariants that the slice types cannot carry are checked here,
//! before any numeric work runs. The camera matrix and distortion vector are
//! parsed into a [`PinholeCamera`] so the numeric code downstream only ever
//! sees validated calibration data.

use surgnav_calib::distortion::PolynomialDistortion;
use surgnav_calib::{CameraIntrinsic, PinholeCamera};

use crate::ProjectionError;

/// Parse and validate the camera matrix and optional distortion vector.
pub(crate) fn validate_camera(
    camera_matrix: &[[f64; 3]; 3],
    distortion: Option<&[f64]>,
) -> Result<PinholeCamera, ProjectionError> {
    let intrinsic = CameraIntrinsic::from_matrix(camera_matrix)?;
    let distortion = match distortion {
        Some(coefficients) => Some(PolynomialDistortion::from_coefficients(coefficients)?),
        None => None,
    };
    Ok(PinholeCamera::new(intrinsic, distortion))
}

/// Check that every point has a normal.
pub(crate) fn validate_normals(
    points: &[[f64; 3]],
    normals: &[[f64; 3]],
) -> Result<(), ProjectionError> {
    if normals.len() != points.len() {
        return Err(ProjectionError::MismatchedArrayLengths {
            left_name: "normals",
            left_len: normals.len(),
            right_name: "points",
            right_len: points.len(),
        });
    }
    Ok(())
}

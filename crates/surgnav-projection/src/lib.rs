#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Linear algebra kernels for rigid transforms.
pub mod linalg;

/// Projection and facing-point operations.
pub mod ops;

/// Rotation and rigid-transform conversions.
pub mod transforms;

mod validation;

pub use ops::{project_facing_points, project_points, FacingPoints};

use surgnav_calib::CameraError;
use thiserror::Error;

/// Error types for projection operations.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Camera calibration data failed validation
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// Invalid input data - mismatched array lengths with descriptive labels.
    #[error("Mismatched array lengths: {left_name} ({left_len}) != {right_name} ({right_len})")]
    MismatchedArrayLengths {
        /// Label for the left-hand slice
        left_name: &'static str,
        /// Length of the left-hand slice
        left_len: usize,
        /// Label for the right-hand slice
        right_name: &'static str,
        /// Length of the right-hand slice
        right_len: usize,
    },

    /// The world-to-camera transform cannot be inverted
    #[error("World to camera transform is singular (determinant {det})")]
    SingularTransform {
        /// Determinant of the offending transform
        det: f64,
    },
}

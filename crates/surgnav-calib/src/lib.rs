#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Lens distortion models.
pub mod distortion;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use distortion::PolynomialDistortion;

/// Error types for camera calibration data.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Invalid camera intrinsics matrix
    #[error("Invalid camera intrinsics matrix: {0}")]
    InvalidIntrinsics(String),

    /// Invalid distortion coefficients
    #[error("Invalid distortion coefficients: {0}")]
    InvalidDistortion(String),
}

/// Result type for camera calibration operations.
pub type CameraResult<T> = Result<T, CameraError>;

/// Represents the intrinsic parameters of a pinhole camera
///
/// # Fields
///
/// * `fx` - The focal length in the x direction
/// * `fy` - The focal length in the y direction
/// * `cx` - The x coordinate of the principal point
/// * `cy` - The y coordinate of the principal point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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
    /// Create camera intrinsics from focal lengths and principal point.
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Create camera intrinsics from a 3x3 intrinsics matrix.
    ///
    /// The matrix must have the form `[[fx, 0, cx], [0, fy, cy], [0, 0, 1]]`
    /// with finite, positive focal lengths.
    pub fn from_matrix(k: &[[f64; 3]; 3]) -> CameraResult<Self> {
        if k[0][1] != 0.0 || k[1][0] != 0.0 || k[2][0] != 0.0 || k[2][1] != 0.0 || k[2][2] != 1.0 {
            return Err(CameraError::InvalidIntrinsics(
                "Intrinsics matrix must have form [[fx, 0, cx], [0, fy, cy], [0, 0, 1]]"
                    .to_string(),
            ));
        }

        let (fx, fy) = (k[0][0], k[1][1]);
        if !fx.is_finite() || !fy.is_finite() || fx <= 0.0 || fy <= 0.0 {
            return Err(CameraError::InvalidIntrinsics(format!(
                "Focal lengths must be finite and positive, got fx={fx}, fy={fy}"
            )));
        }

        let (cx, cy) = (k[0][2], k[1][2]);
        if !cx.is_finite() || !cy.is_finite() {
            return Err(CameraError::InvalidIntrinsics(format!(
                "Principal point must be finite, got cx={cx}, cy={cy}"
            )));
        }

        Ok(Self { fx, fy, cx, cy })
    }

    /// Convert to a 3x3 intrinsics matrix.
    pub fn to_matrix(&self) -> [[f64; 3]; 3] {
        [
            [self.fx, 0.0, self.cx],
            [0.0, self.fy, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }
}

/// Represents the extrinsic parameters of a pinhole camera
///
/// # Fields
///
/// * `rotation` - The rotation matrix of the camera 3x3
/// * `translation` - The translation vector of the camera 3x1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraExtrinsic {
    /// The rotation matrix of the camera 3x3
    pub rotation: [[f64; 3]; 3],
    /// The translation vector of the camera 3x1
    pub translation: [f64; 3],
}

/// Per-point projection strategy from camera space to pixel coordinates.
///
/// The projection core drives this trait so that distortion models can be
/// swapped, or the pipeline exercised with a deterministic stub in tests.
pub trait CameraProjection {
    /// Project a single point given in camera coordinates to pixels.
    fn project_camera_point(&self, point: &[f64; 3]) -> [f64; 2];
}

/// A pinhole camera with optional polynomial lens distortion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinholeCamera {
    /// Intrinsic parameters.
    pub intrinsic: CameraIntrinsic,
    /// Distortion parameters, `None` for an ideal pinhole.
    pub distortion: Option<PolynomialDistortion>,
}

impl PinholeCamera {
    /// Create a camera model with intrinsics and optional distortion.
    pub fn new(intrinsic: CameraIntrinsic, distortion: Option<PolynomialDistortion>) -> Self {
        Self {
            intrinsic,
            distortion,
        }
    }

    /// Create a camera model without distortion.
    pub fn pinhole(intrinsic: CameraIntrinsic) -> Self {
        Self {
            intrinsic,
            distortion: None,
        }
    }

    /// Check if the camera has distortion.
    pub fn has_distortion(&self) -> bool {
        self.distortion.as_ref().is_some_and(|d| d.has_distortion())
    }
}

impl CameraProjection for PinholeCamera {
    fn project_camera_point(&self, point: &[f64; 3]) -> [f64; 2] {
        let inv_z = 1.0 / point[2];
        let u = self.intrinsic.fx * point[0] * inv_z + self.intrinsic.cx;
        let v = self.intrinsic.fy * point[1] * inv_z + self.intrinsic.cy;

        match &self.distortion {
            Some(d) => {
                let (ud, vd) = distortion::distort_point_polynomial(u, v, &self.intrinsic, d);
                [ud, vd]
            }
            None => [u, v],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_intrinsic_from_matrix() {
        let k = [
            [1000.0, 0.0, 640.0],
            [0.0, 1000.0, 480.0],
            [0.0, 0.0, 1.0],
        ];
        let intrinsic = CameraIntrinsic::from_matrix(&k).unwrap();
        assert_eq!(intrinsic.fx, 1000.0);
        assert_eq!(intrinsic.fy, 1000.0);
        assert_eq!(intrinsic.cx, 640.0);
        assert_eq!(intrinsic.cy, 480.0);
    }

    #[test]
    fn test_intrinsic_matrix_roundtrip() {
        let intrinsic = CameraIntrinsic::new(1000.0, 950.0, 640.0, 480.0);
        let k = intrinsic.to_matrix();
        assert_eq!(CameraIntrinsic::from_matrix(&k).unwrap(), intrinsic);
    }

    #[test]
    fn test_intrinsic_from_matrix_rejects_skew() {
        let k = [
            [1000.0, 0.5, 640.0],
            [0.0, 1000.0, 480.0],
            [0.0, 0.0, 1.0],
        ];
        assert!(matches!(
            CameraIntrinsic::from_matrix(&k),
            Err(CameraError::InvalidIntrinsics(_))
        ));
    }

    #[test]
    fn test_intrinsic_from_matrix_rejects_negative_focal() {
        let k = [
            [-1000.0, 0.0, 640.0],
            [0.0, 1000.0, 480.0],
            [0.0, 0.0, 1.0],
        ];
        assert!(matches!(
            CameraIntrinsic::from_matrix(&k),
            Err(CameraError::InvalidIntrinsics(_))
        ));
    }

    #[test]
    fn test_intrinsic_from_matrix_rejects_bad_bottom_row() {
        let k = [
            [1000.0, 0.0, 640.0],
            [0.0, 1000.0, 480.0],
            [0.0, 0.0, 0.0],
        ];
        assert!(CameraIntrinsic::from_matrix(&k).is_err());
    }

    #[test]
    fn test_pinhole_projects_optical_axis_to_principal_point() {
        let camera = PinholeCamera::pinhole(CameraIntrinsic::new(1000.0, 1000.0, 960.0, 540.0));
        let pixel = camera.project_camera_point(&[0.0, 0.0, 100.0]);
        assert_relative_eq!(pixel[0], 960.0);
        assert_relative_eq!(pixel[1], 540.0);
    }

    #[test]
    fn test_pinhole_projects_off_axis_point() {
        let camera = PinholeCamera::pinhole(CameraIntrinsic::new(500.0, 500.0, 320.0, 240.0));
        let pixel = camera.project_camera_point(&[1.0, 2.0, 10.0]);
        assert_relative_eq!(pixel[0], 500.0 * 0.1 + 320.0, epsilon = 1e-12);
        assert_relative_eq!(pixel[1], 500.0 * 0.2 + 240.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_distortion_matches_pinhole() {
        let intrinsic = CameraIntrinsic::new(500.0, 500.0, 320.0, 240.0);
        let pinhole = PinholeCamera::pinhole(intrinsic.clone());
        let with_zero = PinholeCamera::new(
            intrinsic,
            Some(PolynomialDistortion::from_coefficients(&[0.0; 5]).unwrap()),
        );
        let point = [3.0, -2.0, 25.0];
        let a = pinhole.project_camera_point(&point);
        let b = with_zero.project_camera_point(&point);
        assert_relative_eq!(a[0], b[0], epsilon = 1e-12);
        assert_relative_eq!(a[1], b[1], epsilon = 1e-12);
    }

    #[test]
    fn test_camera_serde_roundtrip() {
        let camera = PinholeCamera::new(
            CameraIntrinsic::new(1000.0, 1000.0, 960.0, 540.0),
            Some(PolynomialDistortion::from_coefficients(&[0.1, 0.01, 0.001, -0.001]).unwrap()),
        );
        let json = serde_json::to_string(&camera).unwrap();
        let back: PinholeCamera = serde_json::from_str(&json).unwrap();
        assert_eq!(back, camera);
    }
}

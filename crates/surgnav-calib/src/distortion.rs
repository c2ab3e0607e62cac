use serde::{Deserialize, Serialize};

use crate::{CameraError, CameraIntrinsic, CameraResult};

/// Represents the polynomial distortion parameters of a camera
///
/// Radial coefficients `k1..k6` and tangential coefficients `p1`, `p2` of
/// the Brown-Conrady model, in the conventional `[k1, k2, p1, p2, k3, k4,
/// k5, k6]` coefficient-vector ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialDistortion {
    /// The first radial distortion coefficient
    pub k1: f64,
    /// The second radial distortion coefficient
    pub k2: f64,
    /// The third radial distortion coefficient
    pub k3: f64,
    /// The fourth radial distortion coefficient
    pub k4: f64,
    /// The fifth radial distortion coefficient
    pub k5: f64,
    /// The sixth radial distortion coefficient
    pub k6: f64,
    /// The first tangential distortion coefficient
    pub p1: f64,
    /// The second tangential distortion coefficient
    pub p2: f64,
}

impl PolynomialDistortion {
    /// Create distortion parameters with all coefficients set to zero (no distortion).
    pub fn none() -> Self {
        Self {
            k1: 0.0,
            k2: 0.0,
            k3: 0.0,
            k4: 0.0,
            k5: 0.0,
            k6: 0.0,
            p1: 0.0,
            p2: 0.0,
        }
    }

    /// Create distortion parameters with radial and tangential coefficients.
    pub fn radial_tangential(k1: f64, k2: f64, p1: f64, p2: f64) -> Self {
        Self {
            k1,
            k2,
            k3: 0.0,
            k4: 0.0,
            k5: 0.0,
            k6: 0.0,
            p1,
            p2,
        }
    }

    /// Create distortion parameters from a coefficient vector.
    ///
    /// Accepts the conventional `[k1, k2, p1, p2]`, `[k1, k2, p1, p2, k3]`
    /// or `[k1, k2, p1, p2, k3, k4, k5, k6]` layouts. Longer layouts carry
    /// thin-prism and tilt terms this model does not evaluate, so they are
    /// rejected rather than truncated.
    pub fn from_coefficients(coefficients: &[f64]) -> CameraResult<Self> {
        if !matches!(coefficients.len(), 4 | 5 | 8) {
            return Err(CameraError::InvalidDistortion(format!(
                "Coefficient vector must have 4, 5 or 8 elements, got {}",
                coefficients.len()
            )));
        }
        if let Some(c) = coefficients.iter().find(|c| !c.is_finite()) {
            return Err(CameraError::InvalidDistortion(format!(
                "Coefficients must be finite, got {c}"
            )));
        }

        let get = |i: usize| coefficients.get(i).copied().unwrap_or(0.0);
        Ok(Self {
            k1: get(0),
            k2: get(1),
            p1: get(2),
            p2: get(3),
            k3: get(4),
            k4: get(5),
            k5: get(6),
            k6: get(7),
        })
    }

    /// Check if there is any distortion.
    pub fn has_distortion(&self) -> bool {
        *self != Self::none()
    }
}

/// Distort a point using polynomial distortion
///
/// # Arguments
///
/// * `x` - The x coordinate of the point
/// * `y` - The y coordinate of the point
/// * `intrinsic` - The intrinsic parameters of the camera
/// * `distortion` - The distortion parameters of the camera
///
/// # Returns
///
/// * `x` - The x coordinate of the distorted point
/// * `y` - The y coordinate of the distorted point
pub fn distort_point_polynomial(
    x: f64,
    y: f64,
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
) -> (f64, f64) {
    // unpack the intrinsic and distortion parameters
    let (fx, fy, cx, cy) = (intrinsic.fx, intrinsic.fy, intrinsic.cx, intrinsic.cy);
    let (k1, k2, k3, k4, k5, k6, p1, p2) = (
        distortion.k1,
        distortion.k2,
        distortion.k3,
        distortion.k4,
        distortion.k5,
        distortion.k6,
        distortion.p1,
        distortion.p2,
    );

    // normalize the coordinates
    let x = (x - cx) / fx;
    let y = (y - cy) / fy;

    // calculate the radial distance
    let r2 = x * x + y * y;

    // radial distortion
    let kr = (1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2)
        / (1.0 + k4 * r2 + k5 * r2 * r2 + k6 * r2 * r2 * r2);

    // tangential distortion
    let xd = x * kr + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
    let yd = y * kr + p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;

    // denormalize the coordinates
    let xdst = fx * xd + cx;
    let ydst = fy * yd + cy;

    (xdst, ydst)
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Wrist posture classification.
//!
//! A wrist is considered neutral when it sits roughly between the elbow and the
//! middle of the hand. For each side the classifier measures
//!
//! ```text
//! ratio = |wrist - elbow| / |hand_midpoint - elbow|
//! ```
//!
//! in pixel space, where `hand_midpoint` is the average of the index and pinky
//! fingertips. The pose is ergonomic only when both ratios fall strictly inside
//! the [`ErgonomicBand`].

use serde::{Deserialize, Serialize};

use crate::error::{ErgonomicsError, Result};
use crate::landmark::{LandmarkSet, PoseLandmark};

/// Open interval of accepted wrist ratios.
///
/// The default bounds were tuned empirically, not derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErgonomicBand {
    /// Exclusive lower bound.
    pub lower: f64,
    /// Exclusive upper bound.
    pub upper: f64,
}

impl ErgonomicBand {
    /// Default band `(0.4, 0.805)`.
    pub const DEFAULT: Self = Self {
        lower: 0.4,
        upper: 0.805,
    };

    /// Create a band.
    ///
    /// # Errors
    ///
    /// Returns [`ErgonomicsError::ConfigError`] if either bound is not finite or
    /// `lower >= upper`.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(ErgonomicsError::ConfigError(format!(
                "ergonomic band bounds must be finite, got ({lower}, {upper})"
            )));
        }
        if lower >= upper {
            return Err(ErgonomicsError::ConfigError(format!(
                "ergonomic band lower bound {lower} must be below upper bound {upper}"
            )));
        }
        Ok(Self { lower, upper })
    }

    /// Whether `ratio` lies strictly inside the band. NaN is never inside.
    #[must_use]
    pub fn contains(&self, ratio: f64) -> bool {
        self.lower < ratio && ratio < self.upper
    }
}

impl Default for ErgonomicBand {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Body side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Elbow, wrist, index fingertip and pinky fingertip labels for this side.
    #[must_use]
    pub const fn arm(self) -> [PoseLandmark; 4] {
        match self {
            Self::Left => [
                PoseLandmark::LeftElbow,
                PoseLandmark::LeftWrist,
                PoseLandmark::LeftIndex,
                PoseLandmark::LeftPinky,
            ],
            Self::Right => [
                PoseLandmark::RightElbow,
                PoseLandmark::RightWrist,
                PoseLandmark::RightIndex,
                PoseLandmark::RightPinky,
            ],
        }
    }
}

/// Wrist ratios for both sides of one pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WristRatios {
    pub left: f64,
    pub right: f64,
}

impl WristRatios {
    /// Whether both ratios fall inside `band`.
    #[must_use]
    pub fn within(&self, band: &ErgonomicBand) -> bool {
        band.contains(self.left) && band.contains(self.right)
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (a.0 - b.0, a.1 - b.1);
    (dx * dx + dy * dy).sqrt()
}

fn scale(x: f32, y: f32, w: f64, h: f64) -> (f64, f64) {
    (f64::from(x) * w, f64::from(y) * h)
}

/// Compute the wrist ratio for one side.
///
/// Landmarks are widened to `f64` before scaling so that ratios a few ulps
/// below a band edge are not rounded onto it.
///
/// The result is NaN when elbow, wrist and hand midpoint coincide, and
/// infinite when only the elbow and hand midpoint coincide.
#[must_use]
pub fn wrist_ratio(landmarks: &LandmarkSet, side: Side, width: u32, height: u32) -> f64 {
    let [elbow, wrist, index, pinky] = side.arm().map(|label| landmarks[label]);
    let (w, h) = (f64::from(width), f64::from(height));

    let elbow = scale(elbow.x, elbow.y, w, h);
    let wrist = scale(wrist.x, wrist.y, w, h);
    let hand_midpoint = (
        (f64::from(index.x) + f64::from(pinky.x)) / 2.0 * w,
        (f64::from(index.y) + f64::from(pinky.y)) / 2.0 * h,
    );

    distance(wrist, elbow) / distance(hand_midpoint, elbow)
}

/// Compute wrist ratios for both sides.
#[must_use]
pub fn wrist_ratios(landmarks: &LandmarkSet, width: u32, height: u32) -> WristRatios {
    WristRatios {
        left: wrist_ratio(landmarks, Side::Left, width, height),
        right: wrist_ratio(landmarks, Side::Right, width, height),
    }
}

/// Decide whether both wrists are held in a neutral position.
///
/// # Arguments
///
/// * `landmarks` - Landmarks of one detected person.
/// * `width` - Source image width in pixels.
/// * `height` - Source image height in pixels.
/// * `band` - Accepted ratio interval.
#[must_use]
pub fn is_wrist_ergonomic(
    landmarks: &LandmarkSet,
    width: u32,
    height: u32,
    band: &ErgonomicBand,
) -> bool {
    let ratios = wrist_ratios(landmarks, width, height);
    tracing::debug!(left = ratios.left, right = ratios.right, "wrist ratios");
    ratios.within(band)
}

/// Verdict for an optional pose: `None` when no person was detected.
#[must_use]
pub fn assess(
    landmarks: Option<&LandmarkSet>,
    width: u32,
    height: u32,
    band: &ErgonomicBand,
) -> Option<bool> {
    landmarks.map(|set| is_wrist_ergonomic(set, width, height, band))
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Body landmark definitions.
//!
//! This module defines the 33-point whole-body pose topology produced by the
//! pose model, along with the [`Landmark`] and [`LandmarkSet`] value types that
//! flow from the model into the classifier and out over the wire.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use crate::error::{ErgonomicsError, Result};

/// Number of landmarks in a complete pose.
pub const NUM_LANDMARKS: usize = 33;

/// Anatomical landmark labels, in model output order.
///
/// The discriminant of each variant is its index in a [`LandmarkSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    /// All labels in index order.
    pub const ALL: [Self; NUM_LANDMARKS] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Index of this label within a [`LandmarkSet`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the label used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "NOSE",
            Self::LeftEyeInner => "LEFT_EYE_INNER",
            Self::LeftEye => "LEFT_EYE",
            Self::LeftEyeOuter => "LEFT_EYE_OUTER",
            Self::RightEyeInner => "RIGHT_EYE_INNER",
            Self::RightEye => "RIGHT_EYE",
            Self::RightEyeOuter => "RIGHT_EYE_OUTER",
            Self::LeftEar => "LEFT_EAR",
            Self::RightEar => "RIGHT_EAR",
            Self::MouthLeft => "MOUTH_LEFT",
            Self::MouthRight => "MOUTH_RIGHT",
            Self::LeftShoulder => "LEFT_SHOULDER",
            Self::RightShoulder => "RIGHT_SHOULDER",
            Self::LeftElbow => "LEFT_ELBOW",
            Self::RightElbow => "RIGHT_ELBOW",
            Self::LeftWrist => "LEFT_WRIST",
            Self::RightWrist => "RIGHT_WRIST",
            Self::LeftPinky => "LEFT_PINKY",
            Self::RightPinky => "RIGHT_PINKY",
            Self::LeftIndex => "LEFT_INDEX",
            Self::RightIndex => "RIGHT_INDEX",
            Self::LeftThumb => "LEFT_THUMB",
            Self::RightThumb => "RIGHT_THUMB",
            Self::LeftHip => "LEFT_HIP",
            Self::RightHip => "RIGHT_HIP",
            Self::LeftKnee => "LEFT_KNEE",
            Self::RightKnee => "RIGHT_KNEE",
            Self::LeftAnkle => "LEFT_ANKLE",
            Self::RightAnkle => "RIGHT_ANKLE",
            Self::LeftHeel => "LEFT_HEEL",
            Self::RightHeel => "RIGHT_HEEL",
            Self::LeftFootIndex => "LEFT_FOOT_INDEX",
            Self::RightFootIndex => "RIGHT_FOOT_INDEX",
        }
    }
}

impl fmt::Display for PoseLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PoseLandmark {
    type Err = LandmarkParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase().replace(['-', ' '], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == upper)
            .ok_or_else(|| LandmarkParseError(s.to_string()))
    }
}

/// Error returned when parsing an unknown landmark label.
#[derive(Debug, Clone)]
pub struct LandmarkParseError(String);

impl fmt::Display for LandmarkParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid landmark '{}'", self.0)
    }
}

impl std::error::Error for LandmarkParseError {}

/// A single body landmark.
///
/// `x` and `y` are normalized to `[0, 1]` by the image width and height.
/// `z` is relative depth on roughly the same scale as `x`; smaller values are
/// closer to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    /// Create a new landmark.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Position in pixel coordinates of an image with the given size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_pixels(&self, width: u32, height: u32) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }
}

/// The complete set of 33 landmarks for one detected person.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: [Landmark; NUM_LANDMARKS],
}

impl LandmarkSet {
    /// Create a landmark set from exactly 33 points in [`PoseLandmark::ALL`] order.
    #[must_use]
    pub const fn new(points: [Landmark; NUM_LANDMARKS]) -> Self {
        Self { points }
    }

    /// Build a landmark set from a slice.
    ///
    /// Points beyond the 33rd are ignored; pose models commonly append
    /// auxiliary alignment points after the body topology.
    ///
    /// # Errors
    ///
    /// Returns [`ErgonomicsError::LandmarkError`] if fewer than 33 points are supplied.
    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        let head = points.get(..NUM_LANDMARKS).ok_or_else(|| {
            ErgonomicsError::LandmarkError(format!(
                "expected {NUM_LANDMARKS} landmarks, got {}",
                points.len()
            ))
        })?;

        let mut out = [Landmark::default(); NUM_LANDMARKS];
        out.copy_from_slice(head);
        Ok(Self::new(out))
    }

    /// Get a landmark by label.
    #[must_use]
    pub const fn get(&self, label: PoseLandmark) -> &Landmark {
        &self.points[label.index()]
    }

    /// Iterate over `(label, landmark)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (PoseLandmark, &Landmark)> {
        PoseLandmark::ALL.iter().copied().zip(self.points.iter())
    }

    /// Raw points in index order.
    #[must_use]
    pub const fn as_slice(&self) -> &[Landmark] {
        &self.points
    }

    /// Number of landmarks (always 33).
    #[must_use]
    pub const fn len(&self) -> usize {
        NUM_LANDMARKS
    }

    /// Always `false`; a landmark set is never partial.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl Index<PoseLandmark> for LandmarkSet {
    type Output = Landmark;

    fn index(&self, label: PoseLandmark) -> &Self::Output {
        self.get(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_order() {
        for (i, label) in PoseLandmark::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
        }
        assert_eq!(PoseLandmark::LeftElbow.index(), 13);
        assert_eq!(PoseLandmark::RightWrist.index(), 16);
        assert_eq!(PoseLandmark::LeftPinky.index(), 17);
        assert_eq!(PoseLandmark::RightIndex.index(), 20);
        assert_eq!(PoseLandmark::RightFootIndex.index(), 32);
    }

    #[test]
    fn test_label_from_str() {
        assert_eq!(
            "LEFT_WRIST".parse::<PoseLandmark>().unwrap(),
            PoseLandmark::LeftWrist
        );
        assert_eq!(
            "right elbow".parse::<PoseLandmark>().unwrap(),
            PoseLandmark::RightElbow
        );
        assert_eq!(
            "left-foot-index".parse::<PoseLandmark>().unwrap(),
            PoseLandmark::LeftFootIndex
        );
        assert!("tail".parse::<PoseLandmark>().is_err());
    }

    #[test]
    fn test_label_display_round_trip() {
        for label in PoseLandmark::ALL {
            assert_eq!(label.to_string().parse::<PoseLandmark>().unwrap(), label);
        }
    }

    #[test]
    fn test_from_slice_too_short() {
        let points = vec![Landmark::default(); 12];
        let err = LandmarkSet::from_slice(&points).unwrap_err();
        assert!(matches!(err, ErgonomicsError::LandmarkError(_)));
    }

    #[test]
    fn test_from_slice_ignores_extra_points() {
        let points: Vec<Landmark> = (0..39)
            .map(|i| Landmark::new(i as f32, 0.0, 0.0))
            .collect();
        let set = LandmarkSet::from_slice(&points).unwrap();
        assert_eq!(set.len(), NUM_LANDMARKS);
        assert!((set[PoseLandmark::RightFootIndex].x - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_to_pixels() {
        let lm = Landmark::new(0.25, 0.5, -0.1);
        let (x, y) = lm.to_pixels(640, 480);
        assert!((x - 160.0).abs() < 1e-4);
        assert!((y - 240.0).abs() < 1e-4);
    }
}

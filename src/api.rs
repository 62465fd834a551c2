// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Wire types shared by the HTTP service and the client.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ergonomics::{ErgonomicBand, assess};
use crate::landmark::{LandmarkSet, PoseLandmark};
use crate::provider::ProviderInfo;

/// One landmark as sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LandmarkData {
    /// Landmark label (e.g. `LEFT_WRIST`)
    pub name: String,
    /// X coordinate, normalized by image width
    pub x: f32,
    /// Y coordinate, normalized by image height
    pub y: f32,
    /// Relative depth
    pub z: f32,
}

impl LandmarkData {
    /// Parse the label, if it is a known landmark.
    #[must_use]
    pub fn label(&self) -> Option<PoseLandmark> {
        self.name.parse().ok()
    }
}

/// Response of `POST /check_ergonomics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErgonomicsResponse {
    /// `true` if both wrists are neutral, `false` if not, `null` if no person was detected
    pub is_ergonomic: Option<bool>,
    /// 33 body landmarks in fixed order, empty if no person was detected
    #[serde(default)]
    pub landmarks: Vec<LandmarkData>,
}

impl ErgonomicsResponse {
    /// Build a response from an optional pose.
    #[must_use]
    pub fn from_pose(
        landmarks: Option<&LandmarkSet>,
        width: u32,
        height: u32,
        band: &ErgonomicBand,
    ) -> Self {
        let is_ergonomic = assess(landmarks, width, height, band);
        let landmarks = landmarks
            .map(|set| {
                set.iter()
                    .map(|(label, lm)| LandmarkData {
                        name: label.as_str().to_string(),
                        x: lm.x,
                        y: lm.y,
                        z: lm.z,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            is_ergonomic,
            landmarks,
        }
    }

    /// Human-readable status line for overlays.
    #[must_use]
    pub const fn status_text(&self) -> &'static str {
        match self.is_ergonomic {
            Some(true) => "Ergonomic",
            Some(false) => "Not Ergonomic",
            None => "No Pose Detected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Server status
    pub status: String,
    /// API version
    pub version: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InfoResponse {
    /// Pose provider description
    pub provider: ProviderInfo,
    /// Accepted wrist ratio interval (exclusive)
    pub band: ErgonomicBand,
    /// Landmark labels in response order
    pub landmark_names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Landmark, NUM_LANDMARKS};

    #[test]
    fn test_no_pose_serializes_null_and_empty() {
        let response = ErgonomicsResponse::from_pose(None, 640, 480, &ErgonomicBand::DEFAULT);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "is_ergonomic": null, "landmarks": [] })
        );
        assert_eq!(response.status_text(), "No Pose Detected");
    }

    #[test]
    fn test_pose_serializes_named_landmarks_in_order() {
        let set = LandmarkSet::new([Landmark::new(0.5, 0.25, -0.1); NUM_LANDMARKS]);
        let response =
            ErgonomicsResponse::from_pose(Some(&set), 640, 480, &ErgonomicBand::DEFAULT);

        // All points coincide, so the ratio is NaN and the verdict is false.
        assert_eq!(response.is_ergonomic, Some(false));
        assert_eq!(response.landmarks.len(), NUM_LANDMARKS);
        assert_eq!(response.landmarks[0].name, "NOSE");
        assert_eq!(response.landmarks[15].name, "LEFT_WRIST");
        assert_eq!(response.landmarks[32].name, "RIGHT_FOOT_INDEX");
        assert_eq!(response.landmarks[15].label(), Some(PoseLandmark::LeftWrist));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["landmarks"][0]["x"], serde_json::json!(0.5));
    }

    #[test]
    fn test_response_deserializes_without_landmarks() {
        let response: ErgonomicsResponse =
            serde_json::from_str(r#"{"is_ergonomic": true}"#).unwrap();
        assert_eq!(response.is_ergonomic, Some(true));
        assert!(response.landmarks.is_empty());
        assert_eq!(response.status_text(), "Ergonomic");
    }
}

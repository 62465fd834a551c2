// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose provider abstraction.
//!
//! The HTTP handler only needs "image in, optional landmark set out". Anything
//! that satisfies [`PoseProvider`] can back the service: the ONNX
//! [`PoseModel`](crate::PoseModel), or a canned provider in tests.

use image::DynamicImage;
use serde::Serialize;

use crate::error::Result;
use crate::landmark::LandmarkSet;

/// Static description of a provider, reported by `GET /info`.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ProviderInfo {
    /// Human-readable provider name (e.g. model file name).
    pub name: String,
    /// Model input size (height, width).
    pub imgsz: (usize, usize),
    /// Minimum pose presence score.
    pub min_detection_confidence: f32,
}

/// Estimates body landmarks from a decoded image.
pub trait PoseProvider: Send {
    /// Run pose estimation on one image.
    ///
    /// Returns `Ok(None)` when no person is detected.
    ///
    /// # Errors
    ///
    /// Returns an error if the image can't be processed or the model fails.
    fn estimate(&mut self, image: &DynamicImage) -> Result<Option<LandmarkSet>>;

    /// Describe this provider.
    fn info(&self) -> ProviderInfo;
}

impl<P: PoseProvider + ?Sized> PoseProvider for Box<P> {
    fn estimate(&mut self, image: &DynamicImage) -> Result<Option<LandmarkSet>> {
        (**self).estimate(image)
    }

    fn info(&self) -> ProviderInfo {
        (**self).info()
    }
}

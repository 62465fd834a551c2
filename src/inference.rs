// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Inference configuration.
//!
//! This module defines the [`InferenceConfig`] struct, which controls how the pose
//! model is loaded and when a detected pose is accepted.

use crate::device::Device;

/// Configuration for pose inference.
///
/// This struct uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use wrist_ergonomics::InferenceConfig;
///
/// let config = InferenceConfig::new()
///     .with_confidence(0.5)
///     .with_imgsz(256, 256)
///     .with_threads(4);
/// ```
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Minimum pose presence score (0.0 to 1.0) for a person to count as detected.
    pub min_detection_confidence: f32,
    /// Explicit model input size (height, width).
    /// If `None`, the size is read from the model's input shape.
    pub imgsz: Option<(usize, usize)>,
    /// Number of intra-op threads for ONNX Runtime.
    /// Setting this to `0` allows ONNX Runtime to choose the optimal number.
    pub num_threads: usize,
    /// Execution device. `None` means CPU.
    pub device: Option<Device>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            min_detection_confidence: 0.5,
            imgsz: None,
            num_threads: 0, // 0 = let ONNX Runtime decide
            device: None,
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum detection confidence.
    ///
    /// Frames whose pose presence score is below this value yield no landmarks.
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.min_detection_confidence = threshold;
        self
    }

    /// Set the model input size.
    ///
    /// # Arguments
    ///
    /// * `height` - The target image height.
    /// * `width` - The target image width.
    #[must_use]
    pub const fn with_imgsz(mut self, height: usize, width: usize) -> Self {
        self.imgsz = Some((height, width));
        self
    }

    /// Set the number of threads for inference. `0` means auto.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Set the execution device.
    #[must_use]
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }
}

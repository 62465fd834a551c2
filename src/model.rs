// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose model loading and inference.
//!
//! This module provides [`PoseModel`], an ONNX Runtime session wrapping a
//! 33-point body landmark model. Input is a letterboxed RGB image; output 0
//! holds the landmarks (x, y, z in model-input pixels, extra columns ignored)
//! and output 1, when present, holds a pose presence score.

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;

use crate::device::Device;
use crate::error::{ErgonomicsError, Result};
use crate::inference::InferenceConfig;
use crate::landmark::{Landmark, LandmarkSet, NUM_LANDMARKS};
use crate::preprocessing::{Letterbox, TensorLayout, preprocess_image};
use crate::provider::{PoseProvider, ProviderInfo};

/// Input size used when the model declares dynamic spatial dimensions.
pub const DEFAULT_IMGSZ: (usize, usize) = (256, 256);

/// Default pose model file name.
pub const DEFAULT_MODEL: &str = "pose_landmark_full.onnx";

/// Body landmark model for inference.
///
/// # Example
///
/// ```no_run
/// use wrist_ergonomics::{PoseModel, PoseProvider};
///
/// let mut model = PoseModel::load("pose_landmark_full.onnx")?;
/// let img = image::open("frame.jpg")?;
/// if let Some(landmarks) = model.estimate(&img)? {
///     println!("{} landmarks", landmarks.len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PoseModel {
    /// ONNX Runtime session.
    session: Session,
    /// Input tensor name.
    input_name: String,
    /// Landmark output tensor name.
    landmark_output: String,
    /// Presence score output tensor name, if the model has one.
    presence_output: Option<String>,
    /// Input tensor layout.
    layout: TensorLayout,
    /// Model input size (height, width).
    imgsz: (usize, usize),
    /// Inference configuration.
    config: InferenceConfig,
    /// Path the model was loaded from.
    model_path: String,
    /// Whether model has been warmed up.
    warmed_up: bool,
}

impl PoseModel {
    /// Load a pose model from an ONNX file with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_config(path, InferenceConfig::default())
    }

    /// Load a pose model with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist, can't be loaded, or
    /// doesn't look like an image-to-landmarks model.
    pub fn load_with_config<P: AsRef<Path>>(path: P, config: InferenceConfig) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ErgonomicsError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        #[allow(unused_mut)]
        let mut builder = Session::builder().map_err(|e| {
            ErgonomicsError::ModelLoadError(format!("Failed to create session builder: {e}"))
        })?;

        match config.device.as_ref().unwrap_or(&Device::Cpu) {
            Device::Cpu => {}
            #[cfg(feature = "cuda")]
            Device::Cuda(index) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let ep = ort::execution_providers::CUDAExecutionProvider::default()
                    .with_device_id(*index as i32)
                    .build();
                builder = builder.with_execution_providers([ep]).map_err(|e| {
                    ErgonomicsError::ModelLoadError(format!("Failed to register CUDA EP: {e}"))
                })?;
            }
            #[cfg(feature = "coreml")]
            Device::CoreMl => {
                let ep = ort::execution_providers::CoreMLExecutionProvider::default()
                    .with_subgraphs(true)
                    .build();
                builder = builder.with_execution_providers([ep]).map_err(|e| {
                    ErgonomicsError::ModelLoadError(format!("Failed to register CoreML EP: {e}"))
                })?;
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(ErgonomicsError::FeatureNotEnabled(format!(
                    "device '{other}' requires building with its cargo feature"
                )));
            }
        }

        let session = builder
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| {
                ErgonomicsError::ModelLoadError(format!("Failed to set optimization level: {e}"))
            })?
            .with_intra_threads(config.num_threads)
            .map_err(|e| {
                ErgonomicsError::ModelLoadError(format!("Failed to set intra-thread count: {e}"))
            })?
            .commit_from_file(path)
            .map_err(|e| ErgonomicsError::ModelLoadError(format!("Failed to load model: {e}")))?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| ErgonomicsError::ModelLoadError("Model has no inputs".to_string()))?;
        let input_name = input.name.clone();
        let input_shape: Vec<i64> = input
            .input_type
            .tensor_shape()
            .map(|shape| shape.iter().copied().collect())
            .unwrap_or_default();

        let (layout, declared_size) = TensorLayout::from_shape(&input_shape).ok_or_else(|| {
            ErgonomicsError::ModelLoadError(format!(
                "Expected a 4-D image input, got shape {input_shape:?}"
            ))
        })?;
        let imgsz = config.imgsz.or(declared_size).unwrap_or(DEFAULT_IMGSZ);

        let mut output_names = session.outputs.iter().map(|o| o.name.clone());
        let landmark_output = output_names
            .next()
            .ok_or_else(|| ErgonomicsError::ModelLoadError("Model has no outputs".to_string()))?;
        let presence_output = output_names.next();

        tracing::debug!(
            ?layout,
            ?imgsz,
            %landmark_output,
            ?presence_output,
            "pose model loaded"
        );

        Ok(Self {
            session,
            input_name,
            landmark_output,
            presence_output,
            layout,
            imgsz,
            config,
            model_path: path.display().to_string(),
            warmed_up: false,
        })
    }

    /// Warm up the model by running inference with a dummy input.
    ///
    /// Warmup is automatically called on first estimate.
    ///
    /// # Errors
    ///
    /// Returns an error if the dummy inference fails.
    pub fn warmup(&mut self) -> Result<()> {
        if self.warmed_up {
            return Ok(());
        }

        let (h, w) = self.imgsz;
        let dummy_input = match self.layout {
            TensorLayout::Nchw => Array4::<f32>::zeros((1, 3, h, w)),
            TensorLayout::Nhwc => Array4::<f32>::zeros((1, h, w, 3)),
        };
        let _ = self.run_inference(&dummy_input)?;

        self.warmed_up = true;
        Ok(())
    }

    /// Run the ONNX session, returning landmark data, its shape, and the raw presence score.
    fn run_inference(&mut self, input: &Array4<f32>) -> Result<(Vec<f32>, Vec<usize>, Option<f32>)> {
        let input_contiguous = input.as_standard_layout();

        let input_tensor = TensorRef::from_array_view(&input_contiguous).map_err(|e| {
            ErgonomicsError::InferenceError(format!("Failed to create input tensor: {e}"))
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| ErgonomicsError::InferenceError(format!("Inference failed: {e}")))?;

        let output = outputs.get(self.landmark_output.as_str()).ok_or_else(|| {
            ErgonomicsError::InferenceError(format!(
                "Output '{}' not found",
                self.landmark_output
            ))
        })?;

        let (shape, data) = output.try_extract_tensor::<f32>().map_err(|e| {
            ErgonomicsError::InferenceError(format!("Failed to extract output: {e}"))
        })?;

        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let shape_vec: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        let data_vec: Vec<f32> = data.to_vec();

        let presence = self
            .presence_output
            .as_deref()
            .and_then(|name| outputs.get(name))
            .and_then(|value| value.try_extract_tensor::<f32>().ok())
            .and_then(|(_, data)| data.first().copied());

        Ok((data_vec, shape_vec, presence))
    }

    /// Path the model was loaded from.
    #[must_use]
    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    /// Model input size (height, width).
    #[must_use]
    pub const fn imgsz(&self) -> (usize, usize) {
        self.imgsz
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }
}

impl PoseProvider for PoseModel {
    fn estimate(&mut self, image: &DynamicImage) -> Result<Option<LandmarkSet>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ErgonomicsError::ImageError("Image has zero size".to_string()));
        }

        if !self.warmed_up {
            self.warmup()?;
        }

        let start = Instant::now();
        let preprocess_result = preprocess_image(image, self.imgsz, self.layout);
        let preprocess_ms = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        let (data, shape, presence) = self.run_inference(&preprocess_result.tensor)?;
        let inference_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::debug!(
            preprocess_ms,
            inference_ms,
            presence = ?presence.map(presence_probability),
            "pose inference"
        );

        if let Some(raw) = presence
            && presence_probability(raw) < self.config.min_detection_confidence
        {
            return Ok(None);
        }

        decode_landmarks(&data, &shape, &preprocess_result.letterbox).map(Some)
    }

    fn info(&self) -> ProviderInfo {
        let name = Path::new(&self.model_path)
            .file_name()
            .map_or_else(|| self.model_path.clone(), |n| n.to_string_lossy().to_string());
        ProviderInfo {
            name,
            imgsz: self.imgsz,
            min_detection_confidence: self.config.min_detection_confidence,
        }
    }
}

impl std::fmt::Debug for PoseModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseModel")
            .field("model_path", &self.model_path)
            .field("layout", &self.layout)
            .field("imgsz", &self.imgsz)
            .field("has_presence", &self.presence_output.is_some())
            .finish()
    }
}

/// Convert a presence output to a probability.
///
/// Some exports emit a logit, others an already-activated score.
fn presence_probability(raw: f32) -> f32 {
    if (0.0..=1.0).contains(&raw) {
        raw
    } else {
        1.0 / (1.0 + (-raw).exp())
    }
}

/// Number of values per landmark in a landmark output tensor.
fn values_per_landmark(shape: &[usize], len: usize) -> Option<usize> {
    if shape.len() >= 3 {
        return shape.last().copied().filter(|&k| k >= 3);
    }
    // Flattened (1, N*K): prefer the richest layout that still yields a full pose.
    [5, 4, 3]
        .into_iter()
        .find(|&k| len % k == 0 && len / k >= NUM_LANDMARKS)
}

/// Decode a raw landmark tensor into a [`LandmarkSet`] in normalized
/// original-image coordinates.
///
/// # Errors
///
/// Returns an error if the tensor holds fewer than 33 landmarks.
pub fn decode_landmarks(data: &[f32], shape: &[usize], letterbox: &Letterbox) -> Result<LandmarkSet> {
    let k = values_per_landmark(shape, data.len()).ok_or_else(|| {
        ErgonomicsError::InferenceError(format!(
            "Unexpected landmark output shape {shape:?} ({} values)",
            data.len()
        ))
    })?;
    if data.len() / k < NUM_LANDMARKS {
        return Err(ErgonomicsError::InferenceError(format!(
            "Model produced {} landmarks, expected at least {NUM_LANDMARKS}",
            data.len() / k
        )));
    }

    let points: Vec<Landmark> = data
        .chunks_exact(k)
        .take(NUM_LANDMARKS)
        .map(|v| {
            let (x, y) = letterbox.to_normalized(v[0], v[1]);
            Landmark::new(x, y, letterbox.depth_to_normalized(v[2]))
        })
        .collect();

    LandmarkSet::from_slice(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::PoseLandmark;

    #[test]
    fn test_model_not_found() {
        let result = PoseModel::load("nonexistent.onnx");
        assert!(matches!(
            result.unwrap_err(),
            ErgonomicsError::ModelLoadError(_)
        ));
    }

    #[test]
    fn test_presence_probability() {
        assert!((presence_probability(0.8) - 0.8).abs() < 1e-6);
        assert!((presence_probability(0.0)).abs() < 1e-6);
        assert!(presence_probability(5.0) > 0.99);
        assert!(presence_probability(-5.0) < 0.01);
    }

    #[test]
    fn test_values_per_landmark() {
        assert_eq!(values_per_landmark(&[1, 195], 195), Some(5));
        assert_eq!(values_per_landmark(&[1, 132], 132), Some(4));
        assert_eq!(values_per_landmark(&[1, 99], 99), Some(3));
        assert_eq!(values_per_landmark(&[1, 33, 3], 99), Some(3));
        assert_eq!(values_per_landmark(&[1, 33, 2], 66), None);
        assert_eq!(values_per_landmark(&[1, 10], 10), None);
    }

    #[test]
    fn test_decode_landmarks_flat() {
        let letterbox = Letterbox {
            orig_shape: (256, 256),
            scale: (1.0, 1.0),
            padding: (0.0, 0.0),
        };
        // 39 points x 5 values, point i at (i, 2i, -i)
        let data: Vec<f32> = (0..39)
            .flat_map(|i| {
                let i = i as f32;
                [i, 2.0 * i, -i, 0.9, 0.9]
            })
            .collect();

        let set = decode_landmarks(&data, &[1, 195], &letterbox).unwrap();
        let wrist = set[PoseLandmark::LeftWrist];
        assert!((wrist.x - 15.0 / 256.0).abs() < 1e-6);
        assert!((wrist.y - 30.0 / 256.0).abs() < 1e-6);
        assert!((wrist.z + 15.0 / 256.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_landmarks_too_few() {
        let letterbox = Letterbox {
            orig_shape: (10, 10),
            scale: (1.0, 1.0),
            padding: (0.0, 0.0),
        };
        let data = vec![0.0; 17 * 3];
        assert!(matches!(
            decode_landmarks(&data, &[1, 17, 3], &letterbox),
            Err(ErgonomicsError::InferenceError(_))
        ));
    }
}

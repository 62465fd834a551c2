// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Server configuration.
//!
//! Settings come from three layers, lowest precedence first: built-in defaults,
//! an optional TOML file, and command-line flags / environment variables.
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 5000
//! model = "models/pose_landmark_full.onnx"
//! min_detection_confidence = 0.5
//!
//! [band]
//! lower = 0.4
//! upper = 0.805
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::ergonomics::ErgonomicBand;
use crate::error::{ErgonomicsError, Result};
use crate::inference::InferenceConfig;
use crate::model::DEFAULT_MODEL;

/// Default request body limit (16 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Configuration for the ergonomics HTTP service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Path to the ONNX pose model.
    pub model: String,
    /// Minimum pose presence score.
    pub min_detection_confidence: f32,
    /// Accepted wrist ratio interval.
    pub band: ErgonomicBand,
    /// Execution device (`cpu`, `cuda:0`, `coreml`).
    pub device: Option<String>,
    /// ONNX Runtime intra-op threads, `0` for auto.
    pub threads: usize,
    /// Square model input size override.
    pub imgsz: Option<usize>,
    /// Maximum upload size in bytes.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model: DEFAULT_MODEL.to_string(),
            min_detection_confidence: 0.5,
            band: ErgonomicBand::DEFAULT,
            device: None,
            threads: 0,
            imgsz: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file. Missing keys take default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read, isn't valid TOML, or holds
    /// invalid values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ErgonomicsError::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string isn't valid TOML or holds invalid values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ErgonomicsError::ConfigError`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        ErgonomicBand::new(self.band.lower, self.band.upper)?;
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err(ErgonomicsError::ConfigError(format!(
                "min_detection_confidence must be within [0, 1], got {}",
                self.min_detection_confidence
            )));
        }
        if self.body_limit == 0 {
            return Err(ErgonomicsError::ConfigError(
                "body_limit must be positive".to_string(),
            ));
        }
        if self.imgsz == Some(0) {
            return Err(ErgonomicsError::ConfigError(
                "imgsz must be positive".to_string(),
            ));
        }
        self.parsed_device()?;
        Ok(())
    }

    /// Socket address string to bind.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn parsed_device(&self) -> Result<Option<Device>> {
        self.device
            .as_deref()
            .map(str::parse::<Device>)
            .transpose()
            .map_err(ErgonomicsError::ConfigError)
    }

    /// Build the pose model configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the device string is invalid.
    pub fn inference_config(&self) -> Result<InferenceConfig> {
        let mut config = InferenceConfig::new()
            .with_confidence(self.min_detection_confidence)
            .with_threads(self.threads);
        if let Some(sz) = self.imgsz {
            config = config.with_imgsz(sz, sz);
        }
        if let Some(device) = self.parsed_device()? {
            config = config.with_device(device);
        }
        Ok(config)
    }
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the ergonomics library.

use std::fmt;

/// Result type alias for ergonomics operations.
pub type Result<T> = std::result::Result<T, ErgonomicsError>;

/// Main error type for the ergonomics library.
#[derive(Debug)]
pub enum ErgonomicsError {
    /// Error loading the ONNX pose model.
    ModelLoadError(String),
    /// Error during model inference.
    InferenceError(String),
    /// Error decoding, encoding, or processing images.
    ImageError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Landmark set is malformed (e.g. fewer than 33 points).
    LandmarkError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// HTTP request to the ergonomics endpoint failed.
    RequestError(String),
    /// Visualizer error.
    VisualizerError(String),
    /// Video/stream processing error.
    VideoError(String),
    /// Feature not enabled.
    FeatureNotEnabled(String),
}

impl ErgonomicsError {
    /// Whether the error was caused by the caller's input rather than by the service.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::ImageError(_))
    }
}

impl fmt::Display for ErgonomicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::LandmarkError(msg) => write!(f, "Landmark error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::RequestError(msg) => write!(f, "Request error: {msg}"),
            Self::VisualizerError(msg) => write!(f, "Visualizer error: {msg}"),
            Self::VideoError(msg) => write!(f, "Video error: {msg}"),
            Self::FeatureNotEnabled(msg) => write!(f, "Feature not enabled: {msg}"),
        }
    }
}

impl std::error::Error for ErgonomicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ErgonomicsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for ErgonomicsError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

impl From<reqwest::Error> for ErgonomicsError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestError(err.to_string())
    }
}

impl From<toml::de::Error> for ErgonomicsError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ErgonomicsError::ModelLoadError("test".to_string());
        assert_eq!(err.to_string(), "Model load error: test");

        let err = ErgonomicsError::LandmarkError("expected 33 landmarks, got 12".to_string());
        assert_eq!(
            err.to_string(),
            "Landmark error: expected 33 landmarks, got 12"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ErgonomicsError::ImageError("bad".to_string()).is_client_error());
        assert!(!ErgonomicsError::InferenceError("boom".to_string()).is_client_error());
        assert!(!ErgonomicsError::ModelLoadError("missing".to_string()).is_client_error());
        assert!(!ErgonomicsError::LandmarkError("expected 33 landmarks, got 12".to_string()).is_client_error());
    }

    #[test]
    fn test_io_source() {
        use std::error::Error;
        let err = ErgonomicsError::from(std::io::Error::other("disk"));
        assert!(err.source().is_some());
    }
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Visualization tools for ergonomics results.

/// Color definitions and palettes.
pub mod color;

/// Body skeleton topology.
pub mod skeleton;

#[cfg(feature = "visualize")]
pub mod viewer;

pub use color::Color;
pub use skeleton::{BodyPart, POSE_CONNECTIONS};

#[cfg(feature = "visualize")]
pub use viewer::Viewer;

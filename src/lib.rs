// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Wrist Ergonomics
//!
//! HTTP service that checks wrist posture in a single image. A body-pose model
//! produces 33 normalized landmarks; a geometric rule on the elbow, wrist and
//! hand decides whether both wrists are held in a neutral position.
//!
//! ## The rule
//!
//! For each arm, with every point scaled to pixels:
//!
//! ```text
//! hand_midpoint = (INDEX + PINKY) / 2
//! ratio         = |WRIST - ELBOW| / |hand_midpoint - ELBOW|
//! ```
//!
//! The pose is ergonomic iff both ratios fall strictly inside the
//! [`ErgonomicBand`] (default `(0.4, 0.805)`).
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use wrist_ergonomics::{ErgonomicBand, PoseModel, PoseProvider, is_wrist_ergonomic};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut model = PoseModel::load("pose_landmark_full.onnx")?;
//!     let image = image::open("desk.jpg")?;
//!
//!     match model.estimate(&image)? {
//!         Some(landmarks) => {
//!             let ok = is_wrist_ergonomic(
//!                 &landmarks,
//!                 image.width(),
//!                 image.height(),
//!                 &ErgonomicBand::DEFAULT,
//!             );
//!             println!("ergonomic: {ok}");
//!         }
//!         None => println!("no person detected"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Serve on 0.0.0.0:5000
//! wrist-ergonomics serve --model pose_landmark_full.onnx
//!
//! # Stream the default webcam to the server and show the overlay
//! wrist-ergonomics client --source 0 --show
//!
//! # Check a folder of stills and save annotated copies
//! wrist-ergonomics client --source shots/ --save
//! ```
//!
//! ## HTTP API
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /check_ergonomics` | Multipart field `image`; returns `{"is_ergonomic", "landmarks"}` |
//! | `GET /` | Landing page |
//! | `GET /health` | Liveness and version |
//! | `GET /info` | Provider description and band |
//! | `GET /api-docs/openapi.json` | OpenAPI document |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `visualize` | Client preview window (default) |
//! | `video` | Webcam and video file sources for the client (default) |
//! | `cuda` | NVIDIA CUDA acceleration |
//! | `coreml` | Apple `CoreML` (macOS/iOS) |

// Modules
pub mod annotate;
pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod device;
pub mod ergonomics;
pub mod error;
pub mod inference;
pub mod io;
pub mod landmark;
pub mod model;
pub mod preprocessing;
pub mod provider;
pub mod server;
pub mod source;
pub mod visualizer;

// Re-export main types for convenience
pub use api::{ErgonomicsResponse, LandmarkData};
pub use client::ErgonomicsClient;
pub use config::ServerConfig;
pub use device::Device;
pub use ergonomics::{ErgonomicBand, Side, WristRatios, assess, is_wrist_ergonomic, wrist_ratios};
pub use error::{ErgonomicsError, Result};
pub use inference::InferenceConfig;
pub use landmark::{Landmark, LandmarkSet, NUM_LANDMARKS, PoseLandmark};
pub use model::PoseModel;
pub use provider::{PoseProvider, ProviderInfo};
pub use server::{AppState, router};
pub use source::{Source, SourceIterator};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "wrist-ergonomics");
    }
}

// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Command-line interface.
//!
//! `serve` runs the HTTP service around a local pose model; `client` streams
//! frames to a running service and overlays the answers.

/// CLI arguments.
pub mod args;

/// Client runner.
pub mod client;

/// Console output and tracing setup.
pub mod logging;

/// Server runner.
pub mod serve;

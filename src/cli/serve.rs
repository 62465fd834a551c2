// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use crate::cli::args::ServeArgs;
use crate::config::ServerConfig;
use crate::model::PoseModel;
use crate::provider::PoseProvider;
use crate::{VERSION, error, info, section, verbose};

/// Load the pose model and run the HTTP server until interrupted.
pub fn run_serve(args: &ServeArgs) {
    let config = match args.resolve() {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let model = match load_model(&config) {
        Ok(m) => m,
        Err(e) => {
            error!("Error loading model: {e}");
            process::exit(1);
        }
    };

    let provider = model.info();
    info!("Wrist Ergonomics {VERSION} 🚀 serving {}", provider.name);
    section!("Configuration");
    verbose!("  model:      {}", config.model);
    verbose!("  imgsz:      ({}, {})", provider.imgsz.0, provider.imgsz.1);
    verbose!("  confidence: {}", provider.min_detection_confidence);
    verbose!("  band:       ({}, {})", config.band.lower, config.band.upper);
    verbose!(
        "  device:     {}",
        config.device.as_deref().unwrap_or("cpu")
    );
    info!("Listening on http://{}", config.addr());
    info!("POST images to http://{}/check_ergonomics", config.addr());

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start async runtime: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(crate::server::serve(&config, Box::new(model))) {
        error!("Server error: {e}");
        process::exit(1);
    }
}

fn load_model(config: &ServerConfig) -> crate::Result<PoseModel> {
    let inference = config.inference_config()?;
    let mut model = PoseModel::load_with_config(&config.model, inference)?;
    // Pay the first-run cost before accepting requests.
    model.warmup()?;
    Ok(model)
}

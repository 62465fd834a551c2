// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::client::DEFAULT_URL;
use crate::config::ServerConfig;
use crate::ergonomics::ErgonomicBand;
use crate::error::Result;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Examples:
    wrist-ergonomics serve --model pose_landmark_full.onnx
    wrist-ergonomics serve -m pose.onnx --port 8080 --band-lower 0.35 --band-upper 0.85
    wrist-ergonomics serve --config ergonomics.toml --device cuda:0
    wrist-ergonomics client --source 0 --show
    wrist-ergonomics client --url http://desk-server:5000/check_ergonomics -s shots/ --save"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ergonomics HTTP server
    Serve(ServeArgs),
    /// Send frames to a running server and overlay the verdict
    Client(ClientArgs),
}

/// Arguments for the serve command.
///
/// Flags override values read from `--config`, which override defaults.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to ONNX pose landmark model
    #[arg(short, long, env = "MODEL_PATH")]
    pub model: Option<String>,

    /// Interface to bind [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind [default: 5000]
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Minimum pose detection confidence [default: 0.5]
    #[arg(long)]
    pub conf: Option<f32>,

    /// Lower bound of the ergonomic wrist ratio band (exclusive) [default: 0.4]
    #[arg(long)]
    pub band_lower: Option<f64>,

    /// Upper bound of the ergonomic wrist ratio band (exclusive) [default: 0.805]
    #[arg(long)]
    pub band_upper: Option<f64>,

    /// Device to use (cpu, cuda:0, coreml)
    #[arg(long)]
    pub device: Option<String>,

    /// ONNX Runtime intra-op threads (0 = auto)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Square model input size override
    #[arg(long)]
    pub imgsz: Option<usize>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show debug output
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Merge the config file (if any) with command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file can't be loaded or the merged
    /// values are invalid.
    pub fn resolve(&self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };

        if let Some(model) = &self.model {
            config.model.clone_from(model);
        }
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(conf) = self.conf {
            config.min_detection_confidence = conf;
        }
        if self.band_lower.is_some() || self.band_upper.is_some() {
            config.band = ErgonomicBand::new(
                self.band_lower.unwrap_or(config.band.lower),
                self.band_upper.unwrap_or(config.band.upper),
            )?;
        }
        if self.device.is_some() {
            config.device.clone_from(&self.device);
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if self.imgsz.is_some() {
            config.imgsz = self.imgsz;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Arguments for the client command.
#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Ergonomics endpoint URL
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Input source (webcam index, video, image, directory, or glob)
    #[arg(short, long, default_value = "0")]
    pub source: String,

    /// Display annotated frames in a window (on by default with the `visualize` feature)
    #[arg(long, default_value_t = false, conflicts_with = "no_show")]
    pub show: bool,

    /// Never open a display window
    #[arg(long, default_value_t = false)]
    pub no_show: bool,

    /// Save annotated frames to runs/ergonomics/check
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Show verbose output
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl ClientArgs {
    /// Whether frames should go to a window. Without `--show` or `--no-show`
    /// this follows the `visualize` feature.
    #[must_use]
    pub const fn display(&self) -> bool {
        !self.no_show && (self.show || cfg!(feature = "visualize"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_client_args_defaults() {
        let args = Cli::parse_from(["app", "client"]);
        match args.command {
            Commands::Client(client_args) => {
                assert_eq!(client_args.url, "http://localhost:5000/check_ergonomics");
                assert_eq!(client_args.source, "0");
                assert!(!client_args.show);
                assert!(!client_args.no_show);
                assert_eq!(client_args.display(), cfg!(feature = "visualize"));
                assert!(!client_args.save);
                assert!(!client_args.verbose);
            }
            Commands::Serve(_) => panic!("expected client command"),
        }
    }

    #[test]
    fn test_client_display_flags() {
        let Commands::Client(args) = Cli::parse_from(["app", "client", "--no-show"]).command else {
            panic!("expected client command");
        };
        assert!(!args.display());

        let Commands::Client(args) = Cli::parse_from(["app", "client", "--show"]).command else {
            panic!("expected client command");
        };
        assert!(args.display());

        assert!(Cli::try_parse_from(["app", "client", "--show", "--no-show"]).is_err());
    }

    #[test]
    #[cfg(feature = "video")]
    fn test_default_client_source_opens() {
        use crate::source::{Source, SourceIterator};

        let Commands::Client(args) = Cli::parse_from(["app", "client"]).command else {
            panic!("expected client command");
        };
        let source = Source::from(args.source.as_str());
        assert_eq!(source, Source::Webcam(0));
        // Opening only validates the source; the device is read on the first frame.
        assert!(SourceIterator::new(source).is_ok());
    }

    #[test]
    fn test_serve_args_override_defaults() {
        let args = Cli::parse_from([
            "app",
            "serve",
            "--model",
            "custom.onnx",
            "--port",
            "8080",
            "--band-upper",
            "0.9",
            "--conf",
            "0.7",
        ]);
        let Commands::Serve(serve_args) = args.command else {
            panic!("expected serve command");
        };

        let config = serve_args.resolve().unwrap();
        assert_eq!(config.model, "custom.onnx");
        assert_eq!(config.port, 8080);
        assert!((config.band.lower - 0.4).abs() < f64::EPSILON);
        assert!((config.band.upper - 0.9).abs() < f64::EPSILON);
        assert!((config.min_detection_confidence - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_serve_flags_beat_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 6000\nhost = \"127.0.0.1\"\nthreads = 4").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = Cli::parse_from(["app", "serve", "--config", &path, "--port", "7000"]);
        let Commands::Serve(serve_args) = args.command else {
            panic!("expected serve command");
        };

        let config = serve_args.resolve().unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.threads, 4);
    }

    #[test]
    fn test_serve_rejects_inverted_band() {
        let args = Cli::parse_from(["app", "serve", "--band-lower", "0.9", "--band-upper", "0.2"]);
        let Commands::Serve(serve_args) = args.command else {
            panic!("expected serve command");
        };
        assert!(serve_args.resolve().is_err());
    }
}

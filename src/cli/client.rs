// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;
#[cfg(feature = "visualize")]
use std::time::Duration;

use image::DynamicImage;

use crate::annotate::{Annotator, find_next_run_dir};
use crate::api::ErgonomicsResponse;
use crate::cli::args::ClientArgs;
use crate::client::ErgonomicsClient;
use crate::io::{FrameSaver, init_video};
use crate::source::{Source, SourceIterator};
#[cfg(feature = "visualize")]
use crate::visualizer::Viewer;
use crate::{error, info, verbose, verdict, warn};

/// Per-run verdict counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub ergonomic: usize,
    pub not_ergonomic: usize,
    pub no_pose: usize,
    pub failed: usize,
}

impl Tally {
    /// Count one answered frame.
    pub fn record(&mut self, is_ergonomic: Option<bool>) {
        match is_ergonomic {
            Some(true) => self.ergonomic += 1,
            Some(false) => self.not_ergonomic += 1,
            None => self.no_pose += 1,
        }
    }

    /// Frames sent, answered or not.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.ergonomic + self.not_ergonomic + self.no_pose + self.failed
    }

    /// One-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} frames: {} ergonomic, {} not ergonomic, {} no pose, {} failed",
            self.total(),
            self.ergonomic,
            self.not_ergonomic,
            self.no_pose,
            self.failed
        )
    }
}

/// Frame for the window and the saver. Frames the server didn't answer are
/// shown as captured.
fn frame_to_display(
    annotator: &Annotator,
    frame: &DynamicImage,
    response: Option<&ErgonomicsResponse>,
) -> DynamicImage {
    response.map_or_else(|| frame.clone(), |r| annotator.annotate(frame, r))
}

/// Stream frames from a source to the server and overlay the answers.
#[allow(clippy::too_many_lines)]
pub fn run_client(args: &ClientArgs) {
    let client = match ErgonomicsClient::new(args.url.clone()) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let source = Source::from(args.source.as_str());
    let is_video = source.is_video();
    if is_video {
        init_video();
    }

    let frames = match SourceIterator::new(source) {
        Ok(iter) => iter,
        Err(e) => {
            error!("Error opening source '{}': {e}", args.source);
            process::exit(1);
        }
    };

    #[cfg(not(feature = "visualize"))]
    if args.show {
        warn!("--show requires the 'visualize' feature. Compile with --features visualize.");
    }
    #[cfg(feature = "visualize")]
    let mut show = args.display();
    #[cfg(not(feature = "visualize"))]
    let show = false;

    let mut saver = if args.save {
        match FrameSaver::new(find_next_run_dir("runs/ergonomics", "check")) {
            Ok(s) => Some(s),
            Err(e) => {
                error!("{e}");
                process::exit(1);
            }
        }
    } else {
        None
    };

    let annotator = (show || saver.is_some()).then(Annotator::new);

    #[cfg(feature = "visualize")]
    let mut viewer: Option<Viewer> = None;

    verbose!("Sending frames from '{}' to {}", args.source, client.url());
    let mut tally = Tally::default();

    for item in frames {
        let (frame, meta) = match item {
            Ok(val) => val,
            Err(e) => {
                error!("Error reading source: {e}");
                if is_video {
                    break;
                }
                continue;
            }
        };

        let response = match client.check(&frame) {
            Ok(r) => {
                tally.record(r.is_ergonomic);
                verdict!(
                    r.is_ergonomic,
                    "{} {}: {}",
                    if is_video { "frame" } else { "image" },
                    meta.path,
                    r.status_text()
                );
                Some(r)
            }
            Err(e) => {
                error!("{e}");
                tally.failed += 1;
                None
            }
        };

        let Some(annotator) = &annotator else {
            continue;
        };
        let display = frame_to_display(annotator, &frame, response.as_ref());

        if response.is_some()
            && let Some(saver) = &mut saver
            && let Err(e) = saver.save(is_video, &meta, &display)
        {
            error!("Failed to save frame: {e}");
        }

        #[cfg(feature = "visualize")]
        if show {
            let size = (display.width() as usize, display.height() as usize);
            if viewer.as_ref().is_some_and(|v| v.size() != size) {
                viewer = None;
            }
            if viewer.is_none() {
                match Viewer::new("Wrist Ergonomics", size.0, size.1) {
                    Ok(v) => viewer = Some(v),
                    Err(e) if args.show => {
                        error!("{e}");
                        process::exit(1);
                    }
                    Err(e) => {
                        warn!("No display available, continuing without a window: {e}");
                        show = false;
                        continue;
                    }
                }
            }
            if let Some(v) = &mut viewer {
                let still_open = match v.update(&display) {
                    Ok(true) if !is_video => v.wait(Duration::from_millis(1500)).unwrap_or(false),
                    Ok(open) => open,
                    Err(e) => {
                        error!("{e}");
                        false
                    }
                };
                if !still_open {
                    break;
                }
            }
        }
    }

    info!("{}", tally.summary());
    if let Some(saver) = &saver {
        verbose!("Results saved to {}", saver.save_dir().display());
    }
}

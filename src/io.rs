// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Saving annotated client frames.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{ErgonomicsError, Result};
use crate::source::FrameMeta;

#[cfg(feature = "video")]
static INIT: std::sync::Once = std::sync::Once::new();

/// Initialize `video-rs` (FFmpeg) once. Safe to call repeatedly.
#[allow(clippy::missing_const_for_fn)]
pub fn init_video() {
    #[cfg(feature = "video")]
    INIT.call_once(|| {
        if let Err(e) = video_rs::init() {
            tracing::error!("Failed to initialize video-rs: {e}");
        }
    });
}

/// Writes annotated frames into a run directory.
///
/// Still images keep their file stem; stream frames are numbered.
#[derive(Debug)]
pub struct FrameSaver {
    save_dir: PathBuf,
    saved: usize,
}

impl FrameSaver {
    /// Create the save directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory can't be created.
    pub fn new<P: AsRef<Path>>(save_dir: P) -> Result<Self> {
        let save_dir = save_dir.as_ref().to_path_buf();
        fs::create_dir_all(&save_dir).map_err(|e| {
            ErgonomicsError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create {}: {e}", save_dir.display()),
            ))
        })?;
        Ok(Self { save_dir, saved: 0 })
    }

    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Number of frames written so far.
    #[must_use]
    pub const fn saved(&self) -> usize {
        self.saved
    }

    /// Output path for a frame.
    #[must_use]
    pub fn path_for(&self, is_video: bool, meta: &FrameMeta) -> PathBuf {
        if is_video {
            return self.save_dir.join(format!("frame_{:06}.jpg", meta.frame_idx));
        }
        let stem = Path::new(&meta.path)
            .file_stem()
            .map_or_else(|| format!("image_{}", meta.frame_idx), |s| s.to_string_lossy().to_string());
        self.save_dir.join(format!("{stem}.jpg"))
    }

    /// Save one annotated frame as JPEG.
    ///
    /// # Errors
    ///
    /// Returns an error if the image can't be encoded or written.
    pub fn save(&mut self, is_video: bool, meta: &FrameMeta, annotated: &DynamicImage) -> Result<PathBuf> {
        let path = self.path_for(is_video, meta);
        // JPEG has no alpha channel.
        DynamicImage::ImageRgb8(annotated.to_rgb8()).save(&path)?;
        self.saved += 1;
        Ok(path)
    }
}

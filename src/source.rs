// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame sources for the ergonomics client.
//!
//! A source string is resolved into still images (file, directory, glob) or a
//! frame stream (video file, webcam). Streams need the `video` feature.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{ErgonomicsError, Result};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"];
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v", "mpeg", "mpg",
];

/// Where client frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Path to an image file.
    Image(PathBuf),
    /// Directory containing images.
    Directory(PathBuf),
    /// Glob pattern for images (`dir/*.jpg`).
    Glob(String),
    /// Path to a video file.
    Video(PathBuf),
    /// Webcam device index.
    Webcam(u32),
}

impl Source {
    /// Check if this source yields a continuous frame stream.
    #[must_use]
    pub const fn is_video(&self) -> bool {
        matches!(self, Self::Video(_) | Self::Webcam(_))
    }

    /// Location handed to the video decoder.
    #[must_use]
    pub fn video_path(&self) -> Option<PathBuf> {
        match self {
            Self::Video(p) => Some(p.clone()),
            Self::Webcam(idx) => Some(PathBuf::from(format!("/dev/video{idx}"))),
            _ => None,
        }
    }

    fn has_extension(path: &Path, extensions: &[&str]) -> bool {
        path.extension().is_some_and(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            extensions.contains(&ext.as_str())
        })
    }
}

impl Default for Source {
    fn default() -> Self {
        Self::Webcam(0)
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        if let Ok(idx) = s.parse::<u32>() {
            return Self::Webcam(idx);
        }
        if s.contains('*') {
            return Self::Glob(s.to_string());
        }

        let path = PathBuf::from(s);
        if path.is_dir() {
            Self::Directory(path)
        } else if Self::has_extension(&path, VIDEO_EXTENSIONS) {
            Self::Video(path)
        } else {
            Self::Image(path)
        }
    }
}

/// Metadata about a source frame.
#[derive(Debug, Clone, Default)]
pub struct FrameMeta {
    /// Frame index within the source.
    pub frame_idx: usize,
    /// Total frames, when known.
    pub total_frames: Option<usize>,
    /// Source path or device.
    pub path: String,
}

/// Iterator over frames from a [`Source`].
pub struct SourceIterator {
    source: Source,
    current_frame: usize,
    image_paths: Vec<PathBuf>,
    exhausted: bool,
    #[cfg(feature = "video")]
    decoder: Option<video_rs::decode::Decoder>,
}

impl SourceIterator {
    /// Open a source.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or glob can't be listed, or a stream is
    /// requested without the `video` feature.
    pub fn new(source: Source) -> Result<Self> {
        let image_paths = match &source {
            Source::Image(path) => vec![path.clone()],
            Source::Directory(dir) => collect_images(dir, None)?,
            Source::Glob(pattern) => collect_glob(pattern)?,
            Source::Video(_) | Source::Webcam(_) => {
                if !cfg!(feature = "video") {
                    return Err(ErgonomicsError::FeatureNotEnabled(
                        "Video and webcam sources require the 'video' feature".to_string(),
                    ));
                }
                Vec::new()
            }
        };

        Ok(Self {
            source,
            current_frame: 0,
            image_paths,
            exhausted: false,
            #[cfg(feature = "video")]
            decoder: None,
        })
    }

    /// Number of still images queued, `None` for streams.
    #[must_use]
    pub fn len_hint(&self) -> Option<usize> {
        (!self.source.is_video()).then_some(self.image_paths.len())
    }

    fn next_image(&mut self) -> Option<Result<(DynamicImage, FrameMeta)>> {
        let path = self.image_paths.get(self.current_frame)?;
        let meta = FrameMeta {
            frame_idx: self.current_frame,
            total_frames: Some(self.image_paths.len()),
            path: path.to_string_lossy().to_string(),
        };
        self.current_frame += 1;

        Some(
            image::open(path)
                .map(|img| (img, meta))
                .map_err(|e| {
                    ErgonomicsError::ImageError(format!("Failed to load {}: {e}", path.display()))
                }),
        )
    }

    #[cfg(feature = "video")]
    fn next_video_frame(&mut self) -> Option<Result<(DynamicImage, FrameMeta)>> {
        let path = self.source.video_path()?;
        if self.decoder.is_none() {
            match video_rs::decode::Decoder::new(path.as_path()) {
                Ok(d) => self.decoder = Some(d),
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(ErgonomicsError::VideoError(format!(
                        "Failed to open {}: {e}",
                        path.display()
                    ))));
                }
            }
        }

        let decoder = self.decoder.as_mut()?;
        // Any decode error is treated as end of stream.
        let (_ts, frame) = decoder.decode().ok()?;
        let meta = FrameMeta {
            frame_idx: self.current_frame,
            total_frames: None,
            path: path.to_string_lossy().to_string(),
        };
        self.current_frame += 1;
        Some(video_frame_to_image(&frame).map(|img| (img, meta)))
    }

    #[cfg(not(feature = "video"))]
    fn next_video_frame(&mut self) -> Option<Result<(DynamicImage, FrameMeta)>> {
        None
    }
}

impl Iterator for SourceIterator {
    type Item = Result<(DynamicImage, FrameMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        if self.source.is_video() {
            self.next_video_frame()
        } else {
            self.next_image()
        }
    }
}

fn collect_images(dir: &Path, ext_filter: Option<&str>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ErgonomicsError::ImageError(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| match ext_filter {
            Some(ext) => Source::has_extension(path, &[ext]),
            None => Source::has_extension(path, IMAGE_EXTENSIONS),
        })
        .collect();

    paths.sort();
    Ok(paths)
}

/// Expand `dir/*.ext` or `dir/*`. Only a single trailing wildcard is supported.
fn collect_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let Some(star_pos) = pattern.find('*') else {
        return Ok(vec![PathBuf::from(pattern)]);
    };

    let dir_part = pattern[..star_pos].trim_end_matches(['/', '\\']);
    let dir = if dir_part.is_empty() {
        Path::new(".")
    } else {
        Path::new(dir_part)
    };
    let ext = pattern[star_pos..].strip_prefix("*.").map(str::to_lowercase);
    collect_images(dir, ext.as_deref())
}

#[cfg(feature = "video")]
fn video_frame_to_image(frame: &video_rs::Frame) -> Result<DynamicImage> {
    let (height, width) = (frame.shape()[0], frame.shape()[1]);
    let width = u32::try_from(width)
        .map_err(|_| ErgonomicsError::VideoError("Frame width exceeds u32::MAX".to_string()))?;
    let height = u32::try_from(height)
        .map_err(|_| ErgonomicsError::VideoError("Frame height exceeds u32::MAX".to_string()))?;

    let data: Vec<u8> = frame.as_standard_layout().iter().copied().collect();
    image::RgbImage::from_raw(width, height, data)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| ErgonomicsError::VideoError("Malformed video frame".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_from_string() {
        assert_eq!(Source::from("0"), Source::Webcam(0));
        assert_eq!(Source::from("2"), Source::Webcam(2));
        assert!(matches!(Source::from("frame.jpg"), Source::Image(_)));
        assert!(matches!(Source::from("clip.MP4"), Source::Video(_)));
        assert!(matches!(Source::from("shots/*.png"), Source::Glob(_)));
        assert_eq!(Source::default(), Source::Webcam(0));
    }

    #[test]
    fn test_webcam_device_path() {
        assert_eq!(
            Source::Webcam(1).video_path(),
            Some(PathBuf::from("/dev/video1"))
        );
        assert!(Source::Image(PathBuf::from("a.png")).video_path().is_none());
    }

    #[test]
    fn test_directory_and_glob_listing() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.jpg", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let source = Source::from(dir.path().to_str().unwrap());
        assert!(matches!(source, Source::Directory(_)));
        let iter = SourceIterator::new(source).unwrap();
        assert_eq!(iter.len_hint(), Some(2));
        assert!(iter.image_paths[0].ends_with("a.jpg"));

        let pattern = format!("{}/*.png", dir.path().display());
        let iter = SourceIterator::new(Source::from(pattern.as_str())).unwrap();
        assert_eq!(iter.image_paths.len(), 1);
        assert!(iter.image_paths[0].ends_with("b.png"));
    }

    #[test]
    fn test_image_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        DynamicImage::new_rgb8(8, 6).save(&path).unwrap();

        let mut iter = SourceIterator::new(Source::Image(path)).unwrap();
        let (img, meta) = iter.next().unwrap().unwrap();
        assert_eq!((img.width(), img.height()), (8, 6));
        assert_eq!(meta.total_frames, Some(1));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_unreadable_image_is_error() {
        let mut iter = SourceIterator::new(Source::Image(PathBuf::from("missing.png"))).unwrap();
        assert!(matches!(
            iter.next(),
            Some(Err(ErgonomicsError::ImageError(_)))
        ));
    }
}

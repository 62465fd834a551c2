// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Drawing ergonomics results onto frames.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut};

use crate::api::ErgonomicsResponse;
use crate::landmark::{NUM_LANDMARKS, PoseLandmark};
use crate::visualizer::{BodyPart, Color, POSE_CONNECTIONS};

/// Assets URL for downloading fonts
const ASSETS_URL: &str = "https://github.com/ultralytics/assets/releases/download/v0.0.0";

const FONT_NAME: &str = "Arial.ttf";
const KEYPOINT_RADIUS: i32 = 6;
const LIMB_THICKNESS: i32 = 2;
const TEXT_ORIGIN: (i32, i32) = (10, 30);
const TEXT_SCALE: f32 = 32.0;

/// Find the next available run directory (check, check2, check3, etc.)
#[must_use]
pub fn find_next_run_dir(base: &str, prefix: &str) -> PathBuf {
    let base_path = Path::new(base);

    let first = base_path.join(prefix);
    if !first.exists() {
        return first;
    }

    (2..)
        .map(|i| base_path.join(format!("{prefix}{i}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// Check if font exists locally or download it
pub fn check_font(font: &str) -> Option<PathBuf> {
    let font_name = Path::new(font).file_name()?.to_string_lossy();
    let config_dir = dirs::config_dir()?.join("Ultralytics");
    let font_path = config_dir.join(font_name.as_ref());

    if font_path.exists() {
        return Some(font_path);
    }

    if let Err(e) = fs::create_dir_all(&config_dir) {
        tracing::warn!("Failed to create config directory: {e}");
        return None;
    }

    let url = format!("{ASSETS_URL}/{font_name}");
    tracing::info!("Downloading {url} to {}", font_path.display());

    let mut response = match reqwest::blocking::get(&url).and_then(|r| r.error_for_status()) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Failed to download font from {url}: {e}");
            return None;
        }
    };

    let mut file = match File::create(&font_path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Failed to create font file: {e}");
            return None;
        }
    };

    if let Err(e) = io::copy(&mut response, &mut file) {
        tracing::warn!("Failed to download font: {e}");
        // Partial downloads would be picked up as cached next time.
        let _ = fs::remove_file(&font_path);
        return None;
    }

    Some(font_path)
}

/// Draws skeletons, keypoints and the verdict line.
///
/// Text is skipped when no font could be loaded.
pub struct Annotator {
    font: Option<FontVec>,
}

impl Annotator {
    /// Create an annotator, fetching the overlay font on first use.
    #[must_use]
    pub fn new() -> Self {
        let font = check_font(FONT_NAME)
            .and_then(|path| fs::read(path).ok())
            .and_then(|data| FontVec::try_from_vec(data).ok());
        if font.is_none() {
            tracing::warn!("Overlay font unavailable, status text will not be drawn");
        }
        Self { font }
    }

    /// Annotator that never draws text.
    #[must_use]
    pub const fn without_text() -> Self {
        Self { font: None }
    }

    /// Annotate a frame with the server's answer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn annotate(&self, image: &DynamicImage, response: &ErgonomicsResponse) -> DynamicImage {
        let mut img = image.to_rgb8();
        let points = pixel_points(response, img.width(), img.height());

        for (a, b) in POSE_CONNECTIONS {
            if let (Some(pa), Some(pb)) = (points[a.index()], points[b.index()]) {
                let color = Rgb::from(Color::for_part(BodyPart::of_connection(a, b)));
                draw_thick_line(&mut img, pa, pb, color);
            }
        }

        let keypoint_color = Rgb::from(Color::GREEN);
        for (x, y) in points.iter().flatten() {
            draw_filled_circle_mut(
                &mut img,
                (x.round() as i32, y.round() as i32),
                KEYPOINT_RADIUS,
                keypoint_color,
            );
        }

        if let Some(font) = &self.font {
            draw_text_mut(
                &mut img,
                Rgb::from(Color::for_verdict(response.is_ergonomic)),
                TEXT_ORIGIN.0,
                TEXT_ORIGIN.1,
                PxScale::from(TEXT_SCALE),
                font,
                response.status_text(),
            );
        }

        DynamicImage::ImageRgb8(img)
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

/// Landmark pixel positions indexed by label. Unknown or non-finite entries are `None`.
#[allow(clippy::cast_precision_loss)]
fn pixel_points(
    response: &ErgonomicsResponse,
    width: u32,
    height: u32,
) -> [Option<(f32, f32)>; NUM_LANDMARKS] {
    let mut points = [None; NUM_LANDMARKS];
    for lm in &response.landmarks {
        let Some(label) = lm.name.parse::<PoseLandmark>().ok() else {
            continue;
        };
        if lm.x.is_finite() && lm.y.is_finite() {
            points[label.index()] = Some((lm.x * width as f32, lm.y * height as f32));
        }
    }
    points
}

#[allow(clippy::cast_precision_loss)]
fn draw_thick_line(img: &mut RgbImage, a: (f32, f32), b: (f32, f32), color: Rgb<u8>) {
    for offset in -(LIMB_THICKNESS / 2)..=(LIMB_THICKNESS / 2) {
        let o = offset as f32;
        draw_line_segment_mut(img, (a.0 + o, a.1), (b.0 + o, b.1), color);
        draw_line_segment_mut(img, (a.0, a.1 + o), (b.0, b.1 + o), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LandmarkData;

    fn response_with(landmarks: &[(PoseLandmark, f32, f32)]) -> ErgonomicsResponse {
        ErgonomicsResponse {
            is_ergonomic: Some(true),
            landmarks: landmarks
                .iter()
                .map(|(label, x, y)| LandmarkData {
                    name: label.as_str().to_string(),
                    x: *x,
                    y: *y,
                    z: 0.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_keypoints_are_drawn_green() {
        let image = DynamicImage::new_rgb8(100, 100);
        let response = response_with(&[(PoseLandmark::LeftWrist, 0.5, 0.5)]);

        let out = Annotator::without_text().annotate(&image, &response).to_rgb8();
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(*out.get_pixel(50, 50), Rgb([0, 255, 0]));
        assert_eq!(*out.get_pixel(90, 90), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_limbs_connect_keypoints() {
        let image = DynamicImage::new_rgb8(100, 100);
        let response = response_with(&[
            (PoseLandmark::LeftElbow, 0.1, 0.5),
            (PoseLandmark::LeftWrist, 0.9, 0.5),
        ]);

        let out = Annotator::without_text().annotate(&image, &response).to_rgb8();
        let arm = Rgb::from(Color::for_part(BodyPart::Arm));
        assert_eq!(*out.get_pixel(50, 50), arm);
    }

    #[test]
    fn test_empty_response_leaves_frame_untouched() {
        let image = DynamicImage::new_rgb8(20, 10);
        let response = ErgonomicsResponse {
            is_ergonomic: None,
            landmarks: Vec::new(),
        };
        let out = Annotator::without_text().annotate(&image, &response);
        assert_eq!(out.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn test_find_next_run_dir() {
        let base = tempfile::tempdir().unwrap();
        let base_str = base.path().to_str().unwrap();

        let first = find_next_run_dir(base_str, "check");
        assert!(first.ends_with("check"));
        fs::create_dir_all(&first).unwrap();

        let second = find_next_run_dir(base_str, "check");
        assert!(second.ends_with("check2"));
    }
}

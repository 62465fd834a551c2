// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Preview window for annotated client frames.

use std::time::{Duration, Instant};

use image::DynamicImage;
use minifb::{Key, Window, WindowOptions};

use crate::error::{ErgonomicsError, Result};

/// A minifb window showing the latest annotated frame.
///
/// Closing the window or pressing `q`/`Esc` ends the preview.
pub struct Viewer {
    window: Window,
    width: usize,
    height: usize,
    buffer: Vec<u32>,
}

impl Viewer {
    /// Open a viewer window.
    ///
    /// # Errors
    ///
    /// Returns [`ErgonomicsError::VisualizerError`] if the window can't be created.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| ErgonomicsError::VisualizerError(format!("Failed to create window: {e}")))?;

        // ~60 fps
        window.set_target_fps(60);

        Ok(Self {
            window,
            width,
            height,
            buffer: Vec::new(),
        })
    }

    /// Window size the viewer was last drawn at.
    #[must_use]
    pub const fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Whether the user still wants the preview.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.window.is_open()
            && !self.window.is_key_down(Key::Escape)
            && !self.window.is_key_down(Key::Q)
    }

    /// Draw a frame. Returns `Ok(false)` once the user closed the window.
    ///
    /// # Errors
    ///
    /// Returns [`ErgonomicsError::VisualizerError`] if the window can't be updated.
    pub fn update(&mut self, image: &DynamicImage) -> Result<bool> {
        if !self.is_open() {
            return Ok(false);
        }

        let rgb = image.to_rgb8();
        self.width = rgb.width() as usize;
        self.height = rgb.height() as usize;

        // minifb wants 0x00RRGGBB per pixel
        self.buffer.clear();
        self.buffer.extend(rgb.pixels().map(|p| {
            (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2])
        }));

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| {
                ErgonomicsError::VisualizerError(format!("Failed to update window: {e}"))
            })?;

        Ok(true)
    }

    /// Keep the window responsive for `duration`. Returns `Ok(false)` if the
    /// user closed it meanwhile.
    ///
    /// # Errors
    ///
    /// Returns [`ErgonomicsError::VisualizerError`] if the window can't be updated.
    pub fn wait(&mut self, duration: Duration) -> Result<bool> {
        if self.buffer.is_empty() {
            return Ok(self.is_open());
        }

        let start = Instant::now();
        while start.elapsed() < duration {
            if !self.is_open() {
                return Ok(false);
            }
            self.window
                .update_with_buffer(&self.buffer, self.width, self.height)
                .map_err(|e| {
                    ErgonomicsError::VisualizerError(format!("Failed to update window: {e}"))
                })?;
        }
        Ok(true)
    }
}

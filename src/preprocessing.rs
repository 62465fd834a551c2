// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image preprocessing for pose inference.
//!
//! This module letterboxes images into the model's input square, normalizes
//! pixels to `[0, 1]`, and maps model-space landmark coordinates back to
//! normalized coordinates of the original image.

#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Letterbox padding color (black, as the landmark models are trained with).
pub const LETTERBOX_COLOR: [u8; 3] = [0, 0, 0];

/// Reciprocal of 255 for normalization.
const INV_255: f32 = 1.0 / 255.0;

/// Memory layout of the model input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// `(1, 3, H, W)`
    Nchw,
    /// `(1, H, W, 3)`
    Nhwc,
}

impl TensorLayout {
    /// Infer the layout and spatial size `(height, width)` from a 4-D input shape.
    ///
    /// Dynamic dimensions (negative values) are reported as `None`.
    #[must_use]
    pub fn from_shape(shape: &[i64]) -> Option<(Self, Option<(usize, usize)>)> {
        if shape.len() != 4 {
            return None;
        }
        let dim = |d: i64| usize::try_from(d).ok().filter(|&d| d > 0);
        if shape[3] == 3 {
            let size = dim(shape[1]).zip(dim(shape[2]));
            Some((Self::Nhwc, size))
        } else {
            let size = dim(shape[2]).zip(dim(shape[3]));
            Some((Self::Nchw, size))
        }
    }
}

/// Geometry of a letterbox transform, used to map coordinates back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Original image dimensions (height, width).
    pub orig_shape: (u32, u32),
    /// Scale factors applied (`scale_y`, `scale_x`).
    pub scale: (f32, f32),
    /// Padding applied (`pad_top`, `pad_left`).
    pub padding: (f32, f32),
}

impl Letterbox {
    /// Map a model-input pixel position to normalized original-image coordinates.
    #[must_use]
    pub fn to_normalized(&self, x: f32, y: f32) -> (f32, f32) {
        let (orig_h, orig_w) = (self.orig_shape.0 as f32, self.orig_shape.1 as f32);
        let ox = (x - self.padding.1) / self.scale.1;
        let oy = (y - self.padding.0) / self.scale.0;
        (ox / orig_w, oy / orig_h)
    }

    /// Map a model-input depth value to the normalized scale of the original width.
    #[must_use]
    pub fn depth_to_normalized(&self, z: f32) -> f32 {
        z / self.scale.1 / self.orig_shape.1 as f32
    }
}

/// Result of preprocessing an image, containing the tensor and transform info.
#[derive(Debug, Clone)]
pub struct PreprocessResult {
    /// Preprocessed image tensor, normalized to [0, 1].
    pub tensor: Array4<f32>,
    /// Letterbox applied to produce the tensor.
    pub letterbox: Letterbox,
}

/// Preprocess an image for pose inference.
///
/// Performs letterbox resizing, normalization to [0, 1], and conversion to a
/// tensor in the requested layout.
///
/// # Arguments
///
/// * `image` - Input image. Must have non-zero dimensions.
/// * `target_size` - Target size as (height, width).
/// * `layout` - Tensor layout expected by the model.
#[must_use]
pub fn preprocess_image(
    image: &DynamicImage,
    target_size: (usize, usize),
    layout: TensorLayout,
) -> PreprocessResult {
    let (orig_width, orig_height) = image.dimensions();
    let (new_width, new_height, pad_left, pad_top, scale) =
        calculate_letterbox_params(orig_width, orig_height, target_size);

    let resized = imageops::resize(&image.to_rgb8(), new_width, new_height, FilterType::Triangle);

    let (dst_h, dst_w) = target_size;
    let mut canvas = RgbImage::from_pixel(dst_w as u32, dst_h as u32, Rgb(LETTERBOX_COLOR));
    imageops::replace(&mut canvas, &resized, i64::from(pad_left), i64::from(pad_top));

    let tensor = image_to_tensor(&canvas, layout);

    PreprocessResult {
        tensor,
        letterbox: Letterbox {
            orig_shape: (orig_height, orig_width),
            scale,
            padding: (pad_top as f32, pad_left as f32),
        },
    }
}

/// Calculate letterbox parameters for resizing.
///
/// Returns `(new_width, new_height, pad_left, pad_top, (scale_y, scale_x))`.
fn calculate_letterbox_params(
    orig_width: u32,
    orig_height: u32,
    target_size: (usize, usize),
) -> (u32, u32, u32, u32, (f32, f32)) {
    let (target_h, target_w) = (target_size.0 as f32, target_size.1 as f32);
    let (orig_h, orig_w) = (orig_height as f32, orig_width as f32);

    // Scale to fit within target while maintaining aspect ratio
    let scale = (target_h / orig_h).min(target_w / orig_w);

    let new_w = ((orig_w * scale).round() as u32).max(1);
    let new_h = ((orig_h * scale).round() as u32).max(1);

    let pad_w = (target_size.1 as u32).saturating_sub(new_w);
    let pad_h = (target_size.0 as u32).saturating_sub(new_h);

    // Center alignment
    let pad_left = pad_w / 2;
    let pad_top = pad_h / 2;

    let scale_x = new_w as f32 / orig_w;
    let scale_y = new_h as f32 / orig_h;

    (new_w, new_h, pad_left, pad_top, (scale_y, scale_x))
}

/// Convert an RGB image to a normalized tensor.
fn image_to_tensor(image: &RgbImage, layout: TensorLayout) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let (h, w) = (height as usize, width as usize);

    let mut tensor = match layout {
        TensorLayout::Nchw => Array4::<f32>::zeros((1, 3, h, w)),
        TensorLayout::Nhwc => Array4::<f32>::zeros((1, h, w, 3)),
    };

    for (x, y, pixel) in image.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            let v = f32::from(pixel[c]) * INV_255;
            match layout {
                TensorLayout::Nchw => tensor[[0, c, y, x]] = v,
                TensorLayout::Nhwc => tensor[[0, y, x, c]] = v,
            }
        }
    }

    tensor
}

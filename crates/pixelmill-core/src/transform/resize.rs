//! Resizing in three modes: fit within bounds, fill exactly, or cover and
//! center-crop.
//!
//! Resampling goes through the image crate's kernels. Output dimensions
//! floor at 1 px.

use crate::buffer::PixelBuffer;
use crate::transform::crop::apply_crop;
use crate::{CropRegion, OptionsError, ResizeMode};

/// Resampling kernel for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleFilter {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl ResampleFilter {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            ResampleFilter::Nearest => image::imageops::FilterType::Nearest,
            ResampleFilter::Bilinear => image::imageops::FilterType::Triangle,
            ResampleFilter::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Resize an image to exact dimensions.
///
/// Zero dimensions are floored at 1 px. If the dimensions already match,
/// the buffer is copied without resampling.
pub fn resize_exact(
    buffer: &PixelBuffer,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> Result<PixelBuffer, OptionsError> {
    let width = width.max(1);
    let height = height.max(1);

    if buffer.width == width && buffer.height == height {
        return Ok(buffer.clone());
    }

    let img = buffer.to_rgba_image().ok_or(OptionsError::MalformedBuffer)?;
    let resized = image::imageops::resize(&img, width, height, filter.to_image_filter());
    Ok(PixelBuffer::from_rgba_image(resized))
}

/// Compute Fit-mode output dimensions.
///
/// Nothing changes unless a provided max dimension is exceeded. With aspect
/// preserved, both axes scale uniformly by the smallest provided max/dim
/// ratio; otherwise each exceeded axis clamps to its max independently.
/// Fit never upscales.
pub fn fit_dimensions(
    width: u32,
    height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
    maintain_aspect: bool,
) -> (u32, u32) {
    let exceeds_width = max_width.is_some_and(|m| width > m);
    let exceeds_height = max_height.is_some_and(|m| height > m);
    if !exceeds_width && !exceeds_height {
        return (width, height);
    }

    if maintain_aspect {
        let mut ratio = f64::INFINITY;
        if let Some(m) = max_width {
            ratio = ratio.min(m as f64 / width as f64);
        }
        if let Some(m) = max_height {
            ratio = ratio.min(m as f64 / height as f64);
        }
        let new_width = ((width as f64 * ratio).round() as u32).max(1);
        let new_height = ((height as f64 * ratio).round() as u32).max(1);
        (new_width, new_height)
    } else {
        let new_width = max_width.map_or(width, |m| width.min(m));
        let new_height = max_height.map_or(height, |m| height.min(m));
        (new_width.max(1), new_height.max(1))
    }
}

/// Scale to cover the target box, then center-crop to exactly it.
fn cover_resize(
    buffer: &PixelBuffer,
    target_width: u32,
    target_height: u32,
    filter: ResampleFilter,
) -> Result<PixelBuffer, OptionsError> {
    let target_width = target_width.max(1);
    let target_height = target_height.max(1);

    let scale = (target_width as f64 / buffer.width as f64)
        .max(target_height as f64 / buffer.height as f64);
    // Rounding must not undershoot the box or the center-crop would escape it.
    let scaled_width = (((buffer.width as f64) * scale).round() as u32).max(target_width);
    let scaled_height = (((buffer.height as f64) * scale).round() as u32).max(target_height);

    let scaled = resize_exact(buffer, scaled_width, scaled_height, filter)?;
    let x = (scaled_width - target_width) / 2;
    let y = (scaled_height - target_height) / 2;
    apply_crop(&scaled, CropRegion::new(x, y, target_width, target_height))
}

/// Apply the configured resize to an image.
///
/// With neither max dimension set this is a pass-through copy. Fill and
/// Crop modes need both dimensions; Fit works with either.
pub fn apply_resize(
    buffer: &PixelBuffer,
    max_width: Option<u32>,
    max_height: Option<u32>,
    mode: ResizeMode,
    maintain_aspect: bool,
    filter: ResampleFilter,
) -> Result<PixelBuffer, OptionsError> {
    if max_width.is_none() && max_height.is_none() {
        return Ok(buffer.clone());
    }

    match mode {
        ResizeMode::Fit => {
            let (width, height) = fit_dimensions(
                buffer.width,
                buffer.height,
                max_width,
                max_height,
                maintain_aspect,
            );
            resize_exact(buffer, width, height, filter)
        }
        ResizeMode::Fill => {
            let (Some(width), Some(height)) = (max_width, max_height) else {
                return Err(OptionsError::IncompleteResizeTarget { mode });
            };
            resize_exact(buffer, width, height, filter)
        }
        ResizeMode::Crop => {
            let (Some(width), Some(height)) = (max_width, max_height) else {
                return Err(OptionsError::IncompleteResizeTarget { mode });
            };
            cover_resize(buffer, width, height, filter)
        }
    }
}

/// Shrink an image so its longest edge does not exceed `max_edge`,
/// preserving aspect ratio. Images that already fit are copied unchanged.
pub fn cap_longest_edge(
    buffer: &PixelBuffer,
    max_edge: u32,
    filter: ResampleFilter,
) -> Result<PixelBuffer, OptionsError> {
    let max_edge = max_edge.max(1);
    if buffer.width <= max_edge && buffer.height <= max_edge {
        return Ok(buffer.clone());
    }

    let ratio = (max_edge as f64 / buffer.width as f64).min(max_edge as f64 / buffer.height as f64);
    let width = ((buffer.width as f64 * ratio).round() as u32).max(1);
    let height = ((buffer.height as f64 * ratio).round() as u32).max(1);
    resize_exact(buffer, width, height, filter)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

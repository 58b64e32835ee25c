//! Color filter compositing.
//!
//! Applies the visual filter set to RGBA pixel data.
//!
//! ## Filter Order
//! 1. Brightness
//! 2. Contrast
//! 3. Saturation
//! 4. Blur
//! 5. Grayscale
//! 6. Sepia
//!
//! All active filters are folded into one ordered pass over the buffer: the
//! per-pixel stages on either side of the (optional) blur convolution are
//! fused into single traversals, so filters cost at most two pixel passes
//! plus the blur. An entirely unset filter set short-circuits to a plain
//! copy.

use crate::buffer::PixelBuffer;
use crate::ImageFilters;

/// Largest accepted blur radius in pixels; larger requests are clamped.
const MAX_BLUR_RADIUS: f32 = 10.0;

/// Apply the composed filter pass to an image.
///
/// Alpha passes through untouched; only the color channels are adjusted.
/// A filter that is set to its neutral value (e.g. brightness 0) still
/// participates in the pass even though it changes nothing visually.
pub fn apply_filters(buffer: &PixelBuffer, filters: &ImageFilters) -> PixelBuffer {
    // Early exit when nothing is set at all.
    if filters.is_noop() {
        return buffer.clone();
    }

    let mut output = buffer.clone();

    if filters.brightness.is_some() || filters.contrast.is_some() || filters.saturation.is_some() {
        apply_tone_pass(&mut output.pixels, filters);
    }

    if let Some(radius) = filters.blur {
        let radius = radius.clamp(0.0, MAX_BLUR_RADIUS);
        if radius > 0.0 {
            output = gaussian_blur(&output, radius);
        }
    }

    if filters.grayscale || filters.sepia {
        apply_matrix_pass(&mut output.pixels, filters.grayscale, filters.sepia);
    }

    output
}

/// Map a -100..=100 slider value to a multiplicative factor.
///
/// Formula: `factor = 1 + value/100`
#[inline]
fn factor_for(value: i32) -> f32 {
    1.0 + value.clamp(-100, 100) as f32 / 100.0
}

/// Calculate luminance using ITU-R BT.709 coefficients.
#[inline]
fn luminance(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Fused brightness, contrast and saturation pass.
fn apply_tone_pass(pixels: &mut [u8], filters: &ImageFilters) {
    let brightness = filters.brightness.map(factor_for);
    let contrast = filters.contrast.map(factor_for);
    let saturation = filters.saturation.map(factor_for);

    for chunk in pixels.chunks_exact_mut(4) {
        let mut r = chunk[0] as f32 / 255.0;
        let mut g = chunk[1] as f32 / 255.0;
        let mut b = chunk[2] as f32 / 255.0;

        if let Some(factor) = brightness {
            r *= factor;
            g *= factor;
            b *= factor;
        }

        if let Some(factor) = contrast {
            let midpoint = 0.5;
            r = (r - midpoint) * factor + midpoint;
            g = (g - midpoint) * factor + midpoint;
            b = (b - midpoint) * factor + midpoint;
        }

        if let Some(factor) = saturation {
            let gray = luminance(r, g, b);
            r = gray + (r - gray) * factor;
            g = gray + (g - gray) * factor;
            b = gray + (b - gray) * factor;
        }

        chunk[0] = (r.clamp(0.0, 1.0) * 255.0) as u8;
        chunk[1] = (g.clamp(0.0, 1.0) * 255.0) as u8;
        chunk[2] = (b.clamp(0.0, 1.0) * 255.0) as u8;
    }
}

/// Fused grayscale and sepia color-matrix pass.
fn apply_matrix_pass(pixels: &mut [u8], grayscale: bool, sepia: bool) {
    for chunk in pixels.chunks_exact_mut(4) {
        let mut r = chunk[0] as f32 / 255.0;
        let mut g = chunk[1] as f32 / 255.0;
        let mut b = chunk[2] as f32 / 255.0;

        if grayscale {
            let gray = luminance(r, g, b);
            r = gray;
            g = gray;
            b = gray;
        }

        if sepia {
            let (sr, sg, sb) = (
                0.393 * r + 0.769 * g + 0.189 * b,
                0.349 * r + 0.686 * g + 0.168 * b,
                0.272 * r + 0.534 * g + 0.131 * b,
            );
            r = sr;
            g = sg;
            b = sb;
        }

        chunk[0] = (r.clamp(0.0, 1.0) * 255.0) as u8;
        chunk[1] = (g.clamp(0.0, 1.0) * 255.0) as u8;
        chunk[2] = (b.clamp(0.0, 1.0) * 255.0) as u8;
    }
}

/// Gaussian blur via the image crate's convolution.
fn gaussian_blur(buffer: &PixelBuffer, radius: f32) -> PixelBuffer {
    // Buffers built through this crate always satisfy the length invariant.
    match buffer.to_rgba_image() {
        Some(img) => PixelBuffer::from_rgba_image(image::imageops::blur(&img, radius)),
        None => buffer.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to build a single-pixel buffer from RGBA values.
    fn pixel(r: u8, g: u8, b: u8, a: u8) -> PixelBuffer {
        PixelBuffer::new(1, 1, vec![r, g, b, a])
    }

    fn apply(buffer: &PixelBuffer, filters: &ImageFilters) -> Vec<u8> {
        apply_filters(buffer, filters).pixels
    }

    // ===== Identity Tests =====

    #[test]
    fn test_identity_no_filters() {
        let buf = pixel(128, 64, 192, 255);
        let filters = ImageFilters::default();
        assert_eq!(apply(&buf, &filters), buf.pixels);
    }

    #[test]
    fn test_explicit_neutral_values_are_visual_noop() {
        let buf = pixel(128, 64, 192, 255);
        let mut filters = ImageFilters::default();
        filters.brightness = Some(0);
        filters.contrast = Some(0);
        filters.saturation = Some(0);
        // Set but neutral: the pass runs yet nothing changes.
        assert!(!filters.is_noop());
        assert_eq!(apply(&buf, &filters), buf.pixels);
    }

    // ===== Brightness Tests =====

    #[test]
    fn test_brightness_doubles() {
        let buf = pixel(64, 64, 64, 255);
        let mut filters = ImageFilters::default();
        filters.brightness = Some(100);
        assert_eq!(apply(&buf, &filters), vec![128, 128, 128, 255]);
    }

    #[test]
    fn test_brightness_halves() {
        let buf = pixel(128, 128, 128, 255);
        let mut filters = ImageFilters::default();
        filters.brightness = Some(-50);
        assert_eq!(apply(&buf, &filters), vec![64, 64, 64, 255]);
    }

    #[test]
    fn test_brightness_clips_at_white() {
        let buf = pixel(200, 200, 200, 255);
        let mut filters = ImageFilters::default();
        filters.brightness = Some(100);
        assert_eq!(apply(&buf, &filters), vec![255, 255, 255, 255]);
    }

    // ===== Contrast Tests =====

    #[test]
    fn test_contrast_spreads_values() {
        let buf = PixelBuffer::new(
            3,
            1,
            vec![64, 64, 64, 255, 128, 128, 128, 255, 192, 192, 192, 255],
        );
        let mut filters = ImageFilters::default();
        filters.contrast = Some(100);
        let result = apply(&buf, &filters);
        assert!(result[0] < 64, "dark pixel gets darker");
        assert!((result[4] as i32 - 128).abs() < 5, "midpoint stays put");
        assert_eq!(result[8], 255, "bright pixel clips at white");
    }

    #[test]
    fn test_contrast_negative_flattens() {
        let buf = PixelBuffer::new(2, 1, vec![0, 0, 0, 255, 255, 255, 255, 255]);
        let mut filters = ImageFilters::default();
        filters.contrast = Some(-50);
        let result = apply(&buf, &filters);
        assert!(result[0] > 0, "black moves toward gray");
        assert!(result[4] < 255, "white moves toward gray");
    }

    // ===== Saturation Tests =====

    #[test]
    fn test_saturation_full_desaturate_is_grayscale() {
        let buf = pixel(200, 128, 100, 255);
        let mut filters = ImageFilters::default();
        filters.saturation = Some(-100);
        let result = apply(&buf, &filters);
        assert_eq!(result[0], result[1]);
        assert_eq!(result[1], result[2]);
    }

    #[test]
    fn test_saturation_increase_spreads_channels() {
        let buf = pixel(200, 128, 100, 255);
        let mut filters = ImageFilters::default();
        filters.saturation = Some(50);
        let result = apply(&buf, &filters);
        let original_spread = 200 - 100;
        let new_spread = result[0] as i32 - result[2] as i32;
        assert!(new_spread > original_spread);
    }

    // ===== Grayscale / Sepia Tests =====

    #[test]
    fn test_grayscale_equalizes_channels() {
        let buf = pixel(255, 0, 0, 255);
        let mut filters = ImageFilters::default();
        filters.grayscale = true;
        let result = apply(&buf, &filters);
        assert_eq!(result[0], result[1]);
        assert_eq!(result[1], result[2]);
        // BT.709 red weight: 0.2126 * 255 = 54
        assert_eq!(result[0], 54);
    }

    #[test]
    fn test_sepia_of_white() {
        let buf = pixel(255, 255, 255, 255);
        let mut filters = ImageFilters::default();
        filters.sepia = true;
        let result = apply(&buf, &filters);
        // Red and green rows exceed 1.0 and clip; blue lands at 0.937.
        assert_eq!(result[0], 255);
        assert_eq!(result[1], 255);
        assert_eq!(result[2], 238);
    }

    #[test]
    fn test_grayscale_then_sepia_composes() {
        let buf = pixel(10, 200, 40, 255);
        let mut both = ImageFilters::default();
        both.grayscale = true;
        both.sepia = true;

        let mut gray_only = ImageFilters::default();
        gray_only.grayscale = true;
        let gray = apply_filters(&buf, &gray_only);

        let mut sepia_only = ImageFilters::default();
        sepia_only.sepia = true;

        assert_eq!(apply(&buf, &both), apply(&gray, &sepia_only));
    }

    // ===== Blur Tests =====

    #[test]
    fn test_blur_softens_edge() {
        // Left half black, right half white.
        let mut pixels = Vec::new();
        for _ in 0..8 {
            for x in 0..8 {
                let v = if x < 4 { 0 } else { 255 };
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let buf = PixelBuffer::new(8, 8, pixels);
        let mut filters = ImageFilters::default();
        filters.blur = Some(2.0);
        let result = apply_filters(&buf, &filters);

        assert_eq!(result.width, 8);
        assert_eq!(result.height, 8);
        assert_ne!(result.pixels, buf.pixels, "edge should be softened");
    }

    #[test]
    fn test_blur_zero_radius_is_noop() {
        let buf = pixel(90, 90, 90, 255);
        let mut filters = ImageFilters::default();
        filters.blur = Some(0.0);
        assert_eq!(apply(&buf, &filters), buf.pixels);
    }

    // ===== Alpha Tests =====

    #[test]
    fn test_alpha_is_untouched() {
        let buf = pixel(200, 100, 50, 128);
        let mut filters = ImageFilters::default();
        filters.brightness = Some(40);
        filters.grayscale = true;
        let result = apply(&buf, &filters);
        assert_eq!(result[3], 128);
    }

    // ===== Combined Tests =====

    #[test]
    fn test_extreme_values_stay_in_range() {
        let buf = pixel(128, 128, 128, 255);
        let mut filters = ImageFilters::default();
        filters.brightness = Some(100);
        filters.contrast = Some(100);
        filters.saturation = Some(100);
        filters.grayscale = true;
        filters.sepia = true;
        let result = apply(&buf, &filters);
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_out_of_range_slider_values_clamp() {
        let buf = pixel(100, 100, 100, 255);
        let mut extreme = ImageFilters::default();
        extreme.brightness = Some(500);
        let mut max = ImageFilters::default();
        max.brightness = Some(100);
        assert_eq!(apply(&buf, &extreme), apply(&buf, &max));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

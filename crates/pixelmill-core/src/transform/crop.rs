//! Rectangle extraction.
//!
//! The crop rectangle is taken verbatim in pixel coordinates. A rectangle
//! that escapes the source bounds is a caller error, not something to clamp:
//! the rectangle was chosen against a specific buffer and silently shifting
//! it would crop the wrong content.

use crate::buffer::PixelBuffer;
use crate::{CropRegion, OptionsError};

/// Extract a rectangle from an image.
///
/// The output dimensions equal the rectangle's dimensions and the pixels are
/// copied unchanged.
///
/// # Errors
///
/// Returns [`OptionsError::EmptyCropRegion`] for a zero-area rectangle and
/// [`OptionsError::CropOutOfBounds`] when the rectangle does not lie fully
/// inside the source buffer.
pub fn apply_crop(buffer: &PixelBuffer, region: CropRegion) -> Result<PixelBuffer, OptionsError> {
    if region.width == 0 || region.height == 0 {
        return Err(OptionsError::EmptyCropRegion(region));
    }

    let right = region.x.checked_add(region.width);
    let bottom = region.y.checked_add(region.height);
    let in_bounds = matches!((right, bottom), (Some(r), Some(b))
        if r <= buffer.width && b <= buffer.height);
    if !in_bounds {
        return Err(OptionsError::CropOutOfBounds {
            region,
            width: buffer.width,
            height: buffer.height,
        });
    }

    let src_stride = buffer.width as usize * 4;
    let row_bytes = region.width as usize * 4;
    let mut output = Vec::with_capacity(region.height as usize * row_bytes);

    // Rows are contiguous, so each can be copied as one slice.
    for y in 0..region.height as usize {
        let src_y = region.y as usize + y;
        let start = src_y * src_stride + region.x as usize * 4;
        output.extend_from_slice(&buffer.pixels[start..start + row_bytes]);
    }

    Ok(PixelBuffer::new(region.width, region.height, output))
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (4u32..=64, 4u32..=64)
    }

    fn create_test_buffer(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    proptest! {
        /// Property: an in-bounds rectangle always succeeds with matching
        /// output dimensions and pixel length.
        #[test]
        fn prop_in_bounds_crop_succeeds(
            (width, height) in dimensions_strategy(),
            fraction in 0.1f64..=1.0,
        ) {
            let buf = create_test_buffer(width, height);
            let crop_w = ((width as f64 * fraction) as u32).max(1);
            let crop_h = ((height as f64 * fraction) as u32).max(1);
            let x = (width - crop_w) / 2;
            let y = (height - crop_h) / 2;

            let result = apply_crop(&buf, CropRegion::new(x, y, crop_w, crop_h)).unwrap();
            prop_assert_eq!(result.width, crop_w);
            prop_assert_eq!(result.height, crop_h);
            prop_assert_eq!(result.pixels.len(), (crop_w * crop_h * 4) as usize);
        }

        /// Property: any rectangle extending past the bounds errors and
        /// never produces a buffer.
        #[test]
        fn prop_out_of_bounds_crop_errors(
            (width, height) in dimensions_strategy(),
            overhang in 1u32..=16,
        ) {
            let buf = create_test_buffer(width, height);
            let result = apply_crop(&buf, CropRegion::new(0, 0, width + overhang, height));
            prop_assert!(
                matches!(result, Err(OptionsError::CropOutOfBounds { .. })),
                "expected CropOutOfBounds error"
            );
        }

        /// Property: cropping is deterministic.
        #[test]
        fn prop_crop_deterministic(
            (width, height) in dimensions_strategy(),
        ) {
            let buf = create_test_buffer(width, height);
            let region = CropRegion::new(1, 1, width - 2, height - 2);
            let a = apply_crop(&buf, region).unwrap();
            let b = apply_crop(&buf, region).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Property: cropped pixels match the source at the offset position.
        #[test]
        fn prop_crop_preserves_values(
            (width, height) in (8u32..=32, 8u32..=32),
            x in 0u32..=4,
            y in 0u32..=4,
        ) {
            let buf = create_test_buffer(width, height);
            let region = CropRegion::new(x, y, 4, 4);
            let result = apply_crop(&buf, region).unwrap();

            let expected = ((y * width + x) % 256) as u8;
            prop_assert_eq!(result.pixels[0], expected);
        }
    }
}

//! Rotation in 90-degree steps.
//!
//! The editing surface only offers quarter-turn rotations, so rotation is an
//! exact index remapping with no resampling and no uncovered canvas. The
//! general bounding-box computation is still exposed for dimension
//! calculations.

use crate::buffer::PixelBuffer;
use crate::OptionsError;

/// Compute the dimensions of the bounding box for a rotated image.
///
/// The enclosing box of a rectangle rotated by θ is
/// `new_w = |w·cos θ| + |h·sin θ|`, `new_h = |w·sin θ| + |h·cos θ|`,
/// with exact fast paths at the quarter-turn stops so 90/270 swap the
/// dimensions precisely.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let normalized = degrees.rem_euclid(360.0);

    if normalized.abs() < 0.001 || (360.0 - normalized).abs() < 0.001 {
        return (width, height);
    }
    if (normalized - 90.0).abs() < 0.001 || (normalized - 270.0).abs() < 0.001 {
        return (height, width);
    }
    if (normalized - 180.0).abs() < 0.001 {
        return (width, height);
    }

    let radians = degrees.to_radians();
    let cos = radians.cos().abs();
    let sin = radians.sin().abs();
    let w = width as f64;
    let h = height as f64;

    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;
    (new_w.max(1), new_h.max(1))
}

/// Rotate an image about its center in 90-degree steps.
///
/// Positive degrees rotate clockwise; negative values are the same turn
/// taken the other way (-90 is equivalent to 270). Quarter turns swap the
/// canvas dimensions; a half turn keeps them.
///
/// # Errors
///
/// Returns [`OptionsError::InvalidRotation`] when `degrees` is not a
/// multiple of 90.
pub fn apply_rotation(buffer: &PixelBuffer, degrees: i32) -> Result<PixelBuffer, OptionsError> {
    if degrees % 90 != 0 {
        return Err(OptionsError::InvalidRotation(degrees));
    }

    let turns = degrees.rem_euclid(360) / 90;
    if turns == 0 {
        return Ok(buffer.clone());
    }

    let (src_w, src_h) = (buffer.width as usize, buffer.height as usize);
    let (dst_w, dst_h) = match turns {
        1 | 3 => (src_h, src_w),
        _ => (src_w, src_h),
    };

    let mut output = vec![0u8; dst_w * dst_h * 4];
    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            let (src_x, src_y) = match turns {
                // Clockwise quarter turn: the left column becomes the top row.
                1 => (dst_y, src_h - 1 - dst_x),
                // Half turn.
                2 => (src_w - 1 - dst_x, src_h - 1 - dst_y),
                // Counter-clockwise quarter turn.
                _ => (src_w - 1 - dst_y, dst_x),
            };
            let src_idx = (src_y * src_w + src_x) * 4;
            let dst_idx = (dst_y * dst_w + dst_x) * 4;
            output[dst_idx..dst_idx + 4].copy_from_slice(&buffer.pixels[src_idx..src_idx + 4]);
        }
    }

    Ok(PixelBuffer::new(dst_w as u32, dst_h as u32, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x1 image: red pixel left, blue pixel right.
    fn two_pixel_buffer() -> PixelBuffer {
        PixelBuffer::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255])
    }

    fn test_buffer(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    #[test]
    fn test_rotated_bounds_quarter_turns() {
        assert_eq!(rotated_bounds(100, 50, 90.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, 270.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, -90.0), (50, 100));
        assert_eq!(rotated_bounds(100, 50, 0.0), (100, 50));
        assert_eq!(rotated_bounds(100, 50, 180.0), (100, 50));
        assert_eq!(rotated_bounds(100, 50, 360.0), (100, 50));
    }

    #[test]
    fn test_rotated_bounds_diagonal() {
        // 45 degrees on a square: both edges grow to w*sqrt(2).
        let (w, h) = rotated_bounds(100, 100, 45.0);
        assert_eq!(w, 141);
        assert_eq!(h, 141);
    }

    #[test]
    fn test_rotation_rejects_off_grid_angles() {
        let buf = test_buffer(4, 4);
        assert!(matches!(
            apply_rotation(&buf, 45),
            Err(OptionsError::InvalidRotation(45))
        ));
    }

    #[test]
    fn test_rotation_zero_is_identity() {
        let buf = test_buffer(5, 3);
        let result = apply_rotation(&buf, 0).unwrap();
        assert_eq!(result, buf);
    }

    #[test]
    fn test_rotation_90_swaps_dimensions() {
        let buf = test_buffer(6, 3);
        let result = apply_rotation(&buf, 90).unwrap();
        assert_eq!(result.width, 3);
        assert_eq!(result.height, 6);
    }

    #[test]
    fn test_rotation_90_moves_pixels_clockwise() {
        let buf = two_pixel_buffer();
        let rotated = apply_rotation(&buf, 90).unwrap();
        assert_eq!(rotated.width, 1);
        assert_eq!(rotated.height, 2);
        // Red (left) ends up on top, blue (right) below.
        assert_eq!(&rotated.pixels[0..4], &[255, 0, 0, 255]);
        assert_eq!(&rotated.pixels[4..8], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_rotation_negative_90_equals_270() {
        let buf = test_buffer(7, 4);
        let ccw = apply_rotation(&buf, -90).unwrap();

        let mut three_quarters = buf.clone();
        for _ in 0..3 {
            three_quarters = apply_rotation(&three_quarters, 90).unwrap();
        }
        assert_eq!(ccw, three_quarters);
    }

    #[test]
    fn test_rotation_180_reverses_pixels() {
        let buf = two_pixel_buffer();
        let rotated = apply_rotation(&buf, 180).unwrap();
        assert_eq!(rotated.width, 2);
        assert_eq!(rotated.height, 1);
        assert_eq!(&rotated.pixels[0..4], &[0, 0, 255, 255]);
        assert_eq!(&rotated.pixels[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_rotation_negative_180_equals_180() {
        let buf = test_buffer(5, 4);
        assert_eq!(
            apply_rotation(&buf, -180).unwrap(),
            apply_rotation(&buf, 180).unwrap()
        );
    }

    #[test]
    fn test_four_quarter_turns_restore_image() {
        let buf = test_buffer(9, 5);
        let mut current = buf.clone();
        for _ in 0..4 {
            current = apply_rotation(&current, 90).unwrap();
        }
        assert_eq!(current, buf);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

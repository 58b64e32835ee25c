//! Mirror operations.

use crate::buffer::PixelBuffer;
use crate::FlipDirection;

/// Mirror an image horizontally, vertically, or both.
///
/// Dimensions are unchanged. `Both` sets both mirrored coordinates in a
/// single pass, which is the same result as flipping horizontally and then
/// vertically (or a 180-degree rotation).
pub fn apply_flip(buffer: &PixelBuffer, direction: FlipDirection) -> PixelBuffer {
    if direction == FlipDirection::None {
        return buffer.clone();
    }

    let (w, h) = (buffer.width as usize, buffer.height as usize);
    let mirror_x = matches!(direction, FlipDirection::Horizontal | FlipDirection::Both);
    let mirror_y = matches!(direction, FlipDirection::Vertical | FlipDirection::Both);

    let mut output = vec![0u8; w * h * 4];
    for y in 0..h {
        let src_y = if mirror_y { h - 1 - y } else { y };
        for x in 0..w {
            let src_x = if mirror_x { w - 1 - x } else { x };
            let src_idx = (src_y * w + src_x) * 4;
            let dst_idx = (y * w + x) * 4;
            output[dst_idx..dst_idx + 4].copy_from_slice(&buffer.pixels[src_idx..src_idx + 4]);
        }
    }

    PixelBuffer::new(buffer.width, buffer.height, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

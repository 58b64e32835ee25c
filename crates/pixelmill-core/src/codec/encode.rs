//! Per-format encoding with a normalized quality scale.
//!
//! Quality arrives normalized to [0, 1]; callers on the 1-100 scale divide
//! before handing off. Formats without a lossy level ignore the value
//! entirely, which keeps their output byte-identical across quality
//! settings. Encoding is deterministic for identical (buffer, format,
//! quality) inputs, a property the target-size search relies on.

use std::io::Cursor;

use image::codecs::avif::AvifEncoder;
use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::buffer::PixelBuffer;
use crate::codec::format::OutputFormat;

/// AVIF encoder effort (1 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero.
    #[error("invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match the declared dimensions.
    #[error("invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// The underlying encoder rejected the image.
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: OutputFormat,
        message: String,
    },
}

/// The terminal artifact of a conversion: encoded bytes plus their format.
#[derive(Debug, Clone)]
pub struct EncodedResult {
    bytes: Vec<u8>,
    format: OutputFormat,
}

impl EncodedResult {
    pub fn new(bytes: Vec<u8>, format: OutputFormat) -> Self {
        Self { bytes, format }
    }

    /// The encoded byte stream.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Encoded size in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Encode a pixel buffer into the requested format.
///
/// # Arguments
///
/// * `buffer` - RGBA pixel buffer to encode
/// * `format` - Target encoding
/// * `quality` - Normalized quality in [0, 1]; values outside are clamped.
///   Ignored for PNG, BMP, GIF and TIFF.
///
/// # Errors
///
/// Returns [`EncodeError::InvalidDimensions`] or
/// [`EncodeError::InvalidPixelData`] when the buffer is inconsistent, and
/// [`EncodeError::EncodingFailed`] when the format encoder refuses it.
pub fn encode(
    buffer: &PixelBuffer,
    format: OutputFormat,
    quality: f32,
) -> Result<EncodedResult, EncodeError> {
    if buffer.width == 0 || buffer.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: buffer.width,
            height: buffer.height,
        });
    }
    let expected = buffer.width as usize * buffer.height as usize * 4;
    if buffer.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: buffer.pixels.len(),
        });
    }

    let quality = quality.clamp(0.0, 1.0);
    let failed = |e: image::ImageError| EncodeError::EncodingFailed {
        format,
        message: e.to_string(),
    };

    let mut cursor = Cursor::new(Vec::new());
    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel; flatten onto black the way a
            // canvas export does.
            let rgb = flatten_to_rgb(buffer);
            let encoder = JpegEncoder::new_with_quality(&mut cursor, percent_quality(quality));
            encoder
                .write_image(&rgb, buffer.width, buffer.height, ExtendedColorType::Rgb8)
                .map_err(failed)?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new(&mut cursor);
            encoder
                .write_image(
                    &buffer.pixels,
                    buffer.width,
                    buffer.height,
                    ExtendedColorType::Rgba8,
                )
                .map_err(failed)?;
        }
        OutputFormat::WebP => {
            // The image crate's WebP encoder is lossless-only, so lossy
            // quality goes through libwebp.
            let encoder = webp::Encoder::from_rgba(&buffer.pixels, buffer.width, buffer.height);
            let memory = encoder.encode(quality * 100.0);
            return Ok(EncodedResult::new(memory.to_vec(), format));
        }
        OutputFormat::Avif => {
            let encoder =
                AvifEncoder::new_with_speed_quality(&mut cursor, AVIF_SPEED, percent_quality(quality));
            encoder
                .write_image(
                    &buffer.pixels,
                    buffer.width,
                    buffer.height,
                    ExtendedColorType::Rgba8,
                )
                .map_err(failed)?;
        }
        OutputFormat::Bmp => {
            let encoder = BmpEncoder::new(&mut cursor);
            encoder
                .write_image(
                    &buffer.pixels,
                    buffer.width,
                    buffer.height,
                    ExtendedColorType::Rgba8,
                )
                .map_err(failed)?;
        }
        OutputFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut cursor);
            encoder
                .encode(
                    &buffer.pixels,
                    buffer.width,
                    buffer.height,
                    ExtendedColorType::Rgba8,
                )
                .map_err(failed)?;
        }
        OutputFormat::Tiff => {
            let encoder = TiffEncoder::new(&mut cursor);
            encoder
                .write_image(
                    &buffer.pixels,
                    buffer.width,
                    buffer.height,
                    ExtendedColorType::Rgba8,
                )
                .map_err(failed)?;
        }
    }

    Ok(EncodedResult::new(cursor.into_inner(), format))
}

/// Map normalized quality to the 1-100 scale used by JPEG and AVIF.
fn percent_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Drop the alpha channel by compositing onto a black background.
fn flatten_to_rgb(buffer: &PixelBuffer) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(buffer.width as usize * buffer.height as usize * 3);
    for pixel in buffer.pixels.chunks_exact(4) {
        let alpha = pixel[3] as u16;
        rgb.push((pixel[0] as u16 * alpha / 255) as u8);
        rgb.push((pixel[1] as u16 * alpha / 255) as u8);
        rgb.push((pixel[2] as u16 * alpha / 255) as u8);
    }
    rgb
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating image dimensions (keep small for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=32, 1u32..=32)
    }

    fn quality_strategy() -> impl Strategy<Value = f32> {
        0.0f32..=1.0
    }

    fn filled_buffer(width: u32, height: u32, value: u8) -> PixelBuffer {
        let mut pixels = vec![value; (width * height * 4) as usize];
        for alpha in pixels.iter_mut().skip(3).step_by(4) {
            *alpha = 255;
        }
        PixelBuffer::new(width, height, pixels)
    }

    proptest! {
        /// Property: valid buffers encode to non-empty JPEG streams with
        /// intact markers for any quality.
        #[test]
        fn prop_jpeg_always_valid(
            (width, height) in dimensions_strategy(),
            quality in quality_strategy(),
        ) {
            let buffer = filled_buffer(width, height, 128);
            let result = encode(&buffer, OutputFormat::Jpeg, quality);
            prop_assert!(result.is_ok());

            let bytes = result.unwrap().into_bytes();
            prop_assert!(bytes.len() >= 4);
            prop_assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
            prop_assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
        }

        /// Property: PNG output does not depend on the quality argument.
        #[test]
        fn prop_png_quality_independent(
            (width, height) in dimensions_strategy(),
            quality in quality_strategy(),
        ) {
            let buffer = filled_buffer(width, height, 77);
            let reference = encode(&buffer, OutputFormat::Png, 1.0).unwrap();
            let other = encode(&buffer, OutputFormat::Png, quality).unwrap();
            prop_assert_eq!(reference.bytes(), other.bytes());
        }

        /// Property: mismatched pixel data always errors, never panics.
        #[test]
        fn prop_pixel_mismatch_errors(
            (width, height) in dimensions_strategy(),
            delta in prop::sample::select(vec![-4i64, -1, 1, 4, 17]),
        ) {
            let expected = width as i64 * height as i64 * 4;
            let actual = (expected + delta).max(0) as usize;
            prop_assume!(actual as i64 != expected);

            let buffer = PixelBuffer {
                width,
                height,
                pixels: vec![0u8; actual],
            };
            prop_assert!(
                matches!(
                    encode(&buffer, OutputFormat::Png, 1.0),
                    Err(EncodeError::InvalidPixelData { .. })
                ),
                "expected InvalidPixelData error"
            );
        }
    }
}

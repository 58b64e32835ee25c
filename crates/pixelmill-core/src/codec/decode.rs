//! Byte-stream decoding with EXIF orientation handling.
//!
//! Decoding guesses the container format from magic numbers, so the caller
//! never declares what it is handing over. EXIF orientation (when present)
//! is applied before the buffer is returned, matching what a browser's
//! decoder does implicitly before any editing starts.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader};
use thiserror::Error;

use crate::buffer::PixelBuffer;

/// Errors that can occur while turning bytes into pixels.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The byte stream is not a recognized image container.
    #[error("invalid or unrecognized image format")]
    InvalidFormat,

    /// The container is recognized but cannot be decoded with the enabled
    /// codecs (e.g. AVIF input).
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The image file is corrupted or incomplete.
    #[error("corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Decode an image byte stream into an RGBA pixel buffer.
///
/// The container format is guessed from the stream itself. If the stream
/// carries an EXIF orientation tag, the matching transform is applied so the
/// returned buffer is upright.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidFormat`] when the bytes are not a
/// recognized container, [`DecodeError::UnsupportedFormat`] when no decoder
/// is available for it, and [`DecodeError::CorruptedFile`] for truncated or
/// malformed streams.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    if image::guess_format(bytes).is_err() {
        return Err(DecodeError::InvalidFormat);
    }

    // Extract EXIF orientation before decoding; absent or unreadable EXIF
    // data means no correction.
    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(unsupported) => {
            DecodeError::UnsupportedFormat(unsupported.to_string())
        }
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    let oriented = apply_orientation(img, orientation);
    Ok(PixelBuffer::from_rgba_image(oriented.into_rgba8()))
}

/// Extract the EXIF orientation tag from an encoded stream.
///
/// Returns `Orientation::Normal` if no EXIF data is found or the tag cannot
/// be read.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => {
            if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
                if let Some(value) = field.value.get_uint(0) {
                    return Orientation::from(value);
                }
            }
            Orientation::Normal
        }
        Err(_) => Orientation::Normal,
    }
}

/// Apply an EXIF orientation transformation to a decoded image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

//! The request orchestrator.
//!
//! One linear pass with no back-edges: decode, filters, rotate, flip, crop,
//! resize, then exactly one of target-size search, size-bounded quality
//! compression, or a plain terminal encode. A failure at any stage aborts
//! the whole request with that stage's error and drops the intermediate
//! buffers on unwind.

use thiserror::Error;

use crate::buffer::PixelBuffer;
use crate::codec::{self, DecodeError, EncodeError, EncodedResult, OutputFormat};
use crate::filters::apply_filters;
use crate::target_size::compress_to_target_size;
use crate::transform::{
    apply_crop, apply_flip, apply_resize, apply_rotation, cap_longest_edge, resize_exact,
    ResampleFilter,
};
use crate::{ConversionOptions, FlipDirection, OptionsError};

/// Dimension cap for quality compression when no resize was requested.
const DEFAULT_DIMENSION_CAP: u32 = 1920;
/// Byte ceiling for the size-bounded compression below quality 50.
const LOW_QUALITY_SIZE_CEILING: u64 = 512 * 1024;
/// Byte ceiling at quality 50 and above.
const SIZE_CEILING: u64 = 1024 * 1024;
const LOW_QUALITY_THRESHOLD: u8 = 50;
/// Bounds for the size-ceiling loop.
const MAX_SIZE_BOUND_ROUNDS: u32 = 10;
const SIZE_BOUND_QUALITY_DECAY: f32 = 0.8;
const SIZE_BOUND_MIN_QUALITY: f32 = 0.05;
const SIZE_BOUND_DIMENSION_DECAY: f64 = 0.9;

/// Any failure while processing a conversion request.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    InvalidOptions(#[from] OptionsError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Run one conversion request from encoded bytes to encoded bytes.
///
/// Operations apply in a fixed order: filters, rotation, flip, crop,
/// resize. An enabled target file size then takes precedence over the
/// quality field and performs the terminal encode itself; otherwise a
/// quality below 100 goes through size-bounded compression, and quality 100
/// encodes directly. When nothing was applied at all and the source already
/// has the requested format, the input bytes pass through unchanged.
pub fn convert_and_compress(
    bytes: &[u8],
    options: &ConversionOptions,
) -> Result<EncodedResult, ConvertError> {
    options.validate()?;

    let source_format = OutputFormat::detect(bytes);
    let mut buffer = codec::decode(bytes)?;
    let mut touched = false;

    if !options.filters.is_noop() {
        buffer = apply_filters(&buffer, &options.filters);
        touched = true;
    }

    if options.rotate != 0 {
        buffer = apply_rotation(&buffer, options.rotate)?;
        touched = true;
    }

    if options.flip != FlipDirection::None {
        buffer = apply_flip(&buffer, options.flip);
        touched = true;
    }

    if let Some(region) = options.crop {
        buffer = apply_crop(&buffer, region)?;
        touched = true;
    }

    if options.max_width.is_some() || options.max_height.is_some() {
        buffer = apply_resize(
            &buffer,
            options.max_width,
            options.max_height,
            options.resize_mode,
            options.maintain_aspect_ratio,
            ResampleFilter::Lanczos3,
        )?;
        touched = true;
    }

    if let Some(target) = options.active_target() {
        // Target-size compression is terminal: format conversion folds into
        // the search's own encodes and no further step runs.
        return Ok(compress_to_target_size(
            &buffer,
            options.format,
            target.target_bytes(),
        )?);
    }

    if options.quality < 100 {
        return quality_compress(&buffer, source_format, options);
    }

    if !touched && source_format == options.format {
        // Nothing to do: hand the original stream back untouched.
        return Ok(EncodedResult::new(bytes.to_vec(), source_format));
    }

    Ok(codec::encode(&buffer, options.format, 1.0)?)
}

/// Size-bounded quality compression.
///
/// The longest edge is capped first (at the larger requested max dimension,
/// or 1920 when none was given) as a safety net independent of the explicit
/// resize step. When the source format differs from the requested one the
/// conversion encode at `quality/100` is terminal; otherwise the encode is
/// re-run under a conservative byte ceiling, decaying quality for lossy
/// formats and dimensions for quality-less ones. Best effort: missing the
/// ceiling after the bounded rounds is not an error.
fn quality_compress(
    buffer: &PixelBuffer,
    source_format: OutputFormat,
    options: &ConversionOptions,
) -> Result<EncodedResult, ConvertError> {
    let ceiling = if options.quality < LOW_QUALITY_THRESHOLD {
        LOW_QUALITY_SIZE_CEILING
    } else {
        SIZE_CEILING
    };
    let cap = options
        .max_width
        .unwrap_or(0)
        .max(options.max_height.unwrap_or(0));
    let cap = if cap == 0 { DEFAULT_DIMENSION_CAP } else { cap };

    let mut working = cap_longest_edge(buffer, cap, ResampleFilter::Lanczos3)?;
    let mut quality = options.quality as f32 / 100.0;

    if source_format != options.format {
        // The format conversion is the terminal encode and the requested
        // quality applies to it directly.
        return Ok(codec::encode(&working, options.format, quality)?);
    }

    let mut result = codec::encode(&working, options.format, quality)?;
    for _ in 0..MAX_SIZE_BOUND_ROUNDS {
        if result.byte_len() as u64 <= ceiling {
            break;
        }
        if options.format.supports_quality() {
            if quality <= SIZE_BOUND_MIN_QUALITY {
                break;
            }
            quality = (quality * SIZE_BOUND_QUALITY_DECAY).max(SIZE_BOUND_MIN_QUALITY);
        } else {
            let width =
                (((working.width as f64) * SIZE_BOUND_DIMENSION_DECAY).round() as u32).max(1);
            let height =
                (((working.height as f64) * SIZE_BOUND_DIMENSION_DECAY).round() as u32).max(1);
            working = resize_exact(&working, width, height, ResampleFilter::Lanczos3)?;
        }
        result = codec::encode(&working, options.format, quality)?;
    }

    Ok(result)
}

//! Bounded iterative search for a byte-size budget.
//!
//! Quality reduction is cheap and preserves framing, so it always runs
//! first; dimension reduction is the blunter fallback once quality has
//! exhausted its range. The search prefers the closest result that does not
//! exceed the target and is best-effort by design: an infeasible target
//! still yields the smallest encode the ratchet reaches, never an error.
//!
//! Every heuristic below is an empirically tuned constant rather than a
//! derived model, because encoder size-vs-quality curves are non-linear and
//! format-dependent. They are named so tests and tuning can reach them.

use crate::buffer::PixelBuffer;
use crate::codec::{self, EncodeError, EncodedResult, OutputFormat};
use crate::transform::{resize_exact, ResampleFilter};

/// Iteration ceiling for each quality binary search.
pub const MAX_QUALITY_ITERATIONS: u32 = 30;
/// The binary search stops once the quality interval is this narrow.
pub const QUALITY_INTERVAL_FLOOR: f64 = 0.005;
/// Normalized quality bounds for the search.
pub const MIN_QUALITY: f64 = 0.01;
pub const MAX_QUALITY: f64 = 1.0;

/// Acceptable deviation: 5% of the target or 1 KB, whichever is larger.
pub const TOLERANCE_FRACTION: f64 = 0.05;
pub const MIN_TOLERANCE_BYTES: u64 = 1024;

/// Safety margin on the area-based scale estimate when a candidate exists.
pub const CANDIDATE_SCALE_MARGIN: f64 = 0.85;
/// More aggressive margin when no under-target candidate was found.
pub const FALLBACK_SCALE_MARGIN: f64 = 0.7;
/// Mild shrink applied when the reference size is already under target.
pub const UNDER_TARGET_SHRINK: f64 = 0.95;

/// Scale floor, relaxed for small targets which need deeper cuts.
pub const MIN_SCALE: f64 = 0.1;
pub const MIN_SCALE_SMALL_TARGET: f64 = 0.05;
pub const SMALL_TARGET_BYTES: u64 = 100 * 1024;

/// Dimensions never drop below this during the search.
pub const MIN_SEARCH_DIMENSION: u32 = 50;

/// Last-resort ratchet: rounds, starting quality, and per-round decay.
pub const MAX_RATCHET_ROUNDS: u32 = 5;
pub const RATCHET_START_QUALITY: f64 = 0.1;
pub const RATCHET_QUALITY_DECAY: f64 = 0.9;
pub const RATCHET_DIMENSION_DECAY: f64 = 0.8;

/// The tolerance band around a target size.
pub fn tolerance_for(target_bytes: u64) -> u64 {
    ((target_bytes as f64 * TOLERANCE_FRACTION) as u64).max(MIN_TOLERANCE_BYTES)
}

/// Outcome of one quality binary search.
enum QualitySearch {
    /// An attempt landed under target and inside the tolerance band.
    Hit(EncodedResult),
    /// No attempt reached tolerance; this is the closest under-target one.
    Best(EncodedResult),
    /// Every attempt exceeded the target (or failed to encode). Carries the
    /// smallest over-target size seen, which seeds the scale estimate.
    Miss { smallest_oversize: Option<u64> },
}

/// Binary-search encode quality toward the target at fixed dimensions.
///
/// Only the current attempt and the best under-target candidate are alive
/// at any time; rejected attempts drop at the end of their iteration. An
/// encode failure narrows the interval downward just like an oversized
/// result, so one refused quality level cannot abort the search.
fn quality_search(
    buffer: &PixelBuffer,
    format: OutputFormat,
    target_bytes: u64,
    tolerance: u64,
) -> QualitySearch {
    let mut min_quality = MIN_QUALITY;
    let mut max_quality = MAX_QUALITY;
    let mut best: Option<(EncodedResult, u64)> = None;
    let mut smallest_oversize: Option<u64> = None;
    let mut iterations = 0;

    while iterations < MAX_QUALITY_ITERATIONS && (max_quality - min_quality) > QUALITY_INTERVAL_FLOOR
    {
        iterations += 1;
        let quality = (min_quality + max_quality) / 2.0;

        let attempt = match codec::encode(buffer, format, quality as f32) {
            Ok(attempt) => attempt,
            Err(_) => {
                max_quality = quality;
                continue;
            }
        };

        let size = attempt.byte_len() as u64;
        let diff = size.abs_diff(target_bytes);

        if size <= target_bytes && diff <= tolerance {
            return QualitySearch::Hit(attempt);
        }

        if size <= target_bytes {
            // Closest under-target candidate so far wins; the loser drops.
            if best.as_ref().map_or(true, |(_, best_diff)| diff < *best_diff) {
                best = Some((attempt, diff));
            }
            min_quality = quality;
        } else {
            smallest_oversize = Some(smallest_oversize.map_or(size, |s| s.min(size)));
            max_quality = quality;
        }
    }

    match best {
        Some((result, _)) => QualitySearch::Best(result),
        None => QualitySearch::Miss { smallest_oversize },
    }
}

/// Estimate a dimension scale factor from byte sizes, assuming encoded size
/// grows roughly with pixel area.
fn estimate_scale_factor(best_size: Option<u64>, reference_size: u64, target_bytes: u64) -> f64 {
    match best_size {
        Some(size) if size > target_bytes => {
            (target_bytes as f64 / size as f64).sqrt() * CANDIDATE_SCALE_MARGIN
        }
        Some(_) => UNDER_TARGET_SHRINK,
        None if reference_size > target_bytes => {
            (target_bytes as f64 / reference_size as f64).sqrt() * FALLBACK_SCALE_MARGIN
        }
        None => UNDER_TARGET_SHRINK,
    }
}

/// Clamp a scale factor to the permitted range for the given target.
fn clamp_scale(scale: f64, target_bytes: u64) -> f64 {
    let floor = if target_bytes < SMALL_TARGET_BYTES {
        MIN_SCALE_SMALL_TARGET
    } else {
        MIN_SCALE
    };
    scale.clamp(floor, 1.0)
}

/// Scale dimensions, flooring each at the search minimum.
fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let new_width = ((width as f64 * scale).round() as u32).max(MIN_SEARCH_DIMENSION);
    let new_height = ((height as f64 * scale).round() as u32).max(MIN_SEARCH_DIMENSION);
    (new_width, new_height)
}

/// Compress an already-transformed image to fit a byte budget.
///
/// Three phases, each bounded:
/// 1. Quality binary search at the buffer's own dimensions.
/// 2. One dimension reduction estimated from observed sizes, then the full
///    quality search again at the reduced dimensions.
/// 3. A fixed low-quality ratchet shrinking dimensions round by round,
///    finished by an unconditional minimum-quality encode.
///
/// The result is the closest encode found that does not exceed the target
/// when one exists; otherwise the final ratchet encode is returned as-is.
/// Callers that need to distinguish exact from approximate compare the
/// result size against the target themselves.
///
/// # Errors
///
/// Only a failed final encode surfaces as [`EncodeError`]; an unreachable
/// target alone never fails the request.
pub fn compress_to_target_size(
    buffer: &PixelBuffer,
    format: OutputFormat,
    target_bytes: u64,
) -> Result<EncodedResult, EncodeError> {
    let tolerance = tolerance_for(target_bytes);

    // Phase 1: quality alone at the original dimensions.
    let mut reference_size = buffer.byte_size() as u64;
    match quality_search(buffer, format, target_bytes, tolerance) {
        QualitySearch::Hit(result) | QualitySearch::Best(result) => return Ok(result),
        QualitySearch::Miss { smallest_oversize } => {
            if let Some(size) = smallest_oversize {
                reference_size = size;
            }
        }
    }

    // Phase 2: estimate a dimension cut from the sizes seen so far and
    // rerun the full quality search at the reduced size.
    let scale = clamp_scale(
        estimate_scale_factor(None, reference_size, target_bytes),
        target_bytes,
    );
    let (mut width, mut height) = scaled_dimensions(buffer.width, buffer.height, scale);

    let reduced = resize_buffer(buffer, width, height)?;
    match quality_search(&reduced, format, target_bytes, tolerance) {
        QualitySearch::Hit(result) | QualitySearch::Best(result) => return Ok(result),
        QualitySearch::Miss { .. } => {}
    }
    drop(reduced);

    // Phase 3: last-resort ratchet at fixed low quality.
    let mut quality = RATCHET_START_QUALITY;
    for _ in 0..MAX_RATCHET_ROUNDS {
        let attempt_buffer = resize_buffer(buffer, width, height)?;
        match codec::encode(&attempt_buffer, format, quality as f32) {
            Ok(result) if result.byte_len() as u64 <= target_bytes => return Ok(result),
            Ok(_) => {}
            Err(_) => break,
        }

        width = (((width as f64) * RATCHET_DIMENSION_DECAY).round() as u32)
            .max(MIN_SEARCH_DIMENSION);
        height = (((height as f64) * RATCHET_DIMENSION_DECAY).round() as u32)
            .max(MIN_SEARCH_DIMENSION);
        quality = (quality * RATCHET_QUALITY_DECAY).max(MIN_QUALITY);
    }

    // Unconditional final encode: the engine never fails a request just
    // because the target could not be hit.
    let final_buffer = resize_buffer(buffer, width, height)?;
    codec::encode(&final_buffer, format, MIN_QUALITY as f32)
}

/// Downscale for a search attempt. Search resizes favor speed over kernel
/// quality since they may run dozens of times per request.
fn resize_buffer(
    buffer: &PixelBuffer,
    width: u32,
    height: u32,
) -> Result<PixelBuffer, EncodeError> {
    resize_exact(buffer, width, height, ResampleFilter::Bilinear).map_err(|_| {
        EncodeError::InvalidPixelData {
            expected: buffer.width as usize * buffer.height as usize * 4,
            actual: buffer.pixels.len(),
        }
    })
}

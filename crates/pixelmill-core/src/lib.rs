//! Pixelmill Core - Image conversion and compression library
//!
//! This crate provides the core processing functionality for Pixelmill:
//! decoding, geometric transforms, color filters, format conversion, and
//! target-size compression. Every operation is a pure function over explicit
//! inputs; the crate holds no global state, so independent requests can run
//! in parallel without coordination.

pub mod buffer;
pub mod codec;
pub mod filters;
pub mod pipeline;
pub mod target_size;
pub mod transform;

pub use buffer::PixelBuffer;
pub use codec::{decode, encode, DecodeError, EncodeError, EncodedResult, OutputFormat};
pub use filters::apply_filters;
pub use pipeline::{convert_and_compress, ConvertError};
pub use target_size::compress_to_target_size;
pub use transform::{
    apply_crop, apply_flip, apply_resize, apply_rotation, rotated_bounds, ResampleFilter,
};

use thiserror::Error;

/// Errors raised by option validation before any pixel work happens.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// The crop region does not fit inside the buffer it is applied to.
    #[error("crop region {region:?} exceeds the {width}x{height} source bounds")]
    CropOutOfBounds {
        region: CropRegion,
        width: u32,
        height: u32,
    },

    /// The crop region has a zero width or height.
    #[error("crop region must have positive dimensions, got {0:?}")]
    EmptyCropRegion(CropRegion),

    /// Rotation is only offered in 90-degree steps.
    #[error("rotation must be a multiple of 90 in -180..=180, got {0}")]
    InvalidRotation(i32),

    /// Quality must be expressed on the 1-100 scale.
    #[error("quality must be in 1..=100, got {0}")]
    InvalidQuality(u8),

    /// Target file size must be a positive number of KB or MB.
    #[error("target file size must be positive, got {0}")]
    InvalidTargetSize(f64),

    /// Fill and Crop resizes stretch to an exact box, so both dimensions
    /// are required once either is given.
    #[error("resize mode {mode:?} requires both max_width and max_height")]
    IncompleteResizeTarget { mode: ResizeMode },

    /// A hand-built buffer whose pixel length disagrees with its
    /// dimensions. Buffers constructed through this crate cannot hit this.
    #[error("pixel buffer length does not match its declared dimensions")]
    MalformedBuffer,
}

/// How an image is fitted when a maximum width/height is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Scale down to fit within the bounds; never upscales.
    #[default]
    Fit,
    /// Stretch to exactly the requested dimensions, ignoring aspect ratio.
    Fill,
    /// Scale to cover the requested box, then center-crop to it.
    Crop,
}

/// Mirror axis for the flip operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipDirection {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

/// A crop rectangle in source pixel coordinates, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Visual filters applied before any geometric operation.
///
/// Every field is optional: an unset filter contributes nothing to the
/// composed pass, while an explicitly set neutral value (e.g. brightness 0)
/// still participates even though it is a visual no-op.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImageFilters {
    /// Brightness adjustment (-100 to 100), factor `1 + value/100`.
    pub brightness: Option<i32>,
    /// Contrast adjustment (-100 to 100), factor `1 + value/100`.
    pub contrast: Option<i32>,
    /// Saturation adjustment (-100 to 100), factor `1 + value/100`.
    pub saturation: Option<i32>,
    /// Gaussian blur radius in pixels (0 to 10).
    pub blur: Option<f32>,
    /// Convert to grayscale using BT.709 luma weights.
    pub grayscale: bool,
    /// Apply the standard sepia color matrix.
    pub sepia: bool,
}

impl ImageFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no filter field is set at all, allowing the compositor to
    /// short-circuit without traversing the buffer.
    pub fn is_noop(&self) -> bool {
        self.brightness.is_none()
            && self.contrast.is_none()
            && self.saturation.is_none()
            && self.blur.is_none()
            && !self.grayscale
            && !self.sepia
    }
}

/// Unit for the target file size constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SizeUnit {
    KB,
    MB,
}

impl SizeUnit {
    pub fn bytes(self) -> u64 {
        match self {
            SizeUnit::KB => 1024,
            SizeUnit::MB => 1024 * 1024,
        }
    }
}

/// Target file size constraint for the compression search.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TargetFileSize {
    pub enabled: bool,
    pub size: f64,
    pub unit: SizeUnit,
}

impl TargetFileSize {
    /// The target expressed in bytes.
    pub fn target_bytes(&self) -> u64 {
        (self.size * self.unit.bytes() as f64).round() as u64
    }
}

impl Default for TargetFileSize {
    fn default() -> Self {
        Self {
            enabled: false,
            size: 1.0,
            unit: SizeUnit::MB,
        }
    }
}

/// Full description of one conversion request.
///
/// Supplied whole by the caller and never mutated by the engine, so a host
/// can cache results keyed on (source bytes, options) equality.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOptions {
    /// Requested output format.
    pub format: OutputFormat,
    /// Encode quality (1-100). Ignored by formats without a lossy level.
    pub quality: u8,
    /// Maximum output width in pixels.
    pub max_width: Option<u32>,
    /// Maximum output height in pixels.
    pub max_height: Option<u32>,
    /// Preserve aspect ratio in Fit mode.
    pub maintain_aspect_ratio: bool,
    /// How the max dimensions are interpreted.
    pub resize_mode: ResizeMode,
    /// Explicit crop rectangle, applied after rotation and flip.
    pub crop: Option<CropRegion>,
    /// Rotation in degrees, a multiple of 90 in -180..=180.
    pub rotate: i32,
    /// Mirror axis.
    pub flip: FlipDirection,
    /// Color filters.
    pub filters: ImageFilters,
    /// Optional target file size; takes precedence over `quality`.
    pub target_file_size: Option<TargetFileSize>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: 80,
            max_width: None,
            max_height: None,
            maintain_aspect_ratio: true,
            resize_mode: ResizeMode::Fit,
            crop: None,
            rotate: 0,
            flip: FlipDirection::None,
            filters: ImageFilters::default(),
            target_file_size: None,
        }
    }
}

impl ConversionOptions {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Check the request for contradictions before any pixel work.
    ///
    /// Crop bounds are not checked here: the rectangle is validated against
    /// the buffer it is eventually applied to, which may have rotated
    /// dimensions by then.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.quality < 1 || self.quality > 100 {
            return Err(OptionsError::InvalidQuality(self.quality));
        }
        if self.rotate % 90 != 0 || !(-180..=180).contains(&self.rotate) {
            return Err(OptionsError::InvalidRotation(self.rotate));
        }
        if let Some(target) = &self.target_file_size {
            if target.enabled && !(target.size > 0.0 && target.size.is_finite()) {
                return Err(OptionsError::InvalidTargetSize(target.size));
            }
        }
        if matches!(self.resize_mode, ResizeMode::Fill | ResizeMode::Crop)
            && self.max_width.is_some() != self.max_height.is_some()
        {
            return Err(OptionsError::IncompleteResizeTarget {
                mode: self.resize_mode,
            });
        }
        Ok(())
    }

    /// The active target size constraint, if compression should use it.
    pub fn active_target(&self) -> Option<TargetFileSize> {
        self.target_file_size.filter(|t| t.enabled)
    }
}

//! Byte-stream codec adapter.
//!
//! This module is the only place pixels meet encoded bytes:
//! - Decoding a byte buffer into an RGBA [`PixelBuffer`](crate::PixelBuffer)
//! - Encoding a pixel buffer into JPEG, PNG, WebP, AVIF, BMP, GIF or TIFF
//!
//! Both directions are deterministic, which the target-size search depends
//! on: re-encoding the same buffer at the same quality must reproduce the
//! same byte count.

pub mod decode;
pub mod encode;
pub mod format;

pub use decode::{decode, DecodeError, Orientation};
pub use encode::{encode, EncodeError, EncodedResult};
pub use format::OutputFormat;

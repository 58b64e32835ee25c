//! Conversion WASM bindings.
//!
//! This module exposes the core conversion pipeline to JavaScript. Options
//! cross the boundary as a plain object and deserialize into
//! [`ConversionOptions`]; errors come back stringified so the host can show
//! them to the user.

use pixelmill_core::{ConversionOptions, OutputFormat};
use wasm_bindgen::prelude::*;

use crate::types::JsEncodedResult;

/// Convert and compress an image according to the given options.
///
/// # Arguments
///
/// * `bytes` - Encoded source image as a `Uint8Array`
/// * `options` - Conversion options as a plain object (camelCase keys,
///   matching the TypeScript `ImageConversionOptions` shape)
///
/// # Returns
///
/// A [`JsEncodedResult`] with the converted bytes and their MIME type, or
/// an error string when decoding fails, the options are contradictory, or
/// an encoder refuses the image.
///
/// # Example
///
/// ```typescript
/// const result = convert_and_compress(bytes, {
///   format: 'jpeg',
///   quality: 80,
///   maintainAspectRatio: true,
///   resizeMode: 'fit',
///   flip: 'none',
///   filters: { brightness: 10 },
///   targetFileSize: { enabled: true, size: 200, unit: 'KB' },
/// });
/// ```
#[wasm_bindgen]
pub fn convert_and_compress(bytes: &[u8], options: JsValue) -> Result<JsEncodedResult, JsValue> {
    let options: ConversionOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("invalid options: {e}")))?;

    pixelmill_core::convert_and_compress(bytes, &options)
        .map(JsEncodedResult::from_result)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Detect the format of an encoded image and return its MIME type.
///
/// Useful for labeling previews before any conversion happens. Unknown
/// streams report as "image/png".
#[wasm_bindgen]
pub fn detect_format(bytes: &[u8]) -> String {
    OutputFormat::detect(bytes).mime_type().to_string()
}

//! WASM-compatible wrapper types for conversion results.
//!
//! These types hand encoded bytes to JavaScript without exposing the core
//! crate's types across the boundary.

use pixelmill_core::EncodedResult;
use wasm_bindgen::prelude::*;

/// An encoded conversion result for JavaScript.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory. Calling `bytes()` copies them out
/// as a `Uint8Array`; for large results, call it once and keep the copy.
/// The `free()` method can be called to explicitly release WASM memory, but
/// this is optional as wasm-bindgen's finalizer handles cleanup
/// automatically.
#[wasm_bindgen]
pub struct JsEncodedResult {
    bytes: Vec<u8>,
    mime_type: String,
}

#[wasm_bindgen]
impl JsEncodedResult {
    /// MIME type of the encoded stream (e.g. "image/webp").
    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.mime_type.clone()
    }

    /// Encoded size in bytes.
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the encoded bytes as a Uint8Array.
    ///
    /// Note: this creates a copy of the data so JavaScript owns its view
    /// independently of WASM memory.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup
    /// automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsEncodedResult {
    /// Create a wrapper from a core result.
    pub(crate) fn from_result(result: EncodedResult) -> Self {
        let mime_type = result.mime_type().to_string();
        Self {
            bytes: result.into_bytes(),
            mime_type,
        }
    }
}

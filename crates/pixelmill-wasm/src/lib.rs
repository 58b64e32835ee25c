//! Pixelmill WASM - WebAssembly bindings for Pixelmill
//!
//! This crate exposes the pixelmill-core conversion engine to
//! JavaScript/TypeScript applications. It marshals bytes and options across
//! the boundary and nothing more: file intake, previews, progress tracking
//! and downloads all live in the host application.
//!
//! # Usage
//!
//! ```typescript
//! import init, { convert_and_compress } from '@pixelmill/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = convert_and_compress(bytes, {
//!   format: 'webp',
//!   quality: 80,
//!   maintainAspectRatio: true,
//!   resizeMode: 'fit',
//!   flip: 'none',
//!   filters: {},
//! });
//! const blob = new Blob([result.bytes()], { type: result.mime_type });
//! ```

use wasm_bindgen::prelude::*;

mod convert;
mod types;

// Re-export public types
pub use convert::{convert_and_compress, detect_format};
pub use types::JsEncodedResult;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: Set up panic hook for better error messages in browser console
    // when console_error_panic_hook feature is added
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

//! Retoque WASM - WebAssembly bindings for the Retoque editing engine
//!
//! Exposes [`JsEditorSession`], a thin wrapper over
//! `retoque_core::EditorSession`.
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditorSession } from '@retoque/wasm';
//!
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const session = new JsEditorSession(bytes, file.type, file.name,
//!   { touch_primary: false, viewport_width: innerWidth }, 800, 600);
//! session.rotate(90);
//! const out = session.export('jpeg', 0.9);
//! ```

use wasm_bindgen::prelude::*;

mod session;
mod types;

pub use session::JsEditorSession;
pub use types::JsExportResult;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}

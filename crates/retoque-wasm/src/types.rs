//! Conversions between JavaScript values and core types.
//!
//! Structured values cross the boundary as plain JS objects through
//! `serde-wasm-bindgen`. Errors become `Error` objects whose `name` is the
//! error category, so the host can branch on it without parsing messages.

use retoque_core::export::ExportResult;
use retoque_core::{EditError, ExportFormat, FlipAxis, Rotation, ToolKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Category name exposed as the JS error's `name`.
pub(crate) fn error_name(err: &EditError) -> &'static str {
    match err {
        EditError::InvalidParameters(_) => "InvalidParameters",
        EditError::ResourceExhaustion(_) => "ResourceExhaustion",
        EditError::EncodeFailure(_) => "EncodeFailure",
        EditError::Busy => "Busy",
        EditError::NoActiveTool => "NoActiveTool",
        EditError::NoPendingCommit => "NoPendingCommit",
        EditError::Config(_) => "ConfigError",
    }
}

pub(crate) fn to_js_error(err: EditError) -> JsValue {
    let js = js_sys::Error::new(&err.to_string());
    js.set_name(error_name(&err));
    js.into()
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| to_js_error(EditError::invalid(e.to_string())))
}

pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| to_js_error(EditError::invalid(e.to_string())))
}

pub(crate) fn parse_tool(name: &str) -> Result<ToolKind, EditError> {
    name.parse()
}

pub(crate) fn parse_format(name: &str) -> Result<ExportFormat, EditError> {
    name.parse().map_err(EditError::InvalidParameters)
}

pub(crate) fn parse_rotation(degrees: i32) -> Result<Rotation, EditError> {
    Rotation::try_from(degrees).map_err(EditError::InvalidParameters)
}

pub(crate) fn parse_axis(name: &str) -> Result<FlipAxis, EditError> {
    name.parse().map_err(EditError::InvalidParameters)
}

/// An encoded export ready to be saved by the host.
#[wasm_bindgen]
pub struct JsExportResult {
    bytes: Vec<u8>,
    mime: String,
    file_name: String,
    width: u32,
    height: u32,
}

#[wasm_bindgen]
impl JsExportResult {
    /// Encoded file contents as a `Uint8Array` (copied out of wasm memory).
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime(&self) -> String {
        self.mime.clone()
    }

    #[wasm_bindgen(getter, js_name = fileName)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[wasm_bindgen(getter, js_name = byteLength)]
    pub fn byte_length(&self) -> usize {
        self.bytes.len()
    }
}

impl From<ExportResult> for JsExportResult {
    fn from(result: ExportResult) -> Self {
        Self {
            bytes: result.bytes,
            mime: result.mime.to_string(),
            file_name: result.file_name,
            width: result.width,
            height: result.height,
        }
    }
}

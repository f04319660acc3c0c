//! `JsEditorSession`: the editing session exposed to JavaScript.
//!
//! Commits run inline on the calling thread; the browser host is expected to
//! own this object from a worker when it wants the UI to stay responsive.

use retoque_core::export::ExportRequest;
use retoque_core::{
    ContainerSize, DeviceHints, EditorConfig, EditorSession, GestureMode, SourceImage, TouchPoint,
    ToolUpdate, TransformAction,
};
use tracing::debug;
use wasm_bindgen::prelude::*;

use crate::types::{
    from_js, parse_axis, parse_format, parse_rotation, parse_tool, to_js, to_js_error,
    JsExportResult,
};

#[wasm_bindgen]
pub struct JsEditorSession {
    inner: EditorSession,
}

fn gesture_name(mode: GestureMode) -> &'static str {
    match mode {
        GestureMode::Idle => "idle",
        GestureMode::Pinch { .. } => "pinch",
        GestureMode::Drag { .. } => "drag",
    }
}

#[wasm_bindgen]
impl JsEditorSession {
    /// Open a session.
    ///
    /// `hints` is `{ touch_primary?, viewport_width?, viewport_height? }`;
    /// `config_toml` overrides the default engine configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(
        bytes: Vec<u8>,
        mime: &str,
        name: Option<String>,
        hints: JsValue,
        container_width: f64,
        container_height: f64,
        config_toml: Option<String>,
    ) -> Result<JsEditorSession, JsValue> {
        let hints: DeviceHints = if hints.is_undefined() || hints.is_null() {
            DeviceHints::default()
        } else {
            from_js(hints)?
        };
        let config = match config_toml.as_deref() {
            Some(toml) => EditorConfig::from_toml_str(toml).map_err(|e| to_js_error(e.into()))?,
            None => EditorConfig::default(),
        };

        let mut source = SourceImage::new(bytes, mime);
        source.name = name;
        let inner = EditorSession::load(
            source,
            hints,
            ContainerSize::new(container_width, container_height),
            config,
        )
        .map_err(to_js_error)?;

        debug!(natural = %inner.natural(), "wasm session created");
        Ok(JsEditorSession { inner })
    }

    #[wasm_bindgen(js_name = loadSource)]
    pub fn load_source(
        &mut self,
        bytes: Vec<u8>,
        mime: &str,
        name: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let mut source = SourceImage::new(bytes, mime);
        source.name = name;
        let natural = self.inner.load_source(source).map_err(to_js_error)?;
        to_js(&natural)
    }

    // -- state ------------------------------------------------------------

    /// `{ width, height }` of the current image.
    pub fn natural(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.natural())
    }

    /// `{ zoom, offset_x, offset_y }`.
    pub fn viewport(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.viewport())
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    #[wasm_bindgen(js_name = isBusy)]
    pub fn is_busy(&self) -> bool {
        self.inner.is_busy()
    }

    /// Encoded bytes of the current image.
    #[wasm_bindgen(js_name = currentBytes)]
    pub fn current_bytes(&self) -> Vec<u8> {
        self.inner.current_buffer().bytes().to_vec()
    }

    #[wasm_bindgen(js_name = currentMime)]
    pub fn current_mime(&self) -> String {
        self.inner.current_buffer().mime().to_string()
    }

    // -- tools ------------------------------------------------------------

    #[wasm_bindgen(js_name = activateTool)]
    pub fn activate_tool(&mut self, kind: &str) -> Result<JsValue, JsValue> {
        let kind = parse_tool(kind).map_err(to_js_error)?;
        let preview = self.inner.activate_tool(kind).map_err(to_js_error)?;
        to_js(&preview)
    }

    /// `update` is `{ type: "resize-width", value: 640 }` and so on.
    #[wasm_bindgen(js_name = updateTool)]
    pub fn update_tool(&mut self, update: JsValue) -> Result<JsValue, JsValue> {
        let update: ToolUpdate = from_js(update)?;
        let preview = self.inner.update_tool(update).map_err(to_js_error)?;
        to_js(&preview)
    }

    #[wasm_bindgen(js_name = cancelTool)]
    pub fn cancel_tool(&mut self) -> Result<(), JsValue> {
        self.inner.cancel_tool().map_err(to_js_error)
    }

    /// Preview of the active tool, or `undefined`.
    pub fn preview(&self) -> Result<JsValue, JsValue> {
        match self.inner.preview() {
            Some(preview) => to_js(&preview),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Commit the active tool. Resolves to `{ status: "unchanged" }` or
    /// `{ status: "committed", natural, downscaled }`.
    pub fn commit(&mut self) -> Result<JsValue, JsValue> {
        let outcome = self.inner.commit_now().map_err(to_js_error)?;
        to_js(&outcome)
    }

    /// Rotate by 90, -90 or 180 degrees.
    pub fn rotate(&mut self, degrees: i32) -> Result<JsValue, JsValue> {
        let rotation = parse_rotation(degrees).map_err(to_js_error)?;
        let outcome = self
            .inner
            .transform_now(TransformAction::Rotate { rotation })
            .map_err(to_js_error)?;
        to_js(&outcome)
    }

    /// Mirror along `"horizontal"` or `"vertical"`.
    pub fn flip(&mut self, axis: &str) -> Result<JsValue, JsValue> {
        let axis = parse_axis(axis).map_err(to_js_error)?;
        let outcome = self
            .inner
            .transform_now(TransformAction::Flip { axis })
            .map_err(to_js_error)?;
        to_js(&outcome)
    }

    // -- history ----------------------------------------------------------

    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.inner.undo().map_err(to_js_error)
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.inner.redo().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = clearHistory)]
    pub fn clear_history(&mut self) -> Result<(), JsValue> {
        self.inner.clear_history().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = resetToOriginal)]
    pub fn reset_to_original(&mut self) -> Result<(), JsValue> {
        self.inner.reset_to_original().map_err(to_js_error)
    }

    // -- export -----------------------------------------------------------

    /// Encode the current image as `format` (`png`, `jpeg`, `webp` or a MIME
    /// type).
    pub fn export(
        &self,
        format: &str,
        quality: Option<f32>,
        file_name: Option<String>,
    ) -> Result<JsExportResult, JsValue> {
        let format = parse_format(format).map_err(to_js_error)?;
        let request = ExportRequest {
            format,
            quality,
            file_name,
        };
        let result = self.inner.export(&request).map_err(to_js_error)?;
        Ok(result.into())
    }

    // -- viewport ---------------------------------------------------------

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.inner.pan(dx, dy);
    }

    /// Zoom by `factor`, optionally around a container point.
    #[wasm_bindgen(js_name = zoomBy)]
    pub fn zoom_by(&mut self, factor: f64, anchor_x: Option<f64>, anchor_y: Option<f64>) -> f64 {
        let anchor = anchor_x.zip(anchor_y);
        self.inner.zoom_by(factor, anchor)
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f64) {
        self.inner.set_zoom(zoom);
    }

    #[wasm_bindgen(js_name = setSliderZoom)]
    pub fn set_slider_zoom(&mut self, zoom: f64) {
        self.inner.set_slider_zoom(zoom);
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) {
        self.inner.step_zoom_in();
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) {
        self.inner.step_zoom_out();
    }

    pub fn wheel(&mut self, delta_x: f64, delta_y: f64, zoom_modifier: bool) {
        self.inner.wheel(delta_x, delta_y, zoom_modifier);
    }

    #[wasm_bindgen(js_name = fitToBounds)]
    pub fn fit_to_bounds(&mut self) {
        self.inner.fit_to_bounds();
    }

    #[wasm_bindgen(js_name = oneToOne)]
    pub fn one_to_one(&mut self) {
        self.inner.one_to_one();
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&mut self) {
        self.inner.reset_view();
    }

    #[wasm_bindgen(js_name = setContainer)]
    pub fn set_container(&mut self, width: f64, height: f64) {
        self.inner.set_container(ContainerSize::new(width, height));
    }

    /// `points` is an array of `{ x, y }`. Returns the gesture started:
    /// `"idle"`, `"pinch"` or `"drag"`.
    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, points: JsValue, timestamp_ms: f64) -> Result<String, JsValue> {
        let points: Vec<TouchPoint> = from_js(points)?;
        let timestamp = if timestamp_ms.is_finite() && timestamp_ms > 0.0 {
            timestamp_ms as u64
        } else {
            0
        };
        let mode = self.inner.touch_start(&points, timestamp);
        Ok(gesture_name(mode).to_string())
    }

    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&mut self, points: JsValue) -> Result<(), JsValue> {
        let points: Vec<TouchPoint> = from_js(points)?;
        self.inner.touch_move(&points);
        Ok(())
    }

    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&mut self) {
        self.inner.touch_end();
    }

    /// Double-click: toggle between fit and the fixed zoom.
    #[wasm_bindgen(js_name = toggleZoom)]
    pub fn toggle_zoom(&mut self) {
        self.inner.toggle_zoom();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_names() {
        assert_eq!(gesture_name(GestureMode::Idle), "idle");
        assert_eq!(gesture_name(GestureMode::Pinch { distance: 3.0 }), "pinch");
        assert_eq!(
            gesture_name(GestureMode::Drag {
                last: TouchPoint::new(1.0, 2.0)
            }),
            "drag"
        );
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use retoque_core::encode::encode_png;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn session(width: u32, height: u32) -> JsEditorSession {
        let pixels = vec![200u8; (width * height * 4) as usize];
        let bytes = encode_png(&pixels, width, height).unwrap();
        JsEditorSession::new(
            bytes,
            "image/png",
            Some("foto.png".into()),
            JsValue::UNDEFINED,
            800.0,
            600.0,
            None,
        )
        .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_rotate_and_undo() {
        let mut s = session(40, 20);
        s.rotate(90).unwrap();
        assert!(s.can_undo());
        assert!(s.undo().unwrap());
        assert!(s.can_redo());
    }

    #[wasm_bindgen_test]
    fn test_export_png() {
        let s = session(10, 10);
        let result = s.export("png", None, None).unwrap();
        assert_eq!(result.mime(), "image/png");
        assert_eq!(result.file_name(), "foto.png");
        assert_eq!((result.width(), result.height()), (10, 10));
    }

    #[wasm_bindgen_test]
    fn test_bad_rotation_is_error() {
        let mut s = session(10, 10);
        assert!(s.rotate(45).is_err());
        assert!(s.activate_tool("lasso").is_err());
    }

    #[wasm_bindgen_test]
    fn test_config_override() {
        let pixels = vec![0u8; 4 * 4 * 4];
        let bytes = encode_png(&pixels, 4, 4).unwrap();
        let s = JsEditorSession::new(
            bytes,
            "image/png",
            None,
            JsValue::UNDEFINED,
            100.0,
            100.0,
            Some("[history]\ncapacity = 3\n".into()),
        );
        assert!(s.is_ok());
    }
}

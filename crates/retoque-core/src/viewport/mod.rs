//! Zoom and pan of a fixed-aspect image inside a resizable container.
//!
//! # Coordinate System
//!
//! The offset is the image-space point (in natural pixels, relative to the
//! image center) shown at the container center. A host renders the image
//! centered in the container with
//! `transform: scale(zoom) translate(-offset_x px, -offset_y px)`.
//!
//! Anchors passed to [`ViewportController::zoom_by`] are in container pixels
//! relative to the container center; [`ViewportController::anchor_at`]
//! converts from top-left container coordinates.

mod gesture;

pub use gesture::{GestureMode, GestureRecognizer, TouchPoint};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::NaturalDimensions;
use crate::config::ZoomConfig;

/// Current zoom and pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Size of the display surface in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    state: ViewportState,
    natural: NaturalDimensions,
    container: ContainerSize,
    settings: ZoomConfig,
    fit_padding: f64,
}

impl ViewportController {
    /// Create a controller already fitted to the container.
    pub fn new(
        natural: NaturalDimensions,
        container: ContainerSize,
        settings: ZoomConfig,
        fit_padding: f64,
    ) -> Self {
        let mut controller = Self {
            state: ViewportState::default(),
            natural,
            container,
            settings,
            fit_padding,
        };
        controller.refit();
        controller
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn natural(&self) -> NaturalDimensions {
        self.natural
    }

    pub fn container(&self) -> ContainerSize {
        self.container
    }

    pub fn settings(&self) -> &ZoomConfig {
        &self.settings
    }

    /// Move the image by a screen-space delta, so content follows the pointer.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.state.offset_x -= dx / self.state.zoom;
        self.state.offset_y -= dy / self.state.zoom;
    }

    /// Multiply the zoom by `factor`.
    ///
    /// With an anchor (container pixels from the center) the image point
    /// under the anchor stays put; without one the offset is unchanged.
    /// Returns the resulting zoom.
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<(f64, f64)>) -> f64 {
        if !factor.is_finite() || factor <= 0.0 {
            return self.state.zoom;
        }
        let target = self.state.zoom * factor;
        self.zoom_to(target, self.settings.max, anchor)
    }

    /// Compute `scale = min(cw / nw, ch / nh) * padding` and center the image.
    pub fn fit_to_bounds(&mut self, natural: NaturalDimensions, container: ContainerSize) {
        self.natural = natural;
        self.container = container;
        self.refit();
    }

    /// Fit using the stored natural and container dimensions.
    pub fn refit(&mut self) {
        let scale_x = self.container.width / self.natural.width as f64;
        let scale_y = self.container.height / self.natural.height as f64;
        let scale = scale_x.min(scale_y) * self.fit_padding;

        self.state.zoom = if scale.is_finite() && scale > 0.0 {
            self.normalize(scale, self.settings.max)
        } else {
            self.settings.min
        };
        self.state.offset_x = 0.0;
        self.state.offset_y = 0.0;
        debug!(zoom = self.state.zoom, natural = %self.natural, "viewport fitted");
    }

    /// The zoom [`refit`](Self::refit) would produce, without applying it.
    pub fn fit_zoom(&self) -> f64 {
        let mut fitted = self.clone();
        fitted.refit();
        fitted.state.zoom
    }

    /// Set the zoom directly, clamped to the full range. Offset is kept.
    pub fn set_exact(&mut self, zoom: f64) {
        self.zoom_to(zoom, self.settings.max, None);
    }

    /// Set the zoom from the slider, which only reaches `slider_max`.
    pub fn set_slider(&mut self, zoom: f64) {
        self.zoom_to(zoom, self.settings.slider_max, None);
    }

    /// One image pixel per container pixel, centered.
    pub fn one_to_one(&mut self) {
        self.reset();
    }

    pub fn step_in(&mut self) {
        self.zoom_by(self.settings.step, None);
    }

    pub fn step_out(&mut self) {
        self.zoom_by(1.0 / self.settings.step, None);
    }

    /// Mouse wheel: zoom with the modifier held, otherwise scroll.
    pub fn wheel(&mut self, delta_x: f64, delta_y: f64, zoom_modifier: bool) {
        if zoom_modifier {
            self.zoom_by(1.0 - delta_y * self.settings.wheel_sensitivity, None);
        } else {
            self.pan(-delta_x, -delta_y);
        }
    }

    /// Zoom 1, offset at the origin.
    pub fn reset(&mut self) {
        self.state = ViewportState::default();
    }

    /// Put back a previously captured state, clamping the zoom.
    pub fn restore(&mut self, state: ViewportState) {
        let zoom = if state.zoom.is_finite() {
            self.normalize(state.zoom, self.settings.max)
        } else {
            self.state.zoom
        };
        self.state = ViewportState { zoom, ..state };
    }

    /// The display surface changed size; re-fit.
    pub fn set_container(&mut self, container: ContainerSize) {
        self.container = container;
        self.refit();
    }

    /// Convert a top-left-origin container point into an anchor.
    pub fn anchor_at(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.container.width / 2.0, y - self.container.height / 2.0)
    }

    fn zoom_to(&mut self, zoom: f64, max: f64, anchor: Option<(f64, f64)>) -> f64 {
        if !zoom.is_finite() {
            return self.state.zoom;
        }
        let previous = self.state.zoom;
        let next = self.normalize(zoom, max);

        if let Some((ax, ay)) = anchor {
            self.state.offset_x += ax / previous - ax / next;
            self.state.offset_y += ay / previous - ay / next;
        }
        self.state.zoom = next;
        debug!(zoom = next, "viewport zoom");
        next
    }

    /// Round to 3 decimals, then clamp.
    fn normalize(&self, zoom: f64, max: f64) -> f64 {
        ((zoom * 1000.0).round() / 1000.0).clamp(self.settings.min, max)
    }
}

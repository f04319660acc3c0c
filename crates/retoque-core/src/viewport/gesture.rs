//! Touch and pointer gesture recognition.
//!
//! Gestures are mutually exclusive and inferred from the number of active
//! points: two points pinch, one point drags, two quick taps toggle between
//! fit and a fixed zoom. A new touch-start always replaces whatever gesture
//! was in progress.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ViewportController;

/// A touch or pointer position in container pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(self, other: TouchPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn midpoint(self, other: TouchPoint) -> TouchPoint {
        TouchPoint::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// The gesture currently being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureMode {
    #[default]
    Idle,
    Pinch {
        distance: f64,
    },
    Drag {
        last: TouchPoint,
    },
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    mode: GestureMode,
    last_tap_ms: Option<u64>,
    zoomed_in: bool,
    drag_enabled: bool,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self {
            mode: GestureMode::Idle,
            last_tap_ms: None,
            zoomed_in: false,
            drag_enabled: true,
        }
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    /// Whether the last double-tap toggle went to the fixed zoom.
    pub fn is_zoomed_in(&self) -> bool {
        self.zoomed_in
    }

    /// Single-point drags pan only while enabled; an active crop selection
    /// takes the pointer instead.
    pub fn set_drag_enabled(&mut self, enabled: bool) {
        self.drag_enabled = enabled;
        if !enabled && matches!(self.mode, GestureMode::Drag { .. }) {
            self.mode = GestureMode::Idle;
        }
    }

    /// Begin a gesture. `timestamp_ms` is any monotonic millisecond clock.
    pub fn touch_start(
        &mut self,
        points: &[TouchPoint],
        timestamp_ms: u64,
        viewport: &mut ViewportController,
    ) -> GestureMode {
        self.mode = match points {
            [a, b, ..] => {
                self.last_tap_ms = None;
                GestureMode::Pinch {
                    distance: a.distance(*b),
                }
            }
            [point] => {
                let window = viewport.settings().double_tap_window_ms;
                let is_double_tap = self
                    .last_tap_ms
                    .map(|last| timestamp_ms > last && timestamp_ms - last < window)
                    .unwrap_or(false);

                if is_double_tap {
                    self.last_tap_ms = None;
                    self.toggle_zoom(viewport);
                    GestureMode::Idle
                } else {
                    self.last_tap_ms = Some(timestamp_ms);
                    if self.drag_enabled {
                        GestureMode::Drag { last: *point }
                    } else {
                        GestureMode::Idle
                    }
                }
            }
            [] => GestureMode::Idle,
        };
        self.mode
    }

    /// Continue the current gesture.
    pub fn touch_move(&mut self, points: &[TouchPoint], viewport: &mut ViewportController) {
        match (self.mode, points) {
            (GestureMode::Pinch { distance }, [a, b, ..]) => {
                let next = a.distance(*b);
                if distance > f64::EPSILON && next > f64::EPSILON {
                    let center = a.midpoint(*b);
                    let anchor = viewport.anchor_at(center.x, center.y);
                    viewport.zoom_by(next / distance, Some(anchor));
                }
                self.mode = GestureMode::Pinch { distance: next };
            }
            (GestureMode::Drag { last }, [point]) => {
                viewport.pan(point.x - last.x, point.y - last.y);
                self.mode = GestureMode::Drag { last: *point };
            }
            _ => {}
        }
    }

    /// End the gesture; lifting any finger ends it.
    pub fn touch_end(&mut self) {
        self.mode = GestureMode::Idle;
    }

    /// Toggle between fit-to-bounds and the fixed double-tap zoom. Also
    /// used for mouse double-click.
    pub fn toggle_zoom(&mut self, viewport: &mut ViewportController) {
        if self.zoomed_in {
            viewport.refit();
            self.zoomed_in = false;
        } else {
            let zoom = viewport.settings().double_tap_zoom;
            viewport.reset();
            viewport.set_exact(zoom);
            self.zoomed_in = true;
        }
        debug!(zoom = viewport.zoom(), zoomed_in = self.zoomed_in, "double tap");
    }

    /// Forget all gesture state, e.g. after the image changed.
    pub fn reset(&mut self) {
        self.mode = GestureMode::Idle;
        self.last_tap_ms = None;
        self.zoomed_in = false;
    }
}

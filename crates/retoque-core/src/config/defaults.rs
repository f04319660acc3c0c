//! Default values for every tunable constant.
//!
//! # Categories
//!
//! - **Device profiles**: fit padding, crop size limit and crop quality
//! - **Zoom**: zoom bounds, stepping and gesture tuning
//! - **History**: snapshot capacity
//! - **Export**: default encode quality

// ==========================================================================
// Device Profile Defaults
// ==========================================================================

/// Fraction of the container the fitted image fills on pointer-primary devices.
pub const DESKTOP_FIT_PADDING: f64 = 0.98;

/// Fraction of the container the fitted image fills on touch or narrow devices.
pub const CONSTRAINED_FIT_PADDING: f64 = 0.9;

/// Largest crop output edge on desktop.
pub const DESKTOP_CROP_MAX_DIMENSION: u32 = 4096;

/// Largest crop output edge on constrained devices.
pub const CONSTRAINED_CROP_MAX_DIMENSION: u32 = 1024;

/// JPEG quality of crop commits on desktop.
pub const DESKTOP_CROP_QUALITY: f32 = 0.92;

/// JPEG quality of crop commits on constrained devices.
pub const CONSTRAINED_CROP_QUALITY: f32 = 0.75;

/// Viewports at most this wide are treated as constrained.
pub const NARROW_VIEWPORT_WIDTH: u32 = 768;

// ==========================================================================
// Zoom Defaults
// ==========================================================================

pub const MIN_ZOOM: f64 = 0.01;

pub const MAX_ZOOM: f64 = 8.0;

/// Upper bound of the zoom slider.
pub const SLIDER_MAX_ZOOM: f64 = 4.0;

/// Keyboard zoom multiplier.
pub const ZOOM_STEP: f64 = 1.1;

/// Zoom change per wheel delta unit while the zoom modifier is held.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.0015;

/// Zoom the double-tap toggle switches to.
pub const DOUBLE_TAP_ZOOM: f64 = 2.0;

/// Maximum gap between two taps of a double tap.
pub const DOUBLE_TAP_WINDOW_MS: u64 = 300;

// ==========================================================================
// History Defaults
// ==========================================================================

pub const HISTORY_CAPACITY: usize = 50;

// ==========================================================================
// Export Defaults
// ==========================================================================

pub const EXPORT_QUALITY: f32 = crate::encode::DEFAULT_QUALITY;

/// File stem used when the source has no usable name.
pub const FALLBACK_FILE_STEM: &str = "imagen";

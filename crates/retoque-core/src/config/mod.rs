//! Editor configuration.
//!
//! Every constant the engine uses can be overridden from TOML. Missing keys
//! fall back to the values in [`defaults`].
//!
//! # Sections
//!
//! - `[desktop]` / `[constrained]` - per-device-class profiles
//! - `[zoom]` - zoom bounds and gesture tuning
//! - `[history]` - snapshot capacity
//! - `[export]` - default export quality
//!
//! ```toml
//! [constrained]
//! crop_max_dimension = 2048
//!
//! [history]
//! capacity = 20
//! ```

pub mod defaults;

pub use defaults::*;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// =============================================================================
// Device Class
// =============================================================================

/// Coarse device category used to pick a [`DeviceProfile`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceClass {
    /// Pointer-primary, wide viewport.
    #[default]
    Desktop,
    /// Touch-primary or narrow viewport.
    Constrained,
}

/// What the host knows about the device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct DeviceHints {
    pub touch_primary: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl DeviceClass {
    pub fn from_hints(touch_primary: bool, viewport_width: u32) -> Self {
        if touch_primary || viewport_width <= NARROW_VIEWPORT_WIDTH {
            DeviceClass::Constrained
        } else {
            DeviceClass::Desktop
        }
    }
}

impl From<DeviceHints> for DeviceClass {
    fn from(hints: DeviceHints) -> Self {
        DeviceClass::from_hints(hints.touch_primary, hints.viewport_width)
    }
}

// =============================================================================
// Section Structs
// =============================================================================

/// Constants that depend on the device class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DeviceProfile {
    /// Fraction of the container a fitted image fills.
    pub fit_padding: f64,
    /// Largest edge of a committed crop; larger selections are scaled down.
    pub crop_max_dimension: u32,
    /// JPEG quality of crop commits, in `(0, 1]`.
    pub crop_quality: f32,
}

impl DeviceProfile {
    pub const fn desktop() -> Self {
        Self {
            fit_padding: DESKTOP_FIT_PADDING,
            crop_max_dimension: DESKTOP_CROP_MAX_DIMENSION,
            crop_quality: DESKTOP_CROP_QUALITY,
        }
    }

    pub const fn constrained() -> Self {
        Self {
            fit_padding: CONSTRAINED_FIT_PADDING,
            crop_max_dimension: CONSTRAINED_CROP_MAX_DIMENSION,
            crop_quality: CONSTRAINED_CROP_QUALITY,
        }
    }
}

/// Partial profile as written in TOML; absent keys keep the built-in value
/// of the section being read.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileOverrides {
    fit_padding: Option<f64>,
    crop_max_dimension: Option<u32>,
    crop_quality: Option<f32>,
}

impl ProfileOverrides {
    fn apply_to(self, base: DeviceProfile) -> DeviceProfile {
        DeviceProfile {
            fit_padding: self.fit_padding.unwrap_or(base.fit_padding),
            crop_max_dimension: self.crop_max_dimension.unwrap_or(base.crop_max_dimension),
            crop_quality: self.crop_quality.unwrap_or(base.crop_quality),
        }
    }
}

fn deserialize_desktop<'de, D>(deserializer: D) -> Result<DeviceProfile, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ProfileOverrides::deserialize(deserializer)?.apply_to(DeviceProfile::desktop()))
}

fn deserialize_constrained<'de, D>(deserializer: D) -> Result<DeviceProfile, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ProfileOverrides::deserialize(deserializer)?.apply_to(DeviceProfile::constrained()))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    pub slider_max: f64,
    pub step: f64,
    pub wheel_sensitivity: f64,
    pub double_tap_zoom: f64,
    pub double_tap_window_ms: u64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: MIN_ZOOM,
            max: MAX_ZOOM,
            slider_max: SLIDER_MAX_ZOOM,
            step: ZOOM_STEP,
            wheel_sensitivity: WHEEL_ZOOM_SENSITIVITY,
            double_tap_zoom: DOUBLE_TAP_ZOOM,
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub quality: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            quality: EXPORT_QUALITY,
        }
    }
}

// =============================================================================
// Main Config Struct
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    #[serde(deserialize_with = "deserialize_desktop")]
    pub desktop: DeviceProfile,
    #[serde(deserialize_with = "deserialize_constrained")]
    pub constrained: DeviceProfile,
    pub zoom: ZoomConfig,
    pub history: HistoryConfig,
    pub export: ExportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            desktop: DeviceProfile::desktop(),
            constrained: DeviceProfile::constrained(),
            zoom: ZoomConfig::default(),
            history: HistoryConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse TOML overrides on top of the defaults, then validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn profile(&self, class: DeviceClass) -> DeviceProfile {
        match class {
            DeviceClass::Desktop => self.desktop,
            DeviceClass::Constrained => self.constrained,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, profile) in [("desktop", &self.desktop), ("constrained", &self.constrained)] {
            if !(profile.fit_padding > 0.0 && profile.fit_padding <= 1.0) {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("fit_padding {} must be in (0, 1]", profile.fit_padding),
                });
            }
            if profile.crop_max_dimension == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "crop_max_dimension must be positive".to_string(),
                });
            }
            if !(profile.crop_quality > 0.0 && profile.crop_quality <= 1.0) {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("crop_quality {} must be in (0, 1]", profile.crop_quality),
                });
            }
        }

        let zoom = &self.zoom;
        if !(zoom.min > 0.0 && zoom.min <= zoom.slider_max && zoom.slider_max <= zoom.max) {
            return Err(ConfigError::Invalid {
                key: "zoom",
                reason: format!(
                    "expected 0 < min ({}) <= slider_max ({}) <= max ({})",
                    zoom.min, zoom.slider_max, zoom.max
                ),
            });
        }
        if zoom.step <= 1.0 {
            return Err(ConfigError::Invalid {
                key: "zoom.step",
                reason: format!("{} must be greater than 1", zoom.step),
            });
        }
        if self.history.capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "history.capacity",
                reason: "must be positive".to_string(),
            });
        }
        if !(self.export.quality > 0.0 && self.export.quality <= 1.0) {
            return Err(ConfigError::Invalid {
                key: "export.quality",
                reason: format!("{} must be in (0, 1]", self.export.quality),
            });
        }
        Ok(())
    }
}

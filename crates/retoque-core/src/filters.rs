//! Preset color filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::luminance::luma_601_u8;

const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// One of the mutually exclusive preset filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetFilter {
    /// No pending filter.
    #[default]
    None,
    Grayscale,
    Sepia,
    Invert,
}

impl PresetFilter {
    pub fn is_none(self) -> bool {
        self == PresetFilter::None
    }

    /// CSS filter string for the live preview.
    pub fn preview_filter(self) -> &'static str {
        match self {
            PresetFilter::None => "none",
            PresetFilter::Grayscale => "grayscale(100%)",
            PresetFilter::Sepia => "sepia(100%)",
            PresetFilter::Invert => "invert(100%)",
        }
    }

    /// Apply the filter to RGBA pixel data in place. Alpha is preserved.
    pub fn apply(self, pixels: &mut [u8]) {
        match self {
            PresetFilter::None => {}
            PresetFilter::Grayscale => {
                for px in pixels.chunks_exact_mut(4) {
                    let luma = luma_601_u8(px[0], px[1], px[2]);
                    px[..3].fill(luma);
                }
            }
            PresetFilter::Sepia => {
                for px in pixels.chunks_exact_mut(4) {
                    let rgb = [px[0] as f32, px[1] as f32, px[2] as f32];
                    for (dst, row) in px.iter_mut().zip(SEPIA) {
                        let v = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2];
                        *dst = v.min(255.0).round() as u8;
                    }
                }
            }
            PresetFilter::Invert => {
                for px in pixels.chunks_exact_mut(4) {
                    for c in &mut px[..3] {
                        *c = 255 - *c;
                    }
                }
            }
        }
    }
}

impl fmt::Display for PresetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PresetFilter::None => "none",
            PresetFilter::Grayscale => "grayscale",
            PresetFilter::Sepia => "sepia",
            PresetFilter::Invert => "invert",
        })
    }
}

impl FromStr for PresetFilter {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(PresetFilter::None),
            "grayscale" => Ok(PresetFilter::Grayscale),
            "sepia" => Ok(PresetFilter::Sepia),
            "invert" => Ok(PresetFilter::Invert),
            other => Err(EditError::invalid(format!("unknown filter: {other}"))),
        }
    }
}

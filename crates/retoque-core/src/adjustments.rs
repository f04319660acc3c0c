//! Tonal adjustments: brightness, contrast and saturation.
//!
//! Each slider runs from -100 to 100 and maps to a multiplicative factor
//! `1 + value / 100`, the same factor a CSS `brightness()`, `contrast()` or
//! `saturate()` filter takes, so the committed pixels match the live preview.
//!
//! ## Order
//! 1. Saturation (interpolate toward BT.709 luma)
//! 2. Contrast (scale around mid-gray 128)
//! 3. Brightness (scale toward black)
//!
//! Clamping happens once, after all three steps.

use serde::{Deserialize, Serialize};

use crate::luminance::luminance_709;

/// Slider range for every tonal adjustment.
pub const ADJUSTMENT_RANGE: std::ops::RangeInclusive<f32> = -100.0..=100.0;

/// Working values of the adjustment tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneAdjustments {
    /// Brightness (-100 to 100)
    pub brightness: f32,
    /// Contrast (-100 to 100)
    pub contrast: f32,
    /// Saturation (-100 to 100)
    pub saturation: f32,
}

impl ToneAdjustments {
    pub fn new(brightness: f32, contrast: f32, saturation: f32) -> Self {
        Self {
            brightness,
            contrast,
            saturation,
        }
        .clamped()
    }

    /// Clamp every slider into range; non-finite values become zero.
    pub fn clamped(self) -> Self {
        Self {
            brightness: clamp_slider(self.brightness),
            contrast: clamp_slider(self.contrast),
            saturation: clamp_slider(self.saturation),
        }
    }

    /// True when applying these values would leave every pixel unchanged.
    pub fn is_identity(&self) -> bool {
        self.brightness == 0.0 && self.contrast == 0.0 && self.saturation == 0.0
    }

    /// CSS filter string reproducing these values for a live preview.
    pub fn preview_filter(&self) -> String {
        if self.is_identity() {
            return "none".to_string();
        }
        format!(
            "brightness({}) contrast({}) saturate({})",
            factor(self.brightness),
            factor(self.contrast),
            factor(self.saturation)
        )
    }
}

fn clamp_slider(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(*ADJUSTMENT_RANGE.start(), *ADJUSTMENT_RANGE.end())
    } else {
        0.0
    }
}

#[inline]
fn factor(value: f32) -> f32 {
    1.0 + value / 100.0
}

/// Apply tonal adjustments to RGBA pixel data in place.
///
/// Alpha is left untouched. An identity set of values returns immediately.
pub fn apply_tone_adjustments(pixels: &mut [u8], adjustments: &ToneAdjustments) {
    if adjustments.is_identity() {
        return;
    }

    let saturation = factor(adjustments.saturation);
    let contrast = factor(adjustments.contrast);
    let brightness = factor(adjustments.brightness);

    for chunk in pixels.chunks_exact_mut(4) {
        let mut rgb = [chunk[0] as f32, chunk[1] as f32, chunk[2] as f32];

        if adjustments.saturation != 0.0 {
            let gray = luminance_709(rgb[0], rgb[1], rgb[2]);
            for c in &mut rgb {
                *c = gray + saturation * (*c - gray);
            }
        }

        if adjustments.contrast != 0.0 {
            for c in &mut rgb {
                *c = (*c - 128.0) * contrast + 128.0;
            }
        }

        if adjustments.brightness != 0.0 {
            for c in &mut rgb {
                *c *= brightness;
            }
        }

        for (dst, c) in chunk.iter_mut().zip(rgb) {
            *dst = c.clamp(0.0, 255.0).round() as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(pixels: &[u8], adj: ToneAdjustments) -> Vec<u8> {
        let mut out = pixels.to_vec();
        apply_tone_adjustments(&mut out, &adj);
        out
    }

    #[test]
    fn test_identity_no_adjustments() {
        let pixels = vec![12, 200, 77, 255, 0, 0, 0, 0];
        assert_eq!(apply(&pixels, ToneAdjustments::default()), pixels);
    }

    #[test]
    fn test_brightness_scales_channels() {
        let out = apply(&[100, 50, 200, 255], ToneAdjustments::new(50.0, 0.0, 0.0));
        assert_eq!(out, vec![150, 75, 255, 255]);
    }

    #[test]
    fn test_brightness_minus_100_is_black() {
        let out = apply(&[100, 50, 200, 128], ToneAdjustments::new(-100.0, 0.0, 0.0));
        assert_eq!(out, vec![0, 0, 0, 128]);
    }

    #[test]
    fn test_contrast_pivots_on_mid_gray() {
        let adj = ToneAdjustments::new(0.0, 100.0, 0.0);
        assert_eq!(apply(&[128, 128, 128, 255], adj), vec![128, 128, 128, 255]);
        assert_eq!(apply(&[100, 160, 0, 255], adj), vec![72, 192, 0, 255]);
    }

    #[test]
    fn test_contrast_minus_100_flattens() {
        let out = apply(&[0, 255, 30, 255], ToneAdjustments::new(0.0, -100.0, 0.0));
        assert_eq!(out, vec![128, 128, 128, 255]);
    }

    #[test]
    fn test_saturation_minus_100_is_bt709_gray() {
        let out = apply(&[255, 0, 0, 255], ToneAdjustments::new(0.0, 0.0, -100.0));
        assert_eq!(out, vec![54, 54, 54, 255]);
    }

    #[test]
    fn test_saturation_increase_moves_away_from_gray() {
        let out = apply(&[150, 100, 100, 255], ToneAdjustments::new(0.0, 0.0, 50.0));
        assert!(out[0] > 150);
        assert!(out[1] < 100);
    }

    #[test]
    fn test_saturation_before_contrast() {
        // Saturation first makes the pixel gray (54), then contrast doubles
        // its distance from 128.
        let out = apply(&[255, 0, 0, 255], ToneAdjustments::new(0.0, 100.0, -100.0));
        assert_eq!(out[0], 0);
        assert_eq!(out[0], out[1]);
    }

    #[test]
    fn test_values_are_clamped() {
        let adj = ToneAdjustments::new(500.0, f32::NAN, -300.0);
        assert_eq!(adj.brightness, 100.0);
        assert_eq!(adj.contrast, 0.0);
        assert_eq!(adj.saturation, -100.0);
    }

    #[test]
    fn test_preview_filter() {
        assert_eq!(ToneAdjustments::default().preview_filter(), "none");
        assert_eq!(
            ToneAdjustments::new(20.0, -50.0, 0.0).preview_filter(),
            "brightness(1.2) contrast(0.5) saturate(1)"
        );
    }

    #[test]
    fn test_incomplete_pixel_ignored() {
        let out = apply(&[10, 10, 10, 255, 9, 9], ToneAdjustments::new(100.0, 0.0, 0.0));
        assert_eq!(out, vec![20, 20, 20, 255, 9, 9]);
    }
}

//! Luminance weights shared by the tonal and preset-filter operations.
//!
//! Two weightings are in use: saturation interpolates toward ITU-R BT.709
//! luma (the weighting a browser's `saturate()` filter uses), while the
//! grayscale preset uses the older ITU-R BT.601 luma.

/// ITU-R BT.709 coefficient for red channel in luminance calculation.
pub const LUMINANCE_R: f32 = 0.2126;

/// ITU-R BT.709 coefficient for green channel in luminance calculation.
pub const LUMINANCE_G: f32 = 0.7152;

/// ITU-R BT.709 coefficient for blue channel in luminance calculation.
pub const LUMINANCE_B: f32 = 0.0722;

/// ITU-R BT.601 luma weights, in R, G, B order.
pub const LUMA_601: [f32; 3] = [0.299, 0.587, 0.114];

/// BT.709 luminance of an RGB triple on the 0-255 scale.
///
/// The result is not rounded so it can feed further arithmetic.
#[inline]
pub fn luminance_709(r: f32, g: f32, b: f32) -> f32 {
    LUMINANCE_R * r + LUMINANCE_G * g + LUMINANCE_B * b
}

/// BT.601 luma of a u8 RGB triple, rounded to the nearest level.
#[inline]
pub fn luma_601_u8(r: u8, g: u8, b: u8) -> u8 {
    let luma = LUMA_601[0] * r as f32 + LUMA_601[1] * g as f32 + LUMA_601[2] * b as f32;
    luma.clamp(0.0, 255.0).round() as u8
}

//! WebP encoding.
//!
//! The `image` crate only ships a lossless WebP encoder. Quality is honored by
//! snapping each color channel to a coarser set of levels before encoding,
//! which shrinks the output the way a lossy encoder would.

use std::io::Cursor;

use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate, EncodeError, ExportFormat};

/// Encode RGBA pixel data to WebP bytes.
///
/// `quality` is on the 1-100 scale; 100 leaves the pixels untouched.
pub fn encode_webp(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height)?;

    let quality = quality.clamp(1, 100);
    let mut data = pixels.to_vec();
    quantize_rgb(&mut data, quality);

    let mut buffer = Cursor::new(Vec::new());
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(&data, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: ExportFormat::WebP,
            message: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}

fn quantize_rgb(data: &mut [u8], quality: u8) {
    if quality >= 100 {
        return;
    }
    let step = 255.0 / (levels_for_quality(quality) as f32 - 1.0);
    for pixel in data.chunks_exact_mut(4) {
        for channel in pixel.iter_mut().take(3) {
            let bucket = (f32::from(*channel) / step).round();
            *channel = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Number of levels per channel; quadratic so high qualities stay close to
/// the source while low ones collapse quickly.
fn levels_for_quality(quality: u8) -> u16 {
    if quality >= 100 {
        return 256;
    }
    let normalized = f32::from(quality.max(1)) / 100.0;
    (2.0 + normalized * normalized * 254.0).round().clamp(2.0, 256.0) as u16
}

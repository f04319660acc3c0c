//! Image encoding for commits and export.
//!
//! This module provides functionality for:
//! - Encoding RGBA pixels to PNG (lossless, alpha preserved)
//! - Encoding to JPEG with configurable quality (alpha dropped)
//! - Encoding to WebP with configurable quality
//!
//! Quality is expressed on the public surface as a fraction in `(0, 1]`, the
//! way a browser canvas takes it, and converted to the 1-100 scale the codecs
//! use internally.

mod jpeg;
mod png;
mod webp;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use jpeg::encode_jpeg;
pub use png::encode_png;
pub use webp::encode_webp;

use crate::decode::DecodedImage;

/// Quality used when the caller does not ask for one.
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec rejected the image
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: ExportFormat,
        message: String,
    },
}

/// Output encodings supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless raster; quality is ignored.
    #[default]
    Png,
    /// Lossy photographic.
    Jpeg,
    /// Lossy modern.
    WebP,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::WebP => "webp",
        }
    }

    /// Whether the quality parameter has any effect.
    pub fn is_lossy(self) -> bool {
        !matches!(self, ExportFormat::Png)
    }

    /// Encode an image in this format.
    ///
    /// `quality` is a fraction in `(0, 1]`; it is ignored for PNG.
    pub fn encode(self, image: &DecodedImage, quality: f32) -> Result<Vec<u8>, EncodeError> {
        let q = quality_percent(quality);
        match self {
            ExportFormat::Png => encode_png(&image.pixels, image.width, image.height),
            ExportFormat::Jpeg => encode_jpeg(&image.pixels, image.width, image.height, q),
            ExportFormat::WebP => encode_webp(&image.pixels, image.width, image.height, q),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::WebP => "WebP",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    /// Accepts a short name (`png`, `jpeg`, `jpg`, `webp`) or a MIME type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" | "image/png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" | "image/jpeg" => Ok(ExportFormat::Jpeg),
            "webp" | "image/webp" => Ok(ExportFormat::WebP),
            other => Err(format!("unsupported export format: {other}")),
        }
    }
}

/// Convert a `(0, 1]` quality fraction to the codecs' 1-100 scale.
pub fn quality_percent(quality: f32) -> u8 {
    if !quality.is_finite() {
        return 100;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Validate an RGBA buffer against its dimensions.
fn validate(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_percent() {
        assert_eq!(quality_percent(0.92), 92);
        assert_eq!(quality_percent(1.0), 100);
        assert_eq!(quality_percent(0.001), 1);
        assert_eq!(quality_percent(7.0), 100);
        assert_eq!(quality_percent(f32::NAN), 100);
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
        assert_eq!(ExportFormat::WebP.mime_type(), "image/webp");
        assert!(!ExportFormat::Png.is_lossy());
        assert!(ExportFormat::WebP.is_lossy());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JPG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("image/png".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("webp".parse::<ExportFormat>().unwrap(), ExportFormat::WebP);
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_encode_dispatch_signatures() {
        let image = DecodedImage::new(4, 4, vec![90u8; 4 * 4 * 4]);

        let png = ExportFormat::Png.encode(&image, 0.1).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let jpeg = ExportFormat::Jpeg.encode(&image, DEFAULT_QUALITY).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);

        let webp = ExportFormat::WebP.encode(&image, DEFAULT_QUALITY).unwrap();
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn test_validate() {
        assert!(validate(&[0u8; 16], 2, 2).is_ok());
        assert!(matches!(
            validate(&[0u8; 15], 2, 2),
            Err(EncodeError::InvalidPixelData { .. })
        ));
        assert!(matches!(
            validate(&[], 0, 2),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }
}

//! Pixel buffers and decode errors.

use image::Limits;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Neither the byte signature nor the MIME hint names a supported format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    #[error("Corrupted or incomplete image data: {0}")]
    CorruptedFile(String),

    /// The decoder or an allocation hit its memory limit.
    #[error("Out of memory during decoding")]
    OutOfMemory,

    /// Zero-sized, or too large to address as RGBA.
    #[error("Image too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },
}

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Limits(_) => DecodeError::OutOfMemory,
            image::ImageError::Unsupported(_) => DecodeError::InvalidFormat,
            other => DecodeError::CorruptedFile(other.to_string()),
        }
    }
}

/// Resampling filter used when scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Nearest,
    Bilinear,
    /// Closest to a browser canvas with high-quality smoothing.
    #[default]
    Lanczos3,
}

impl FilterType {
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Row-major RGBA8 pixels.
///
/// Operations always start from a fresh decode of the session's current
/// buffer, so an instance is owned by exactly one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            Some(pixels.len()),
            buffer_len(width, height).ok(),
            "RGBA length does not match {width}x{height}"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Zero-filled (transparent) image. Allocation failure is reported
    /// instead of aborting.
    pub fn blank(width: u32, height: u32) -> Result<Self, DecodeError> {
        let len = checked_buffer_len(width, height)?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| DecodeError::OutOfMemory)?;
        pixels.resize(len, 0);
        Ok(Self::new(width, height, pixels))
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    /// Copy into an `image::RgbaImage`; `None` when the length is wrong.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let at = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[at..at + CHANNELS]);
        px
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0 || self.pixels.is_empty()
    }
}

/// `width * height * 4`, or `DimensionsTooLarge` when that overflows.
pub fn buffer_len(width: u32, height: u32) -> Result<usize, DecodeError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(DecodeError::DimensionsTooLarge { width, height })
}

/// Largest single allocation any pixel operation may make, the same budget
/// the decoder runs under.
pub fn alloc_budget() -> u64 {
    Limits::default().max_alloc.unwrap_or(u64::MAX)
}

/// [`buffer_len`], also refusing buffers over [`alloc_budget`] with
/// `OutOfMemory`.
pub fn checked_buffer_len(width: u32, height: u32) -> Result<usize, DecodeError> {
    let len = buffer_len(width, height)?;
    if len as u64 > alloc_budget() {
        return Err(DecodeError::OutOfMemory);
    }
    Ok(len)
}

//! Image cropping.
//!
//! Crop selections are stored as percentages of the natural dimensions so
//! they survive viewport changes, and are resolved to a pixel rectangle only
//! when the crop is committed or exported.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left corner
//! - (100, 100) = bottom-right corner
//! - width/height are percentages of the natural width/height

use serde::{Deserialize, Serialize};

use crate::decode::{resize_region_to_fit, DecodeError, DecodedImage, CHANNELS};

/// Crop selection in percent of the natural dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A resolved crop rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
        .clamped()
    }

    /// The whole image.
    pub fn full_frame() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }

    /// Zero width or height means nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn is_full_frame(&self) -> bool {
        *self == Self::full_frame()
    }

    /// Force the region inside `[0, 100]` on both axes.
    ///
    /// The origin is clamped first and the extent shrunk to fit, so the
    /// region never grows. Non-finite values become zero.
    pub fn clamped(self) -> Self {
        let x = finite_or_zero(self.x).clamp(0.0, 100.0);
        let y = finite_or_zero(self.y).clamp(0.0, 100.0);
        Self {
            x,
            y,
            width: finite_or_zero(self.width).clamp(0.0, 100.0 - x),
            height: finite_or_zero(self.height).clamp(0.0, 100.0 - y),
        }
    }

    /// Resolve against natural dimensions, rounding each edge to a pixel.
    ///
    /// Returns `None` when the selection is empty or rounds to zero pixels.
    pub fn resolve(&self, natural_width: u32, natural_height: u32) -> Option<PixelRect> {
        let region = self.clamped();
        if region.is_empty() {
            return None;
        }

        let (x, width) = resolve_axis(region.x, region.width, natural_width);
        let (y, height) = resolve_axis(region.y, region.height, natural_height);
        if width == 0 || height == 0 {
            return None;
        }
        Some(PixelRect {
            x,
            y,
            width,
            height,
        })
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn resolve_axis(start: f64, extent: f64, size: u32) -> (u32, u32) {
    let size_f = size as f64;
    let from = ((start / 100.0) * size_f).round().min(size_f) as u32;
    let to = (((start + extent) / 100.0) * size_f).round().min(size_f) as u32;
    (from, to.saturating_sub(from))
}

impl PixelRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Intersect with a `width` x `height` image. `None` if nothing is left.
    pub fn clip(&self, width: u32, height: u32) -> Option<PixelRect> {
        let x = self.x.min(width);
        let y = self.y.min(height);
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);
        let rect = PixelRect {
            x,
            y,
            width: right.saturating_sub(x),
            height: bottom.saturating_sub(y),
        };
        (rect.width > 0 && rect.height > 0).then_some(rect)
    }
}

/// Result of a crop commit.
#[derive(Debug, Clone)]
pub struct CropOutput {
    pub image: DecodedImage,
    /// The selection exceeded the size limit and was scaled down uniformly.
    pub downscaled: bool,
}

/// Copy a pixel rectangle out of an image.
///
/// The rectangle is clipped to the image first.
///
/// # Errors
///
/// `DimensionsTooLarge` with zero dimensions if nothing of the rectangle
/// lies inside the image; `OutOfMemory` if the output cannot be allocated.
pub fn apply_crop(image: &DecodedImage, rect: PixelRect) -> Result<DecodedImage, DecodeError> {
    let rect = rect
        .clip(image.width, image.height)
        .ok_or(DecodeError::DimensionsTooLarge {
            width: 0,
            height: 0,
        })?;

    if rect == PixelRect::full(image.width, image.height) {
        return Ok(image.clone());
    }

    let mut output = DecodedImage::blank(rect.width, rect.height)?;
    let row_bytes = rect.width as usize * CHANNELS;
    let src_stride = image.width as usize * CHANNELS;

    for (row, dst) in output.pixels.chunks_exact_mut(row_bytes).enumerate() {
        let src_start = (rect.y as usize + row) * src_stride + rect.x as usize * CHANNELS;
        dst.copy_from_slice(&image.pixels[src_start..src_start + row_bytes]);
    }

    Ok(output)
}

/// Crop, scaling the selection down uniformly if either edge exceeds
/// `max_dimension`.
///
/// An oversized selection is sampled straight into the downscaled output;
/// the full-resolution crop box is never materialized.
pub fn apply_crop_limited(
    image: &DecodedImage,
    rect: PixelRect,
    max_dimension: u32,
) -> Result<CropOutput, DecodeError> {
    let rect = rect
        .clip(image.width, image.height)
        .ok_or(DecodeError::DimensionsTooLarge {
            width: 0,
            height: 0,
        })?;
    if rect.width <= max_dimension && rect.height <= max_dimension {
        return Ok(CropOutput {
            image: apply_crop(image, rect)?,
            downscaled: false,
        });
    }

    let scaled = resize_region_to_fit(
        image,
        (rect.x, rect.y, rect.width, rect.height),
        max_dimension,
    )?;
    Ok(CropOutput {
        image: scaled,
        downscaled: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test image where each pixel's red channel encodes its index.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for i in 0..(width * height) {
            pixels.extend_from_slice(&[(i % 256) as u8, 0, 0, 255]);
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_resolve_center_quarter() {
        let rect = CropRegion::new(25.0, 25.0, 50.0, 50.0).resolve(800, 600).unwrap();
        assert_eq!(
            rect,
            PixelRect {
                x: 200,
                y: 150,
                width: 400,
                height: 300
            }
        );
    }

    #[test]
    fn test_resolve_empty_selection() {
        assert!(CropRegion::new(10.0, 10.0, 0.0, 50.0).resolve(800, 600).is_none());
        assert!(CropRegion::default().resolve(800, 600).is_none());
        // Rounds to zero pixels.
        assert!(CropRegion::new(0.0, 0.0, 0.01, 50.0).resolve(10, 10).is_none());
    }

    #[test]
    fn test_region_clamped_to_frame() {
        let region = CropRegion::new(-10.0, 90.0, 150.0, 30.0);
        assert_eq!(region.x, 0.0);
        assert_eq!(region.width, 100.0);
        assert_eq!(region.y, 90.0);
        assert!((region.height - 10.0).abs() < 1e-9);
        assert!(CropRegion::new(f64::NAN, 0.0, 10.0, 10.0).x == 0.0);
    }

    #[test]
    fn test_full_frame() {
        assert!(CropRegion::full_frame().is_full_frame());
        assert_eq!(
            CropRegion::full_frame().resolve(37, 11),
            Some(PixelRect::full(37, 11))
        );
    }

    #[test]
    fn test_clip() {
        let rect = PixelRect {
            x: 8,
            y: 0,
            width: 10,
            height: 4,
        };
        assert_eq!(
            rect.clip(10, 10),
            Some(PixelRect {
                x: 8,
                y: 0,
                width: 2,
                height: 4
            })
        );
        assert_eq!(
            PixelRect {
                x: 10,
                y: 0,
                width: 5,
                height: 5
            }
            .clip(10, 10),
            None
        );
    }

    #[test]
    fn test_crop_pixel_values_preserved() {
        let img = test_image(10, 10);
        let rect = PixelRect {
            x: 2,
            y: 3,
            width: 4,
            height: 2,
        };
        let cropped = apply_crop(&img, rect).unwrap();

        assert_eq!((cropped.width, cropped.height), (4, 2));
        assert_eq!(cropped.pixel(0, 0), [32, 0, 0, 255]);
        assert_eq!(cropped.pixel(3, 1), [45, 0, 0, 255]);
    }

    #[test]
    fn test_full_crop_is_copy() {
        let img = test_image(7, 5);
        assert_eq!(apply_crop(&img, PixelRect::full(7, 5)).unwrap(), img);
    }

    #[test]
    fn test_crop_outside_image_is_error() {
        let img = test_image(4, 4);
        let rect = PixelRect {
            x: 4,
            y: 4,
            width: 2,
            height: 2,
        };
        assert!(apply_crop(&img, rect).is_err());
    }

    #[test]
    fn test_limited_crop_under_limit() {
        let img = test_image(20, 10);
        let out = apply_crop_limited(&img, PixelRect::full(20, 10), 64).unwrap();
        assert!(!out.downscaled);
        assert_eq!((out.image.width, out.image.height), (20, 10));
    }

    #[test]
    fn test_limited_crop_downscales_uniformly() {
        let img = test_image(200, 100);
        let rect = PixelRect {
            x: 0,
            y: 0,
            width: 160,
            height: 80,
        };
        let out = apply_crop_limited(&img, rect, 40).unwrap();
        assert!(out.downscaled);
        assert_eq!((out.image.width, out.image.height), (40, 20));
    }

    #[test]
    fn test_limited_crop_samples_selection_only() {
        // top rows dark, bottom rows bright
        let mut pixels = Vec::new();
        for y in 0..60u32 {
            let v = if y < 30 { 10 } else { 240 };
            for _ in 0..60 {
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let img = DecodedImage::new(60, 60, pixels);
        let rect = PixelRect {
            x: 0,
            y: 30,
            width: 60,
            height: 30,
        };
        let out = apply_crop_limited(&img, rect, 20).unwrap();
        assert!(out.downscaled);
        assert_eq!((out.image.width, out.image.height), (20, 10));
        assert!(out.image.pixels.chunks_exact(4).all(|p| p[0] >= 239));
    }

    #[test]
    fn test_limited_crop_outside_image_is_error() {
        let img = test_image(4, 4);
        let rect = PixelRect {
            x: 9,
            y: 0,
            width: 100,
            height: 100,
        };
        assert!(apply_crop_limited(&img, rect, 2).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn region_strategy() -> impl Strategy<Value = CropRegion> {
        (-20.0f64..120.0, -20.0f64..120.0, 0.0f64..150.0, 0.0f64..150.0)
            .prop_map(|(x, y, w, h)| CropRegion::new(x, y, w, h))
    }

    proptest! {
        /// Property: a clamped region stays inside the frame.
        #[test]
        fn prop_region_within_frame(region in region_strategy()) {
            prop_assert!(region.x >= 0.0 && region.y >= 0.0);
            prop_assert!(region.x + region.width <= 100.0 + 1e-9);
            prop_assert!(region.y + region.height <= 100.0 + 1e-9);
        }

        /// Property: a resolved rectangle never leaves the image.
        #[test]
        fn prop_resolved_within_bounds(
            region in region_strategy(),
            width in 1u32..5000,
            height in 1u32..5000,
        ) {
            if let Some(rect) = region.resolve(width, height) {
                prop_assert!(rect.width >= 1 && rect.height >= 1);
                prop_assert!(rect.x + rect.width <= width);
                prop_assert!(rect.y + rect.height <= height);
            }
        }

        /// Property: cropped pixels come from the matching source position.
        #[test]
        fn prop_cropped_pixels_from_original(
            (width, height) in (2u32..40, 2u32..40),
            region in region_strategy(),
        ) {
            let mut pixels = Vec::with_capacity((width * height * 4) as usize);
            for y in 0..height {
                for x in 0..width {
                    pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
                }
            }
            let img = DecodedImage::new(width, height, pixels);

            if let Some(rect) = region.resolve(width, height) {
                let out = apply_crop(&img, rect).unwrap();
                prop_assert_eq!(out.pixel_count(), rect.width as u64 * rect.height as u64);
                prop_assert_eq!(out.pixel(0, 0), [rect.x as u8, rect.y as u8, 0, 255]);
            }
        }

        /// Property: the limited crop never exceeds the limit.
        #[test]
        fn prop_limited_crop_bounded(
            (width, height) in (1u32..80, 1u32..80),
            limit in 1u32..40,
        ) {
            let img = DecodedImage::new(width, height, vec![9u8; (width * height * 4) as usize]);
            let out = apply_crop_limited(&img, PixelRect::full(width, height), limit).unwrap();
            prop_assert!(out.image.width <= limit && out.image.height <= limit);
            prop_assert_eq!(out.downscaled, width > limit || height > limit);
        }
    }
}

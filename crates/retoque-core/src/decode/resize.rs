//! Filtered image resizing.
//!
//! Provides resize operations using the `image` crate's algorithms.
//! All functions return new `DecodedImage` instances without modifying the input.

use image::{imageops, ImageBuffer, Rgba};

use super::{alloc_budget, checked_buffer_len, DecodeError, DecodedImage, FilterType};

/// Bytes per pixel of the `Rgba32F` pass `imageops::resize` makes between
/// its vertical and horizontal sampling.
const FLOAT_PASS_BYTES: u64 = 16;

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::DimensionsTooLarge` if either target dimension is
/// zero or the target buffer would not be addressable, and
/// `DecodeError::OutOfMemory` if the output or the intermediate pass would
/// exceed the allocation budget.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::DimensionsTooLarge { width, height });
    }
    checked_buffer_len(width, height)?;

    if image.width == width && image.height == height {
        return Ok(image.clone());
    }
    if filter != FilterType::Nearest
        && u64::from(image.width) * u64::from(height) * FLOAT_PASS_BYTES > alloc_budget()
    {
        return Err(DecodeError::OutOfMemory);
    }

    let rgba = image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Pixel buffer size mismatch".to_string()))?;

    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgba_image(resized))
}

/// Scale the `width` x `height` region at (`x`, `y`) down so neither edge
/// exceeds `max_edge`.
///
/// Pixels are sampled straight from the source; only the downscaled output
/// is allocated. Every source pixel of the region contributes to exactly one
/// output pixel (area averaging). The region must lie inside the image.
pub fn resize_region_to_fit(
    image: &DecodedImage,
    (x, y, width, height): (u32, u32, u32, u32),
    max_edge: u32,
) -> Result<DecodedImage, DecodeError> {
    if max_edge == 0 || width == 0 || height == 0 {
        return Err(DecodeError::DimensionsTooLarge { width, height });
    }
    let (new_width, new_height) = calculate_fit_dimensions(width, height, max_edge);
    checked_buffer_len(new_width, new_height)?;

    let source = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(
        image.width,
        image.height,
        image.pixels.as_slice(),
    )
    .ok_or_else(|| DecodeError::CorruptedFile("Pixel buffer size mismatch".to_string()))?;
    let region = imageops::crop_imm(&source, x, y, width, height);
    let scaled = imageops::thumbnail(&*region, new_width, new_height);

    Ok(DecodedImage::from_rgba_image(scaled))
}

/// Calculate dimensions that fit within `max_edge` while preserving aspect ratio.
///
/// Dimensions already inside the bound are returned unchanged.
pub fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}

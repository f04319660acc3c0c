//! Decoding of encoded source buffers with EXIF orientation handling.
//!
//! Browsers draw JPEG photos with their EXIF orientation applied, so the
//! natural dimensions a user sees are the oriented ones. Decoding here does
//! the same; buffers produced by a commit carry no EXIF and decode as-is.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::metadata::Orientation;
use image::{ImageFormat, ImageReader, Limits};

use super::{DecodeError, DecodedImage};

/// Decode an encoded image into RGBA pixels.
///
/// The format is sniffed from the byte signature; `mime` is only consulted
/// when the signature is not recognized.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for unrecognized data,
/// `DecodeError::OutOfMemory` when the decoder's allocation limit is hit and
/// `DecodeError::CorruptedFile` for truncated or malformed data.
pub fn decode_image(bytes: &[u8], mime: Option<&str>) -> Result<DecodedImage, DecodeError> {
    let reader = open_reader(bytes, mime)?;
    let is_jpeg = reader.format() == Some(ImageFormat::Jpeg);

    let mut img = reader.decode()?;
    if is_jpeg {
        img.apply_orientation(exif_orientation(bytes));
    }

    Ok(DecodedImage::from_rgba_image(img.into_rgba8()))
}

/// Read oriented dimensions from the header without decoding pixels.
pub fn probe_dimensions(bytes: &[u8], mime: Option<&str>) -> Result<(u32, u32), DecodeError> {
    let reader = open_reader(bytes, mime)?;
    let is_jpeg = reader.format() == Some(ImageFormat::Jpeg);
    let (width, height) = reader.into_dimensions()?;

    if is_jpeg && swaps_axes(exif_orientation(bytes)) {
        Ok((height, width))
    } else {
        Ok((width, height))
    }
}

/// EXIF orientation tag of `bytes`, `NoTransforms` when there is none.
pub fn exif_orientation(bytes: &[u8]) -> Orientation {
    Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .and_then(|value| u8::try_from(value).ok())
        .and_then(Orientation::from_exif)
        .unwrap_or(Orientation::NoTransforms)
}

/// Orientations that exchange width and height.
fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

fn open_reader<'a>(
    bytes: &'a [u8],
    mime: Option<&str>,
) -> Result<ImageReader<Cursor<&'a [u8]>>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        match mime.and_then(ImageFormat::from_mime_type) {
            Some(format) => reader.set_format(format),
            None => return Err(DecodeError::InvalidFormat),
        }
    }

    reader.limits(Limits::default());
    Ok(reader)
}

//! Encoded image buffers.
//!
//! An [`ImageBuffer`] is the unit the session, history and export pipeline
//! pass around: encoded bytes, their MIME type and the natural dimensions.
//! It is immutable; every commit produces a new one and snapshots share it
//! through an `Arc`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::decode::{decode_image, probe_dimensions, DecodeError, DecodedImage};

/// Pixel dimensions of an image as stored, after EXIF orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalDimensions {
    pub width: u32,
    pub height: u32,
}

impl NaturalDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for NaturalDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Shared handle to an encoded raster image.
#[derive(Clone)]
pub struct ImageBuffer {
    bytes: Arc<[u8]>,
    mime: Arc<str>,
    natural: NaturalDimensions,
}

impl ImageBuffer {
    /// Wrap source bytes, reading the oriented dimensions from the header.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not a recognized image or the dimensions are
    /// zero.
    pub fn from_source(bytes: impl Into<Arc<[u8]>>, mime: &str) -> Result<Self, DecodeError> {
        let bytes = bytes.into();
        let (width, height) = probe_dimensions(&bytes, Some(mime))?;
        if width == 0 || height == 0 {
            return Err(DecodeError::DimensionsTooLarge { width, height });
        }
        Ok(Self {
            bytes,
            mime: Arc::from(mime),
            natural: NaturalDimensions::new(width, height),
        })
    }

    /// Wrap bytes this crate just encoded, whose dimensions are known.
    pub(crate) fn from_encoded(bytes: Vec<u8>, mime: &str, natural: NaturalDimensions) -> Self {
        Self {
            bytes: bytes.into(),
            mime: Arc::from(mime),
            natural,
        }
    }

    /// Decode into RGBA pixels. Each call decodes afresh.
    pub fn decode(&self) -> Result<DecodedImage, DecodeError> {
        decode_image(&self.bytes, Some(self.mime()))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn natural(&self) -> NaturalDimensions {
        self.natural
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &ImageBuffer) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl PartialEq for ImageBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.natural == other.natural
                && self.mime == other.mime
                && self.bytes == other.bytes)
    }
}

impl Eq for ImageBuffer {}

impl fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("mime", &self.mime)
            .field("natural", &self.natural)
            .field("len", &self.bytes.len())
            .finish()
    }
}

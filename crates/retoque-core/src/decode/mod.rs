//! Image decoding for the editing engine.
//!
//! This module provides functionality for:
//! - Decoding encoded source buffers (JPEG, PNG, WebP) into RGBA pixels
//! - Probing natural dimensions without a full decode
//! - Resizing decoded images with a choice of filters
//!
//! Every tool decodes the session's current buffer afresh; decoded pixels are
//! never shared between operations.

mod resize;
mod source;
mod types;

pub use resize::{calculate_fit_dimensions, resize, resize_region_to_fit};
pub use source::{decode_image, exif_orientation, probe_dimensions};
pub use types::{alloc_budget, buffer_len, checked_buffer_len, DecodeError, DecodedImage, FilterType, CHANNELS};

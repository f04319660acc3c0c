//! Geometric operations: crop, quarter-turn rotation and flips.
//!
//! All operations take a decoded RGBA image and return a new one; the input
//! is never modified.
//!
//! # Coordinate System
//!
//! - Crop selections are percentages of the natural dimensions
//! - Rotation angles are in degrees, positive = clockwise
//! - Origin is top-left corner

mod crop;
mod rotation;

pub use crop::{apply_crop, apply_crop_limited, CropOutput, CropRegion, PixelRect};
pub use rotation::{apply_flip, apply_rotation, rotated_dimensions, FlipAxis, Rotation};

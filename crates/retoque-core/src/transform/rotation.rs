//! Quarter-turn rotation and mirroring.
//!
//! Every operation is an exact pixel permutation computed by inverse mapping:
//! for each output pixel we find the single source pixel that lands there,
//! so no interpolation or resampling is involved.
//!
//! For a `w` x `h` source the inverse maps are:
//! ```text
//! clockwise 90:          dst(x, y) = src(y, h - 1 - x)
//! counter-clockwise 90:  dst(x, y) = src(w - 1 - y, x)
//! 180:                   dst(x, y) = src(w - 1 - x, h - 1 - y)
//! flip horizontal:       dst(x, y) = src(w - 1 - x, y)
//! flip vertical:         dst(x, y) = src(x, h - 1 - y)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decode::{DecodeError, DecodedImage, CHANNELS};

/// Rotation about the image center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    Clockwise90,
    CounterClockwise90,
    Half,
}

impl Rotation {
    /// Signed angle in degrees, positive = clockwise.
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Clockwise90 => 90,
            Rotation::CounterClockwise90 => -90,
            Rotation::Half => 180,
        }
    }

    /// Quarter turns swap width and height.
    pub fn swaps_dimensions(self) -> bool {
        !matches!(self, Rotation::Half)
    }
}

impl TryFrom<i32> for Rotation {
    type Error = String;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        match degrees {
            90 | -270 => Ok(Rotation::Clockwise90),
            -90 | 270 => Ok(Rotation::CounterClockwise90),
            180 | -180 => Ok(Rotation::Half),
            other => Err(format!("unsupported rotation: {other} degrees")),
        }
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Mirror axis. `Horizontal` swaps left and right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

impl fmt::Display for FlipAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlipAxis::Horizontal => "horizontal",
            FlipAxis::Vertical => "vertical",
        })
    }
}

impl FromStr for FlipAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Ok(FlipAxis::Horizontal),
            "vertical" | "v" => Ok(FlipAxis::Vertical),
            other => Err(format!("unknown flip axis: {other}")),
        }
    }
}

/// Output dimensions after rotating a `width` x `height` image.
pub fn rotated_dimensions(width: u32, height: u32, rotation: Rotation) -> (u32, u32) {
    if rotation.swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Rotate an image by a quarter or half turn.
pub fn apply_rotation(image: &DecodedImage, rotation: Rotation) -> Result<DecodedImage, DecodeError> {
    let (w, h) = (image.width, image.height);
    let (out_w, out_h) = rotated_dimensions(w, h, rotation);

    remap(image, out_w, out_h, |x, y| match rotation {
        Rotation::Clockwise90 => (y, h - 1 - x),
        Rotation::CounterClockwise90 => (w - 1 - y, x),
        Rotation::Half => (w - 1 - x, h - 1 - y),
    })
}

/// Mirror an image along an axis.
pub fn apply_flip(image: &DecodedImage, axis: FlipAxis) -> Result<DecodedImage, DecodeError> {
    let (w, h) = (image.width, image.height);

    remap(image, w, h, |x, y| match axis {
        FlipAxis::Horizontal => (w - 1 - x, y),
        FlipAxis::Vertical => (x, h - 1 - y),
    })
}

/// Build an `out_w` x `out_h` image where each pixel is copied from the
/// source coordinate returned by `source_of`.
fn remap(
    image: &DecodedImage,
    out_w: u32,
    out_h: u32,
    source_of: impl Fn(u32, u32) -> (u32, u32),
) -> Result<DecodedImage, DecodeError> {
    let mut output = DecodedImage::blank(out_w, out_h)?;
    if output.is_empty() {
        return Ok(output);
    }

    let src_stride = image.width as usize;
    for (i, dst) in output.pixels.chunks_exact_mut(CHANNELS).enumerate() {
        let x = (i % out_w as usize) as u32;
        let y = (i / out_w as usize) as u32;
        let (sx, sy) = source_of(x, y);
        let src = (sy as usize * src_stride + sx as usize) * CHANNELS;
        dst.copy_from_slice(&image.pixels[src..src + CHANNELS]);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x2 image whose red channel is the pixel index:
    /// ```text
    /// 0 1 2
    /// 3 4 5
    /// ```
    fn test_image() -> DecodedImage {
        let pixels = (0u8..6).flat_map(|i| [i, 0, 0, 255]).collect();
        DecodedImage::new(3, 2, pixels)
    }

    fn reds(image: &DecodedImage) -> Vec<u8> {
        image.pixels.chunks_exact(4).map(|p| p[0]).collect()
    }

    #[test]
    fn test_clockwise() {
        let out = apply_rotation(&test_image(), Rotation::Clockwise90).unwrap();
        assert_eq!((out.width, out.height), (2, 3));
        assert_eq!(reds(&out), vec![3, 0, 4, 1, 5, 2]);
    }

    #[test]
    fn test_counter_clockwise() {
        let out = apply_rotation(&test_image(), Rotation::CounterClockwise90).unwrap();
        assert_eq!((out.width, out.height), (2, 3));
        assert_eq!(reds(&out), vec![2, 5, 1, 4, 0, 3]);
    }

    #[test]
    fn test_half_turn() {
        let out = apply_rotation(&test_image(), Rotation::Half).unwrap();
        assert_eq!((out.width, out.height), (3, 2));
        assert_eq!(reds(&out), vec![5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_flips() {
        let h = apply_flip(&test_image(), FlipAxis::Horizontal).unwrap();
        assert_eq!(reds(&h), vec![2, 1, 0, 5, 4, 3]);

        let v = apply_flip(&test_image(), FlipAxis::Vertical).unwrap();
        assert_eq!(reds(&v), vec![3, 4, 5, 0, 1, 2]);
    }

    #[test]
    fn test_alpha_carried() {
        let img = DecodedImage::new(1, 2, vec![1, 2, 3, 0, 4, 5, 6, 128]);
        let out = apply_rotation(&img, Rotation::Clockwise90).unwrap();
        assert_eq!(out.pixels, vec![4, 5, 6, 128, 1, 2, 3, 0]);
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::try_from(90).unwrap(), Rotation::Clockwise90);
        assert_eq!(Rotation::try_from(-90).unwrap(), Rotation::CounterClockwise90);
        assert_eq!(Rotation::try_from(180).unwrap(), Rotation::Half);
        assert!(Rotation::try_from(45).is_err());
        assert_eq!(i32::from(Rotation::CounterClockwise90), -90);
    }

    #[test]
    fn test_flip_axis_parse() {
        assert_eq!("Horizontal".parse::<FlipAxis>().unwrap(), FlipAxis::Horizontal);
        assert_eq!("v".parse::<FlipAxis>().unwrap(), FlipAxis::Vertical);
        assert!("diagonal".parse::<FlipAxis>().is_err());
    }

    #[test]
    fn test_rotated_dimensions() {
        assert_eq!(rotated_dimensions(800, 600, Rotation::Clockwise90), (600, 800));
        assert_eq!(rotated_dimensions(800, 600, Rotation::Half), (800, 600));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn image_strategy() -> impl Strategy<Value = DecodedImage> {
        (1u32..12, 1u32..12).prop_flat_map(|(w, h)| {
            prop::collection::vec(any::<u8>(), (w * h * 4) as usize)
                .prop_map(move |pixels| DecodedImage::new(w, h, pixels))
        })
    }

    proptest! {
        /// Property: four clockwise turns are the identity.
        #[test]
        fn prop_four_turns_identity(img in image_strategy()) {
            let mut out = img.clone();
            for _ in 0..4 {
                out = apply_rotation(&out, Rotation::Clockwise90).unwrap();
            }
            prop_assert_eq!(out, img);
        }

        /// Property: clockwise then counter-clockwise is the identity.
        #[test]
        fn prop_opposite_turns_cancel(img in image_strategy()) {
            let cw = apply_rotation(&img, Rotation::Clockwise90).unwrap();
            let back = apply_rotation(&cw, Rotation::CounterClockwise90).unwrap();
            prop_assert_eq!(back, img);
        }

        /// Property: flipping twice is the identity.
        #[test]
        fn prop_double_flip_identity(img in image_strategy(), horizontal in any::<bool>()) {
            let axis = if horizontal { FlipAxis::Horizontal } else { FlipAxis::Vertical };
            let once = apply_flip(&img, axis).unwrap();
            prop_assert_eq!(apply_flip(&once, axis).unwrap(), img);
        }

        /// Property: a half turn equals both flips.
        #[test]
        fn prop_half_turn_is_both_flips(img in image_strategy()) {
            let half = apply_rotation(&img, Rotation::Half).unwrap();
            let h = apply_flip(&img, FlipAxis::Horizontal).unwrap();
            prop_assert_eq!(apply_flip(&h, FlipAxis::Vertical).unwrap(), half);
        }
    }
}

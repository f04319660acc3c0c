//! Pixel operations produced by committing a tool.

use serde::{Deserialize, Serialize};
use tracing::debug_span;

use crate::adjustments::{apply_tone_adjustments, ToneAdjustments};
use crate::decode::{resize, DecodeError, DecodedImage, FilterType};
use crate::encode::ExportFormat;
use crate::filters::PresetFilter;
use crate::transform::{apply_crop_limited, apply_flip, apply_rotation, FlipAxis, PixelRect, Rotation};

/// A fully resolved, self-contained edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EditOperation {
    Crop {
        rect: PixelRect,
        max_dimension: u32,
        /// JPEG quality of the committed crop.
        quality: f32,
    },
    Resize {
        width: u32,
        height: u32,
    },
    Rotate {
        rotation: Rotation,
    },
    Flip {
        axis: FlipAxis,
    },
    Adjust {
        adjustments: ToneAdjustments,
    },
    Filter {
        filter: PresetFilter,
    },
}

#[derive(Debug, Clone)]
pub struct OperationOutput {
    pub image: DecodedImage,
    /// A crop was scaled down to respect the device limit.
    pub downscaled: bool,
}

impl EditOperation {
    pub fn name(&self) -> &'static str {
        match self {
            EditOperation::Crop { .. } => "crop",
            EditOperation::Resize { .. } => "resize",
            EditOperation::Rotate { .. } => "rotate",
            EditOperation::Flip { .. } => "flip",
            EditOperation::Adjust { .. } => "adjust",
            EditOperation::Filter { .. } => "filter",
        }
    }

    /// Encoding of the committed buffer: crops are stored as JPEG at the
    /// device quality, everything else losslessly.
    pub fn output_encoding(&self) -> (ExportFormat, f32) {
        match self {
            EditOperation::Crop { quality, .. } => (ExportFormat::Jpeg, *quality),
            _ => (ExportFormat::Png, 1.0),
        }
    }

    /// Run the operation on freshly decoded pixels.
    pub fn apply(&self, mut image: DecodedImage) -> Result<OperationOutput, DecodeError> {
        let _span = debug_span!("edit_operation", op = self.name(), width = image.width, height = image.height)
            .entered();

        let output = match *self {
            EditOperation::Crop {
                rect,
                max_dimension,
                ..
            } => {
                let cropped = apply_crop_limited(&image, rect, max_dimension)?;
                OperationOutput {
                    image: cropped.image,
                    downscaled: cropped.downscaled,
                }
            }
            EditOperation::Resize { width, height } => OperationOutput {
                image: resize(&image, width, height, FilterType::Lanczos3)?,
                downscaled: false,
            },
            EditOperation::Rotate { rotation } => OperationOutput {
                image: apply_rotation(&image, rotation)?,
                downscaled: false,
            },
            EditOperation::Flip { axis } => OperationOutput {
                image: apply_flip(&image, axis)?,
                downscaled: false,
            },
            EditOperation::Adjust { adjustments } => {
                apply_tone_adjustments(&mut image.pixels, &adjustments);
                OperationOutput {
                    image,
                    downscaled: false,
                }
            }
            EditOperation::Filter { filter } => {
                filter.apply(&mut image.pixels);
                OperationOutput {
                    image,
                    downscaled: false,
                }
            }
        };
        Ok(output)
    }
}

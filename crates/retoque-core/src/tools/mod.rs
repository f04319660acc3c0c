//! Editing tools.
//!
//! Each tool is a small state machine (`Inactive` -> `Editing` ->
//! `ReadyToCommit`) holding working parameters. Updating parameters only
//! changes what the preview shows; pixels are touched when the session turns
//! the tool's [`EditOperation`] plan into a commit job.
//!
//! Exactly one tool is active at a time. [`ActiveTool`] owns it and forwards
//! to the [`Tool`] trait.

mod adjust;
mod crop;
mod filter;
mod operation;
mod resize;
mod transform;

pub use adjust::AdjustTool;
pub use crop::CropTool;
pub use filter::FilterTool;
pub use operation::{EditOperation, OperationOutput};
pub use resize::ResizeTool;
pub use transform::{TransformAction, TransformTool};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::adjustments::ToneAdjustments;
use crate::buffer::NaturalDimensions;
use crate::config::DeviceProfile;
use crate::error::{EditError, Result};
use crate::filters::PresetFilter;
use crate::transform::{CropRegion, FlipAxis, PixelRect, Rotation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Crop,
    Resize,
    Transform,
    Adjust,
    Filter,
}

impl ToolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Crop => "crop",
            ToolKind::Resize => "resize",
            ToolKind::Transform => "transform",
            ToolKind::Adjust => "adjust",
            ToolKind::Filter => "filter",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crop" => Ok(ToolKind::Crop),
            "resize" => Ok(ToolKind::Resize),
            "transform" | "rotate" => Ok(ToolKind::Transform),
            "adjust" | "adjustments" => Ok(ToolKind::Adjust),
            "filter" | "filters" => Ok(ToolKind::Filter),
            other => Err(EditError::invalid(format!("unknown tool: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolPhase {
    Inactive,
    /// Active with nothing to commit yet.
    Editing,
    /// Active and a commit would change the image.
    ReadyToCommit,
}

/// A partial change to the active tool's working parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum ToolUpdate {
    CropRegion(CropRegion),
    ResizeWidth(u32),
    ResizeHeight(u32),
    MaintainAspect(bool),
    Rotate(Rotation),
    Flip(FlipAxis),
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
    Filter(PresetFilter),
}

/// Snapshot of a tool's working parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "lowercase")]
pub enum ToolParameters {
    Crop {
        region: Option<CropRegion>,
    },
    Resize {
        width: u32,
        height: u32,
        maintain_aspect: bool,
    },
    Transform {
        pending: Option<TransformAction>,
    },
    Adjust(ToneAdjustments),
    Filter {
        filter: PresetFilter,
    },
}

/// What the host needs to render the live preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolPreview {
    pub kind: ToolKind,
    pub phase: ToolPhase,
    pub parameters: ToolParameters,
    /// CSS `filter` value approximating the pending tonal/preset change.
    pub css_filter: Option<String>,
    /// Crop selection resolved against the current natural dimensions.
    pub crop_rect: Option<PixelRect>,
    pub has_changes: bool,
}

/// Session state a tool reads when seeding or planning.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext {
    pub natural: NaturalDimensions,
    pub profile: DeviceProfile,
}

/// Uniform contract of every tool.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn is_active(&self) -> bool;

    /// Seed working parameters from the current image.
    fn activate(&mut self, ctx: &ToolContext);

    /// Apply a partial parameter change.
    ///
    /// # Errors
    ///
    /// `InvalidParameters` if the update belongs to another tool.
    fn update(&mut self, update: ToolUpdate, ctx: &ToolContext) -> Result<()>;

    /// Whether committing now would change the image.
    fn has_changes(&self, ctx: &ToolContext) -> bool;

    fn parameters(&self) -> ToolParameters;

    /// Turn the working parameters into an operation. `Ok(None)` means the
    /// commit is a no-op.
    fn plan(&self, ctx: &ToolContext) -> Result<Option<EditOperation>>;

    /// Drop working parameters and go inactive.
    fn cancel(&mut self);

    /// Called after this tool's operation was committed.
    fn committed(&mut self, ctx: &ToolContext) {
        let _ = ctx;
        self.cancel();
    }

    fn css_filter(&self) -> Option<String> {
        None
    }

    fn crop_rect(&self, ctx: &ToolContext) -> Option<PixelRect> {
        let _ = ctx;
        None
    }

    fn phase(&self, ctx: &ToolContext) -> ToolPhase {
        if !self.is_active() {
            ToolPhase::Inactive
        } else if self.has_changes(ctx) {
            ToolPhase::ReadyToCommit
        } else {
            ToolPhase::Editing
        }
    }

    fn preview(&self, ctx: &ToolContext) -> ToolPreview {
        ToolPreview {
            kind: self.kind(),
            phase: self.phase(ctx),
            parameters: self.parameters(),
            css_filter: self.css_filter(),
            crop_rect: self.crop_rect(ctx),
            has_changes: self.has_changes(ctx),
        }
    }
}

/// The single active tool.
#[derive(Debug, Clone)]
pub enum ActiveTool {
    Crop(CropTool),
    Resize(ResizeTool),
    Transform(TransformTool),
    Adjust(AdjustTool),
    Filter(FilterTool),
}

impl ActiveTool {
    /// Create and activate a tool of the given kind.
    pub fn activate(kind: ToolKind, ctx: &ToolContext) -> Self {
        let mut tool = match kind {
            ToolKind::Crop => ActiveTool::Crop(CropTool::default()),
            ToolKind::Resize => ActiveTool::Resize(ResizeTool::default()),
            ToolKind::Transform => ActiveTool::Transform(TransformTool::default()),
            ToolKind::Adjust => ActiveTool::Adjust(AdjustTool::default()),
            ToolKind::Filter => ActiveTool::Filter(FilterTool::default()),
        };
        tool.as_tool_mut().activate(ctx);
        tool
    }

    pub fn as_tool(&self) -> &dyn Tool {
        match self {
            ActiveTool::Crop(tool) => tool,
            ActiveTool::Resize(tool) => tool,
            ActiveTool::Transform(tool) => tool,
            ActiveTool::Adjust(tool) => tool,
            ActiveTool::Filter(tool) => tool,
        }
    }

    pub fn as_tool_mut(&mut self) -> &mut dyn Tool {
        match self {
            ActiveTool::Crop(tool) => tool,
            ActiveTool::Resize(tool) => tool,
            ActiveTool::Transform(tool) => tool,
            ActiveTool::Adjust(tool) => tool,
            ActiveTool::Filter(tool) => tool,
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.as_tool().kind()
    }

    /// The resize target, when this is a resize tool with a positive target.
    pub fn resize_target(&self) -> Option<(u32, u32)> {
        match self {
            ActiveTool::Resize(tool) => tool.target(),
            _ => None,
        }
    }
}

/// Error for an update sent to the wrong tool.
fn mismatched(kind: ToolKind, update: &ToolUpdate) -> EditError {
    EditError::invalid(format!("{update:?} does not apply to the {kind} tool"))
}

/// Parameter updates that reach a tool which has not been activated.
fn inactive(kind: ToolKind) -> EditError {
    EditError::invalid(format!("the {kind} tool is not active"))
}

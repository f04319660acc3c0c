//! Rotate and flip tool.
//!
//! Holds at most one pending action. Hosts usually trigger actions
//! directly through the session, which activates this tool, sets the action
//! and commits in one step.

use serde::{Deserialize, Serialize};

use super::{inactive, mismatched, EditOperation, Tool, ToolContext, ToolKind, ToolParameters, ToolUpdate};
use crate::error::{EditError, Result};
use crate::transform::{FlipAxis, Rotation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum TransformAction {
    Rotate { rotation: Rotation },
    Flip { axis: FlipAxis },
}

impl From<TransformAction> for EditOperation {
    fn from(action: TransformAction) -> Self {
        match action {
            TransformAction::Rotate { rotation } => EditOperation::Rotate { rotation },
            TransformAction::Flip { axis } => EditOperation::Flip { axis },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformTool {
    active: bool,
    pending: Option<TransformAction>,
}

impl TransformTool {
    pub fn pending(&self) -> Option<TransformAction> {
        self.pending
    }
}

impl Tool for TransformTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Transform
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self, _ctx: &ToolContext) {
        self.active = true;
        self.pending = None;
    }

    fn update(&mut self, update: ToolUpdate, _ctx: &ToolContext) -> Result<()> {
        if !self.active {
            return Err(inactive(self.kind()));
        }
        self.pending = Some(match update {
            ToolUpdate::Rotate(rotation) => TransformAction::Rotate { rotation },
            ToolUpdate::Flip(axis) => TransformAction::Flip { axis },
            other => return Err(mismatched(self.kind(), &other)),
        });
        Ok(())
    }

    fn has_changes(&self, _ctx: &ToolContext) -> bool {
        self.active && self.pending.is_some()
    }

    fn parameters(&self) -> ToolParameters {
        ToolParameters::Transform {
            pending: self.pending,
        }
    }

    fn plan(&self, _ctx: &ToolContext) -> Result<Option<EditOperation>> {
        if !self.active {
            return Err(EditError::NoActiveTool);
        }
        Ok(self.pending.map(EditOperation::from))
    }

    fn cancel(&mut self) {
        self.active = false;
        self.pending = None;
    }

    /// Stays active so several rotations can be applied in a row.
    fn committed(&mut self, _ctx: &ToolContext) {
        self.pending = None;
    }
}

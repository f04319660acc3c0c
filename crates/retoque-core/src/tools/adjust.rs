//! Brightness / contrast / saturation tool.
//!
//! The preview is a CSS filter string; a commit recomputes the effect on
//! freshly decoded pixels. Sliders return to zero after a commit.

use tracing::debug;

use super::{inactive, mismatched, EditOperation, Tool, ToolContext, ToolKind, ToolParameters, ToolUpdate};
use crate::adjustments::ToneAdjustments;
use crate::error::{EditError, Result};

#[derive(Debug, Clone, Default)]
pub struct AdjustTool {
    active: bool,
    values: ToneAdjustments,
}

impl AdjustTool {
    pub fn values(&self) -> ToneAdjustments {
        self.values
    }
}

impl Tool for AdjustTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Adjust
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self, _ctx: &ToolContext) {
        self.active = true;
        self.values = ToneAdjustments::default();
    }

    fn update(&mut self, update: ToolUpdate, _ctx: &ToolContext) -> Result<()> {
        if !self.active {
            return Err(inactive(self.kind()));
        }
        let mut values = self.values;
        match update {
            ToolUpdate::Brightness(v) => values.brightness = v,
            ToolUpdate::Contrast(v) => values.contrast = v,
            ToolUpdate::Saturation(v) => values.saturation = v,
            other => return Err(mismatched(self.kind(), &other)),
        }
        self.values = values.clamped();
        debug!(?self.values, "tone adjustments");
        Ok(())
    }

    fn has_changes(&self, _ctx: &ToolContext) -> bool {
        self.active && !self.values.is_identity()
    }

    fn parameters(&self) -> ToolParameters {
        ToolParameters::Adjust(self.values)
    }

    fn plan(&self, _ctx: &ToolContext) -> Result<Option<EditOperation>> {
        if !self.active {
            return Err(EditError::NoActiveTool);
        }
        if self.values.is_identity() {
            return Ok(None);
        }
        Ok(Some(EditOperation::Adjust {
            adjustments: self.values,
        }))
    }

    fn cancel(&mut self) {
        self.active = false;
        self.values = ToneAdjustments::default();
    }

    fn committed(&mut self, _ctx: &ToolContext) {
        self.values = ToneAdjustments::default();
    }

    fn css_filter(&self) -> Option<String> {
        self.active.then(|| self.values.preview_filter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tests::ctx;
    use crate::tools::ToolPhase;

    #[test]
    fn test_all_zero_is_noop() {
        let c = ctx(10, 10);
        let mut tool = AdjustTool::default();
        tool.activate(&c);
        tool.update(ToolUpdate::Brightness(0.0), &c).unwrap();
        assert!(!tool.has_changes(&c));
        assert_eq!(tool.plan(&c).unwrap(), None);
        assert_eq!(tool.css_filter().as_deref(), Some("none"));
    }

    #[test]
    fn test_sliders_clamped_and_previewed() {
        let c = ctx(10, 10);
        let mut tool = AdjustTool::default();
        tool.activate(&c);
        tool.update(ToolUpdate::Contrast(250.0), &c).unwrap();
        tool.update(ToolUpdate::Saturation(-50.0), &c).unwrap();

        assert_eq!(tool.values().contrast, 100.0);
        assert_eq!(tool.phase(&c), ToolPhase::ReadyToCommit);
        assert_eq!(
            tool.css_filter().as_deref(),
            Some("brightness(1) contrast(2) saturate(0.5)")
        );
    }

    #[test]
    fn test_committed_resets_sliders() {
        let c = ctx(10, 10);
        let mut tool = AdjustTool::default();
        tool.activate(&c);
        tool.update(ToolUpdate::Brightness(30.0), &c).unwrap();
        tool.committed(&c);
        assert!(tool.is_active());
        assert!(tool.values().is_identity());
    }
}

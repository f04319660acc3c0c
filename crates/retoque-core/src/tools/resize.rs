//! Resize tool.
//!
//! With the aspect lock on, editing one dimension recomputes the other as
//! `round(value * natural_other / natural_edited)`.

use tracing::debug;

use super::{inactive, mismatched, EditOperation, Tool, ToolContext, ToolKind, ToolParameters, ToolUpdate};
use crate::error::{EditError, Result};

#[derive(Debug, Clone)]
pub struct ResizeTool {
    active: bool,
    width: u32,
    height: u32,
    maintain_aspect: bool,
}

impl Default for ResizeTool {
    fn default() -> Self {
        Self {
            active: false,
            width: 0,
            height: 0,
            maintain_aspect: true,
        }
    }
}

impl ResizeTool {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn maintain_aspect(&self) -> bool {
        self.maintain_aspect
    }

    /// The working target, if active and both dimensions are positive.
    pub fn target(&self) -> Option<(u32, u32)> {
        (self.active && self.width > 0 && self.height > 0).then_some((self.width, self.height))
    }
}

fn proportional(value: u32, other: u32, edited: u32) -> u32 {
    if edited == 0 {
        return 0;
    }
    let scaled = (value as f64 * other as f64 / edited as f64).round();
    scaled.min(u32::MAX as f64) as u32
}

impl Tool for ResizeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Resize
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self, ctx: &ToolContext) {
        self.active = true;
        self.width = ctx.natural.width;
        self.height = ctx.natural.height;
    }

    fn update(&mut self, update: ToolUpdate, ctx: &ToolContext) -> Result<()> {
        if !self.active {
            return Err(inactive(self.kind()));
        }
        let natural = ctx.natural;
        match update {
            ToolUpdate::ResizeWidth(width) => {
                self.width = width;
                if self.maintain_aspect {
                    self.height = proportional(width, natural.height, natural.width);
                }
            }
            ToolUpdate::ResizeHeight(height) => {
                self.height = height;
                if self.maintain_aspect {
                    self.width = proportional(height, natural.width, natural.height);
                }
            }
            ToolUpdate::MaintainAspect(on) => self.maintain_aspect = on,
            other => return Err(mismatched(self.kind(), &other)),
        }
        debug!(
            width = self.width,
            height = self.height,
            maintain_aspect = self.maintain_aspect,
            "resize target"
        );
        Ok(())
    }

    fn has_changes(&self, ctx: &ToolContext) -> bool {
        self.target()
            .is_some_and(|(w, h)| (w, h) != (ctx.natural.width, ctx.natural.height))
    }

    fn parameters(&self) -> ToolParameters {
        ToolParameters::Resize {
            width: self.width,
            height: self.height,
            maintain_aspect: self.maintain_aspect,
        }
    }

    fn plan(&self, ctx: &ToolContext) -> Result<Option<EditOperation>> {
        if !self.active {
            return Err(EditError::NoActiveTool);
        }
        let (width, height) = self.target().ok_or_else(|| {
            EditError::invalid(format!(
                "resize target {}x{} must be positive",
                self.width, self.height
            ))
        })?;

        if !self.has_changes(ctx) {
            return Ok(None);
        }
        Ok(Some(EditOperation::Resize { width, height }))
    }

    fn cancel(&mut self) {
        *self = Self {
            maintain_aspect: self.maintain_aspect,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tests::ctx;

    fn active(c: &ToolContext) -> ResizeTool {
        let mut tool = ResizeTool::default();
        tool.activate(c);
        tool
    }

    #[test]
    fn test_seeded_from_natural() {
        let c = ctx(640, 480);
        let tool = active(&c);
        assert_eq!((tool.width(), tool.height()), (640, 480));
        assert!(tool.maintain_aspect());
        assert_eq!(tool.plan(&c).unwrap(), None);
    }

    #[test]
    fn test_locked_aspect() {
        let c = ctx(1000, 1000);
        let mut tool = active(&c);
        tool.update(ToolUpdate::ResizeWidth(500), &c).unwrap();
        assert_eq!((tool.width(), tool.height()), (500, 500));

        tool.update(ToolUpdate::MaintainAspect(false), &c).unwrap();
        tool.update(ToolUpdate::ResizeHeight(800), &c).unwrap();
        assert_eq!((tool.width(), tool.height()), (500, 800));
        assert_eq!(
            tool.plan(&c).unwrap(),
            Some(EditOperation::Resize {
                width: 500,
                height: 800
            })
        );
    }

    #[test]
    fn test_locked_height_rounds() {
        let c = ctx(800, 600);
        let mut tool = active(&c);
        tool.update(ToolUpdate::ResizeHeight(100), &c).unwrap();
        // 100 * 800 / 600 = 133.33
        assert_eq!(tool.width(), 133);
    }

    #[test]
    fn test_zero_target_is_invalid() {
        let c = ctx(800, 600);
        let mut tool = active(&c);
        tool.update(ToolUpdate::ResizeWidth(0), &c).unwrap();
        assert_eq!(tool.height(), 0);
        assert!(!tool.has_changes(&c));
        assert!(matches!(tool.plan(&c), Err(EditError::InvalidParameters(_))));
    }

    #[test]
    fn test_cancel_keeps_lock_preference() {
        let c = ctx(10, 10);
        let mut tool = active(&c);
        tool.update(ToolUpdate::MaintainAspect(false), &c).unwrap();
        tool.cancel();
        assert!(!tool.is_active());
        assert!(!tool.maintain_aspect());
        assert_eq!(tool.target(), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::tools::tests::ctx;
    use proptest::prelude::*;

    proptest! {
        /// Property: doubling the width with the lock on doubles the height.
        #[test]
        fn prop_locked_doubling((nw, nh) in (1u32..5000, 1u32..5000)) {
            let c = ctx(nw, nh);
            let mut tool = ResizeTool::default();
            tool.activate(&c);
            tool.update(ToolUpdate::ResizeWidth(nw * 2), &c).unwrap();
            prop_assert!((tool.height() as i64 - (nh as i64 * 2)).abs() <= 1);
        }
    }
}

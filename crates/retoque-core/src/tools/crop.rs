//! Crop tool.
//!
//! Activation selects the full frame. The selection is discarded on cancel,
//! on a successful commit, and when another tool is activated.

use tracing::debug;

use super::{inactive, mismatched, EditOperation, Tool, ToolContext, ToolKind, ToolParameters, ToolUpdate};
use crate::error::{EditError, Result};
use crate::transform::{CropRegion, PixelRect};

#[derive(Debug, Clone, Default)]
pub struct CropTool {
    region: Option<CropRegion>,
}

impl CropTool {
    pub fn region(&self) -> Option<CropRegion> {
        self.region
    }

    fn resolved(&self, ctx: &ToolContext) -> Option<PixelRect> {
        self.region?
            .resolve(ctx.natural.width, ctx.natural.height)
    }

    fn exceeds_limit(rect: PixelRect, ctx: &ToolContext) -> bool {
        let limit = ctx.profile.crop_max_dimension;
        rect.width > limit || rect.height > limit
    }
}

impl Tool for CropTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Crop
    }

    fn is_active(&self) -> bool {
        self.region.is_some()
    }

    fn activate(&mut self, _ctx: &ToolContext) {
        self.region = Some(CropRegion::full_frame());
    }

    fn update(&mut self, update: ToolUpdate, _ctx: &ToolContext) -> Result<()> {
        match update {
            ToolUpdate::CropRegion(region) => {
                if self.region.is_none() {
                    return Err(inactive(self.kind()));
                }
                let region = region.clamped();
                debug!(?region, "crop region");
                self.region = Some(region);
                Ok(())
            }
            other => Err(mismatched(self.kind(), &other)),
        }
    }

    /// A full-frame selection only changes the image when it exceeds the
    /// device size limit.
    fn has_changes(&self, ctx: &ToolContext) -> bool {
        match self.resolved(ctx) {
            Some(rect) => {
                rect != PixelRect::full(ctx.natural.width, ctx.natural.height)
                    || Self::exceeds_limit(rect, ctx)
            }
            None => false,
        }
    }

    fn parameters(&self) -> ToolParameters {
        ToolParameters::Crop {
            region: self.region,
        }
    }

    fn plan(&self, ctx: &ToolContext) -> Result<Option<EditOperation>> {
        if self.region.is_none() {
            return Err(EditError::NoActiveTool);
        }
        let rect = self
            .resolved(ctx)
            .ok_or_else(|| EditError::invalid("crop selection has zero area"))?;

        if !self.has_changes(ctx) {
            return Ok(None);
        }
        Ok(Some(EditOperation::Crop {
            rect,
            max_dimension: ctx.profile.crop_max_dimension,
            quality: ctx.profile.crop_quality,
        }))
    }

    fn cancel(&mut self) {
        self.region = None;
    }

    fn crop_rect(&self, ctx: &ToolContext) -> Option<PixelRect> {
        self.resolved(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceProfile;
    use crate::tools::tests::ctx;
    use crate::tools::ToolPhase;

    fn active(c: &ToolContext) -> CropTool {
        let mut tool = CropTool::default();
        tool.activate(c);
        tool
    }

    #[test]
    fn test_activate_selects_full_frame() {
        let c = ctx(800, 600);
        let tool = active(&c);
        assert_eq!(tool.region(), Some(CropRegion::full_frame()));
        assert_eq!(tool.crop_rect(&c), Some(PixelRect::full(800, 600)));
        assert!(!tool.has_changes(&c));
        assert_eq!(tool.plan(&c).unwrap(), None);
    }

    #[test]
    fn test_center_quarter_plan() {
        let c = ctx(800, 600);
        let mut tool = active(&c);
        tool.update(ToolUpdate::CropRegion(CropRegion::new(25.0, 25.0, 50.0, 50.0)), &c)
            .unwrap();

        assert_eq!(tool.phase(&c), ToolPhase::ReadyToCommit);
        let op = tool.plan(&c).unwrap().unwrap();
        assert_eq!(
            op,
            EditOperation::Crop {
                rect: PixelRect {
                    x: 200,
                    y: 150,
                    width: 400,
                    height: 300
                },
                max_dimension: 4096,
                quality: 0.92,
            }
        );
    }

    #[test]
    fn test_zero_area_is_invalid() {
        let c = ctx(800, 600);
        let mut tool = active(&c);
        tool.update(ToolUpdate::CropRegion(CropRegion::new(10.0, 10.0, 0.0, 20.0)), &c)
            .unwrap();
        assert!(matches!(tool.plan(&c), Err(EditError::InvalidParameters(_))));
        assert_eq!(tool.phase(&c), ToolPhase::Editing);
    }

    #[test]
    fn test_full_frame_over_limit_changes() {
        let c = ToolContext {
            profile: DeviceProfile::constrained(),
            ..ctx(3000, 2000)
        };
        let tool = active(&c);
        assert!(tool.has_changes(&c));
        assert!(matches!(
            tool.plan(&c).unwrap(),
            Some(EditOperation::Crop { max_dimension: 1024, .. })
        ));
    }

    #[test]
    fn test_cancel_clears_selection() {
        let c = ctx(100, 100);
        let mut tool = active(&c);
        tool.cancel();
        assert!(!tool.is_active());
        assert_eq!(tool.crop_rect(&c), None);
        assert!(tool.update(ToolUpdate::CropRegion(CropRegion::full_frame()), &c).is_err());
    }
}

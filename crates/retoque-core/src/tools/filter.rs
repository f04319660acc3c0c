//! Preset filter tool. Selecting `none` clears the pending filter.

use super::{inactive, mismatched, EditOperation, Tool, ToolContext, ToolKind, ToolParameters, ToolUpdate};
use crate::error::{EditError, Result};
use crate::filters::PresetFilter;

#[derive(Debug, Clone, Default)]
pub struct FilterTool {
    active: bool,
    filter: PresetFilter,
}

impl FilterTool {
    pub fn filter(&self) -> PresetFilter {
        self.filter
    }
}

impl Tool for FilterTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Filter
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self, _ctx: &ToolContext) {
        self.active = true;
        self.filter = PresetFilter::None;
    }

    fn update(&mut self, update: ToolUpdate, _ctx: &ToolContext) -> Result<()> {
        if !self.active {
            return Err(inactive(self.kind()));
        }
        match update {
            ToolUpdate::Filter(filter) => {
                self.filter = filter;
                Ok(())
            }
            other => Err(mismatched(self.kind(), &other)),
        }
    }

    fn has_changes(&self, _ctx: &ToolContext) -> bool {
        self.active && !self.filter.is_none()
    }

    fn parameters(&self) -> ToolParameters {
        ToolParameters::Filter {
            filter: self.filter,
        }
    }

    fn plan(&self, _ctx: &ToolContext) -> Result<Option<EditOperation>> {
        if !self.active {
            return Err(EditError::NoActiveTool);
        }
        if self.filter.is_none() {
            return Ok(None);
        }
        Ok(Some(EditOperation::Filter {
            filter: self.filter,
        }))
    }

    fn cancel(&mut self) {
        self.active = false;
        self.filter = PresetFilter::None;
    }

    fn committed(&mut self, _ctx: &ToolContext) {
        self.filter = PresetFilter::None;
    }

    fn css_filter(&self) -> Option<String> {
        self.active.then(|| self.filter.preview_filter().to_string())
    }
}

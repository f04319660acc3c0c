//! The editor session: one loaded image and everything editing it.
//!
//! [`EditorSession`] owns the current [`ImageBuffer`], the viewport, the
//! gesture recognizer, the undo history and the active tool. Pixel work runs
//! as a [`CommitJob`] that owns everything it needs, so a host can run it on
//! another thread and hand the [`CommitResult`] back. While a job is
//! outstanding every mutating call returns [`EditError::Busy`]; viewport and
//! gesture calls keep working.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, debug_span, info, warn};

use crate::buffer::{ImageBuffer, NaturalDimensions};
use crate::config::{DeviceClass, DeviceHints, DeviceProfile, EditorConfig};
use crate::error::{EditError, Result};
use crate::export::{export_image, ExportPlan, ExportRequest, ExportResult};
use crate::history::{HistoryManager, Snapshot};
use crate::tools::{
    ActiveTool, EditOperation, ToolContext, ToolKind, ToolPreview, ToolUpdate, TransformAction,
};
use crate::transform::{FlipAxis, Rotation};
use crate::viewport::{
    ContainerSize, GestureMode, GestureRecognizer, TouchPoint, ViewportController, ViewportState,
};

/// Encoded bytes handed over by the host.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Arc<[u8]>,
    pub mime: String,
    /// Original file name, used to suggest export names.
    pub name: Option<String>,
}

impl SourceImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: mime.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// What a finished commit did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CommitOutcome {
    /// The tool had nothing to apply.
    Unchanged,
    Committed {
        natural: NaturalDimensions,
        /// A crop was scaled down to the device size limit.
        downscaled: bool,
    },
}

/// A self-contained commit, safe to run on any thread.
#[derive(Debug)]
pub struct CommitJob {
    id: u64,
    buffer: ImageBuffer,
    operation: EditOperation,
}

impl CommitJob {
    /// Identifies the job to [`EditorSession::abandon_commit`].
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn operation(&self) -> EditOperation {
        self.operation
    }

    /// Decode, apply the operation and encode the new buffer.
    pub fn run(self) -> CommitResult {
        let _span = debug_span!("commit_job", id = self.id, op = self.operation.name()).entered();
        let outcome = render(&self.buffer, &self.operation);
        CommitResult {
            id: self.id,
            operation: self.operation,
            outcome,
        }
    }
}

fn render(buffer: &ImageBuffer, operation: &EditOperation) -> Result<Rendered> {
    let image = buffer.decode()?;
    let output = operation.apply(image)?;
    let (format, quality) = operation.output_encoding();
    let bytes = format.encode(&output.image, quality)?;
    let natural = NaturalDimensions::new(output.image.width, output.image.height);
    Ok(Rendered {
        buffer: ImageBuffer::from_encoded(bytes, format.mime_type(), natural),
        downscaled: output.downscaled,
    })
}

#[derive(Debug)]
struct Rendered {
    buffer: ImageBuffer,
    downscaled: bool,
}

/// Output of [`CommitJob::run`], to be passed to
/// [`EditorSession::finish_commit`].
#[derive(Debug)]
pub struct CommitResult {
    id: u64,
    operation: EditOperation,
    outcome: Result<Rendered>,
}

impl CommitResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingCommit {
    id: u64,
    operation: EditOperation,
}

#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    device: DeviceClass,
    profile: DeviceProfile,
    source: ImageBuffer,
    source_name: Option<String>,
    current: ImageBuffer,
    viewport: ViewportController,
    gestures: GestureRecognizer,
    history: HistoryManager,
    tool: Option<ActiveTool>,
    pending: Option<PendingCommit>,
    next_job: u64,
}

impl EditorSession {
    /// Open a session on `source`.
    ///
    /// # Errors
    ///
    /// `Config` for an invalid configuration, `ResourceExhaustion` when the
    /// source cannot be read.
    pub fn load(
        source: SourceImage,
        hints: DeviceHints,
        container: ContainerSize,
        config: EditorConfig,
    ) -> Result<Self> {
        config.validate()?;
        let device = DeviceClass::from(hints);
        let profile = config.profile(device);
        let buffer = ImageBuffer::from_source(source.bytes, &source.mime)?;
        let natural = buffer.natural();

        info!(%natural, mime = buffer.mime(), ?device, "source loaded");

        Ok(Self {
            viewport: ViewportController::new(natural, container, config.zoom, profile.fit_padding),
            history: HistoryManager::new(config.history.capacity),
            gestures: GestureRecognizer::new(),
            source: buffer.clone(),
            current: buffer,
            source_name: source.name,
            tool: None,
            pending: None,
            next_job: 0,
            config,
            device,
            profile,
        })
    }

    /// Replace the image being edited. History, tool and view start over.
    pub fn load_source(&mut self, source: SourceImage) -> Result<NaturalDimensions> {
        self.ensure_idle()?;
        let buffer = ImageBuffer::from_source(source.bytes, &source.mime)?;
        let natural = buffer.natural();
        info!(%natural, mime = buffer.mime(), "source replaced");

        self.source = buffer.clone();
        self.source_name = source.name;
        self.history.clear();
        self.install(buffer);
        Ok(natural)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn natural(&self) -> NaturalDimensions {
        self.current.natural()
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn viewport_controller(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn current_buffer(&self) -> &ImageBuffer {
        &self.current
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn device_class(&self) -> DeviceClass {
        self.device
    }

    pub fn profile(&self) -> DeviceProfile {
        self.profile
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.tool.as_ref().map(ActiveTool::kind)
    }

    // ---------------------------------------------------------------------
    // Tools
    // ---------------------------------------------------------------------

    /// Make `kind` the active tool. Any other active tool is cancelled;
    /// activating the tool that is already active keeps its parameters.
    pub fn activate_tool(&mut self, kind: ToolKind) -> Result<ToolPreview> {
        self.ensure_idle()?;
        let ctx = self.tool_context();
        let tool = match self.tool.take() {
            Some(tool) if tool.kind() == kind => tool,
            previous => {
                if let Some(mut previous) = previous {
                    previous.as_tool_mut().cancel();
                    debug!(tool = %previous.kind(), "tool cancelled by switch");
                }
                ActiveTool::activate(kind, &ctx)
            }
        };
        let preview = tool.as_tool().preview(&ctx);
        self.tool = Some(tool);
        self.sync_drag();
        debug!(tool = %kind, "tool activated");
        Ok(preview)
    }

    /// Apply a partial parameter change to the active tool.
    pub fn update_tool(&mut self, update: ToolUpdate) -> Result<ToolPreview> {
        self.ensure_idle()?;
        let ctx = self.tool_context();
        let tool = self.tool.as_mut().ok_or(EditError::NoActiveTool)?;
        if let Err(err) = tool.as_tool_mut().update(update, &ctx) {
            warn!(error = %err, "tool update refused");
            return Err(err);
        }
        Ok(tool.as_tool().preview(&ctx))
    }

    /// Drop the active tool and its working parameters.
    pub fn cancel_tool(&mut self) -> Result<()> {
        self.ensure_idle()?;
        if let Some(mut tool) = self.tool.take() {
            tool.as_tool_mut().cancel();
            debug!(tool = %tool.kind(), "tool cancelled");
        }
        self.sync_drag();
        Ok(())
    }

    pub fn preview(&self) -> Option<ToolPreview> {
        let ctx = self.tool_context();
        self.tool.as_ref().map(|tool| tool.as_tool().preview(&ctx))
    }

    // ---------------------------------------------------------------------
    // Commit
    // ---------------------------------------------------------------------

    /// Plan a commit of the active tool.
    ///
    /// Returns `Ok(None)` when the tool has nothing to apply. Otherwise the
    /// session is busy until the job's result is passed to
    /// [`finish_commit`](Self::finish_commit).
    pub fn begin_commit(&mut self) -> Result<Option<CommitJob>> {
        self.ensure_idle()?;
        let ctx = self.tool_context();
        let tool = self.tool.as_ref().ok_or(EditError::NoActiveTool)?;
        let operation = match tool.as_tool().plan(&ctx) {
            Ok(Some(operation)) => operation,
            Ok(None) => {
                debug!(tool = %tool.kind(), "nothing to commit");
                return Ok(None);
            }
            Err(err) => {
                warn!(tool = %tool.kind(), error = %err, "commit refused");
                return Err(err);
            }
        };
        Ok(Some(self.start_job(operation)))
    }

    /// Install the result of a job started by
    /// [`begin_commit`](Self::begin_commit).
    ///
    /// On failure the committed image is untouched and the active tool is
    /// discarded.
    pub fn finish_commit(&mut self, result: CommitResult) -> Result<CommitOutcome> {
        match self.pending {
            Some(pending) if pending.id == result.id => {}
            _ => return Err(EditError::NoPendingCommit),
        }
        self.pending = None;

        let rendered = match result.outcome {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!(op = result.operation.name(), error = %err, "commit failed");
                self.discard_tool();
                return Err(err);
            }
        };

        let before = self.natural();
        self.history
            .save_snapshot(Snapshot::new(self.current.clone(), self.viewport.state()));
        self.current = rendered.buffer;
        let natural = self.natural();
        self.viewport.fit_to_bounds(natural, self.viewport.container());
        self.gestures.reset();

        let ctx = self.tool_context();
        let keep_tool = match self.tool.as_mut() {
            Some(tool) => {
                tool.as_tool_mut().committed(&ctx);
                tool.as_tool().is_active()
            }
            None => false,
        };
        if !keep_tool {
            self.tool = None;
        }
        self.sync_drag();

        if rendered.downscaled {
            warn!(%natural, limit = self.profile.crop_max_dimension, "crop downscaled to device limit");
        }
        info!(
            op = result.operation.name(),
            %before,
            after = %natural,
            bytes = self.current.len(),
            "edit committed"
        );

        Ok(CommitOutcome::Committed {
            natural,
            downscaled: rendered.downscaled,
        })
    }

    /// Give up on the outstanding job `id` without installing anything.
    ///
    /// The committed image is untouched and the active tool is discarded, as
    /// for a failed job. A result for `id` arriving later is rejected with
    /// `NoPendingCommit`.
    pub fn abandon_commit(&mut self, id: u64) -> Result<()> {
        match self.pending {
            Some(pending) if pending.id == id => {
                warn!(id, op = pending.operation.name(), "commit abandoned");
                self.pending = None;
                self.discard_tool();
                Ok(())
            }
            _ => Err(EditError::NoPendingCommit),
        }
    }

    /// Commit the active tool on the calling thread.
    pub fn commit_now(&mut self) -> Result<CommitOutcome> {
        match self.begin_commit()? {
            Some(job) => self.finish_commit(job.run()),
            None => Ok(CommitOutcome::Unchanged),
        }
    }

    /// Commit the active tool on tokio's blocking pool.
    #[cfg(feature = "tokio")]
    pub async fn commit(&mut self) -> Result<CommitOutcome> {
        match self.begin_commit()? {
            Some(job) => PendingGuard::new(self, job.id).run(job).await,
            None => Ok(CommitOutcome::Unchanged),
        }
    }

    /// Start an immediate rotate or flip. The transform tool becomes the
    /// active tool and stays active afterwards.
    pub fn begin_transform(&mut self, action: TransformAction) -> Result<CommitJob> {
        self.activate_tool(ToolKind::Transform)?;
        let update = match action {
            TransformAction::Rotate { rotation } => ToolUpdate::Rotate(rotation),
            TransformAction::Flip { axis } => ToolUpdate::Flip(axis),
        };
        self.update_tool(update)?;
        Ok(self.start_job(action.into()))
    }

    pub fn transform_now(&mut self, action: TransformAction) -> Result<CommitOutcome> {
        let job = self.begin_transform(action)?;
        self.finish_commit(job.run())
    }

    #[cfg(feature = "tokio")]
    pub async fn transform(&mut self, action: TransformAction) -> Result<CommitOutcome> {
        let job = self.begin_transform(action)?;
        PendingGuard::new(self, job.id).run(job).await
    }

    pub fn rotate_now(&mut self, rotation: Rotation) -> Result<CommitOutcome> {
        self.transform_now(TransformAction::Rotate { rotation })
    }

    pub fn flip_now(&mut self, axis: FlipAxis) -> Result<CommitOutcome> {
        self.transform_now(TransformAction::Flip { axis })
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    /// Step back one commit. Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        self.ensure_idle()?;
        let current = Snapshot::new(self.current.clone(), self.viewport.state());
        let tool = &mut self.tool;
        let restored = self.history.undo(current, |_| clear_tool(tool));
        Ok(self.restore(restored, "undo"))
    }

    /// Re-apply one undone commit. Returns `false` when there was nothing to
    /// redo.
    pub fn redo(&mut self) -> Result<bool> {
        self.ensure_idle()?;
        let current = Snapshot::new(self.current.clone(), self.viewport.state());
        let tool = &mut self.tool;
        let restored = self.history.redo(current, |_| clear_tool(tool));
        Ok(self.restore(restored, "redo"))
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.history.clear();
        info!("history cleared");
        Ok(())
    }

    /// Go back to the loaded source, forgetting every edit.
    pub fn reset_to_original(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.history.clear();
        self.install(self.source.clone());
        info!(natural = %self.natural(), "reset to original");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Export
    // ---------------------------------------------------------------------

    /// Encode the current image, honoring an open crop selection and an
    /// active resize target. Never changes the session.
    pub fn export(&self, request: &ExportRequest) -> Result<ExportResult> {
        let ctx = self.tool_context();
        let crop = self
            .tool
            .as_ref()
            .filter(|tool| tool.kind() == ToolKind::Crop)
            .and_then(|tool| tool.as_tool().crop_rect(&ctx));
        let resize_target = self.tool.as_ref().and_then(ActiveTool::resize_target);
        let plan = ExportPlan::new(self.natural(), crop, resize_target);

        export_image(
            &self.current,
            plan,
            request,
            self.config.export.quality,
            self.source_name.as_deref(),
        )
        .map_err(|err| {
            warn!(format = %request.format, error = %err, "export failed");
            err
        })
    }

    // ---------------------------------------------------------------------
    // Viewport and gestures
    // ---------------------------------------------------------------------

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan(dx, dy);
    }

    /// Zoom around an optional anchor in top-left-origin container pixels.
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<(f64, f64)>) -> f64 {
        let anchor = anchor.map(|(x, y)| self.viewport.anchor_at(x, y));
        self.viewport.zoom_by(factor, anchor)
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_exact(zoom);
    }

    pub fn set_slider_zoom(&mut self, zoom: f64) {
        self.viewport.set_slider(zoom);
    }

    pub fn step_zoom_in(&mut self) {
        self.viewport.step_in();
    }

    pub fn step_zoom_out(&mut self) {
        self.viewport.step_out();
    }

    pub fn wheel(&mut self, delta_x: f64, delta_y: f64, zoom_modifier: bool) {
        self.viewport.wheel(delta_x, delta_y, zoom_modifier);
    }

    pub fn fit_to_bounds(&mut self) {
        self.viewport.refit();
    }

    pub fn one_to_one(&mut self) {
        self.viewport.one_to_one();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// The display surface was resized.
    pub fn set_container(&mut self, container: ContainerSize) {
        self.viewport.set_container(container);
    }

    pub fn touch_start(&mut self, points: &[TouchPoint], timestamp_ms: u64) -> GestureMode {
        self.gestures.touch_start(points, timestamp_ms, &mut self.viewport)
    }

    pub fn touch_move(&mut self, points: &[TouchPoint]) {
        self.gestures.touch_move(points, &mut self.viewport);
    }

    pub fn touch_end(&mut self) {
        self.gestures.touch_end();
    }

    /// Mouse double-click: toggle between fit and the fixed zoom.
    pub fn toggle_zoom(&mut self) {
        self.gestures.toggle_zoom(&mut self.viewport);
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn ensure_idle(&self) -> Result<()> {
        match self.pending {
            Some(pending) => {
                warn!(op = pending.operation.name(), "refused while a commit is running");
                Err(EditError::Busy)
            }
            None => Ok(()),
        }
    }

    fn tool_context(&self) -> ToolContext {
        ToolContext {
            natural: self.natural(),
            profile: self.profile,
        }
    }

    fn start_job(&mut self, operation: EditOperation) -> CommitJob {
        let id = self.next_job;
        self.next_job = self.next_job.wrapping_add(1);
        self.pending = Some(PendingCommit { id, operation });
        debug!(id, op = operation.name(), "commit job started");
        CommitJob {
            id,
            buffer: self.current.clone(),
            operation,
        }
    }

    /// Make `buffer` current with no tool and a fitted view.
    fn install(&mut self, buffer: ImageBuffer) {
        self.current = buffer;
        self.discard_tool();
        self.gestures.reset();
        let natural = self.natural();
        self.viewport.fit_to_bounds(natural, self.viewport.container());
    }

    fn restore(&mut self, snapshot: Option<Snapshot>, direction: &'static str) -> bool {
        let Some(snapshot) = snapshot else {
            debug!(direction, "nothing to restore");
            return false;
        };
        self.current = snapshot.buffer;
        self.viewport
            .fit_to_bounds(snapshot.natural, self.viewport.container());
        self.viewport.restore(snapshot.viewport);
        self.gestures.reset();
        self.sync_drag();
        info!(
            direction,
            natural = %snapshot.natural,
            undo = self.history.undo_len(),
            redo = self.history.redo_len(),
            "history restored"
        );
        true
    }

    fn discard_tool(&mut self) {
        clear_tool(&mut self.tool);
        self.sync_drag();
    }

    /// A crop selection takes single-pointer drags away from panning.
    fn sync_drag(&mut self) {
        let cropping = self.active_tool() == Some(ToolKind::Crop);
        self.gestures.set_drag_enabled(!cropping);
    }
}

fn clear_tool(tool: &mut Option<ActiveTool>) {
    if let Some(mut tool) = tool.take() {
        tool.as_tool_mut().cancel();
    }
}

/// Abandons the pending job if an async commit is dropped before its result
/// is installed.
#[cfg(feature = "tokio")]
struct PendingGuard<'a> {
    session: &'a mut EditorSession,
    id: u64,
    armed: bool,
}

#[cfg(feature = "tokio")]
impl<'a> PendingGuard<'a> {
    fn new(session: &'a mut EditorSession, id: u64) -> Self {
        Self {
            session,
            id,
            armed: true,
        }
    }

    async fn run(mut self, job: CommitJob) -> Result<CommitOutcome> {
        let result = run_blocking(job).await;
        self.armed = false;
        self.session.finish_commit(result)
    }
}

#[cfg(feature = "tokio")]
impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            // The job may still finish on the blocking pool; its result is dropped.
            let _ = self.session.abandon_commit(self.id);
        }
    }
}

#[cfg(feature = "tokio")]
async fn run_blocking(job: CommitJob) -> CommitResult {
    let id = job.id;
    let operation = job.operation;
    match tokio::task::spawn_blocking(move || job.run()).await {
        Ok(result) => result,
        Err(err) => CommitResult {
            id,
            operation,
            outcome: Err(EditError::ResourceExhaustion(format!("commit job aborted: {err}"))),
        },
    }
}

use crate::diagram::composite::{grid_floor, RgbaBuffer};
use crate::diagram::history::StrokeStore;
use crate::diagram::input::{DrawSession, SessionPaint};
use crate::diagram::loader::{CompositeWorker, FsImageLoader, ImageLoader, WorkerConfig};
use crate::diagram::mapper::{map_to_logical, PointerPosition, SurfaceRect};
use crate::diagram::messages::{CompositeOutcome, CompositeRequest, LayerStatus, RepaintReason};
use crate::diagram::model::{BrushConfig, Color, Eye};
use crate::diagram::render::{self, DirtyRect};
use crate::diagram::save::{DiagramObserver, Notifier};
use crate::diagram::settings::DiagramSettings;
use crate::diagram::toolbar::{
    buttons_for, HistoryCommand, ToolbarButtons, ToolbarCommand, ToolbarState,
};
use anyhow::Result;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Inputs the host form provides when the component mounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountOptions {
    pub right_baseline: Option<String>,
    pub left_baseline: Option<String>,
    pub active_eye: Option<Eye>,
}

struct EyeSurface {
    eye: Eye,
    store: StrokeStore,
    session: DrawSession,
    baseline: Option<String>,
    floor: RgbaBuffer,
    pixels: RgbaBuffer,
    template_status: LayerStatus,
    baseline_status: LayerStatus,
    latest_ticket: u64,
    applied_ticket: u64,
    pending_notify: bool,
    worker: CompositeWorker,
}

impl EyeSurface {
    fn is_settled(&self) -> bool {
        self.applied_ticket == self.latest_ticket
    }

    fn request_repaint(&mut self, reason: RepaintReason) {
        self.latest_ticket += 1;
        if reason.notifies() {
            self.pending_notify = true;
        }
        debug!(eye = %self.eye, ticket = self.latest_ticket, ?reason, "requested recomposite");
        self.worker.submit(CompositeRequest {
            ticket: self.latest_ticket,
            reason,
            baseline: self.baseline.clone(),
        });
    }

    /// Floor, committed strokes, then the stroke still being drawn so a late
    /// floor never hides it.
    fn repaint(&mut self) {
        let strokes = self
            .store
            .committed()
            .iter()
            .chain(self.session.active_stroke());
        self.pixels = render::repaint(&self.floor, strokes);
    }

    fn paint(&mut self, paint: SessionPaint) -> Option<DirtyRect> {
        let stroke = self.session.active_stroke()?;
        let (color, width) = (stroke.color(), stroke.width());
        match paint {
            SessionPaint::Dot(point) => render::draw_dot(&mut self.pixels, point, color, width),
            SessionPaint::Segment { from, to } => {
                render::draw_segment(&mut self.pixels, from, to, color, width)
            }
        }
    }

    /// Whether a deferred settle notification may fire now.
    fn take_pending_notify(&mut self) -> bool {
        if self.pending_notify && self.is_settled() && !self.session.is_active() {
            self.pending_notify = false;
            return true;
        }
        false
    }
}

/// The dual-eye annotation component. Pointer and toolbar events are handled
/// synchronously; image loading runs on one worker per eye and lands through
/// [`EyeDiagram::pump`] or [`EyeDiagram::wait_settled`].
pub struct EyeDiagram {
    settings: DiagramSettings,
    toolbar: ToolbarState,
    surfaces: [EyeSurface; 2],
    interaction: Option<Eye>,
    notifier: Notifier,
    outcomes: Receiver<CompositeOutcome>,
}

impl EyeDiagram {
    pub fn mount(
        mut settings: DiagramSettings,
        options: MountOptions,
        loader: Arc<dyn ImageLoader>,
        observer: Option<DiagramObserver>,
    ) -> Result<Self> {
        settings.sanitize();
        let (outcome_tx, outcomes) = mpsc::channel();
        let grid = settings.grid_style();
        let floor = grid_floor(settings.surface, &grid);

        let build = |eye: Eye, baseline: Option<String>| -> Result<EyeSurface> {
            let worker = CompositeWorker::spawn(
                WorkerConfig {
                    eye,
                    size: settings.surface,
                    grid,
                    template: settings.template_for(eye).cloned(),
                    loader: loader.clone(),
                },
                outcome_tx.clone(),
            )?;
            Ok(EyeSurface {
                eye,
                store: StrokeStore::default(),
                session: DrawSession::default(),
                baseline: normalize_baseline(baseline),
                floor: floor.clone(),
                pixels: floor.clone(),
                template_status: LayerStatus::Absent,
                baseline_status: LayerStatus::Absent,
                latest_ticket: 0,
                applied_ticket: 0,
                pending_notify: false,
                worker,
            })
        };
        let surfaces = [
            build(Eye::Right, options.right_baseline)?,
            build(Eye::Left, options.left_baseline)?,
        ];

        let active_eye = options.active_eye.unwrap_or(Eye::Right);
        let mut diagram = Self {
            toolbar: ToolbarState::new(&settings, active_eye),
            settings,
            surfaces,
            interaction: None,
            notifier: Notifier::new(observer),
            outcomes,
        };
        for surface in diagram.surfaces.iter_mut() {
            surface.request_repaint(RepaintReason::Mount);
        }
        info!(
            width = diagram.settings.surface.width,
            height = diagram.settings.surface.height,
            %active_eye,
            "eye diagram mounted"
        );
        Ok(diagram)
    }

    /// Mounts with templates read from `settings.asset_root`.
    pub fn mount_with_assets(
        settings: DiagramSettings,
        options: MountOptions,
        observer: Option<DiagramObserver>,
    ) -> Result<Self> {
        let loader = Arc::new(FsImageLoader::new(settings.asset_root.clone()));
        Self::mount(settings, options, loader, observer)
    }

    pub fn settings(&self) -> &DiagramSettings {
        &self.settings
    }

    pub fn toolbar(&self) -> &ToolbarState {
        &self.toolbar
    }

    pub fn active_eye(&self) -> Eye {
        self.toolbar.active_eye()
    }

    pub fn brush(&self) -> BrushConfig {
        self.toolbar.brush()
    }

    /// The eye currently receiving a pointer drag, if any.
    pub fn interaction(&self) -> Option<Eye> {
        self.interaction
    }

    pub fn surface(&self, eye: Eye) -> &RgbaBuffer {
        &self.surfaces[eye.index()].pixels
    }

    pub fn floor(&self, eye: Eye) -> &RgbaBuffer {
        &self.surfaces[eye.index()].floor
    }

    pub fn store(&self, eye: Eye) -> &StrokeStore {
        &self.surfaces[eye.index()].store
    }

    pub fn baseline(&self, eye: Eye) -> Option<&str> {
        self.surfaces[eye.index()].baseline.as_deref()
    }

    pub fn template_status(&self, eye: Eye) -> LayerStatus {
        self.surfaces[eye.index()].template_status
    }

    pub fn baseline_status(&self, eye: Eye) -> LayerStatus {
        self.surfaces[eye.index()].baseline_status
    }

    pub fn last_emitted(&self, eye: Eye) -> Option<&str> {
        self.notifier.last_emitted(eye)
    }

    pub fn buttons(&self, eye: Eye) -> ToolbarButtons {
        let surface = &self.surfaces[eye.index()];
        buttons_for(&surface.store, surface.baseline.is_some())
    }

    pub fn is_settled(&self) -> bool {
        self.surfaces.iter().all(EyeSurface::is_settled)
    }

    pub fn is_eye_settled(&self, eye: Eye) -> bool {
        self.surfaces[eye.index()].is_settled()
    }

    pub fn pointer_down(
        &mut self,
        eye: Eye,
        position: PointerPosition,
        rect: SurfaceRect,
    ) -> Option<DirtyRect> {
        let point = map_to_logical(position, rect, self.settings.surface)?;
        if let Some(previous) = self.interaction.take() {
            self.finish_interaction(previous);
        }
        self.toolbar.apply_command(ToolbarCommand::SelectEye(eye));
        self.interaction = Some(eye);

        let brush = self.toolbar.brush();
        let surface = &mut self.surfaces[eye.index()];
        let paint = surface.session.begin(point, brush);
        surface.paint(paint)
    }

    pub fn pointer_move(
        &mut self,
        eye: Eye,
        position: PointerPosition,
        rect: SurfaceRect,
    ) -> Option<DirtyRect> {
        if self.interaction != Some(eye) {
            return None;
        }
        let point = map_to_logical(position, rect, self.settings.surface)?;
        let surface = &mut self.surfaces[eye.index()];
        let paint = surface.session.extend(point)?;
        surface.paint(paint)
    }

    /// Ends the drag on `eye`. Returns true when a stroke was committed.
    pub fn pointer_up(&mut self, eye: Eye) -> bool {
        if self.interaction != Some(eye) {
            return false;
        }
        self.interaction = None;
        self.finish_interaction(eye)
    }

    pub fn pointer_leave(&mut self, eye: Eye) -> bool {
        self.pointer_up(eye)
    }

    fn finish_interaction(&mut self, eye: Eye) -> bool {
        let surface = &mut self.surfaces[eye.index()];
        let mut committed = false;
        let notify_now = match surface.session.finish() {
            Some(stroke) => {
                let points = stroke.len();
                surface.store.commit(stroke);
                committed = true;
                debug!(%eye, points, strokes = surface.store.undo_len(), "committed stroke");
                // A snapshot taken over an unsettled floor would miss the
                // layer still loading; emit once the composite lands.
                surface.pending_notify = !surface.is_settled();
                !surface.pending_notify
            }
            None => {
                // The feedback dot of a discarded tap must not linger.
                surface.repaint();
                surface.take_pending_notify()
            }
        };

        if notify_now {
            self.notifier.notify(eye, &self.surfaces[eye.index()].pixels);
        }
        committed
    }

    pub fn apply_toolbar(&mut self, command: ToolbarCommand) -> bool {
        match self.toolbar.apply_command(command) {
            Some(HistoryCommand::Undo(eye)) => self.undo(eye),
            Some(HistoryCommand::Redo(eye)) => self.redo(eye),
            Some(HistoryCommand::Clear(eye)) => {
                self.clear(eye);
                true
            }
            None => false,
        }
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.toolbar.apply_command(ToolbarCommand::SetColor(color));
    }

    pub fn set_brush_width(&mut self, width: u32) {
        self.toolbar.apply_command(ToolbarCommand::SetWidth(width));
    }

    pub fn select_eye(&mut self, eye: Eye) {
        self.toolbar.apply_command(ToolbarCommand::SelectEye(eye));
    }

    pub fn undo(&mut self, eye: Eye) -> bool {
        let surface = &mut self.surfaces[eye.index()];
        if surface.store.undo().is_none() {
            return false;
        }
        surface.request_repaint(RepaintReason::Undo);
        true
    }

    pub fn redo(&mut self, eye: Eye) -> bool {
        let surface = &mut self.surfaces[eye.index()];
        if surface.store.redo().is_none() {
            return false;
        }
        surface.request_repaint(RepaintReason::Redo);
        true
    }

    /// Drops every stroke and the baseline image of `eye`. Unlike undoing
    /// every stroke this cannot be reverted.
    pub fn clear(&mut self, eye: Eye) {
        let surface = &mut self.surfaces[eye.index()];
        let cleared = surface.store.clear();
        let had_baseline = surface.baseline.take().is_some();
        debug!(
            %eye,
            committed = cleared.committed,
            redo = cleared.redo,
            had_baseline,
            "cleared eye diagram"
        );
        surface.request_repaint(RepaintReason::Clear);
    }

    /// Replaces the host-supplied baseline of `eye`. A new baseline starts a
    /// fresh history. Values equal to the current baseline, or to the last
    /// snapshot this component emitted, are ignored.
    pub fn set_baseline(&mut self, eye: Eye, baseline: Option<String>) -> bool {
        let baseline = normalize_baseline(baseline);
        if let Some(value) = baseline.as_deref() {
            if self.notifier.is_echo(eye, value) {
                debug!(%eye, "ignoring echoed snapshot as baseline");
                return false;
            }
        }

        let surface = &mut self.surfaces[eye.index()];
        if surface.baseline == baseline {
            return false;
        }
        if self.interaction == Some(eye) {
            self.interaction = None;
        }
        surface.session = DrawSession::default();
        surface.store = StrokeStore::default();
        surface.baseline = baseline;
        surface.request_repaint(RepaintReason::Baseline);
        true
    }

    /// Applies finished composites without blocking. Returns how many were
    /// applied; stale results are dropped.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.outcomes.try_recv() {
                Ok(outcome) => {
                    if self.apply_outcome(outcome) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("composite workers disconnected");
                    break;
                }
            }
        }
        applied
    }

    /// Blocks until every eye shows its most recently requested composite.
    pub fn wait_settled(&mut self) {
        while !self.is_settled() {
            match self.outcomes.recv() {
                Ok(outcome) => {
                    self.apply_outcome(outcome);
                }
                Err(_) => {
                    warn!("composite workers stopped before the diagram settled");
                    break;
                }
            }
        }
    }

    /// Like [`EyeDiagram::wait_settled`] but gives up after `timeout`.
    pub fn wait_settled_for(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_settled() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.outcomes.recv_timeout(remaining) {
                Ok(outcome) => {
                    self.apply_outcome(outcome);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("composite workers stopped before the diagram settled");
                    return false;
                }
            }
        }
        true
    }

    fn apply_outcome(&mut self, outcome: CompositeOutcome) -> bool {
        let eye = outcome.eye;
        let surface = &mut self.surfaces[eye.index()];
        if outcome.ticket != surface.latest_ticket {
            debug!(
                %eye,
                ticket = outcome.ticket,
                latest = surface.latest_ticket,
                "dropping stale composite"
            );
            return false;
        }

        surface.floor = outcome.floor;
        surface.template_status = outcome.template;
        surface.baseline_status = outcome.baseline;
        surface.applied_ticket = outcome.ticket;
        surface.repaint();
        debug!(%eye, ticket = outcome.ticket, reason = ?outcome.reason, "applied composite");

        if surface.take_pending_notify() {
            self.notifier.notify(eye, &self.surfaces[eye.index()].pixels);
        }
        true
    }
}

impl Drop for EyeDiagram {
    fn drop(&mut self) {
        debug!("unmounting eye diagram");
    }
}

fn normalize_baseline(baseline: Option<String>) -> Option<String> {
    baseline.filter(|value| !value.trim().is_empty())
}

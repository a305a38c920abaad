use crate::diagram::composite::{compose_floor, GridStyle};
use crate::diagram::messages::{CompositeOutcome, CompositeRequest, LayerStatus};
use crate::diagram::model::{Eye, SurfaceSize};
use crate::diagram::save::decode_data_url;
use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A static asset, resolved by the loader.
    Asset(PathBuf),
    /// A data URL or bare base64 image supplied by the host.
    Encoded(String),
}

impl ImageSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::Asset(_) => "asset",
            ImageSource::Encoded(_) => "encoded",
        }
    }
}

pub trait ImageLoader: Send + Sync {
    fn load(&self, source: &ImageSource) -> Result<RgbaImage>;
}

/// Reads assets relative to `asset_root` and decodes encoded values in
/// memory.
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    asset_root: PathBuf,
}

impl FsImageLoader {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, source: &ImageSource) -> Result<RgbaImage> {
        match source {
            ImageSource::Asset(path) => {
                let full = self.asset_root.join(path);
                let image = image::open(&full)
                    .with_context(|| format!("load image asset {}", full.display()))?;
                Ok(image.to_rgba8())
            }
            ImageSource::Encoded(value) => decode_data_url(value),
        }
    }
}

/// Everything a worker needs to build one eye's floor.
pub struct WorkerConfig {
    pub eye: Eye,
    pub size: SurfaceSize,
    pub grid: GridStyle,
    pub template: Option<PathBuf>,
    pub loader: Arc<dyn ImageLoader>,
}

#[derive(Default)]
struct MailboxState {
    pending: Option<CompositeRequest>,
    shutdown: bool,
}

#[derive(Default)]
struct Mailbox {
    state: Mutex<MailboxState>,
    ready: Condvar,
}

/// Background compositor for one eye. The mailbox holds a single request:
/// submitting while one is still queued replaces it, so a burst of repaint
/// requests only composes the newest.
pub struct CompositeWorker {
    eye: Eye,
    mailbox: Arc<Mailbox>,
    handle: Option<JoinHandle<()>>,
}

impl CompositeWorker {
    pub fn spawn(config: WorkerConfig, outcomes: Sender<CompositeOutcome>) -> Result<Self> {
        let eye = config.eye;
        let mailbox = Arc::new(Mailbox::default());
        let worker_mailbox = mailbox.clone();
        let handle = std::thread::Builder::new()
            .name(format!("eye-diagram-{eye}"))
            .spawn(move || run_worker(config, worker_mailbox, outcomes))
            .with_context(|| format!("spawn composite worker for {eye} eye"))?;
        Ok(Self {
            eye,
            mailbox,
            handle: Some(handle),
        })
    }

    pub fn submit(&self, request: CompositeRequest) {
        let Ok(mut state) = self.mailbox.state.lock() else {
            warn!(eye = %self.eye, "composite mailbox poisoned; dropping request");
            return;
        };
        if let Some(stale) = state.pending.replace(request) {
            debug!(eye = %self.eye, ticket = stale.ticket, "superseded queued composite");
        }
        self.mailbox.ready.notify_one();
    }
}

impl Drop for CompositeWorker {
    fn drop(&mut self) {
        if let Ok(mut state) = self.mailbox.state.lock() {
            state.shutdown = true;
            state.pending = None;
        }
        self.mailbox.ready.notify_one();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(eye = %self.eye, "composite worker panicked");
            }
        }
    }
}

fn next_request(mailbox: &Mailbox) -> Option<CompositeRequest> {
    let mut state = mailbox.state.lock().ok()?;
    loop {
        if state.shutdown {
            return None;
        }
        if let Some(request) = state.pending.take() {
            return Some(request);
        }
        state = mailbox.ready.wait(state).ok()?;
    }
}

fn run_worker(config: WorkerConfig, mailbox: Arc<Mailbox>, outcomes: Sender<CompositeOutcome>) {
    let mut template_cache: Option<RgbaImage> = None;
    while let Some(request) = next_request(&mailbox) {
        let outcome = compose(&config, &mut template_cache, request);
        if outcomes.send(outcome).is_err() {
            break;
        }
    }
    debug!(eye = %config.eye, "composite worker stopped");
}

fn compose(
    config: &WorkerConfig,
    template_cache: &mut Option<RgbaImage>,
    request: CompositeRequest,
) -> CompositeOutcome {
    let eye = config.eye;

    let template = match (&config.template, template_cache.is_some()) {
        (None, _) => LayerStatus::Absent,
        (Some(_), true) => LayerStatus::Loaded,
        (Some(path), false) => {
            match load_layer(config, ImageSource::Asset(path.clone())) {
                Some(image) => {
                    *template_cache = Some(image);
                    LayerStatus::Loaded
                }
                None => LayerStatus::Failed,
            }
        }
    };

    let baseline_image = request
        .baseline
        .as_ref()
        .and_then(|value| load_layer(config, ImageSource::Encoded(value.clone())));
    let baseline = match (&request.baseline, &baseline_image) {
        (None, _) => LayerStatus::Absent,
        (Some(_), Some(_)) => LayerStatus::Loaded,
        (Some(_), None) => LayerStatus::Failed,
    };

    let floor = compose_floor(
        config.size,
        &config.grid,
        template_cache.as_ref(),
        baseline_image.as_ref(),
    );
    debug!(%eye, ticket = request.ticket, ?template, ?baseline, "composited floor");

    CompositeOutcome {
        eye,
        ticket: request.ticket,
        reason: request.reason,
        floor,
        template,
        baseline,
    }
}

fn load_layer(config: &WorkerConfig, source: ImageSource) -> Option<RgbaImage> {
    match config.loader.load(&source) {
        Ok(image) => Some(image),
        Err(err) => {
            warn!(
                eye = %config.eye,
                source = source.kind(),
                "image layer unavailable, continuing without it: {err:#}"
            );
            None
        }
    }
}

use crate::diagram::composite::RgbaBuffer;
use crate::diagram::model::Eye;

/// Why a full repaint was requested. Only history edits notify the host;
/// mount and externally supplied baselines came from the host already.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepaintReason {
    Mount,
    Baseline,
    Undo,
    Redo,
    Clear,
}

impl RepaintReason {
    pub fn notifies(self) -> bool {
        matches!(self, Self::Undo | Self::Redo | Self::Clear)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRequest {
    pub ticket: u64,
    pub reason: RepaintReason,
    pub baseline: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerStatus {
    Absent,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeOutcome {
    pub eye: Eye,
    pub ticket: u64,
    pub reason: RepaintReason,
    pub floor: RgbaBuffer,
    pub template: LayerStatus,
    pub baseline: LayerStatus,
}

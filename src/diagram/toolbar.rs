use crate::diagram::history::StrokeStore;
use crate::diagram::model::{BrushConfig, Color, Eye};
use crate::diagram::settings::DiagramSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarCommand {
    SelectEye(Eye),
    SetColor(Color),
    QuickColor(usize),
    SetWidth(u32),
    WidthUp,
    WidthDown,
    Undo,
    Redo,
    Clear,
}

/// History edit to run against the active eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCommand {
    Undo(Eye),
    Redo(Eye),
    Clear(Eye),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarState {
    active_eye: Eye,
    brush: BrushConfig,
    quick_colors: Vec<Color>,
    min_width: u32,
    max_width: u32,
}

impl ToolbarState {
    pub fn new(settings: &DiagramSettings, active_eye: Eye) -> Self {
        Self {
            active_eye,
            brush: settings.default_brush(),
            quick_colors: settings.quick_colors.clone(),
            min_width: settings.min_brush_width.max(1),
            max_width: settings.max_brush_width.max(settings.min_brush_width.max(1)),
        }
    }

    pub fn active_eye(&self) -> Eye {
        self.active_eye
    }

    pub fn brush(&self) -> BrushConfig {
        self.brush
    }

    pub fn quick_colors(&self) -> &[Color] {
        &self.quick_colors
    }

    pub fn apply_command(&mut self, command: ToolbarCommand) -> Option<HistoryCommand> {
        reduce_toolbar_state(self, command)
    }
}

pub fn reduce_toolbar_state(
    state: &mut ToolbarState,
    command: ToolbarCommand,
) -> Option<HistoryCommand> {
    let (min_width, max_width) = (state.min_width, state.max_width);
    let clamp = move |width: u32| width.clamp(min_width, max_width);
    match command {
        ToolbarCommand::SelectEye(eye) => state.active_eye = eye,
        ToolbarCommand::SetColor(color) => state.brush.color = color,
        ToolbarCommand::QuickColor(idx) => {
            if let Some(color) = state.quick_colors.get(idx) {
                state.brush.color = *color;
            }
        }
        ToolbarCommand::SetWidth(width) => state.brush.width = clamp(width),
        ToolbarCommand::WidthUp => state.brush.width = clamp(state.brush.width.saturating_add(1)),
        ToolbarCommand::WidthDown => state.brush.width = clamp(state.brush.width.saturating_sub(1)),
        ToolbarCommand::Undo => return Some(HistoryCommand::Undo(state.active_eye)),
        ToolbarCommand::Redo => return Some(HistoryCommand::Redo(state.active_eye)),
        ToolbarCommand::Clear => return Some(HistoryCommand::Clear(state.active_eye)),
    }
    None
}

/// Enabled state of the history buttons for one eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolbarButtons {
    pub undo: bool,
    pub redo: bool,
    pub clear: bool,
}

pub fn buttons_for(store: &StrokeStore, has_baseline: bool) -> ToolbarButtons {
    ToolbarButtons {
        undo: store.can_undo(),
        redo: store.can_redo(),
        clear: store.can_undo() || store.can_redo() || has_baseline,
    }
}

use crate::diagram::model::{BrushConfig, Point, Stroke};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Active(Stroke),
}

/// What the renderer should draw in response to an input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPaint {
    Dot(Point),
    Segment { from: Point, to: Point },
}

/// Turns one down/move/up sequence into a single stroke. One per eye.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawSession {
    state: SessionState,
}

impl DrawSession {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    pub fn active_stroke(&self) -> Option<&Stroke> {
        match &self.state {
            SessionState::Active(stroke) => Some(stroke),
            SessionState::Idle => None,
        }
    }

    /// Starts a stroke with the brush as it is right now. Any stroke still in
    /// progress is replaced; callers finish it first.
    pub fn begin(&mut self, start: Point, brush: BrushConfig) -> SessionPaint {
        self.state = SessionState::Active(Stroke::begin(start, brush));
        SessionPaint::Dot(start)
    }

    /// Appends `point` to the active stroke and returns the new segment.
    /// Ignored while idle and for repeated identical positions.
    pub fn extend(&mut self, point: Point) -> Option<SessionPaint> {
        let SessionState::Active(stroke) = &mut self.state else {
            return None;
        };
        let from = stroke.last_point()?;
        if from == point {
            return None;
        }
        stroke.push(point);
        Some(SessionPaint::Segment { from, to: point })
    }

    /// Ends the interaction. Returns the stroke when it is long enough to be
    /// committed; taps are dropped here.
    pub fn finish(&mut self) -> Option<Stroke> {
        match std::mem::take(&mut self.state) {
            SessionState::Active(stroke) if stroke.is_committable() => Some(stroke),
            _ => None,
        }
    }
}

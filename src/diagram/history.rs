use crate::diagram::model::Stroke;

/// Per-eye stroke history. A stroke lives in at most one of the two stacks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokeStore {
    committed: Vec<Stroke>,
    redo: Vec<Stroke>,
}

/// Returned by [`StrokeStore::clear`].
#[must_use = "clearing an eye also discards its baseline image"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cleared {
    pub committed: usize,
    pub redo: usize,
}

impl StrokeStore {
    /// Appends `stroke` and drops the redo history. Taps are rejected.
    pub fn commit(&mut self, stroke: Stroke) -> bool {
        if !stroke.is_committable() {
            return false;
        }
        self.committed.push(stroke);
        self.redo.clear();
        true
    }

    pub fn undo(&mut self) -> Option<&Stroke> {
        let stroke = self.committed.pop()?;
        self.redo.push(stroke);
        self.redo.last()
    }

    pub fn redo(&mut self) -> Option<&Stroke> {
        let stroke = self.redo.pop()?;
        self.committed.push(stroke);
        self.committed.last()
    }

    pub fn clear(&mut self) -> Cleared {
        let cleared = Cleared {
            committed: self.committed.len(),
            redo: self.redo.len(),
        };
        self.committed.clear();
        self.redo.clear();
        cleared
    }

    pub fn committed(&self) -> &[Stroke] {
        &self.committed
    }

    pub fn redo_buffer(&self) -> &[Stroke] {
        &self.redo
    }

    pub fn undo_len(&self) -> usize {
        self.committed.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

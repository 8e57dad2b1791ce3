//! Snapshot-based undo/redo for the grid document.
//!
//! Every mutation clones the whole pre-mutation document; at the data sizes
//! involved (tens to hundreds of cells) this is the simplest correct scheme.

use crate::document::Document;

/// Maximum retained snapshots per stack; oldest dropped first.
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Document>,
    redo_stack: Vec<Document>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pre-mutation snapshot. Any recorded mutation invalidates the
    /// redo timeline.
    pub fn record(&mut self, snapshot: Document) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Pop the most recent snapshot, storing `current` for redo.
    pub fn undo(&mut self, current: Document) -> Option<Document> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        if self.redo_stack.len() > MAX_HISTORY {
            self.redo_stack.remove(0);
        }
        Some(previous)
    }

    /// Pop the most recent redo snapshot, storing `current` for undo.
    pub fn redo(&mut self, current: Document) -> Option<Document> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

//! Snapshot-based undo/redo.
//!
//! The history holds full timeline snapshots and a cursor; the entry under
//! the cursor is the live state. Recording a snapshot that is structurally
//! equal to the current one is suppressed, so rejected or no-op edits never
//! produce an undo step.

use crate::types::Timeline;

pub const DEFAULT_HISTORY_DEPTH: usize = 100;

pub struct History {
    snapshots: Vec<Timeline>,
    cursor: usize,
    max_entries: usize,
}

impl History {
    /// Seed the history with the initial model. `max_entries` counts
    /// snapshots including the seed and is clamped to at least two so one
    /// undo step always fits.
    pub fn new(initial: Timeline, max_entries: usize) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
            max_entries: max_entries.max(2),
        }
    }

    pub fn current(&self) -> &Timeline {
        &self.snapshots[self.cursor]
    }

    /// Record a new snapshot. Returns false when it equals the current one
    /// (no entry created). Otherwise the redo branch is truncated, the
    /// snapshot appended, and the cursor advanced.
    pub fn record(&mut self, next: Timeline) -> bool {
        if next == self.snapshots[self.cursor] {
            tracing::debug!("history: unchanged snapshot suppressed");
            return false;
        }
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(next);
        self.cursor += 1;
        while self.snapshots.len() > self.max_entries {
            self.snapshots.remove(0);
            self.cursor -= 1;
        }
        tracing::debug!(depth = self.snapshots.len(), cursor = self.cursor, "history: recorded");
        true
    }

    pub fn undo(&mut self) -> Option<&Timeline> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        tracing::debug!(cursor = self.cursor, "history: undo");
        Some(&self.snapshots[self.cursor])
    }

    pub fn redo(&mut self) -> Option<&Timeline> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        tracing::debug!(cursor = self.cursor, "history: redo");
        Some(&self.snapshots[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of stored snapshots, the seed included.
    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }
}

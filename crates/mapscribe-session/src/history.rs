//! Linear undo/redo history of whole-scene snapshots.
//!
//! The history is a list of snapshots plus a cursor. Pushing while the cursor
//! is behind the end discards the redo branch; pushing a snapshot equal to the
//! one at the cursor is a no-op. Undo and redo only move the cursor and hand
//! back the snapshot to restore, so every operation is a no-op at the
//! boundaries.

use crate::snapshot::Snapshot;

/// Default bound on the number of retained snapshots
pub const DEFAULT_HISTORY_LIMIT: usize = 250;

/// Snapshot history with a cursor at the live state
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: usize,
    limit: usize,
}

impl History {
    /// Create an empty history retaining at most `limit` snapshots
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record a snapshot. Returns false when it was coalesced with the
    /// snapshot at the cursor.
    pub fn push(&mut self, snapshot: Snapshot) -> bool {
        if self.current() == Some(&snapshot) {
            return false;
        }

        // Drop the redo branch
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);

        // Limit history size
        let overflow = self.entries.len().saturating_sub(self.limit);
        if overflow > 0 {
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len() - 1;

        tracing::debug!(len = self.entries.len(), cursor = self.cursor, evicted = overflow, "history push");
        true
    }

    /// Step back one snapshot, returning the snapshot to restore
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        tracing::debug!(cursor = self.cursor, "history undo");
        self.entries.get(self.cursor)
    }

    /// Step forward one snapshot, returning the snapshot to restore
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        tracing::debug!(cursor = self.cursor, "history redo");
        self.entries.get(self.cursor)
    }

    /// Drop every snapshot after the cursor, returning how many were dropped
    pub fn discard_redo(&mut self) -> usize {
        let keep = (self.cursor + 1).min(self.entries.len());
        let dropped = self.entries.len() - keep;
        if dropped > 0 {
            self.entries.truncate(keep);
            tracing::debug!(dropped, cursor = self.cursor, "redo branch discarded");
        }
        dropped
    }

    /// Snapshot at the cursor
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

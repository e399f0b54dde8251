//! History stack: sealed strokes plus an active-count cursor.
//!
//! `strokes[..cursor]` are rendered; `strokes[cursor..]` are hidden but kept
//! intact so redo restores them exactly. Pushing after an undo drops the
//! hidden tail, which keeps history linear.
//!
//! Listeners registered with [`HistoryStack::subscribe`] receive a
//! [`HistoryStatus`] after every change that alters it.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::stroke::{Stroke, StrokeId};

/// Snapshot of what undo/redo controls should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    /// No stroke is currently rendered.
    pub is_empty: bool,
    /// Rendered strokes.
    pub active: usize,
    /// Rendered plus hidden strokes.
    pub total: usize,
}

type Listener = Box<dyn FnMut(&HistoryStatus)>;

#[derive(Default)]
pub struct HistoryStack {
    strokes: Vec<Stroke>,
    cursor: usize,
    listeners: Vec<Listener>,
}

impl fmt::Debug for HistoryStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStack")
            .field("strokes", &self.strokes.len())
            .field("cursor", &self.cursor)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl HistoryStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It is called once immediately with the current
    /// status, then after every change.
    pub fn subscribe(&mut self, mut listener: impl FnMut(&HistoryStatus) + 'static) {
        listener(&self.status());
        self.listeners.push(Box::new(listener));
    }

    // --- Mutations ---

    /// Append `stroke` as the newest active stroke, discarding any hidden tail.
    pub fn push(&mut self, stroke: Stroke) -> StrokeId {
        let dropped = self.strokes.len() - self.cursor;
        if dropped > 0 {
            debug!(dropped, "history: discarding redo branch");
            self.strokes.truncate(self.cursor);
        }
        let id = stroke.id();
        self.strokes.push(stroke);
        self.cursor = self.strokes.len();
        self.notify();
        id
    }

    /// Hide the most recent active stroke. Returns false at the bottom.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.notify();
        true
    }

    /// Restore the next hidden stroke. Returns false at the top.
    pub fn redo(&mut self) -> bool {
        if self.cursor == self.strokes.len() {
            return false;
        }
        self.cursor += 1;
        self.notify();
        true
    }

    /// Drop every stroke, active and hidden.
    pub fn clear(&mut self) {
        if self.strokes.is_empty() {
            return;
        }
        debug!(total = self.strokes.len(), "history: cleared");
        self.strokes.clear();
        self.cursor = 0;
        self.notify();
    }

    // --- Queries ---

    /// Rendered strokes, oldest first.
    #[must_use]
    pub fn visible(&self) -> &[Stroke] {
        &self.strokes[..self.cursor]
    }

    /// Every stroke including the hidden tail.
    #[must_use]
    pub fn all(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Whether the stroke at `index` is rendered.
    #[must_use]
    pub fn is_active(&self, index: usize) -> bool {
        index < self.cursor
    }

    #[must_use]
    pub fn get(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id() == id)
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.cursor > 0,
            can_redo: self.cursor < self.strokes.len(),
            is_empty: self.cursor == 0,
            active: self.cursor,
            total: self.strokes.len(),
        }
    }

    fn notify(&mut self) {
        let status = self.status();
        for listener in &mut self.listeners {
            listener(&status);
        }
    }
}

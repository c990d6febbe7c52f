//! Undo/redo history of whole-document snapshots.

use crate::doc::Doc;

#[derive(Debug, Clone)]
pub struct History {
    pub undo_stack: Vec<Doc>,
    pub redo_stack: Vec<Doc>,
    /// Maximum undo depth; `0` is unbounded.
    pub limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(100)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { undo_stack: Vec::new(), redo_stack: Vec::new(), limit }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Record the current state before making a change.
    pub fn record_before_change(&mut self, current: &Doc) {
        self.record(current.clone());
    }

    /// Push a snapshot taken before a change that has since been applied.
    pub fn record(&mut self, before: Doc) {
        self.undo_stack.push(before);
        self.redo_stack.clear();
        if self.limit > 0 && self.undo_stack.len() > self.limit {
            let excess = self.undo_stack.len() - self.limit;
            self.undo_stack.drain(..excess);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo into the provided doc. Returns true if a change occurred.
    pub fn undo(&mut self, doc: &mut Doc) -> bool {
        if let Some(prev) = self.undo_stack.pop() {
            let next = std::mem::replace(doc, prev);
            self.redo_stack.push(next);
            true
        } else {
            false
        }
    }

    /// Redo into the provided doc. Returns true if a change occurred.
    pub fn redo(&mut self, doc: &mut Doc) -> bool {
        if let Some(next) = self.redo_stack.pop() {
            let prev = std::mem::replace(doc, next);
            self.undo_stack.push(prev);
            true
        } else {
            false
        }
    }
}

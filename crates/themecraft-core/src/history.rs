//! Bounded undo/redo stacks of snapshots.

use std::collections::VecDeque;

/// Default number of undo entries kept.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// A pair of bounded snapshot stacks.
///
/// Pushing a new entry clears the redo stack and evicts the oldest undo
/// entry once `depth` is exceeded.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo_stack: VecDeque<T>,
    redo_stack: Vec<T>,
    depth: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl<T> History<T> {
    /// Create an empty history keeping at most `depth` undo entries.
    pub fn new(depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Record the state before a mutation.
    pub fn push(&mut self, snapshot: T) {
        self.undo_stack.push_back(snapshot);
        self.redo_stack.clear();
        while self.undo_stack.len() > self.depth {
            self.undo_stack.pop_front();
        }
    }

    /// Pop the last undo entry, parking `current` on the redo stack.
    ///
    /// Returns `None` (and drops nothing) if there is nothing to undo.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Pop the last redo entry, parking `current` on the undo stack.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history of key value edits.
//!
//! Edits are recorded as before/after values per key and committed in
//! groups, so a whole slide session undoes as one step.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Maximum undo history depth
pub const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Unique operation ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(u64);

impl OperationId {
    /// Get the raw ID value
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// One key value edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    /// Curve name
    pub curve: String,
    /// Key index
    pub index: usize,
    /// Value before the edit
    pub before: f64,
    /// Value after the edit
    pub after: f64,
}

/// Edits that are undone/redone together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationGroup {
    /// Group ID
    pub id: OperationId,
    /// Human-readable description
    pub description: String,
    /// Edits in the order they were made
    pub changes: Vec<ValueChange>,
}

impl OperationGroup {
    /// Record an edit. Repeated edits of one key keep the first `before`.
    pub fn record(&mut self, change: ValueChange) {
        if let Some(existing) = self
            .changes
            .iter_mut()
            .find(|c| c.curve == change.curve && c.index == change.index)
        {
            existing.after = change.after;
        } else {
            self.changes.push(change);
        }
    }

    /// Number of edited keys
    pub fn count(&self) -> usize {
        self.changes.len()
    }

    /// Whether nothing was edited
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// History statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Groups in the undo stack
    pub undo_count: usize,
    /// Groups in the redo stack
    pub redo_count: usize,
    /// Maximum history depth
    pub max_depth: usize,
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<OperationGroup>,
    redo_stack: VecDeque<OperationGroup>,
    next_id: u64,
    max_depth: usize,
}

impl History {
    /// Create a new history manager
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            next_id: 1,
            max_depth,
        }
    }

    /// Start a new, empty group
    pub fn begin_group(&mut self, description: &str) -> OperationGroup {
        let id = OperationId(self.next_id);
        self.next_id += 1;
        OperationGroup {
            id,
            description: description.to_string(),
            changes: Vec::new(),
        }
    }

    /// Commit a group. Empty groups are dropped.
    pub fn commit(&mut self, group: OperationGroup) {
        if group.is_empty() {
            return;
        }

        self.redo_stack.clear();
        self.undo_stack.push_back(group);

        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Take the last group off the undo stack
    pub fn undo(&mut self) -> Result<OperationGroup> {
        let group = self
            .undo_stack
            .pop_back()
            .ok_or(HistoryError::NothingToUndo)?;
        self.redo_stack.push_back(group.clone());
        Ok(group)
    }

    /// Take the last undone group off the redo stack
    pub fn redo(&mut self) -> Result<OperationGroup> {
        let group = self
            .redo_stack
            .pop_back()
            .ok_or(HistoryError::NothingToRedo)?;
        self.undo_stack.push_back(group.clone());
        Ok(group)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            max_depth: self.max_depth,
        }
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|g| g.description.as_str())
    }

    /// Get description of next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|g| g.description.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

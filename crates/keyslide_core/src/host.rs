// SPDX-License-Identifier: MIT OR Apache-2.0
//! The interface between the key model and the animation system.
//!
//! Everything the sliding core needs from the host goes through
//! [`AnimationHost`]. Curves are addressed by name and keys by their index
//! on that curve. The host owns curve evaluation; the core never derives
//! values between keys on its own.

use crate::error::HostError;

/// Result type for host calls
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Port to the animation system that owns the curves.
pub trait AnimationHost {
    /// Whether a graph view with an explicit key selection is active
    fn graph_editor_active(&self) -> bool;

    /// Attributes that currently have selected keys, in a stable order
    fn attributes_with_selected_keys(&self) -> Vec<String>;

    /// Attributes relevant to the current UI context
    fn panel_attributes(&self) -> Vec<String>;

    /// Names of the curves driving an attribute
    fn curves_for_attribute(&self, attribute: &str) -> HostResult<Vec<String>>;

    /// Number of keys on a curve
    fn key_count(&self, curve: &str) -> HostResult<usize>;

    /// Indices of the selected keys on a curve, ascending
    fn selected_key_indices(&self, curve: &str) -> HostResult<Vec<usize>>;

    /// Time of a key
    fn key_time(&self, curve: &str, index: usize) -> HostResult<f64>;

    /// Value of a key
    fn key_value(&self, curve: &str, index: usize) -> HostResult<f64>;

    /// Write the value of a key
    fn set_key_value(&mut self, curve: &str, index: usize, value: f64) -> HostResult<()>;

    /// Index of the key sitting exactly at `time`, if any
    fn key_index_at_time(&self, curve: &str, time: f64) -> HostResult<Option<usize>>;

    /// Authoritative curve value at an arbitrary time
    fn evaluate(&self, curve: &str, time: f64) -> HostResult<f64>;

    /// Declared default of the attribute a curve drives
    fn attribute_default(&self, curve: &str) -> HostResult<f64>;

    /// Current playback time
    fn current_time(&self) -> f64;

    /// Start grouping edits into one undoable action
    fn open_undo_chunk(&mut self);

    /// Close the group opened by [`open_undo_chunk`](Self::open_undo_chunk)
    fn close_undo_chunk(&mut self);
}

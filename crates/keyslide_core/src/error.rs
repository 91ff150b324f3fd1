// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for key sliding.

use crate::key::KeyId;
use thiserror::Error;

/// Errors reported by an [`AnimationHost`](crate::host::AnimationHost)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// No curve with this name exists
    #[error("Curve not found: {0}")]
    CurveNotFound(String),

    /// Key index past the end of the curve
    #[error("Key index {index} out of range on curve {curve}")]
    KeyOutOfRange {
        /// Curve name
        curve: String,
        /// Requested index
        index: usize,
    },

    /// No attribute with this name exists, or a curve is not connected to one
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    /// The curve evaluator failed
    #[error("Evaluation failed on {curve}: {reason}")]
    Evaluation {
        /// Curve name
        curve: String,
        /// Host-provided reason
        reason: String,
    },
}

/// Errors produced by the key model and the slide controller
#[derive(Debug, Error)]
pub enum SlideError {
    /// State-machine contract violation (slide without begin, double begin)
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// The attribute behind a curve (or its default) could not be resolved
    #[error("Cannot resolve attribute for curve {curve}: {reason}")]
    AttributeResolution {
        /// Curve name
        curve: String,
        /// What went wrong
        reason: String,
    },

    /// The key is not part of this collection
    #[error("Key {0} is not in this collection")]
    KeyNotInCollection(KeyId),

    /// Mode name did not parse
    #[error("Unknown mode: {0}")]
    UnknownMode(String),

    /// Settings could not be read or written
    #[error("Settings error: {0}")]
    Settings(String),

    /// Host failure
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Result type for slide operations
pub type Result<T> = std::result::Result<T, SlideError>;

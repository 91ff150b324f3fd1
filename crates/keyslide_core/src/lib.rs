// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slide selected animation keys toward per-mode goals.
//!
//! This crate provides the key-sliding core:
//! - Keys and curves read lazily from an [`AnimationHost`]
//! - Segments of consecutive selected keys with their neighbors
//! - Collection-wide goals (level, linear, shrink, ease)
//! - The [`SlideKeysController`] state machine and its blend modes
//! - Undo history, settings and change notifications
//!
//! ## Architecture
//!
//! Everything the core needs from an animation system goes through the
//! [`AnimationHost`] trait. [`MemoryHost`] implements it over a
//! serializable [`Scene`] and backs the CLI and the tests.

pub mod collection;
pub mod controller;
pub mod curve;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod host;
pub mod key;
pub mod memory;
pub mod mode;
pub mod segment;
pub mod settings;

pub use collection::{EaseValues, SegmentCollection};
pub use controller::{Reload, SlideKeysController, SlideState};
pub use curve::Curve;
pub use dispatch::{Dispatcher, SlideEvent, SlideMessage, SubscriberId};
pub use error::{HostError, Result, SlideError};
pub use history::{History, HistoryError, OperationGroup, ValueChange};
pub use host::{AnimationHost, HostResult};
pub use key::{is_float_close, Key, KeyId};
pub use memory::{MemoryHost, Scene, SceneAttribute, SceneCurve, SceneKey};
pub use mode::{Interpolation, SlideMode};
pub use segment::{CurveSegment, SegmentKey};
pub use settings::SlideSettings;

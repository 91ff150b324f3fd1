// SPDX-License-Identifier: MIT OR Apache-2.0
//! Synchronous notifications from the slide controller.
//!
//! Observers register a callback and receive every [`SlideMessage`] in the
//! order they subscribed. Delivery happens inline, on the caller's stack,
//! before the controller method returns.
//!
//! ```
//! use keyslide_core::dispatch::{Dispatcher, SlideEvent, SlideMessage};
//! use keyslide_core::SlideMode;
//!
//! let mut dispatcher = Dispatcher::new();
//! let id = dispatcher.subscribe(|message| {
//!     println!("{:?} at {}%", message.event, message.percent);
//! });
//! dispatcher.send(SlideMessage::new(SlideEvent::PercentChanged, 50.0, SlideMode::Blend));
//! dispatcher.unsubscribe(id);
//! ```

use crate::mode::SlideMode;
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! {
    /// Handle returned by [`Dispatcher::subscribe`], used to unsubscribe.
    pub struct SubscriberId;
}

/// Things the controller announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideEvent {
    /// A new selection replaced the held keys
    KeysReloaded,
    /// The active mode changed
    ModeChanged,
    /// A slide session started
    BeginSlide,
    /// A slide session ended
    EndSlide,
    /// Keys moved to a new percent
    PercentChanged,
    /// A one-shot slide finished
    SetSlide,
    /// Keys were reset to their original values
    ResetSlide,
}

impl SlideEvent {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::KeysReloaded => "KeysReloaded",
            Self::ModeChanged => "ModeChanged",
            Self::BeginSlide => "BeginSlide",
            Self::EndSlide => "EndSlide",
            Self::PercentChanged => "PercentChanged",
            Self::SetSlide => "SetSlide",
            Self::ResetSlide => "ResetSlide",
        }
    }
}

/// A notification with the controller state at the time it was sent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideMessage {
    /// What happened
    pub event: SlideEvent,
    /// Controller percent after the event
    pub percent: f64,
    /// Active mode after the event
    pub mode: SlideMode,
}

impl SlideMessage {
    /// Create a message
    pub fn new(event: SlideEvent, percent: f64, mode: SlideMode) -> Self {
        Self {
            event,
            percent,
            mode,
        }
    }
}

type Callback = Box<dyn FnMut(&SlideMessage)>;

/// Callback list invoked in registration order
#[derive(Default)]
pub struct Dispatcher {
    subscribers: SlotMap<SubscriberId, Callback>,
    order: Vec<SubscriberId>,
    blocked: bool,
}

impl Dispatcher {
    /// Create a dispatcher with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&SlideMessage) + 'static,
    {
        let id = self.subscribers.insert(Box::new(callback));
        self.order.push(id);
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.order.retain(|existing| *existing != id);
        self.subscribers.remove(id).is_some()
    }

    /// Number of registered callbacks
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Suppress or resume delivery
    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked;
    }

    /// Whether delivery is suppressed
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Deliver a message to every subscriber
    pub fn send(&mut self, message: SlideMessage) {
        if self.blocked {
            return;
        }
        tracing::debug!("Sending message: {}", message.event.name());
        for id in &self.order {
            if let Some(callback) = self.subscribers.get_mut(*id) {
                callback(&message);
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscribers", &self.subscribers.len())
            .field("blocked", &self.blocked)
            .finish()
    }
}

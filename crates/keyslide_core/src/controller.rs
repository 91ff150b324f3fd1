// SPDX-License-Identifier: MIT OR Apache-2.0
//! The slide state machine.
//!
//! [`SlideKeysController`] owns the host and the held [`SegmentCollection`].
//! A slide session runs `begin_slide` → `slide`* → `end_slide` inside one
//! host undo chunk. `end_slide` must be called once the interaction is over,
//! otherwise the undo chunk stays open.

use crate::collection::SegmentCollection;
use crate::dispatch::{Dispatcher, SlideEvent, SlideMessage, SubscriberId};
use crate::error::{Result, SlideError};
use crate::host::AnimationHost;
use crate::key::KeyId;
use crate::mode::SlideMode;
use crate::segment::SegmentKey;
use crate::settings::SlideSettings;
use std::collections::HashMap;

/// Whether a slide session is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideState {
    /// No session
    #[default]
    Idle,
    /// Between `begin_slide` and `end_slide`
    Sliding,
}

/// Outcome of [`SlideKeysController::detect_keys`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reload {
    /// Detection did not run because a session is open
    Skipped,
    /// The selection matches the held keys, which were kept
    Unchanged,
    /// A new collection replaced the held keys
    Reloaded,
}

/// Slides the selected keys of a host toward per-mode goals.
pub struct SlideKeysController<H: AnimationHost> {
    host: H,
    settings: SlideSettings,
    collection: SegmentCollection,
    relative_values: HashMap<KeyId, f64>,
    dispatcher: Dispatcher,
    state: SlideState,
    percent: f64,
    undo_open: bool,
}

impl<H: AnimationHost> SlideKeysController<H> {
    /// Create an idle controller with no keys held
    pub fn new(host: H, settings: SlideSettings) -> Self {
        Self {
            host,
            settings,
            collection: SegmentCollection::new(),
            relative_values: HashMap::new(),
            dispatcher: Dispatcher::new(),
            state: SlideState::Idle,
            percent: 0.0,
            undo_open: false,
        }
    }

    /// Percent of the last absolute apply, 0 after a relative one
    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Active mode
    pub fn mode(&self) -> SlideMode {
        self.settings.mode
    }

    /// Session state
    pub fn state(&self) -> SlideState {
        self.state
    }

    /// Whether a session is open
    pub fn is_sliding(&self) -> bool {
        self.state == SlideState::Sliding
    }

    /// Keys currently held
    pub fn collection(&self) -> &SegmentCollection {
        &self.collection
    }

    /// Settings
    pub fn settings(&self) -> &SlideSettings {
        &self.settings
    }

    /// Mutable settings
    pub fn settings_mut(&mut self) -> &mut SlideSettings {
        &mut self.settings
    }

    /// The host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host. Edits made here are seen by the next detection.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Give back the host
    pub fn into_host(self) -> H {
        self.host
    }

    /// Register a callback for controller events
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&SlideMessage) + 'static,
    {
        self.dispatcher.subscribe(callback)
    }

    /// Remove a callback
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Mutable dispatcher, for blocking delivery
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    fn emit(&mut self, event: SlideEvent) {
        let message = SlideMessage::new(event, self.percent, self.settings.mode);
        self.dispatcher.send(message);
    }

    /// Reload the selected keys from the host.
    ///
    /// Does nothing while sliding unless `force` is set. Without `force` an
    /// identical selection keeps the held keys and their original values.
    /// `force` never changes how keys are found.
    pub fn detect_keys(&mut self, force: bool) -> Result<Reload> {
        if self.is_sliding() && !force {
            return Ok(Reload::Skipped);
        }

        let collection = SegmentCollection::detect(&self.host, &self.settings, false);
        if collection.is_empty() {
            tracing::warn!("You must select at least one key!");
        } else if !force
            && !self.collection.is_empty()
            && !collection.has_selection_changed(&self.host, &self.collection)
        {
            return Ok(Reload::Unchanged);
        }

        tracing::debug!("Refreshing keys: {} segments", collection.len());
        self.collection = collection;
        self.relative_values.clear();
        self.emit(SlideEvent::KeysReloaded);
        Ok(Reload::Reloaded)
    }

    /// Open a slide session, optionally moving straight to `percent`
    pub fn begin_slide(&mut self, percent: Option<f64>) -> Result<()> {
        if self.is_sliding() {
            return Err(SlideError::IllegalState(
                "Cannot call begin_slide twice. Call end_slide() when sliding has finished."
                    .to_string(),
            ));
        }

        self.host.open_undo_chunk();
        self.undo_open = true;
        if let Err(err) = self.detect_keys(false) {
            self.host.close_undo_chunk();
            self.undo_open = false;
            return Err(err);
        }
        self.state = SlideState::Sliding;
        self.emit(SlideEvent::BeginSlide);

        if let Some(percent) = percent {
            self.apply(percent, true)?;
        }
        Ok(())
    }

    /// Move the held keys to `percent` of the active mode
    pub fn slide(&mut self, percent: f64) -> Result<()> {
        self.apply(percent, true)
    }

    /// Close the slide session. Does nothing when idle.
    pub fn end_slide(&mut self) {
        if !self.is_sliding() {
            return;
        }
        if self.undo_open {
            self.host.close_undo_chunk();
            self.undo_open = false;
        }
        self.state = SlideState::Idle;
        self.emit(SlideEvent::EndSlide);
    }

    /// Slide once without an explicit session.
    ///
    /// Relative slides start from the keys' current values and compound.
    pub fn set_slide(&mut self, percent: f64, absolute: bool) -> Result<()> {
        self.begin_slide(None)?;
        let applied = self.apply(percent, absolute);
        self.end_slide();
        applied?;
        self.emit(SlideEvent::SetSlide);
        Ok(())
    }

    /// Put the held keys back to their values before any slide
    pub fn reset_slide(&mut self) -> Result<()> {
        self.relative_values.clear();
        self.set_slide(0.0, true)?;
        self.emit(SlideEvent::ResetSlide);
        Ok(())
    }

    /// Switch mode. The next slide continues from the keys' current values.
    pub fn set_mode(&mut self, mode: SlideMode) -> Result<()> {
        if mode == self.settings.mode {
            return Ok(());
        }

        let mut snapshot = HashMap::with_capacity(self.collection.key_count());
        for key in self.collection.keys() {
            snapshot.insert(key.id(), key.value(&self.host)?);
        }

        self.settings.mode = mode;
        self.percent = 0.0;
        self.relative_values.extend(snapshot);

        tracing::debug!("Mode changed to {}", mode);
        self.emit(SlideEvent::ModeChanged);
        Ok(())
    }

    /// Switch mode by name
    pub fn set_mode_named(&mut self, name: &str) -> Result<()> {
        let mode = name.parse::<SlideMode>()?;
        self.set_mode(mode)
    }

    /// One-shot slide from a quick-pick button or hotkey.
    ///
    /// `absolute` falls back to the `absolute_quick_picks` setting.
    pub fn quick_pick(&mut self, percent: f64, absolute: Option<bool>) -> Result<()> {
        let absolute = absolute.unwrap_or(self.settings.absolute_quick_picks);
        self.set_slide(percent, absolute)
    }

    fn start_value(
        relative_values: &HashMap<KeyId, f64>,
        host: &dyn AnimationHost,
        key: &SegmentKey,
        absolute: bool,
    ) -> Result<f64> {
        if !absolute {
            return key.value(host);
        }
        match relative_values.get(&key.id()) {
            Some(value) => Ok(*value),
            None => key.original_value(host),
        }
    }

    /// Move every held key once.
    ///
    /// A failed host write stops the apply. Keys written before it keep
    /// their new values while `percent` keeps the previous one.
    fn apply(&mut self, percent: f64, absolute: bool) -> Result<()> {
        if !self.is_sliding() {
            return Err(SlideError::IllegalState(
                "Cannot apply slide percentage when sliding has not been activated. Call begin_slide() first."
                    .to_string(),
            ));
        }

        let p = percent / 100.0;
        let mode = self.settings.mode;
        let weight = mode.weight(p);
        let mut written: Vec<KeyId> = Vec::new();

        for segment in self.collection.segments() {
            let average = match mode {
                SlideMode::Average => {
                    (segment.neighbor_left().value(&self.host)?
                        + segment.neighbor_right().value(&self.host)?)
                        / 2.0
                }
                _ => 0.0,
            };
            let shift = match mode {
                SlideMode::Shift if p < 0.0 => {
                    let first = Self::start_value(
                        &self.relative_values,
                        &self.host,
                        segment.first_key(),
                        absolute,
                    )?;
                    segment.neighbor_left().value(&self.host)? - first
                }
                SlideMode::Shift => {
                    let last = Self::start_value(
                        &self.relative_values,
                        &self.host,
                        segment.last_key(),
                        absolute,
                    )?;
                    segment.neighbor_right().value(&self.host)? - last
                }
                _ => 0.0,
            };

            for key in segment.keys() {
                let base = Self::start_value(&self.relative_values, &self.host, key, absolute)?;
                let host: &dyn AnimationHost = &self.host;

                let goal = match mode {
                    SlideMode::Blend if p < 0.0 => segment.neighbor_left().value(host)?,
                    SlideMode::Blend => segment.neighbor_right().value(host)?,
                    SlideMode::Shift => base + shift,
                    SlideMode::Average => average,
                    SlideMode::Default => match self.collection.default_value(host, key) {
                        Ok(value) => value,
                        Err(err @ SlideError::AttributeResolution { .. }) => {
                            tracing::warn!("Skipping key {}: {}", key.key(), err);
                            continue;
                        }
                        Err(err) => return Err(err),
                    },
                    SlideMode::Shrink => self.collection.shrink_value(host, key)?,
                    SlideMode::Level => self.collection.level_value(host)?,
                    SlideMode::Linear => self.collection.linear_value(host, key)?,
                    SlideMode::Ease if p < 0.0 => self.collection.ease_out_value(host, key)?,
                    SlideMode::Ease => self.collection.ease_in_value(host, key)?,
                    SlideMode::EaseInOut => self.collection.ease_in_out_value(host, key)?,
                };

                let value = base * (1.0 - weight) + goal * weight;
                if let Err(err) = key.set_value(&mut self.host, value) {
                    tracing::warn!(
                        "Slide to {}% stopped at {}; already moved: {}",
                        percent,
                        key.key(),
                        written
                            .iter()
                            .map(KeyId::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                    return Err(err);
                }
                written.push(key.id());
                if !absolute {
                    self.relative_values.insert(key.id(), value);
                }
            }
        }

        self.percent = if absolute { p * 100.0 } else { 0.0 };
        self.emit(SlideEvent::PercentChanged);
        Ok(())
    }
}

impl<H: AnimationHost> std::fmt::Debug for SlideKeysController<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideKeysController")
            .field("state", &self.state)
            .field("mode", &self.settings.mode)
            .field("percent", &self.percent)
            .field("segments", &self.collection.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::memory::MemoryHost;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ramp_host() -> MemoryHost {
        let mut host = MemoryHost::new();
        host.add_curve(
            "cube.tx",
            "cube_tx",
            &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)],
        );
        host.select_keys("cube_tx", &[1, 2, 3]);
        host
    }

    fn controller(mode: SlideMode) -> SlideKeysController<MemoryHost> {
        let settings = SlideSettings {
            mode,
            ..SlideSettings::default()
        };
        SlideKeysController::new(ramp_host(), settings)
    }

    fn values(controller: &SlideKeysController<MemoryHost>) -> Vec<f64> {
        controller.host().values("cube_tx")
    }

    #[test]
    fn test_blend_to_neighbors() {
        let mut controller = controller(SlideMode::Blend);
        controller.set_slide(100.0, true).unwrap();
        assert_eq!(values(&controller), vec![0.0, 4.0, 4.0, 4.0, 4.0]);
        assert_eq!(controller.percent(), 100.0);

        controller.set_slide(-100.0, true).unwrap();
        assert_eq!(values(&controller), vec![0.0, 0.0, 0.0, 0.0, 4.0]);

        controller.set_slide(0.0, true).unwrap();
        assert_eq!(values(&controller), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_average() {
        let mut controller = controller(SlideMode::Average);
        controller.set_slide(100.0, true).unwrap();
        assert_eq!(values(&controller), vec![0.0, 2.0, 2.0, 2.0, 4.0]);

        // The goal itself does not depend on the sign
        controller.set_slide(-50.0, true).unwrap();
        assert_eq!(controller.host().value("cube_tx", 2), Some(2.0));
    }

    #[test]
    fn test_shift() {
        let mut controller = controller(SlideMode::Shift);
        controller.set_slide(100.0, true).unwrap();
        assert_eq!(values(&controller), vec![0.0, 2.0, 3.0, 4.0, 4.0]);

        controller.set_slide(-100.0, true).unwrap();
        assert_eq!(values(&controller), vec![0.0, 0.0, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_level_and_linear() {
        let mut host = MemoryHost::new();
        host.add_curve("a.v", "a", &[(0.0, 0.0), (1.0, 6.0), (2.0, 0.0), (4.0, 8.0)]);
        host.select_keys("a", &[1, 2]);
        let mut controller = SlideKeysController::new(host, SlideSettings::default());

        controller.set_mode(SlideMode::Level).unwrap();
        controller.set_slide(100.0, true).unwrap();
        assert_eq!(controller.host().values("a"), vec![0.0, 3.0, 3.0, 8.0]);

        controller.set_mode(SlideMode::Linear).unwrap();
        controller.set_slide(100.0, true).unwrap();
        assert_eq!(controller.host().values("a"), vec![0.0, 2.0, 4.0, 8.0]);
    }

    #[test]
    fn test_shrink_across_curves() {
        let mut host = MemoryHost::new();
        host.add_curve("a.v", "a", &[(0.0, 0.0), (1.0, 4.0), (2.0, 0.0)]);
        host.add_curve("b.v", "b", &[(0.0, 0.0), (1.0, 10.0), (2.0, 0.0)]);
        host.select_keys("a", &[1]);
        host.select_keys("b", &[1]);
        let settings = SlideSettings {
            mode: SlideMode::Shrink,
            ..SlideSettings::default()
        };
        let mut controller = SlideKeysController::new(host, settings);
        controller.set_slide(100.0, true).unwrap();
        assert_eq!(controller.host().value("a", 1), Some(7.0));
        assert_eq!(controller.host().value("b", 1), Some(7.0));
    }

    #[test]
    fn test_ease_uses_sign() {
        let mut controller = controller(SlideMode::Ease);
        controller.set_slide(100.0, true).unwrap();
        // t = 0.5 between 0 and 4
        assert_eq!(controller.host().value("cube_tx", 2), Some(0.5));

        controller.set_slide(-100.0, true).unwrap();
        assert_eq!(controller.host().value("cube_tx", 2), Some(3.5));

        let mut controller = self::controller(SlideMode::EaseInOut);
        controller.set_slide(100.0, true).unwrap();
        assert_eq!(controller.host().value("cube_tx", 2), Some(2.0));
    }

    #[test]
    fn test_default_skips_unresolved_curve() {
        let mut host = ramp_host();
        host.set_attribute_default("cube.tx", 10.0);
        host.add_curve("cube.ty", "cube_ty", &[(0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]);
        host.select_keys("cube_ty", &[1]);
        host.remove_attribute("cube.ty");

        let settings = SlideSettings {
            mode: SlideMode::Default,
            ..SlideSettings::default()
        };
        let mut controller = SlideKeysController::new(host, settings);
        controller.set_slide(100.0, true).unwrap();
        assert_eq!(controller.host().values("cube_tx"), vec![0.0, 10.0, 10.0, 10.0, 4.0]);
        assert_eq!(controller.host().values("cube_ty"), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_illegal_states() {
        let mut controller = controller(SlideMode::Blend);
        assert!(matches!(
            controller.slide(50.0),
            Err(SlideError::IllegalState(_))
        ));

        controller.begin_slide(None).unwrap();
        assert!(matches!(
            controller.begin_slide(None),
            Err(SlideError::IllegalState(_))
        ));
        assert!(matches!(
            controller.set_slide(10.0, true),
            Err(SlideError::IllegalState(_))
        ));
        controller.end_slide();
        assert_eq!(controller.state(), SlideState::Idle);
        assert_eq!(controller.host().undo_chunk_depth(), 0);
    }

    #[test]
    fn test_session_slides_from_originals() {
        let mut controller = controller(SlideMode::Blend);
        controller.begin_slide(Some(50.0)).unwrap();
        assert!(controller.is_sliding());
        assert_eq!(controller.host().value("cube_tx", 1), Some(2.5));
        controller.slide(100.0).unwrap();
        controller.slide(50.0).unwrap();
        assert_eq!(controller.host().value("cube_tx", 1), Some(2.5));
        controller.end_slide();
        controller.end_slide();
        assert!(!controller.is_sliding());
    }

    #[test]
    fn test_relative_compounds() {
        let mut controller = controller(SlideMode::Blend);
        controller.set_slide(50.0, false).unwrap();
        assert_eq!(controller.host().value("cube_tx", 1), Some(2.5));
        assert_eq!(controller.percent(), 0.0);
        controller.set_slide(50.0, false).unwrap();
        assert_eq!(controller.host().value("cube_tx", 1), Some(3.25));

        // Absolute slides now start from the relative result
        controller.set_slide(0.0, true).unwrap();
        assert_eq!(controller.host().value("cube_tx", 1), Some(3.25));

        controller.reset_slide().unwrap();
        assert_eq!(values(&controller), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_mode_switch_keeps_values() {
        let mut controller = controller(SlideMode::Blend);
        controller.set_slide(50.0, true).unwrap();
        let before = values(&controller);

        controller.set_mode(SlideMode::Level).unwrap();
        assert_eq!(controller.percent(), 0.0);
        assert_eq!(controller.settings().mode, SlideMode::Level);
        controller.begin_slide(None).unwrap();
        controller.slide(0.0).unwrap();
        controller.end_slide();
        assert_eq!(values(&controller), before);
    }

    #[test]
    fn test_set_mode_named() {
        let mut controller = controller(SlideMode::Blend);
        controller.set_mode_named("Ease In/Out").unwrap();
        assert_eq!(controller.mode(), SlideMode::EaseInOut);
        assert!(matches!(
            controller.set_mode_named("wobble"),
            Err(SlideError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_detect_keys() {
        let mut controller = controller(SlideMode::Blend);
        assert_eq!(controller.detect_keys(false).unwrap(), Reload::Reloaded);
        assert_eq!(controller.detect_keys(false).unwrap(), Reload::Unchanged);

        controller.host_mut().deselect_key("cube_tx", 3);
        assert_eq!(controller.detect_keys(false).unwrap(), Reload::Reloaded);
        assert_eq!(controller.collection().key_count(), 2);

        controller.begin_slide(None).unwrap();
        assert_eq!(controller.detect_keys(false).unwrap(), Reload::Skipped);
        controller.end_slide();
    }

    #[test]
    fn test_forced_detect_finds_current_frame_keys() {
        let mut host = MemoryHost::new();
        host.add_curve("ball.ty", "ball_ty", &[(0.0, 0.0), (10.0, 8.0), (20.0, 0.0)]);
        host.set_graph_editor_active(false);
        host.set_panel_attributes(vec!["ball.ty".to_string()]);
        host.set_current_time(10.0);
        let mut controller = SlideKeysController::new(host, SlideSettings::default());

        assert_eq!(controller.detect_keys(true).unwrap(), Reload::Reloaded);
        assert_eq!(controller.collection().key_count(), 1);
        assert_eq!(controller.collection().keys().next().unwrap().key().index(), 1);
    }

    #[test]
    fn test_forced_detect_reloads_unchanged_selection() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut controller = controller(SlideMode::Blend);
        let sink = Rc::clone(&log);
        controller.subscribe(move |m| sink.borrow_mut().push(m.event));

        assert_eq!(controller.detect_keys(false).unwrap(), Reload::Reloaded);
        assert_eq!(controller.detect_keys(false).unwrap(), Reload::Unchanged);
        assert_eq!(controller.detect_keys(true).unwrap(), Reload::Reloaded);
        assert_eq!(controller.collection().key_count(), 3);
        assert_eq!(
            *log.borrow(),
            vec![SlideEvent::KeysReloaded, SlideEvent::KeysReloaded]
        );
    }

    #[test]
    fn test_forced_detect_while_sliding() {
        let mut controller = controller(SlideMode::Blend);
        controller.set_slide(50.0, false).unwrap();
        assert_eq!(controller.host().value("cube_tx", 1), Some(2.5));

        controller.begin_slide(None).unwrap();
        controller.host_mut().set_key_value("cube_tx", 1, 9.0).unwrap();
        assert_eq!(controller.detect_keys(false).unwrap(), Reload::Skipped);
        assert_eq!(controller.detect_keys(true).unwrap(), Reload::Reloaded);
        assert!(controller.is_sliding());

        // The relative start values are gone, so the reloaded keys start
        // from what the host holds now
        controller.slide(0.0).unwrap();
        assert_eq!(controller.host().value("cube_tx", 1), Some(9.0));
        controller.end_slide();
        assert_eq!(controller.host().undo_chunk_depth(), 0);
    }

    #[test]
    fn test_failed_mode_switch_changes_nothing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut controller = controller(SlideMode::Blend);
        controller.set_slide(50.0, true).unwrap();

        // Held keys of a curve that is gone before their values were read
        let host = controller.host_mut();
        host.add_curve("cube.ty", "cube_ty", &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        host.select_keys("cube_ty", &[1]);
        controller.detect_keys(true).unwrap();
        assert_eq!(controller.collection().key_count(), 4);
        controller.host_mut().remove_curve("cube_ty");

        let sink = Rc::clone(&log);
        controller.subscribe(move |m| sink.borrow_mut().push(m.event));

        assert!(matches!(
            controller.set_mode(SlideMode::Level),
            Err(SlideError::Host(HostError::CurveNotFound(_)))
        ));
        assert_eq!(controller.mode(), SlideMode::Blend);
        assert_eq!(controller.percent(), 50.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_failed_write_keeps_percent() {
        let mut host = MemoryHost::new();
        host.add_curve("a.v", "a", &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        host.add_curve("b.v", "b", &[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        host.select_keys("a", &[1]);
        host.select_keys("b", &[1]);
        let mut controller = SlideKeysController::new(host, SlideSettings::default());

        controller.begin_slide(None).unwrap();
        controller.slide(50.0).unwrap();
        assert_eq!(controller.percent(), 50.0);

        controller.host_mut().remove_curve("b");
        assert!(matches!(
            controller.slide(100.0),
            Err(SlideError::Host(HostError::CurveNotFound(_)))
        ));
        assert_eq!(controller.host().value("a", 1), Some(2.0));
        assert_eq!(controller.percent(), 50.0);
        controller.end_slide();
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let mut host = ramp_host();
        host.clear_selection();
        let mut controller = SlideKeysController::new(host, SlideSettings::default());
        controller.set_slide(100.0, true).unwrap();
        assert!(controller.collection().is_empty());
        assert_eq!(values(&controller), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_session_is_one_undo_step() {
        let mut controller = controller(SlideMode::Blend);
        controller.begin_slide(None).unwrap();
        controller.slide(30.0).unwrap();
        controller.slide(100.0).unwrap();
        controller.end_slide();

        let mut host = controller.into_host();
        assert_eq!(host.history().stats().undo_count, 1);
        host.undo().unwrap();
        assert_eq!(host.values("cube_tx"), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_quick_pick_uses_setting() {
        let mut controller = controller(SlideMode::Blend);
        controller.quick_pick(50.0, None).unwrap();
        controller.quick_pick(50.0, None).unwrap();
        assert_eq!(controller.host().value("cube_tx", 1), Some(3.25));

        controller.settings_mut().absolute_quick_picks = true;
        controller.reset_slide().unwrap();
        controller.quick_pick(50.0, None).unwrap();
        controller.quick_pick(50.0, None).unwrap();
        assert_eq!(controller.host().value("cube_tx", 1), Some(2.5));
    }

    #[test]
    fn test_events() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut controller = controller(SlideMode::Blend);
        let sink = Rc::clone(&log);
        let id = controller.subscribe(move |m| sink.borrow_mut().push(m.event));

        controller.set_slide(20.0, true).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                SlideEvent::KeysReloaded,
                SlideEvent::BeginSlide,
                SlideEvent::PercentChanged,
                SlideEvent::EndSlide,
                SlideEvent::SetSlide,
            ]
        );

        log.borrow_mut().clear();
        controller.set_mode(SlideMode::Blend).unwrap();
        controller.set_mode(SlideMode::Shift).unwrap();
        assert_eq!(*log.borrow(), vec![SlideEvent::ModeChanged]);

        assert!(controller.unsubscribe(id));
        controller.reset_slide().unwrap();
        assert_eq!(log.borrow().len(), 1);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation curves and selection detection.

use crate::error::{Result, SlideError};
use crate::host::AnimationHost;
use crate::key::Key;
use crate::settings::SlideSettings;
use std::cell::OnceCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Snapshot of one animation curve and all of its keys.
///
/// The key list is read-only. When the host changes, detect again and build
/// a new curve instead of patching this one.
#[derive(Debug)]
pub struct Curve {
    name: Rc<str>,
    keys: Vec<Key>,
    default_value: OnceCell<f64>,
}

impl Curve {
    /// Create a curve from already-built keys
    pub fn new(name: impl Into<Rc<str>>, keys: Vec<Key>) -> Self {
        Self {
            name: name.into(),
            keys,
            default_value: OnceCell::new(),
        }
    }

    /// Build a curve from the host, with selection flags as the host reports them
    pub fn load(host: &dyn AnimationHost, name: &str) -> Result<Self> {
        let name: Rc<str> = name.into();
        let count = host.key_count(&name)?;
        let selected: HashSet<usize> = host.selected_key_indices(&name)?.into_iter().collect();

        let keys = (0..count)
            .map(|index| Key::new(Rc::clone(&name), index, count, selected.contains(&index)))
            .collect();

        Ok(Self::new(name, keys))
    }

    /// All curves driving an attribute
    pub fn from_attribute(host: &dyn AnimationHost, attribute: &str) -> Result<Vec<Self>> {
        host.curves_for_attribute(attribute)?
            .iter()
            .map(|name| Self::load(host, name))
            .collect()
    }

    /// Detect the curves the user is working on.
    ///
    /// Explicitly selected keys win. Without them (and unless
    /// `force_selected_keys` is set) the key on the current frame of every
    /// curve in the UI context is used when `find_current_keys` is enabled.
    /// Host failures drop the affected attribute instead of failing.
    pub fn detect_curves(
        host: &dyn AnimationHost,
        settings: &SlideSettings,
        force_selected_keys: bool,
    ) -> Vec<Self> {
        let mut curves = Vec::new();

        if force_selected_keys || host.graph_editor_active() {
            tracing::debug!("Searching for selected keys");
            for attribute in host.attributes_with_selected_keys() {
                curves.extend(Self::load_attribute(host, &attribute));
            }
            curves.retain(|curve| curve.selected_keys().next().is_some());
        }

        if curves.is_empty() && !force_selected_keys && settings.find_current_keys {
            tracing::debug!("No keys selected, grabbing from current frame");
            let time = host.current_time();
            for attribute in host.panel_attributes() {
                for mut curve in Self::load_attribute(host, &attribute) {
                    match host.key_index_at_time(&curve.name, time) {
                        Ok(Some(index)) => {
                            curve.select_only(index);
                            curves.push(curve);
                        }
                        Ok(None) => {}
                        Err(err) => {
                            tracing::warn!("Skipping curve {}: {}", curve.name, err);
                        }
                    }
                }
            }
        }

        curves
    }

    fn load_attribute(host: &dyn AnimationHost, attribute: &str) -> Vec<Self> {
        match Self::from_attribute(host, attribute) {
            Ok(curves) => curves,
            Err(err) => {
                tracing::warn!("Skipping attribute {}: {}", attribute, err);
                Vec::new()
            }
        }
    }

    fn select_only(&mut self, index: usize) {
        for key in &mut self.keys {
            let selected = key.index() == index;
            key.set_selected(selected);
        }
    }

    /// Curve name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared handle to the curve name
    pub fn name_rc(&self) -> &Rc<str> {
        &self.name
    }

    /// All keys in index order
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Key at an index
    pub fn key(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the curve has no keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Selected keys in index order
    pub fn selected_keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter().filter(|k| k.is_selected())
    }

    /// Default value of the attribute this curve drives (queried once)
    pub fn default_value(&self, host: &dyn AnimationHost) -> Result<f64> {
        if let Some(value) = self.default_value.get() {
            return Ok(*value);
        }
        let value = host
            .attribute_default(&self.name)
            .map_err(|err| SlideError::AttributeResolution {
                curve: self.name.to_string(),
                reason: err.to_string(),
            })?;
        let _ = self.default_value.set(value);
        Ok(value)
    }
}

// Curves are the same curve when their names match.
impl PartialEq for Curve {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

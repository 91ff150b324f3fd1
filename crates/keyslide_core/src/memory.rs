// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory animation host.
//!
//! [`MemoryHost`] keeps curves in a serializable [`Scene`], evaluates them
//! linearly between keys and records every value write in an undo
//! [`History`]. It backs the command-line tool and the test suite.

use crate::error::HostError;
use crate::history::{self, History, OperationGroup, ValueChange};
use crate::host::{AnimationHost, HostResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current scene format version
pub const SCENE_FORMAT_VERSION: u32 = 1;

/// Two key times closer than this are the same frame
pub const TIME_TOLERANCE: f64 = 1e-6;

/// A key stored in a scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneKey {
    /// Frame
    pub time: f64,
    /// Value
    pub value: f64,
    /// Selected in the graph view
    #[serde(default)]
    pub selected: bool,
}

/// A curve stored in a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCurve {
    /// Attribute this curve drives
    pub attribute: String,
    /// Keys, ordered by time
    pub keys: Vec<SceneKey>,
}

/// An animatable attribute
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneAttribute {
    /// Declared default value
    #[serde(default)]
    pub default: f64,
}

/// Everything the in-memory host knows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Scene format version
    pub version: u32,
    /// Playback time
    pub current_time: f64,
    /// Whether explicit key selection is in effect
    pub graph_editor_active: bool,
    /// Attributes shown in the UI context
    pub panel_attributes: Vec<String>,
    /// Attributes by name
    pub attributes: IndexMap<String, SceneAttribute>,
    /// Curves by name
    pub curves: IndexMap<String, SceneCurve>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            version: SCENE_FORMAT_VERSION,
            current_time: 0.0,
            graph_editor_active: true,
            panel_attributes: Vec::new(),
            attributes: IndexMap::new(),
            curves: IndexMap::new(),
        }
    }
}

impl Scene {
    /// Parse a scene from RON text. Keys are put in time order.
    pub fn from_ron(content: &str) -> std::io::Result<Self> {
        let mut scene: Scene = ron::from_str(content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        if scene.version > SCENE_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Scene version {} is newer than supported version {}",
                    scene.version, SCENE_FORMAT_VERSION
                ),
            ));
        }

        for curve in scene.curves.values_mut() {
            curve.keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        }
        Ok(scene)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> std::io::Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Load a scene file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save a scene file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_ron()?)
    }
}

/// Animation host backed by a [`Scene`]
#[derive(Debug, Default)]
pub struct MemoryHost {
    scene: Scene,
    history: History,
    chunk_depth: usize,
    pending: Option<OperationGroup>,
}

impl MemoryHost {
    /// Create an empty host
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host over an existing scene
    pub fn from_scene(scene: Scene) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    /// The scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Give back the scene
    pub fn into_scene(self) -> Scene {
        self.scene
    }

    /// Undo history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// How many undo chunks are open
    pub fn undo_chunk_depth(&self) -> usize {
        self.chunk_depth
    }

    /// Add (or replace) an attribute
    pub fn add_attribute(&mut self, name: &str, default: f64) {
        self.scene
            .attributes
            .insert(name.to_string(), SceneAttribute { default });
    }

    /// Remove an attribute, leaving its curves disconnected
    pub fn remove_attribute(&mut self, name: &str) {
        self.scene.attributes.shift_remove(name);
    }

    /// Remove a curve and its keys
    pub fn remove_curve(&mut self, name: &str) {
        self.scene.curves.shift_remove(name);
    }

    /// Add a curve of `(time, value)` keys driving `attribute`.
    ///
    /// The attribute is created with a default of 0 if it does not exist.
    pub fn add_curve(&mut self, attribute: &str, name: &str, keys: &[(f64, f64)]) {
        self.scene
            .attributes
            .entry(attribute.to_string())
            .or_default();

        let mut keys: Vec<SceneKey> = keys
            .iter()
            .map(|&(time, value)| SceneKey {
                time,
                value,
                selected: false,
            })
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));

        self.scene.curves.insert(
            name.to_string(),
            SceneCurve {
                attribute: attribute.to_string(),
                keys,
            },
        );
    }

    /// Select keys (adds to the existing selection)
    pub fn select_keys(&mut self, curve: &str, indices: &[usize]) {
        if let Some(curve) = self.scene.curves.get_mut(curve) {
            for &index in indices {
                if let Some(key) = curve.keys.get_mut(index) {
                    key.selected = true;
                }
            }
        }
    }

    /// Deselect one key
    pub fn deselect_key(&mut self, curve: &str, index: usize) {
        if let Some(key) = self
            .scene
            .curves
            .get_mut(curve)
            .and_then(|c| c.keys.get_mut(index))
        {
            key.selected = false;
        }
    }

    /// Deselect every key
    pub fn clear_selection(&mut self) {
        for curve in self.scene.curves.values_mut() {
            for key in &mut curve.keys {
                key.selected = false;
            }
        }
    }

    /// Move the playhead
    pub fn set_current_time(&mut self, time: f64) {
        self.scene.current_time = time;
    }

    /// Toggle explicit key selection
    pub fn set_graph_editor_active(&mut self, active: bool) {
        self.scene.graph_editor_active = active;
    }

    /// Attributes shown in the UI context
    pub fn set_panel_attributes(&mut self, attributes: Vec<String>) {
        self.scene.panel_attributes = attributes;
    }

    /// Change an attribute's default, creating the attribute if needed
    pub fn set_attribute_default(&mut self, attribute: &str, default: f64) {
        self.add_attribute(attribute, default);
    }

    /// Value of a key
    pub fn value(&self, curve: &str, index: usize) -> Option<f64> {
        self.scene
            .curves
            .get(curve)
            .and_then(|c| c.keys.get(index))
            .map(|k| k.value)
    }

    /// Values of every key on a curve
    pub fn values(&self, curve: &str) -> Vec<f64> {
        self.scene
            .curves
            .get(curve)
            .map(|c| c.keys.iter().map(|k| k.value).collect())
            .unwrap_or_default()
    }

    /// Revert the last committed group of edits
    pub fn undo(&mut self) -> history::Result<OperationGroup> {
        let group = self.history.undo()?;
        for change in group.changes.iter().rev() {
            if let Err(err) = self.write(&change.curve, change.index, change.before) {
                tracing::warn!("Undo skipped a key: {}", err);
            }
        }
        tracing::debug!("Undid {}", group.description);
        Ok(group)
    }

    /// Reapply the last undone group of edits
    pub fn redo(&mut self) -> history::Result<OperationGroup> {
        let group = self.history.redo()?;
        for change in &group.changes {
            if let Err(err) = self.write(&change.curve, change.index, change.after) {
                tracing::warn!("Redo skipped a key: {}", err);
            }
        }
        tracing::debug!("Redid {}", group.description);
        Ok(group)
    }

    fn curve(&self, name: &str) -> HostResult<&SceneCurve> {
        self.scene
            .curves
            .get(name)
            .ok_or_else(|| HostError::CurveNotFound(name.to_string()))
    }

    fn key(&self, curve: &str, index: usize) -> HostResult<&SceneKey> {
        self.curve(curve)?
            .keys
            .get(index)
            .ok_or_else(|| HostError::KeyOutOfRange {
                curve: curve.to_string(),
                index,
            })
    }

    fn write(&mut self, curve: &str, index: usize, value: f64) -> HostResult<f64> {
        let key = self
            .scene
            .curves
            .get_mut(curve)
            .ok_or_else(|| HostError::CurveNotFound(curve.to_string()))?
            .keys
            .get_mut(index)
            .ok_or_else(|| HostError::KeyOutOfRange {
                curve: curve.to_string(),
                index,
            })?;
        Ok(std::mem::replace(&mut key.value, value))
    }
}

impl AnimationHost for MemoryHost {
    fn graph_editor_active(&self) -> bool {
        self.scene.graph_editor_active
    }

    fn attributes_with_selected_keys(&self) -> Vec<String> {
        let mut attributes: Vec<String> = Vec::new();
        for curve in self.scene.curves.values() {
            if curve.keys.iter().any(|k| k.selected) && !attributes.contains(&curve.attribute) {
                attributes.push(curve.attribute.clone());
            }
        }
        attributes
    }

    fn panel_attributes(&self) -> Vec<String> {
        self.scene.panel_attributes.clone()
    }

    fn curves_for_attribute(&self, attribute: &str) -> HostResult<Vec<String>> {
        let curves: Vec<String> = self
            .scene
            .curves
            .iter()
            .filter(|(_, curve)| curve.attribute == attribute)
            .map(|(name, _)| name.clone())
            .collect();
        if curves.is_empty() && !self.scene.attributes.contains_key(attribute) {
            return Err(HostError::AttributeNotFound(attribute.to_string()));
        }
        Ok(curves)
    }

    fn key_count(&self, curve: &str) -> HostResult<usize> {
        Ok(self.curve(curve)?.keys.len())
    }

    fn selected_key_indices(&self, curve: &str) -> HostResult<Vec<usize>> {
        Ok(self
            .curve(curve)?
            .keys
            .iter()
            .enumerate()
            .filter(|(_, k)| k.selected)
            .map(|(i, _)| i)
            .collect())
    }

    fn key_time(&self, curve: &str, index: usize) -> HostResult<f64> {
        Ok(self.key(curve, index)?.time)
    }

    fn key_value(&self, curve: &str, index: usize) -> HostResult<f64> {
        Ok(self.key(curve, index)?.value)
    }

    fn set_key_value(&mut self, curve: &str, index: usize, value: f64) -> HostResult<()> {
        let before = self.write(curve, index, value)?;
        let change = ValueChange {
            curve: curve.to_string(),
            index,
            before,
            after: value,
        };

        match self.pending.as_mut() {
            Some(group) => group.record(change),
            None => {
                let mut group = self.history.begin_group("Set key value");
                group.record(change);
                self.history.commit(group);
            }
        }
        Ok(())
    }

    fn key_index_at_time(&self, curve: &str, time: f64) -> HostResult<Option<usize>> {
        Ok(self
            .curve(curve)?
            .keys
            .iter()
            .position(|k| (k.time - time).abs() < TIME_TOLERANCE))
    }

    fn evaluate(&self, curve: &str, time: f64) -> HostResult<f64> {
        let keys = &self.curve(curve)?.keys;
        let next_idx = keys.iter().position(|k| k.time >= time);

        let value = match next_idx {
            None => keys.last().map(|k| k.value),
            Some(0) => keys.first().map(|k| k.value),
            Some(idx) => {
                let a = &keys[idx - 1];
                let b = &keys[idx];
                if (b.time - a.time).abs() < TIME_TOLERANCE {
                    Some(b.value)
                } else {
                    let t = (time - a.time) / (b.time - a.time);
                    Some(a.value + (b.value - a.value) * t)
                }
            }
        };

        value.ok_or_else(|| HostError::Evaluation {
            curve: curve.to_string(),
            reason: "curve has no keys".to_string(),
        })
    }

    fn attribute_default(&self, curve: &str) -> HostResult<f64> {
        let attribute = &self.curve(curve)?.attribute;
        self.scene
            .attributes
            .get(attribute)
            .map(|a| a.default)
            .ok_or_else(|| HostError::AttributeNotFound(attribute.clone()))
    }

    fn current_time(&self) -> f64 {
        self.scene.current_time
    }

    fn open_undo_chunk(&mut self) {
        self.chunk_depth += 1;
        if self.chunk_depth == 1 {
            self.pending = Some(self.history.begin_group("Slide keys"));
        }
    }

    fn close_undo_chunk(&mut self) {
        if self.chunk_depth == 0 {
            tracing::warn!("Closing an undo chunk that was never opened");
            return;
        }
        self.chunk_depth -= 1;
        if self.chunk_depth == 0 {
            if let Some(group) = self.pending.take() {
                self.history.commit(group);
            }
        }
    }
}

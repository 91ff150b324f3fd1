// SPDX-License-Identifier: MIT OR Apache-2.0
//! All segments of the current selection and the values computed across them.
//!
//! Collection-wide values (level, linear, shrink, ease) are computed in one
//! pass the first time any of them is asked for and kept for the lifetime
//! of the collection. A new selection means a new collection.

use crate::curve::Curve;
use crate::error::{Result, SlideError};
use crate::host::AnimationHost;
use crate::key::KeyId;
use crate::mode::Interpolation;
use crate::segment::{CurveSegment, SegmentKey};
use crate::settings::SlideSettings;
use indexmap::IndexMap;
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Ease targets for a single key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EaseValues {
    /// Cubic ease-in between the neighbors
    pub ease_in: f64,
    /// Cubic ease-out between the neighbors
    pub ease_out: f64,
    /// Cubic ease-in-out between the neighbors
    pub ease_in_out: f64,
}

#[derive(Debug)]
struct LevelAndLinear {
    level: f64,
    linear: HashMap<KeyId, f64>,
}

/// The segments found in the current selection.
#[derive(Debug, Default)]
pub struct SegmentCollection {
    segments: Vec<CurveSegment>,
    level_linear: OnceCell<LevelAndLinear>,
    shrink: OnceCell<HashMap<KeyId, f64>>,
    shrink_timing: RefCell<HashMap<u64, f64>>,
    ease: OnceCell<HashMap<KeyId, EaseValues>>,
}

impl SegmentCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment every curve's selected keys into one collection
    pub fn from_curves(curves: Vec<Curve>) -> Self {
        let mut segments = Vec::new();
        for curve in curves {
            let curve = Rc::new(curve);
            let found = CurveSegment::from_curve(&curve, segments.len());
            segments.extend(found);
        }
        Self {
            segments,
            ..Self::default()
        }
    }

    /// Detect the current selection in the host.
    ///
    /// The result may be empty when nothing is selected.
    pub fn detect(
        host: &dyn AnimationHost,
        settings: &SlideSettings,
        force_selected_keys: bool,
    ) -> Self {
        Self::from_curves(Curve::detect_curves(host, settings, force_selected_keys))
    }

    /// All segments
    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether no keys are selected
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Every selected key, segment by segment
    pub fn keys(&self) -> impl Iterator<Item = &SegmentKey> {
        self.segments.iter().flat_map(|segment| segment.keys().iter())
    }

    /// Number of selected keys
    pub fn key_count(&self) -> usize {
        self.segments.iter().map(|segment| segment.keys().len()).sum()
    }

    /// The segment that owns `key`
    pub fn segment_of(&self, key: &SegmentKey) -> Result<&CurveSegment> {
        key.segment()
            .and_then(|index| self.segments.get(index))
            .filter(|segment| segment.keys().iter().any(|k| k.key() == key.key()))
            .ok_or_else(|| SlideError::KeyNotInCollection(key.id()))
    }

    fn level_and_linear(&self, host: &dyn AnimationHost) -> Result<&LevelAndLinear> {
        if let Some(cached) = self.level_linear.get() {
            return Ok(cached);
        }

        let mut total = 0.0;
        let mut count = 0usize;
        let mut linear = HashMap::with_capacity(self.key_count());

        for segment in &self.segments {
            let left = segment.neighbor_left();
            let right = segment.neighbor_right();
            let left_value = left.value(host)?;
            let right_value = right.value(host)?;

            for key in segment.keys() {
                total += key.value(host)?;
                count += 1;

                let t = segment.time_as_percent_inclusive(host, key)?;
                linear.insert(key.id(), Interpolation::lerp(left_value, right_value, t));
            }
        }

        let level = if count == 0 { 0.0 } else { total / count as f64 };
        tracing::debug!("Cached level {} over {} keys", level, count);
        Ok(self.level_linear.get_or_init(|| LevelAndLinear { level, linear }))
    }

    fn shrink_values(&self, host: &dyn AnimationHost) -> Result<&HashMap<KeyId, f64>> {
        if let Some(cached) = self.shrink.get() {
            return Ok(cached);
        }

        let mut values = HashMap::with_capacity(self.key_count());
        let mut timing = self.shrink_timing.borrow_mut();
        for key in self.keys() {
            let time = key.time(host)?;
            let value = match timing.get(&time.to_bits()) {
                Some(value) => *value,
                None => {
                    let mut total = 0.0;
                    for segment in &self.segments {
                        total += segment.value_at_time(host, time)?;
                    }
                    let value = total / self.segments.len() as f64;
                    timing.insert(time.to_bits(), value);
                    value
                }
            };
            values.insert(key.id(), value);
        }

        Ok(self.shrink.get_or_init(|| values))
    }

    fn ease_values(&self, host: &dyn AnimationHost) -> Result<&HashMap<KeyId, EaseValues>> {
        if let Some(cached) = self.ease.get() {
            return Ok(cached);
        }

        let mut values = HashMap::with_capacity(self.key_count());
        for segment in &self.segments {
            let left = segment.neighbor_left().value(host)?;
            let right = segment.neighbor_right().value(host)?;
            for key in segment.keys() {
                let t = segment.time_as_percent_inclusive(host, key)?;
                values.insert(
                    key.id(),
                    EaseValues {
                        ease_in: Interpolation::lerp(left, right, Interpolation::ease_in(t)),
                        ease_out: Interpolation::lerp(left, right, Interpolation::ease_out(t)),
                        ease_in_out: Interpolation::lerp(
                            left,
                            right,
                            Interpolation::ease_in_out(t),
                        ),
                    },
                );
            }
        }

        Ok(self.ease.get_or_init(|| values))
    }

    /// Mean value of every selected key in the collection
    pub fn level_value(&self, host: &dyn AnimationHost) -> Result<f64> {
        Ok(self.level_and_linear(host)?.level)
    }

    /// Value on the straight line between the key's segment neighbors
    pub fn linear_value(&self, host: &dyn AnimationHost, key: &SegmentKey) -> Result<f64> {
        let id = key.id();
        match self.level_and_linear(host)?.linear.get(&id) {
            Some(value) => Ok(*value),
            None => Err(SlideError::KeyNotInCollection(id)),
        }
    }

    /// Mean over every segment's curve at the key's time
    pub fn shrink_value(&self, host: &dyn AnimationHost, key: &SegmentKey) -> Result<f64> {
        let id = key.id();
        match self.shrink_values(host)?.get(&id) {
            Some(value) => Ok(*value),
            None => Err(SlideError::KeyNotInCollection(id)),
        }
    }

    /// All three ease targets for a key
    pub fn ease(&self, host: &dyn AnimationHost, key: &SegmentKey) -> Result<EaseValues> {
        let id = key.id();
        match self.ease_values(host)?.get(&id) {
            Some(values) => Ok(*values),
            None => Err(SlideError::KeyNotInCollection(id)),
        }
    }

    /// Cubic ease-in target between the key's neighbors
    pub fn ease_in_value(&self, host: &dyn AnimationHost, key: &SegmentKey) -> Result<f64> {
        Ok(self.ease(host, key)?.ease_in)
    }

    /// Cubic ease-out target between the key's neighbors
    pub fn ease_out_value(&self, host: &dyn AnimationHost, key: &SegmentKey) -> Result<f64> {
        Ok(self.ease(host, key)?.ease_out)
    }

    /// Cubic ease-in-out target between the key's neighbors
    pub fn ease_in_out_value(&self, host: &dyn AnimationHost, key: &SegmentKey) -> Result<f64> {
        Ok(self.ease(host, key)?.ease_in_out)
    }

    /// Default value of the attribute behind the key's curve
    pub fn default_value(&self, host: &dyn AnimationHost, key: &SegmentKey) -> Result<f64> {
        self.segment_of(key)?.curve().default_value(host)
    }

    /// Whether `other` differs from this collection in selection or key data.
    ///
    /// Host failures while comparing count as a change.
    pub fn has_selection_changed(&self, host: &dyn AnimationHost, other: &Self) -> bool {
        match self.compare(host, other) {
            Ok(changed) => changed,
            Err(err) => {
                tracing::debug!("hasSelectionChanged: comparison failed: {}", err);
                true
            }
        }
    }

    fn compare(&self, host: &dyn AnimationHost, other: &Self) -> Result<bool> {
        if self.segments.len() != other.segments.len() {
            tracing::debug!("hasSelectionChanged: Segment number mismatch");
            return Ok(true);
        }

        let these = self.segments_by_curve();
        let others = other.segments_by_curve();

        if these.len() != others.len() || these.keys().any(|name| !others.contains_key(name)) {
            tracing::debug!("hasSelectionChanged: Curve name mismatch");
            return Ok(true);
        }

        for (name, these_segments) in &these {
            let Some(other_segments) = others.get(name) else {
                return Ok(true);
            };
            if these_segments.len() != other_segments.len() {
                tracing::debug!("hasSelectionChanged: Segments number mismatch");
                return Ok(true);
            }
            for (this, that) in these_segments.iter().zip(other_segments.iter()) {
                if !this.is_equivalent(that, host)? {
                    tracing::debug!("hasSelectionChanged: segment equivalence mismatch");
                    return Ok(true);
                }
            }
        }

        tracing::debug!("hasSelectionChanged: No change.");
        Ok(false)
    }

    fn segments_by_curve(&self) -> IndexMap<&str, Vec<&CurveSegment>> {
        let mut map: IndexMap<&str, Vec<&CurveSegment>> = IndexMap::new();
        for segment in &self.segments {
            map.entry(segment.curve_name()).or_default().push(segment);
        }
        for segments in map.values_mut() {
            segments.sort_by_key(|segment| segment.first_key().index());
        }
        map
    }
}

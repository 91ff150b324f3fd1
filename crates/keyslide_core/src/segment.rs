// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runs of consecutive selected keys and their neighbors.

use crate::curve::Curve;
use crate::error::Result;
use crate::host::AnimationHost;
use crate::key::{is_float_close, Key, KeyId};
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// A key that belongs to a segment.
///
/// Remembers the value it had before the first write so a slide can always
/// be measured from the pre-session value.
#[derive(Debug, Clone)]
pub struct SegmentKey {
    key: Key,
    segment: Option<usize>,
    original_value: OnceCell<f64>,
}

impl SegmentKey {
    /// Wrap a key owned by the segment at `segment` in its collection
    pub fn new(key: Key, segment: usize) -> Self {
        Self {
            key,
            segment: Some(segment),
            original_value: OnceCell::new(),
        }
    }

    /// Wrap a key that sits outside any segment (a neighbor)
    pub fn detached(key: Key) -> Self {
        Self {
            key,
            segment: None,
            original_value: OnceCell::new(),
        }
    }

    /// The underlying key
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Index of the owning segment within its collection
    pub fn segment(&self) -> Option<usize> {
        self.segment
    }

    /// Identity of this key
    pub fn id(&self) -> KeyId {
        self.key.id()
    }

    /// Index on the curve
    pub fn index(&self) -> usize {
        self.key.index()
    }

    /// Time of the key
    pub fn time(&self, host: &dyn AnimationHost) -> Result<f64> {
        self.key.time(host)
    }

    /// Current value of the key
    pub fn value(&self, host: &dyn AnimationHost) -> Result<f64> {
        self.key.value(host)
    }

    /// Value before this key was first written
    pub fn original_value(&self, host: &dyn AnimationHost) -> Result<f64> {
        if let Some(value) = self.original_value.get() {
            return Ok(*value);
        }
        let value = self.key.value(host)?;
        let _ = self.original_value.set(value);
        Ok(value)
    }

    /// Write a new value, capturing the original first
    pub fn set_value(&self, host: &mut dyn AnimationHost, value: f64) -> Result<()> {
        self.original_value(&*host)?;
        self.key.set_value(host, value)
    }

    /// Same curve, same index, and the same time and value within tolerance
    pub fn is_equivalent(&self, other: &Self, host: &dyn AnimationHost) -> Result<bool> {
        if self.key.curve() != other.key.curve() {
            tracing::debug!("Keys curve mismatch {} {}", self.key, other.key);
            return Ok(false);
        }
        if self.index() != other.index() {
            tracing::debug!("Keys index mismatch {} {}", self.key, other.key);
            return Ok(false);
        }
        if !is_float_close(self.time(host)?, other.time(host)?) {
            tracing::debug!("Keys time mismatch {} {}", self.key, other.key);
            return Ok(false);
        }
        if !is_float_close(self.value(host)?, other.value(host)?) {
            tracing::debug!("Keys value mismatch {} {}", self.key, other.key);
            return Ok(false);
        }
        Ok(true)
    }
}

/// Where a segment's neighbor comes from
#[derive(Debug)]
enum Neighbor {
    /// One of the segment's own keys (the run touches the curve end)
    Own(usize),
    /// The key just outside the run
    Outer(SegmentKey),
}

/// A run of consecutively indexed selected keys on one curve.
#[derive(Debug)]
pub struct CurveSegment {
    curve: Rc<Curve>,
    keys: Vec<SegmentKey>,
    left: Neighbor,
    right: Neighbor,
    timing: RefCell<Option<HashMap<u64, f64>>>,
}

impl CurveSegment {
    /// Build a segment from consecutive keys of `curve`.
    ///
    /// `segment` is the index this segment will have in its collection.
    /// Returns `None` when `keys` is empty.
    pub fn new(curve: Rc<Curve>, keys: Vec<Key>, segment: usize) -> Option<Self> {
        let first = keys.first()?;
        let last = keys.last()?;

        let left = if first.is_first() {
            Neighbor::Own(0)
        } else {
            first
                .index()
                .checked_sub(1)
                .and_then(|index| curve.key(index))
                .map_or(Neighbor::Own(0), |key| {
                    Neighbor::Outer(SegmentKey::detached(key.clone()))
                })
        };

        let last_own = keys.len() - 1;
        let right = if last.is_last() {
            Neighbor::Own(last_own)
        } else {
            curve
                .key(last.index() + 1)
                .map_or(Neighbor::Own(last_own), |key| {
                    Neighbor::Outer(SegmentKey::detached(key.clone()))
                })
        };

        let keys = keys
            .into_iter()
            .map(|key| SegmentKey::new(key, segment))
            .collect();

        Some(Self {
            curve,
            keys,
            left,
            right,
            timing: RefCell::new(None),
        })
    }

    /// Split the selected keys of a curve into segments.
    ///
    /// Segments are numbered from `first_segment` upward.
    pub fn from_curve(curve: &Rc<Curve>, first_segment: usize) -> Vec<Self> {
        let mut runs: Vec<Vec<Key>> = Vec::new();
        let mut run: Vec<Key> = Vec::new();
        let mut last_index: Option<usize> = None;

        for key in curve.selected_keys() {
            if last_index.is_some_and(|last| last + 1 != key.index()) {
                runs.push(std::mem::take(&mut run));
            }
            run.push(key.clone());
            last_index = Some(key.index());
        }
        if !run.is_empty() {
            runs.push(run);
        }

        runs.into_iter()
            .enumerate()
            .filter_map(|(offset, keys)| Self::new(Rc::clone(curve), keys, first_segment + offset))
            .collect()
    }

    /// The curve this segment lives on
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Name of the curve
    pub fn curve_name(&self) -> &str {
        self.curve.name()
    }

    /// Keys in the run
    pub fn keys(&self) -> &[SegmentKey] {
        &self.keys
    }

    /// First key of the run
    pub fn first_key(&self) -> &SegmentKey {
        &self.keys[0]
    }

    /// Last key of the run
    pub fn last_key(&self) -> &SegmentKey {
        &self.keys[self.keys.len() - 1]
    }

    /// Key to the left of the run, or the run's first key at the curve start
    pub fn neighbor_left(&self) -> &SegmentKey {
        self.neighbor(&self.left)
    }

    /// Key to the right of the run, or the run's last key at the curve end
    pub fn neighbor_right(&self) -> &SegmentKey {
        self.neighbor(&self.right)
    }

    fn neighbor<'a>(&'a self, neighbor: &'a Neighbor) -> &'a SegmentKey {
        match neighbor {
            Neighbor::Own(index) => &self.keys[*index],
            Neighbor::Outer(key) => key,
        }
    }

    /// Time between the two neighbors
    pub fn total_time_inclusive(&self, host: &dyn AnimationHost) -> Result<f64> {
        Ok(self.neighbor_right().time(host)? - self.neighbor_left().time(host)?)
    }

    /// Where `key` sits between the neighbors, 0 at the left and 1 at the right.
    ///
    /// A zero-length span yields 0.
    pub fn time_as_percent_inclusive(
        &self,
        host: &dyn AnimationHost,
        key: &SegmentKey,
    ) -> Result<f64> {
        let total = self.total_time_inclusive(host)?;
        if total == 0.0 {
            return Ok(0.0);
        }
        Ok((key.time(host)? - self.neighbor_left().time(host)?) / total)
    }

    /// Value of this segment's curve at `time`.
    ///
    /// Times of the run's own keys answer from the key cache, anything else
    /// asks the host evaluator once and remembers the answer.
    pub fn value_at_time(&self, host: &dyn AnimationHost, time: f64) -> Result<f64> {
        let mut guard = self.timing.borrow_mut();
        if guard.is_none() {
            let mut seeded = HashMap::with_capacity(self.keys.len());
            for key in &self.keys {
                seeded.insert(key.time(host)?.to_bits(), key.value(host)?);
            }
            *guard = Some(seeded);
        }
        let timing = guard.get_or_insert_with(HashMap::new);

        if let Some(value) = timing.get(&time.to_bits()) {
            return Ok(*value);
        }
        let value = host.evaluate(self.curve.name(), time)?;
        timing.insert(time.to_bits(), value);
        Ok(value)
    }

    /// Structural comparison used for change detection
    pub fn is_equivalent(&self, other: &Self, host: &dyn AnimationHost) -> Result<bool> {
        if self.curve_name() != other.curve_name() {
            return Ok(false);
        }

        if self.keys.len() != other.keys.len() {
            tracing::debug!("Segment num keys mismatch");
            return Ok(false);
        }

        if !self.neighbor_left().is_equivalent(other.neighbor_left(), host)?
            || !self.neighbor_right().is_equivalent(other.neighbor_right(), host)?
        {
            tracing::debug!("Segment neighbor equivalence mismatch");
            return Ok(false);
        }

        for (this_key, other_key) in self.keys.iter().zip(other.keys.iter()) {
            if !this_key.is_equivalent(other_key, host)? {
                tracing::debug!("Segment key equivalence mismatch");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

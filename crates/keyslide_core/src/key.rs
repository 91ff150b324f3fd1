// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keys on an animation curve.

use crate::error::Result;
use crate::host::AnimationHost;
use std::cell::{Cell, OnceCell};
use std::fmt;
use std::rc::Rc;

/// Relative tolerance used when comparing key data
pub const REL_TOLERANCE: f64 = 1e-9;

/// Compare two floats with a relative tolerance
pub fn is_float_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= (REL_TOLERANCE * a.abs().max(b.abs())).max(0.0)
}

/// Stable identity of a key: curve name plus index on that curve
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId {
    /// Curve name
    pub curve: Rc<str>,
    /// Index on the curve
    pub index: usize,
}

impl KeyId {
    /// Create a key id
    pub fn new(curve: impl Into<Rc<str>>, index: usize) -> Self {
        Self {
            curve: curve.into(),
            index,
        }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.curve, self.index)
    }
}

/// A single key on a curve.
///
/// Time and value are fetched from the host on first use and cached.
/// Writing the value goes straight to the host.
#[derive(Debug, Clone)]
pub struct Key {
    curve: Rc<str>,
    index: usize,
    curve_len: usize,
    selected: bool,
    time: OnceCell<f64>,
    value: Cell<Option<f64>>,
}

impl Key {
    /// Create a key handle. `curve_len` is the number of keys on the curve.
    pub fn new(curve: Rc<str>, index: usize, curve_len: usize, selected: bool) -> Self {
        Self {
            curve,
            index,
            curve_len,
            selected,
            time: OnceCell::new(),
            value: Cell::new(None),
        }
    }

    /// Name of the curve this key lives on
    pub fn curve(&self) -> &str {
        &self.curve
    }

    /// Shared handle to the curve name
    pub fn curve_name(&self) -> &Rc<str> {
        &self.curve
    }

    /// Index on the curve
    pub fn index(&self) -> usize {
        self.index
    }

    /// Identity of this key
    pub fn id(&self) -> KeyId {
        KeyId {
            curve: Rc::clone(&self.curve),
            index: self.index,
        }
    }

    /// Whether the key was selected at detection time
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Mark the key selected or not
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Time of the key
    pub fn time(&self, host: &dyn AnimationHost) -> Result<f64> {
        if let Some(time) = self.time.get() {
            return Ok(*time);
        }
        let time = host.key_time(&self.curve, self.index)?;
        let _ = self.time.set(time);
        Ok(time)
    }

    /// Value of the key
    pub fn value(&self, host: &dyn AnimationHost) -> Result<f64> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        let value = host.key_value(&self.curve, self.index)?;
        self.value.set(Some(value));
        Ok(value)
    }

    /// Write a new value to the host and cache it
    pub fn set_value(&self, host: &mut dyn AnimationHost, value: f64) -> Result<()> {
        host.set_key_value(&self.curve, self.index, value)?;
        self.value.set(Some(value));
        Ok(())
    }

    /// Cached value, if it has been read or written already
    pub fn cached_value(&self) -> Option<f64> {
        self.value.get()
    }

    /// First key on its curve?
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Last key on its curve?
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.curve_len
    }
}

// Same curve position, regardless of data.
impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.curve == other.curve && self.index == other.index
    }
}

impl Eq for Key {}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.curve, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;

    fn host() -> MemoryHost {
        let mut host = MemoryHost::new();
        host.add_curve("cube.tx", "cube_tx", &[(0.0, 0.0), (1.0, 5.0), (2.0, 7.0)]);
        host
    }

    #[test]
    fn test_lazy_fetch_and_cache() {
        let mut host = host();
        let key = Key::new("cube_tx".into(), 1, 3, true);
        assert_eq!(key.cached_value(), None);
        assert_eq!(key.value(&host).unwrap(), 5.0);
        assert_eq!(key.time(&host).unwrap(), 1.0);

        // Cached: the host changing underneath is not observed
        host.set_key_value("cube_tx", 1, 9.0).unwrap();
        assert_eq!(key.value(&host).unwrap(), 5.0);
    }

    #[test]
    fn test_set_value_writes_through() {
        let mut host = host();
        let key = Key::new("cube_tx".into(), 2, 3, false);
        key.set_value(&mut host, 3.5).unwrap();
        assert_eq!(host.value("cube_tx", 2), Some(3.5));
        assert_eq!(key.cached_value(), Some(3.5));
    }

    #[test]
    fn test_first_last() {
        let first = Key::new("c".into(), 0, 3, false);
        let last = Key::new("c".into(), 2, 3, false);
        assert!(first.is_first());
        assert!(!first.is_last());
        assert!(last.is_last());
        assert!(!last.is_first());
    }

    #[test]
    fn test_equality_is_position() {
        let host = host();
        let a = Key::new("cube_tx".into(), 1, 3, true);
        let b = Key::new("cube_tx".into(), 1, 3, false);
        a.value(&host).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Key::new("cube_tx".into(), 2, 3, true));
        assert_eq!(a.to_string(), "cube_tx:1");
    }

    #[test]
    fn test_missing_curve_is_host_error() {
        let host = host();
        let key = Key::new("nope".into(), 0, 1, true);
        assert!(matches!(
            key.value(&host),
            Err(crate::error::SlideError::Host(_))
        ));
    }

    #[test]
    fn test_float_close() {
        assert!(is_float_close(1.0, 1.0 + 1e-12));
        assert!(!is_float_close(1.0, 1.0001));
        assert!(is_float_close(0.0, 0.0));
    }
}

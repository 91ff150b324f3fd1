// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slide modes and the interpolation helpers they use.

use crate::error::SlideError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the selected keys slide toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideMode {
    /// Toward the left or right neighbor
    #[default]
    Blend,
    /// Move the whole run until its end key meets the neighbor
    Shift,
    /// Toward the mean of the two neighbors
    Average,
    /// Toward the attribute's default value
    Default,
    /// Toward the mean of every selected curve at the key's time
    Shrink,
    /// Toward the mean of all selected keys
    Level,
    /// Toward the straight line between the neighbors
    Linear,
    /// Toward a cubic ease-in (or ease-out for negative percents)
    Ease,
    /// Toward a cubic ease-in-out
    EaseInOut,
}

impl SlideMode {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blend => "blend",
            Self::Shift => "shift",
            Self::Average => "average",
            Self::Default => "default",
            Self::Shrink => "shrink",
            Self::Level => "level",
            Self::Linear => "linear",
            Self::Ease => "ease",
            Self::EaseInOut => "ease_in_out",
        }
    }

    /// All modes in menu order
    pub fn all() -> &'static [SlideMode] {
        &[
            Self::Blend,
            Self::Shift,
            Self::Average,
            Self::Default,
            Self::Shrink,
            Self::Level,
            Self::Linear,
            Self::Ease,
            Self::EaseInOut,
        ]
    }

    /// Whether the lerp weight is `|p|` rather than the signed percent
    pub fn uses_absolute_weight(&self) -> bool {
        matches!(self, Self::Blend | Self::Shift | Self::Ease)
    }

    /// Lerp weight for a normalized percent
    pub fn weight(&self, percent: f64) -> f64 {
        if self.uses_absolute_weight() {
            percent.abs()
        } else {
            percent
        }
    }
}

impl fmt::Display for SlideMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SlideMode {
    type Err = SlideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' ' | '/'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "blend" => Ok(Self::Blend),
            "shift" => Ok(Self::Shift),
            "average" => Ok(Self::Average),
            "default" => Ok(Self::Default),
            "shrink" => Ok(Self::Shrink),
            "level" => Ok(Self::Level),
            "linear" => Ok(Self::Linear),
            "ease" => Ok(Self::Ease),
            "easeinout" => Ok(Self::EaseInOut),
            _ => Err(SlideError::UnknownMode(s.to_string())),
        }
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation, exact at both ends
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a * (1.0 - t) + b * t
    }

    /// Cubic ease-in
    pub fn ease_in(t: f64) -> f64 {
        t * t * t
    }

    /// Cubic ease-out
    pub fn ease_out(t: f64) -> f64 {
        let inv = 1.0 - t;
        1.0 - inv * inv * inv
    }

    /// Cubic ease-in-out
    pub fn ease_in_out(t: f64) -> f64 {
        if t < 0.5 {
            4.0 * t * t * t
        } else {
            let u = -2.0 * t + 2.0;
            1.0 - u * u * u / 2.0
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! User preferences for the slide tool.
//!
//! Settings are a plain value owned by the controller. Loading and saving
//! happen only through [`SlideSettings::load`] and [`SlideSettings::save`].

use crate::error::{Result, SlideError};
use crate::mode::SlideMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "keyslide.ron";

/// Quick-pick percents offered by default
pub const DEFAULT_QUICK_PICKS: [f64; 7] = [-100.0, -50.0, -20.0, 0.0, 20.0, 50.0, 100.0];

/// Preferences for sliding keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideSettings {
    /// Settings format version
    pub version: u32,
    /// Active slide mode
    pub mode: SlideMode,
    /// Show the slider
    pub show_slider: bool,
    /// Show the quick-pick buttons
    pub show_quick_pick: bool,
    /// Percents on the quick-pick buttons
    pub quick_pick_nums: Vec<f64>,
    /// Slider lower bound in percent
    pub slider_min: f64,
    /// Slider upper bound in percent
    pub slider_max: f64,
    /// Quick picks slide absolutely rather than compounding
    pub absolute_quick_picks: bool,
    /// Fall back to keys on the current frame when nothing is selected
    pub find_current_keys: bool,
}

impl Default for SlideSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            mode: SlideMode::default(),
            show_slider: true,
            show_quick_pick: true,
            quick_pick_nums: DEFAULT_QUICK_PICKS.to_vec(),
            slider_min: -100.0,
            slider_max: 100.0,
            absolute_quick_picks: false,
            find_current_keys: true,
        }
    }
}

impl SlideSettings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SlideError::Settings(format!("{}: {}", path.display(), e)))?;
        let settings = Self::from_ron(&content)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let mut settings: SlideSettings =
            ron::from_str(content).map_err(|e| SlideError::Settings(e.to_string()))?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SlideError::Settings(format!(
                "Settings version {} is newer than supported version {}",
                settings.version, SETTINGS_FORMAT_VERSION
            )));
        }

        settings.validate();
        Ok(settings)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, config).map_err(|e| SlideError::Settings(e.to_string()))
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_ron()?;
        std::fs::write(path, content)
            .map_err(|e| SlideError::Settings(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Load settings, or start from defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Put every setting back to its default value
    pub fn factory_reset(&mut self) {
        *self = Self::default();
    }

    /// Repair values that would leave the tool unusable
    pub fn validate(&mut self) {
        if self.quick_pick_nums.is_empty() {
            tracing::warn!("Empty quick-pick list, restoring defaults");
            self.quick_pick_nums = DEFAULT_QUICK_PICKS.to_vec();
        }
        if !(self.slider_min < self.slider_max) {
            tracing::warn!(
                "Invalid slider range {}..{}, restoring defaults",
                self.slider_min,
                self.slider_max
            );
            self.slider_min = -100.0;
            self.slider_max = 100.0;
        }
    }
}

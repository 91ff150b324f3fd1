// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slide commands given on the command line.
//!
//! Each command is one word, optionally followed by `=` and an argument:
//! `mode=linear`, `set=50`, `rel=-20`, `pick=100`, `drag=10,40,80`,
//! `reset`, `detect`, `detect=force`, `undo`, `redo`.

use keyslide_core::{
    AnimationHost, HistoryError, MemoryHost, Reload, SlideError, SlideKeysController, SlideMode,
};
use std::fmt;
use std::str::FromStr;

/// Error type for command parsing and execution
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The command text did not parse
    #[error("Invalid command '{command}': {reason}")]
    Parse {
        /// Command text
        command: String,
        /// What was wrong
        reason: String,
    },

    /// The controller refused the command
    #[error(transparent)]
    Slide(#[from] SlideError),

    /// History error
    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// One step of a command-line run
#[derive(Debug, Clone, PartialEq)]
pub enum SlideCommand {
    /// Switch the active mode
    Mode(SlideMode),
    /// Absolute one-shot slide
    Set(f64),
    /// Relative one-shot slide
    Relative(f64),
    /// Quick pick using the settings default for absolute/relative
    Pick(f64),
    /// Interactive slide through each percent in turn
    Drag(Vec<f64>),
    /// Back to the values before any slide
    Reset,
    /// Reload the selection. `force` reloads even an unchanged selection
    /// or one held by an open session.
    Detect {
        /// Skip the unchanged-selection and open-session checks
        force: bool,
    },
    /// Undo the last edit group
    Undo,
    /// Redo the last undone group
    Redo,
}

impl SlideCommand {
    /// Get a description of this command
    pub fn description(&self) -> String {
        match self {
            Self::Mode(mode) => format!("Set mode to {mode}"),
            Self::Set(percent) => format!("Slide to {percent}%"),
            Self::Relative(percent) => format!("Slide by {percent}%"),
            Self::Pick(percent) => format!("Quick pick {percent}%"),
            Self::Drag(percents) => format!("Drag through {} steps", percents.len()),
            Self::Reset => "Reset slide".to_string(),
            Self::Detect { force: false } => "Detect keys".to_string(),
            Self::Detect { force: true } => "Force detect keys".to_string(),
            Self::Undo => "Undo".to_string(),
            Self::Redo => "Redo".to_string(),
        }
    }

    /// Run the command against a controller
    pub fn execute(
        &self,
        controller: &mut SlideKeysController<MemoryHost>,
    ) -> Result<(), CommandError> {
        match self {
            Self::Mode(mode) => controller.set_mode(*mode)?,
            Self::Set(percent) => controller.set_slide(*percent, true)?,
            Self::Relative(percent) => controller.set_slide(*percent, false)?,
            Self::Pick(percent) => controller.quick_pick(*percent, None)?,
            Self::Drag(percents) => {
                controller.begin_slide(None)?;
                let dragged = percents
                    .iter()
                    .try_for_each(|percent| controller.slide(*percent));
                controller.end_slide();
                dragged?;
            }
            Self::Reset => controller.reset_slide()?,
            Self::Detect { force } => match controller.detect_keys(*force)? {
                Reload::Reloaded => tracing::info!(
                    "Detected {} keys in {} segments",
                    controller.collection().key_count(),
                    controller.collection().len()
                ),
                Reload::Unchanged => tracing::info!("Selection unchanged"),
                Reload::Skipped => tracing::info!("Detection skipped while sliding"),
            },
            Self::Undo => {
                let group = controller.host_mut().undo()?;
                tracing::info!(
                    "Undid #{} {} ({} keys)",
                    group.id.value(),
                    group.description,
                    group.count()
                );
            }
            Self::Redo => {
                let group = controller.host_mut().redo()?;
                tracing::info!(
                    "Redid #{} {} ({} keys)",
                    group.id.value(),
                    group.description,
                    group.count()
                );
            }
        }
        tracing::debug!(
            "{} done, current time {}",
            self.description(),
            controller.host().current_time()
        );
        Ok(())
    }
}

fn parse_percent(command: &str, text: &str) -> Result<f64, CommandError> {
    let percent: f64 = text.trim().parse().map_err(|_| CommandError::Parse {
        command: command.to_string(),
        reason: format!("'{text}' is not a number"),
    })?;
    if !percent.is_finite() {
        return Err(CommandError::Parse {
            command: command.to_string(),
            reason: format!("'{text}' is not a finite percent"),
        });
    }
    Ok(percent)
}

fn require<'a>(command: &str, argument: Option<&'a str>) -> Result<&'a str, CommandError> {
    argument.ok_or_else(|| CommandError::Parse {
        command: command.to_string(),
        reason: "missing argument".to_string(),
    })
}

fn refuse(
    command: &str,
    argument: Option<&str>,
    parsed: SlideCommand,
) -> Result<SlideCommand, CommandError> {
    match argument {
        Some(_) => Err(CommandError::Parse {
            command: command.to_string(),
            reason: "takes no argument".to_string(),
        }),
        None => Ok(parsed),
    }
}

impl FromStr for SlideCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, argument) = match s.split_once('=') {
            Some((name, argument)) => (name, Some(argument)),
            None => (s, None),
        };

        match name.trim().to_lowercase().as_str() {
            "mode" => Ok(Self::Mode(require(s, argument)?.parse()?)),
            "set" => Ok(Self::Set(parse_percent(s, require(s, argument)?)?)),
            "rel" => Ok(Self::Relative(parse_percent(s, require(s, argument)?)?)),
            "pick" => Ok(Self::Pick(parse_percent(s, require(s, argument)?)?)),
            "drag" => {
                let percents = require(s, argument)?
                    .split(',')
                    .map(|text| parse_percent(s, text))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Drag(percents))
            }
            "reset" => refuse(s, argument, Self::Reset),
            "detect" => match argument.map(|a| a.trim().to_lowercase()).as_deref() {
                None => Ok(Self::Detect { force: false }),
                Some("force") => Ok(Self::Detect { force: true }),
                Some(_) => Err(CommandError::Parse {
                    command: s.to_string(),
                    reason: "only 'force' is accepted".to_string(),
                }),
            },
            "undo" => refuse(s, argument, Self::Undo),
            "redo" => refuse(s, argument, Self::Redo),
            _ => Err(CommandError::Parse {
                command: s.to_string(),
                reason: "unknown command".to_string(),
            }),
        }
    }
}

impl fmt::Display for SlideCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

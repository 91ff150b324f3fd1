// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line arguments and the run loop.

use crate::commands::{CommandError, SlideCommand};
use keyslide_core::settings::SETTINGS_FILE_NAME;
use keyslide_core::{MemoryHost, Scene, SlideError, SlideKeysController, SlideMode, SlideSettings};
use std::path::{Path, PathBuf};

/// Usage text
pub const USAGE: &str = "\
Usage: keyslide <scene.ron> [--settings <file>] [--dry-run] <command>...

Commands:
  mode=<name>        blend, shift, average, default, shrink, level, linear, ease, ease_in_out
  set=<percent>      absolute one-shot slide
  rel=<percent>      relative one-shot slide
  pick=<percent>     quick pick (absolute or relative per settings)
  drag=<p1>,<p2>...  begin, slide through each percent, end
  reset              restore the values from before any slide
  detect[=force]     reload the selection; force also reloads mid-drag or unchanged
  undo, redo         step through the edit history";

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Nothing to do
    #[error("Missing scene file")]
    MissingScene,

    /// A flag that needs a value was last
    #[error("Missing value for {0}")]
    MissingValue(String),

    /// Flag not recognized
    #[error("Unknown flag: {0}")]
    UnknownFlag(String),

    /// Scene file could not be read or written
    #[error("Scene file {path}: {source}")]
    Scene {
        /// Scene path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Command failed
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Settings or controller failure
    #[error(transparent)]
    Slide(#[from] SlideError),
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    /// Scene file to edit
    pub scene: PathBuf,
    /// Settings file
    pub settings: PathBuf,
    /// Leave the files untouched
    pub dry_run: bool,
    /// Commands in order
    pub commands: Vec<SlideCommand>,
}

impl CliArgs {
    /// Parse arguments (without the program name).
    ///
    /// The settings file defaults to `keyslide.ron` next to the scene.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, CliError> {
        let mut scene: Option<PathBuf> = None;
        let mut settings: Option<PathBuf> = None;
        let mut dry_run = false;
        let mut commands = Vec::new();

        let mut iter = args.iter().map(AsRef::<str>::as_ref);
        while let Some(arg) = iter.next() {
            match arg {
                "--settings" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| CliError::MissingValue(arg.to_string()))?;
                    settings = Some(PathBuf::from(value));
                }
                "--dry-run" => dry_run = true,
                flag if flag.starts_with("--") => {
                    return Err(CliError::UnknownFlag(flag.to_string()));
                }
                path if scene.is_none() => scene = Some(PathBuf::from(path)),
                command => commands.push(command.parse::<SlideCommand>()?),
            }
        }

        let scene = scene.ok_or(CliError::MissingScene)?;
        let settings = settings.unwrap_or_else(|| default_settings_path(&scene));
        Ok(Self {
            scene,
            settings,
            dry_run,
            commands,
        })
    }
}

fn default_settings_path(scene: &Path) -> PathBuf {
    scene
        .parent()
        .map_or_else(|| PathBuf::from(SETTINGS_FILE_NAME), |dir| dir.join(SETTINGS_FILE_NAME))
}

/// What a run did
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Commands executed
    pub commands: usize,
    /// Keys held at the end
    pub keys: usize,
    /// Mode at the end
    pub mode: SlideMode,
    /// Percent at the end
    pub percent: f64,
    /// Resulting scene
    pub scene: Scene,
}

/// Load the scene and settings, run every command, write the results back.
///
/// A dry run writes nothing.
pub fn run(args: &CliArgs) -> Result<RunReport, CliError> {
    let scene = Scene::load(&args.scene).map_err(|source| CliError::Scene {
        path: args.scene.clone(),
        source,
    })?;
    tracing::info!(
        "Loaded {} curves from {}",
        scene.curves.len(),
        args.scene.display()
    );

    let settings = SlideSettings::load_or_default(&args.settings)?;
    let mut controller = SlideKeysController::new(MemoryHost::from_scene(scene), settings);
    controller.subscribe(|message| {
        tracing::debug!(
            "{} ({}, {}%)",
            message.event.name(),
            message.mode,
            message.percent
        );
    });

    for command in &args.commands {
        tracing::info!("{}", command);
        command.execute(&mut controller)?;
    }

    let report = RunReport {
        commands: args.commands.len(),
        keys: controller.collection().key_count(),
        mode: controller.mode(),
        percent: controller.percent(),
        scene: controller.host().scene().clone(),
    };

    if args.dry_run {
        tracing::info!("Dry run, nothing written");
    } else {
        report
            .scene
            .save(&args.scene)
            .map_err(|source| CliError::Scene {
                path: args.scene.clone(),
                source,
            })?;
        controller.settings().save(&args.settings)?;
        tracing::info!("Saved {}", args.scene.display());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"(
        current_time: 2.0,
        curves: {
            "cube_tx": (
                attribute: "cube.tx",
                keys: [
                    (time: 0.0, value: 0.0),
                    (time: 1.0, value: 1.0, selected: true),
                    (time: 2.0, value: 2.0, selected: true),
                    (time: 3.0, value: 3.0, selected: true),
                    (time: 4.0, value: 4.0),
                ],
            ),
        },
        attributes: {
            "cube.tx": (default: 0.0),
        },
    )"#;

    fn workspace(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("keyslide-cli-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let scene = dir.join("scene.ron");
        std::fs::write(&scene, SCENE).unwrap();
        scene
    }

    #[test]
    fn test_parse_args() {
        let args = CliArgs::parse(&["shot.ron", "--dry-run", "mode=level", "set=50"]).unwrap();
        assert_eq!(args.scene, PathBuf::from("shot.ron"));
        assert_eq!(args.settings, PathBuf::from(SETTINGS_FILE_NAME));
        assert!(args.dry_run);
        assert_eq!(
            args.commands,
            vec![SlideCommand::Mode(SlideMode::Level), SlideCommand::Set(50.0)]
        );

        let args = CliArgs::parse(&["dir/shot.ron", "--settings", "prefs.ron"]).unwrap();
        assert_eq!(args.settings, PathBuf::from("prefs.ron"));
        assert!(args.commands.is_empty());
    }

    #[test]
    fn test_parse_args_errors() {
        let empty: [&str; 0] = [];
        assert!(matches!(CliArgs::parse(&empty), Err(CliError::MissingScene)));
        assert!(matches!(
            CliArgs::parse(&["a.ron", "--settings"]),
            Err(CliError::MissingValue(_))
        ));
        assert!(matches!(
            CliArgs::parse(&["a.ron", "--loud"]),
            Err(CliError::UnknownFlag(_))
        ));
        assert!(matches!(
            CliArgs::parse(&["a.ron", "spin=3"]),
            Err(CliError::Command(_))
        ));
    }

    #[test]
    fn test_run_writes_scene_and_settings() {
        let scene = workspace("write");
        let path = scene.to_string_lossy().into_owned();
        let args = CliArgs::parse(&[path.as_str(), "mode=average", "set=100"]).unwrap();

        let report = run(&args).unwrap();
        assert_eq!(report.commands, 2);
        assert_eq!(report.keys, 3);
        assert_eq!(report.percent, 100.0);

        let saved = Scene::load(&scene).unwrap();
        let values: Vec<f64> = saved.curves["cube_tx"].keys.iter().map(|k| k.value).collect();
        assert_eq!(values, vec![0.0, 2.0, 2.0, 2.0, 4.0]);
        assert_eq!(
            SlideSettings::load(&args.settings).unwrap().mode,
            SlideMode::Average
        );

        std::fs::remove_dir_all(scene.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let scene = workspace("dry");
        let path = scene.to_string_lossy().into_owned();
        let args = CliArgs::parse(&[path.as_str(), "--dry-run", "set=100"]).unwrap();

        let report = run(&args).unwrap();
        assert_eq!(report.scene.curves["cube_tx"].keys[1].value, 4.0);
        assert_eq!(std::fs::read_to_string(&scene).unwrap(), SCENE);
        assert!(!args.settings.exists());

        std::fs::remove_dir_all(scene.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_missing_scene_file() {
        let args = CliArgs::parse(&["/nonexistent/keyslide/scene.ron"]).unwrap();
        assert!(matches!(run(&args), Err(CliError::Scene { .. })));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! `keyslide` - slide selected animation keys in a scene file
//!
//! Loads a RON scene into the in-memory host, runs each command against a
//! slide controller and writes the scene back.
//!
//! ## Usage
//!
//! ```text
//! keyslide shot.ron mode=linear set=50
//! keyslide shot.ron --dry-run drag=10,40,80 undo
//! ```
//!
//! Log output is controlled with `RUST_LOG`.

mod cli;
mod commands;

use cli::{CliArgs, USAGE};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("keyslide_app=info,keyslide_core=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting keyslide v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{USAGE}");
        return;
    }

    let args = match CliArgs::parse(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    match cli::run(&args) {
        Ok(report) => {
            tracing::info!(
                "{} commands, {} keys held, mode {} at {}%",
                report.commands,
                report.keys,
                report.mode,
                report.percent
            );
            if args.dry_run {
                match report.scene.to_ron() {
                    Ok(ron) => println!("{ron}"),
                    Err(e) => tracing::error!("Cannot print scene: {e}"),
                }
            }
        }
        Err(e) => {
            tracing::error!("keyslide failed: {e}");
            std::process::exit(1);
        }
    }
}

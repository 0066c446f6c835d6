//! # OpenHouse
//!
//! Headless entry point: loads `openhouse.toml` (or the path given as the
//! first argument), runs the configured bout and prints a JSON summary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::sync::Arc;

use anyhow::{Context, Result};
use openhouse_combat::ArchetypeTable;
use openhouse_engine::{run_bout, BoutScript, OpenHouseConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => OpenHouseConfig::load_from(path),
        None => OpenHouseConfig::load(),
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(config.log_filter.parse()?))
        .init();

    info!("OpenHouse starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let table = match &config.tuning_path {
        Some(path) => ArchetypeTable::load(path)
            .with_context(|| format!("failed to load tuning table {}", path.display()))?,
        None => ArchetypeTable::builtin(),
    };
    let script = match &config.script_path {
        Some(path) => BoutScript::load(path)
            .with_context(|| format!("failed to load bout script {}", path.display()))?,
        None => BoutScript::default(),
    };

    let summary = run_bout(Arc::new(table), &config, &script)?;
    if config.emit_summary {
        println!("{}", summary.to_json()?);
    }

    info!("OpenHouse shutdown complete");
    Ok(())
}

//! # Snowdrift
//!
//! Runs a headless snowball session from `snowdrift.toml` (or the path given
//! as the first argument) and logs every impact.
//!
//! Set `SNOWDRIFT_LOG_JSON=1` for JSON log lines.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::{Context, Result};
use snowdrift_engine::{EngineConfig, HeadlessDriver};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("snowdrift=info".parse()?);
    if std::env::var_os("SNOWDRIFT_LOG_JSON").is_some() {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    info!("Snowdrift starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args_os().nth(1) {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };

    if std::env::var_os("SNOWDRIFT_WRITE_CONFIG").is_some() {
        config.save().context("writing default config")?;
    }

    let report = HeadlessDriver::new(&config).run();
    info!(
        launched = report.launched,
        finished = report.finished(),
        bus_delivered = report.bus_delivered,
        "Snowdrift shutdown complete"
    );
    Ok(())
}

//! Tracing subscriber setup
//!
//! Logs always go to stderr so stdout stays reserved for protocol traffic.

use crew_core::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Level precedence: `RUST_LOG`, then `--verbose`, then the configured level
pub fn filter(config: &LoggingConfig, verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if verbose { "debug" } else { config.level.as_str() };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init(config: &LoggingConfig, verbose: bool) -> anyhow::Result<()> {
    let filter = filter(config, verbose);

    let (pretty, json) = match config.format {
        LogFormat::Pretty => (Some(fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stderr))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .try_init()?;
    Ok(())
}

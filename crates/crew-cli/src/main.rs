//! Crew CLI application
//!
//! Runs a team of locally configured agents, either behind an MCP server
//! that a CLI assistant connects to over stdio, or directly from the
//! terminal.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/crew-cli
//! ```
//!
//! # Usage
//!
//! ```bash
//! crew --config crew.yaml serve
//! crew run --agents reviewer,tester --mode sequential "Check the last commit"
//! ```

mod args;
mod commands;
mod logging;
mod router;
mod signal_handler;

use anyhow::Context;
use args::Cli;
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let outcome = runtime.block_on(router::route(cli));

    // A blocked stdin read cannot be interrupted, so don't wait on it
    runtime.shutdown_timeout(Duration::from_millis(100));
    outcome
}

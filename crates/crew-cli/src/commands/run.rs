//! `crew run`

use crate::signal_handler::SignalHandler;
use anyhow::Context;
use crew_core::config::Config;
use crew_core::runner::{ExecutionMode, OrchestratedTask};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Run an orchestrated batch and print its summary.
///
/// Exits non-zero unless every agent succeeded.
pub async fn run_agents(
    config: &Config,
    agents: Vec<String>,
    mode: ExecutionMode,
    name: String,
    input: String,
) -> anyhow::Result<ExitCode> {
    let agents: Vec<String> = agents
        .iter()
        .map(|agent| agent.trim())
        .filter(|agent| !agent.is_empty())
        .map(str::to_string)
        .collect();
    if agents.is_empty() {
        anyhow::bail!("no agents given");
    }

    let runner = super::build_runner(config)?;
    let cancel = CancellationToken::new();
    let _signals =
        SignalHandler::start(cancel.clone()).context("failed to install signal handlers")?;

    let task = OrchestratedTask {
        name,
        agents,
        input,
        mode,
    };
    let result = runner.execute_orchestrated(task, &cancel).await;
    info!(success = result.all_successful(), "run finished");

    print!("{}", result.summary());
    Ok(if result.all_successful() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

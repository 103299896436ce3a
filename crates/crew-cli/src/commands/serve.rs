//! `crew serve`

use crate::signal_handler::SignalHandler;
use anyhow::Context;
use crew_core::config::Config;
use crew_mcp::{McpServer, serve_stdio};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Serve MCP over stdio until the client disconnects or a signal arrives
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let runner = super::build_runner(config)?;
    info!(
        workspace = %config.workspace.display(),
        agents = runner.list_agents().len(),
        "starting MCP server"
    );

    let server = McpServer::new(
        runner,
        config.mcp.server_name.clone(),
        config.mcp.server_version.clone(),
    );

    let cancel = CancellationToken::new();
    let _signals =
        SignalHandler::start(cancel.clone()).context("failed to install signal handlers")?;

    serve_stdio(&server, config.mcp.max_message_bytes, &cancel)
        .await
        .context("MCP session failed")?;

    info!("MCP server stopped");
    Ok(())
}

//! Command routing

use crate::args::{Cli, Commands};
use crate::{commands, logging};
use std::process::ExitCode;

/// Load configuration, set up logging, and dispatch the subcommand
pub async fn route(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Commands::Tools = cli.command {
        commands::list_tools();
        return Ok(ExitCode::SUCCESS);
    }

    let config = commands::load_config(cli.config.as_deref(), cli.workspace)?;
    logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Serve => commands::serve(&config).await?,
        Commands::Agents => commands::list_agents(&config)?,
        Commands::Validate => commands::validate(&config)?,
        Commands::Tools => commands::list_tools(),
        Commands::Run {
            agents,
            mode,
            name,
            input,
        } => return commands::run_agents(&config, agents, mode, name, input).await,
    }
    Ok(ExitCode::SUCCESS)
}

//! Subcommand implementations

mod agents;
mod run;
mod serve;
mod tools;
mod validate;

pub use agents::list_agents;
pub use run::run_agents;
pub use serve::serve;
pub use tools::list_tools;
pub use validate::validate;

use crate::args::DEFAULT_CONFIG_FILE;
use anyhow::Context;
use crew_core::config::{Config, load_from_file};
use crew_core::llm::{LlmClient, OpenAiClient};
use crew_core::runner::Runner;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Load, override and validate the configuration.
///
/// An explicit `--config` must exist; the default file is optional.
pub fn load_config(path: Option<&Path>, workspace: Option<PathBuf>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => load_from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                load_from_file(default).with_context(|| {
                    format!("failed to load configuration from {}", DEFAULT_CONFIG_FILE)
                })?
            } else {
                Config::default()
            }
        }
    };

    if let Some(workspace) = workspace {
        config.workspace = workspace;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Build the runner and its LLM client from a validated configuration
pub fn build_runner(config: &Config) -> anyhow::Result<Arc<Runner>> {
    let client = OpenAiClient::from_config(&config.llm).context("failed to create LLM client")?;
    debug!(model = %client.model(), provider = ?config.llm.provider, "LLM client ready");
    let llm: Arc<dyn LlmClient> = Arc::new(client);

    let runner = Runner::new(config, llm).context("failed to start runner")?;
    Ok(Arc::new(runner))
}

//! `crew validate`

use crew_core::config::Config;

/// Configuration is already validated on load; this also resolves every
/// agent's instructions and tools.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    let runner = super::build_runner(config)?;
    println!("Configuration is valid.");
    println!("  workspace: {}", config.workspace.display());
    println!("  agents:    {}", runner.list_agents().len());
    println!("  model:     {} ({:?})", config.llm.model, config.llm.provider);
    Ok(())
}

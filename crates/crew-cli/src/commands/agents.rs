//! `crew agents`

use crew_core::config::Config;

/// Print every configured agent with its tools
pub fn list_agents(config: &Config) -> anyhow::Result<()> {
    let runner = super::build_runner(config)?;
    let infos = runner.list_agent_info();
    if infos.is_empty() {
        println!("No agents configured.");
        return Ok(());
    }

    for info in infos {
        let tools = config
            .get_agent_config(&info.name)
            .map(|agent| agent.tools.join(", "))
            .unwrap_or_default();
        println!("{}", info.name);
        if !info.description.is_empty() {
            println!("  {}", info.description);
        }
        if !tools.is_empty() {
            println!("  tools: {}", tools);
        }
    }
    Ok(())
}

//! CLI argument definitions using clap
//!
//! - crew serve                          # MCP server over stdio
//! - crew agents                         # List configured agents
//! - crew run --agents a,b "task"        # Run agents from the terminal
//! - crew validate / crew tools          # Utility commands

use clap::{Parser, Subcommand};
use crew_core::runner::ExecutionMode;
use std::path::PathBuf;

/// Configuration file used when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "crew.yaml";

#[derive(Parser)]
#[command(name = "crew")]
#[command(about = "Crew - local multi-agent runtime exposed over MCP")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (YAML, TOML or JSON)
    #[arg(long, short, global = true, env = "CREW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Workspace root, overriding the configuration
    #[arg(long, short, global = true)]
    pub workspace: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve agents and workspace tools over MCP on stdin/stdout
    Serve,

    /// List configured agents and their descriptions
    Agents,

    /// Check the configuration and agent instructions for errors
    Validate,

    /// List the tools available to agents and to MCP clients
    Tools,

    /// Run one or more agents on an input and print a summary
    Run {
        /// Comma-separated agent names, in execution order
        #[arg(long, short, required = true, value_delimiter = ',')]
        agents: Vec<String>,

        /// parallel or sequential
        #[arg(long, short, default_value = "parallel")]
        mode: ExecutionMode,

        /// Task name shown in logs
        #[arg(long, default_value = "cli")]
        name: String,

        /// Input handed to every agent
        input: String,
    },
}

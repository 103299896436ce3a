//! File-based configuration loading

use super::Config;
use crate::error::{CrewError, CrewResult};
use std::fs;
use std::path::Path;

/// Serialization format of a configuration document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> CrewResult<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            other => Err(CrewError::config(format!(
                "unsupported config format {:?} (use .json, .toml, .yaml, or .yml)",
                other.unwrap_or("")
            ))),
        }
    }
}

/// Load configuration from a file.
///
/// The document is parsed only; call [`Config::validate`] once any CLI
/// overrides have been applied.
pub fn load_from_file(path: &Path) -> CrewResult<Config> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|e| {
        CrewError::config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;
    load_from_str(&content, format)
}

/// Parse configuration from an in-memory document
pub fn load_from_str(content: &str, format: ConfigFormat) -> CrewResult<Config> {
    match format {
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| CrewError::config(format!("Failed to parse JSON config: {}", e))),
        ConfigFormat::Toml => toml::from_str(content)
            .map_err(|e| CrewError::config(format!("Failed to parse TOML config: {}", e))),
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| CrewError::config(format!("Failed to parse YAML config: {}", e))),
    }
}

//! Agent configuration loading and types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the endpoint agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the collector
    #[serde(default = "default_collector_url")]
    pub collector_url: String,
    /// Stable identifier this endpoint reports under
    #[serde(default = "default_device_id")]
    pub device_id: String,
    /// Seconds between reporting cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Per-command probe timeout in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Where the last observed snapshot is persisted
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            collector_url: default_collector_url(),
            device_id: default_device_id(),
            interval_secs: default_interval_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            state_path: default_state_path(),
        }
    }
}

fn default_collector_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_device_id() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown-device".to_string())
}

fn default_interval_secs() -> u64 {
    // 15 minute reporting period
    900
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("postwatch/state.json"))
        .unwrap_or_else(|| PathBuf::from("postwatch-state.json"))
}

impl AgentConfig {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &PathBuf) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AgentConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from default paths or use defaults
    pub fn load_default() -> eyre::Result<Self> {
        // Check environment variable
        if let Ok(path) = std::env::var("POSTWATCH_AGENT_CONFIG") {
            return Self::load(&PathBuf::from(path));
        }

        // Try common paths
        let paths = [
            PathBuf::from("postwatch-agent.toml"),
            PathBuf::from("/etc/postwatch/agent.toml"),
            dirs::config_dir()
                .map(|p| p.join("postwatch/agent.toml"))
                .unwrap_or_default(),
        ];

        for path in paths {
            if path.exists() {
                return Self::load(&path);
            }
        }

        // Return default config if no file found
        tracing::warn!("no config file found, using defaults");
        Ok(AgentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_fills_every_default() {
        let config: AgentConfig = toml::from_str("").unwrap();
        assert_eq!(config.collector_url, "http://127.0.0.1:5000");
        assert_eq!(config.interval_secs, 900);
        assert_eq!(config.probe_timeout_secs, 5);
        assert!(!config.device_id.is_empty());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config: AgentConfig = toml::from_str(
            "collector_url = \"http://collector.lan:9000\"\ndevice_id = \"laptop-7\"\ninterval_secs = 60\n",
        )
        .unwrap();
        assert_eq!(config.collector_url, "http://collector.lan:9000");
        assert_eq!(config.device_id, "laptop-7");
        assert_eq!(config.interval_secs, 60);
    }
}

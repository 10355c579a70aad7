use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{HunterError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Booking page to watch.
    pub target_url: String,
    /// Minutes between scheduled scans.
    pub scan_interval_minutes: u64,
    /// Hard timeout on the page fetch; the only latency bound of a scan.
    pub request_timeout_seconds: u64,
    /// Client identity sent with every fetch.
    pub user_agent: String,
    /// Persisted scan snapshot + notification state.
    pub state_file: String,
    /// Persisted subscriber list.
    pub subscribers_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: "https://www.polferrer.com".to_string(),
            scan_interval_minutes: 10,
            request_timeout_seconds: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            state_file: "data/state.json".to_string(),
            subscribers_file: "data/subscribers.json".to_string(),
        }
    }
}

impl Config {
    /// Reads `config.toml` when present; a missing file means defaults.
    pub fn load() -> Result<Self> {
        let config_path = Path::new("config.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            HunterError::Config(format!("failed to read '{}': {e}", config_path.display()))
        })?;
        toml::from_str(&config_content)
            .map_err(|e| HunterError::Config(format!("invalid config.toml: {e}")))
    }

    /// The bot token comes from the environment, never from the config file.
    pub fn bot_token() -> Result<String> {
        std::env::var("BOT_TOKEN")
            .map_err(|_| HunterError::Config("BOT_TOKEN is not set".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str("scan_interval_minutes = 5").unwrap();
        assert_eq!(config.scan_interval_minutes, 5);
        assert_eq!(config.target_url, Config::default().target_url);
        assert_eq!(config.request_timeout_seconds, 15);
    }
}

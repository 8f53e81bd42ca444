//! Configuration for the room climate agent.

use crate::core::InferenceThresholds;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Sensor channel to fetch samples from
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Notifier credentials and recipients
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Tick cadences and daily greeting time
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Hysteresis threshold tables for the window inference
    #[serde(default)]
    pub thresholds: InferenceThresholds,
}

/// ThingSpeak-compatible channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Base URL of the feeds API
    pub base_url: String,
    /// Channel identifier
    pub channel_id: String,
    /// Read API key
    pub read_key: String,
    /// Number of most recent samples to fetch per tick
    pub fetch_count: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.thingspeak.com".to_string(),
            channel_id: String::new(),
            read_key: String::new(),
            fetch_count: 100,
        }
    }
}

/// Telegram bot settings and the recipient allow-list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Base URL of the bot API
    pub api_url: String,
    /// Bot token
    pub bot_token: String,
    /// Chat that receives alerts and greetings
    pub owner_chat_id: i64,
    /// Optional second recipient for window requests
    pub roommate_chat_id: Option<i64>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            owner_chat_id: 0,
            roommate_chat_id: None,
        }
    }
}

/// When the pipeline runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between window checks
    pub check_interval_secs: u64,
    /// Hour of the daily greeting (24h, local to `timezone`)
    pub daily_hour: u32,
    /// Minute of the daily greeting
    pub daily_minute: u32,
    /// IANA timezone the greeting time is interpreted in
    pub timezone: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 300, // one state transition per 5 minutes
            daily_hour: 8,
            daily_minute: 0,
            timezone: "Europe/London".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roomsense-agent")
            .join("config.json")
    }

    /// Whether the channel section is filled in enough to fetch.
    pub fn channel_configured(&self) -> bool {
        !self.channel.channel_id.is_empty()
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schedule.check_interval_secs, 300);
        assert_eq!(config.schedule.daily_hour, 8);
        assert_eq!(config.channel.fetch_count, 100);
        assert!(!config.channel_configured());
        assert_eq!(config.thresholds.convergence.min_gap_temp, 3.0);
        assert_eq!(config.thresholds.divergence.min_gap_temp, 10.0);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{"channel": {"base_url": "http://localhost:9000",
                        "channel_id": "42", "read_key": "k", "fetch_count": 25}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.channel_configured());
        assert_eq!(config.channel.fetch_count, 25);
        assert_eq!(config.schedule.daily_hour, 8);
        assert_eq!(config.thresholds.convergence.min_change_humid, 3.0);
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.thresholds.divergence.min_gap_humid,
            config.thresholds.divergence.min_gap_humid
        );
    }
}

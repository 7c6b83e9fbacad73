use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::throttle::DEFAULT_MIN_INTERVAL_MS;
use crate::window::DEFAULT_WINDOW_MS;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Missing required configuration: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodlightConfig {
    pub window: WindowConfig,
    pub throttle: ThrottleConfig,
    pub hume: HumeConfig,
    pub hue: HueConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Retention horizon for emotion snapshots
    pub window_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Minimum spacing between light updates
    pub min_interval_ms: u64,
}

/// Emotion streaming service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumeConfig {
    /// WebSocket endpoint
    pub endpoint: String,
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_id: Option<String>,
}

/// Lighting bridge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HueConfig {
    pub bridge_ip: String,
    pub app_key: String,
    pub light_ids: Vec<String>,
    /// Overrides `https://{bridge_ip}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl HueConfig {
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", self.bridge_ip))
    }

    /// Check that the bridge can be addressed and authenticated against.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        let required = [
            ("HUE_BRIDGE_IP", self.bridge_ip.is_empty() && self.base_url.is_none()),
            ("HUE_APP_KEY", self.app_key.is_empty()),
            ("HUE_LIGHT_IDS", self.light_ids.is_empty()),
        ];
        first_missing(&required)
    }
}

fn first_missing(required: &[(&'static str, bool)]) -> Result<(), ConfigError> {
    match required.iter().find(|(_, missing)| *missing) {
        Some((field, _)) => Err(ConfigError::MissingField(*field)),
        None => Ok(()),
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
        }
    }
}

impl MoodlightConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: MoodlightConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file, then apply environment overrides
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. User config file (if exists)
    /// 3. Default config file
    /// 4. Built-in defaults (lowest priority)
    pub fn load_layered(
        default_path: Option<&Path>,
        user_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config = MoodlightConfig::default();

        if let Some(path) = default_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        // A user file replaces the default file wholesale.
        if let Some(path) = user_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Credentials use the service variable names (`HUME_*`, `HUE_*`);
    /// tuning knobs are prefixed with `MOODLIGHT_`.
    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("HUME_API_KEY") {
            self.hume.api_key = val;
        }
        if let Some(val) = lookup("HUME_ENDPOINT") {
            self.hume.endpoint = val;
        }
        if let Some(val) = lookup("HUME_CONFIG_ID") {
            self.hume.config_id = Some(val).filter(|v| !v.is_empty());
        }

        if let Some(val) = lookup("HUE_BRIDGE_IP") {
            self.hue.bridge_ip = val;
        }
        if let Some(val) = lookup("HUE_APP_KEY") {
            self.hue.app_key = val;
        }
        if let Some(val) = lookup("HUE_LIGHT_IDS") {
            self.hue.light_ids = val
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(val) = lookup("MOODLIGHT_WINDOW_MS") {
            self.window.window_ms = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid MOODLIGHT_WINDOW_MS".to_string())
            })?;
        }
        if let Some(val) = lookup("MOODLIGHT_MIN_INTERVAL_MS") {
            self.throttle.min_interval_ms = val.parse().map_err(|_| {
                ConfigError::Validation("Invalid MOODLIGHT_MIN_INTERVAL_MS".to_string())
            })?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.window_ms == 0 {
            return Err(ConfigError::Validation(
                "window.window_ms must be > 0".to_string(),
            ));
        }
        if self.window.window_ms > 600_000 {
            return Err(ConfigError::Validation(
                "window.window_ms must be <= 600000".to_string(),
            ));
        }
        if self.throttle.min_interval_ms > 60_000 {
            return Err(ConfigError::Validation(
                "throttle.min_interval_ms must be <= 60000".to_string(),
            ));
        }
        if self.hue.light_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "hue.light_ids must not contain empty ids".to_string(),
            ));
        }
        Ok(())
    }

    /// Check that everything needed to talk to both services is present.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        first_missing(&[
            ("HUME_API_KEY", self.hume.api_key.is_empty()),
            ("HUME_ENDPOINT", self.hume.endpoint.is_empty()),
        ])?;
        self.hue.require_credentials()
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `harmonyd.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use harmony_adapter_mqtt::MqttConfig;
use harmony_app::registry::PollIntervals;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// MQTT broker settings.
    pub mqtt: MqttConfig,
    /// Bridge behaviour: namespace and poll cadences.
    pub bridge: BridgeConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Static hub list; bypasses discovery entirely.
    pub hubs: Vec<HubEntry>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Bridge behaviour configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Namespace prefixed to every bus topic.
    pub topic_namespace: String,
    /// How often the activity catalog is refreshed, in milliseconds.
    pub activity_poll_interval_ms: u64,
    /// How often hub state is refreshed, in milliseconds.
    pub state_poll_interval_ms: u64,
}

impl BridgeConfig {
    /// Poll cadences as [`PollIntervals`].
    #[must_use]
    pub fn poll_intervals(&self) -> PollIntervals {
        PollIntervals {
            activities: Duration::from_millis(self.activity_poll_interval_ms),
            state: Duration::from_millis(self.state_poll_interval_ms),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// One statically configured hub.
#[derive(Debug, Deserialize)]
pub struct HubEntry {
    /// Human-readable hub name; the slug is derived from it.
    pub name: String,
}

impl Config {
    /// Load configuration from `harmonyd.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("harmonyd.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HARMONYD_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("HARMONYD_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("HARMONYD_MQTT_HOST") {
            self.mqtt.host = val;
        }
        if let Ok(val) = std::env::var("HARMONYD_MQTT_PORT") {
            if let Ok(port) = val.parse() {
                self.mqtt.port = port;
            }
        }
        if let Ok(val) = std::env::var("HARMONYD_NAMESPACE") {
            self.bridge.topic_namespace = val;
        }
        if let Ok(val) = std::env::var("HARMONYD_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.bridge.activity_poll_interval_ms == 0 || self.bridge.state_poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "poll intervals must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Names of the hubs to register at startup.
    ///
    /// With no static list configured, a single demo hub is registered so
    /// the bridge is observable end-to-end out of the box.
    #[must_use]
    pub fn hub_names(&self) -> Vec<String> {
        if self.hubs.is_empty() {
            vec!["Living Room".to_string()]
        } else {
            self.hubs.iter().map(|hub| hub.name.clone()).collect()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8282,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            topic_namespace: "harmony-api".to_string(),
            activity_poll_interval_ms: 60_000,
            state_poll_interval_ms: 5_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "harmonyd=info,harmony=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

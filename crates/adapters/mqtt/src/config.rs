//! MQTT broker configuration.

use serde::Deserialize;

/// Connection settings for the MQTT broker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker hostname or IP address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Optional broker username.
    pub username: Option<String>,
    /// Optional broker password.
    pub password: Option<String>,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "harmony-api".to_string(),
            username: None,
            password: None,
            keep_alive_secs: 30,
        }
    }
}

//! MQTT adapter error types.

use harmony_domain::error::HarmonyError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client rejected an operation.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),
}

impl From<MqttError> for HarmonyError {
    fn from(err: MqttError) -> Self {
        Self::bus(err)
    }
}

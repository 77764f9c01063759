//! # harmony-adapter-mqtt
//!
//! MQTT adapter built on [rumqttc](https://docs.rs/rumqttc).
//!
//! ## Responsibilities
//! - Implement the [`MessagePublisher`] port with retained QoS 1 publishes
//! - Run the **command bridge**: subscribe to the wildcard inbound command
//!   pattern and dispatch `on`/`off` payloads into the command service
//! - Re-subscribe on every broker (re)connection, so the wildcard
//!   subscription survives rumqttc's internal reconnects
//!
//! ## Dependency rule
//! Depends on `harmony-app` (port traits and services) and `harmony-domain`.
//! Never leaks rumqttc types into the core.

mod config;
mod error;
mod topic;

pub use config::MqttConfig;
pub use error::MqttError;
pub use topic::parse_command_topic;

use std::future::Future;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};

use harmony_app::ports::{HubClient, MessagePublisher};
use harmony_app::services::HubCommandService;
use harmony_domain::error::HarmonyError;
use harmony_domain::slug::Slug;

/// Build the broker connection from configuration.
///
/// Returns the shared client handle and the event loop that must be driven
/// (via [`CommandBridge::run`]) for any traffic to flow.
#[must_use]
pub fn connect(config: &MqttConfig) -> (AsyncClient, EventLoop) {
    let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
    options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        options.set_credentials(username, password);
    }
    AsyncClient::new(options, 64)
}

/// [`MessagePublisher`] backed by a rumqttc client.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    /// Wrap a connected client handle.
    #[must_use]
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

impl MessagePublisher for MqttPublisher {
    fn publish(
        &self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> impl Future<Output = Result<(), HarmonyError>> + Send {
        let client = self.client.clone();
        let topic = topic.to_string();
        let payload = payload.to_string();
        async move {
            client
                .publish(topic, QoS::AtLeastOnce, retain, payload)
                .await
                .map_err(|err| MqttError::Client(err).into())
        }
    }
}

/// A parsed inbound command.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    On,
    Off,
}

/// Parse topic and payload into a dispatchable command.
///
/// Payload matching is case-sensitive; anything other than `on`/`off` (or a
/// non-matching topic) is ignored.
fn parse_command(namespace: &str, topic: &str, payload: &[u8]) -> Option<(Slug, Slug, Command)> {
    let (hub, activity) = parse_command_topic(namespace, topic)?;
    let command = match payload {
        b"on" => Command::On,
        b"off" => Command::Off,
        _ => return None,
    };
    Some((hub, activity, command))
}

/// Subscribes to inbound commands and dispatches them to hub actions.
pub struct CommandBridge<C, P> {
    client: AsyncClient,
    namespace: String,
    service: HubCommandService<C, P>,
}

impl<C, P> CommandBridge<C, P>
where
    C: HubClient + Send + Sync + 'static,
    P: MessagePublisher + Send + Sync + 'static,
{
    /// Create a bridge for the given namespace.
    pub fn new(
        client: AsyncClient,
        namespace: impl Into<String>,
        service: HubCommandService<C, P>,
    ) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            service,
        }
    }

    /// Drive the event loop forever.
    ///
    /// Connection errors are logged and polling resumes after a short pause;
    /// rumqttc re-establishes the session on the next poll.
    pub async fn run(self, mut event_loop: EventLoop) {
        let filter = format!("{}/hubs/+/activities/+/command", self.namespace);
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!("connected to broker");
                    if let Err(error) = self.client.subscribe(&filter, QoS::AtLeastOnce).await {
                        tracing::warn!(%error, filter, "command subscription failed");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.dispatch(&publish.topic, &publish.payload).await;
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(%error, "broker connection error");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    async fn dispatch(&self, topic: &str, payload: &[u8]) {
        let Some((hub, activity, command)) = parse_command(&self.namespace, topic, payload) else {
            return;
        };
        let result = match command {
            Command::On => self.service.start_activity(&hub, &activity).await,
            Command::Off => self.service.power_off_activity(&hub, &activity).await,
        };
        // unresolved addressing is a silent no-op on the bus path
        if let Err(error) = result {
            tracing::debug!(%hub, %activity, %error, "command not dispatched");
        }
    }
}

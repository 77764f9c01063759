//! # harmonyd — harmony bridge daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Connect the MQTT client and spawn the command bridge
//! - Build the hub registry and register the configured hubs
//! - Build the axum router and serve the read facade
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use harmony_adapter_http_axum::state::AppState;
use harmony_adapter_mqtt::{CommandBridge, MqttPublisher};
use harmony_adapter_virtual::VirtualHub;
use harmony_app::gateway::PublishGateway;
use harmony_app::registry::HubRegistry;
use harmony_app::services::HubCommandService;

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Bus
    let (mqtt_client, event_loop) = harmony_adapter_mqtt::connect(&config.mqtt);
    let publisher = Arc::new(MqttPublisher::new(mqtt_client.clone()));
    let gateway = PublishGateway::new(publisher, config.bridge.topic_namespace.clone());

    // Hub registry
    let registry = Arc::new(HubRegistry::new(gateway, config.bridge.poll_intervals()));
    for name in config.hub_names() {
        if let Err(error) = registry.register(&name, VirtualHub::default()).await {
            tracing::warn!(%error, hub = name, "skipping hub registration");
        }
    }

    // Command bridge
    let bridge = CommandBridge::new(
        mqtt_client,
        config.bridge.topic_namespace.clone(),
        HubCommandService::new(Arc::clone(&registry)),
    );
    tokio::spawn(bridge.run(event_loop));

    // HTTP
    let app = harmony_adapter_http_axum::router::build(AppState::new(registry));
    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "harmonyd listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

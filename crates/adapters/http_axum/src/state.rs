//! Shared application state for axum handlers.

use std::sync::Arc;

use harmony_app::ports::{HubClient, MessagePublisher};
use harmony_app::registry::HubRegistry;
use harmony_app::services::HubCommandService;

/// Application state shared across all axum handlers.
///
/// Generic over the hub client and publisher types to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone` — only the `Arc` wrappers are
/// cloned.
pub struct AppState<C, P> {
    /// Registry of active hubs and their caches.
    pub registry: Arc<HubRegistry<C, P>>,
    /// Command dispatch shared with the bus bridge.
    pub commands: HubCommandService<C, P>,
}

impl<C, P> Clone for AppState<C, P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            commands: self.commands.clone(),
        }
    }
}

impl<C, P> AppState<C, P>
where
    C: HubClient + Send + Sync + 'static,
    P: MessagePublisher + Send + Sync + 'static,
{
    /// Create the state from a shared registry.
    pub fn new(registry: Arc<HubRegistry<C, P>>) -> Self {
        Self {
            commands: HubCommandService::new(Arc::clone(&registry)),
            registry,
        }
    }
}

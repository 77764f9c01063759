//! Command dispatch — translates addressed commands into hub actions.
//!
//! Shared by the bus command bridge and the HTTP action routes: both resolve
//! `{hub slug, activity slug}` here and get the same fire-and-forget
//! semantics. Addressing errors surface to the caller (the bridge drops them
//! silently, HTTP maps them to 404); capability failures are logged and
//! never surface — the bus has no response channel in this direction.

use std::sync::Arc;

use harmony_domain::error::HarmonyError;
use harmony_domain::slug::Slug;

use crate::ports::{HubClient, MessagePublisher};
use crate::registry::HubRegistry;

/// Use-cases for acting on a hub by slug.
pub struct HubCommandService<C, P> {
    registry: Arc<HubRegistry<C, P>>,
}

impl<C, P> Clone for HubCommandService<C, P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<C, P> HubCommandService<C, P>
where
    C: HubClient + Send + Sync + 'static,
    P: MessagePublisher + Send + Sync + 'static,
{
    /// Create a service dispatching into the given registry.
    pub fn new(registry: Arc<HubRegistry<C, P>>) -> Self {
        Self { registry }
    }

    /// Start the activity addressed by slug on the addressed hub.
    ///
    /// Resolution is synchronous; the capability call itself is spawned
    /// fire-and-forget, followed by an immediate out-of-cycle state poll so
    /// the bus reflects the transition without waiting for the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`HarmonyError::NotFound`] when the hub or activity slug does
    /// not resolve.
    #[tracing::instrument(skip(self))]
    pub async fn start_activity(&self, hub: &Slug, activity: &Slug) -> Result<(), HarmonyError> {
        let (client, activity) = self.registry.resolve_activity(hub, activity).await?;
        let registry = Arc::clone(&self.registry);
        let hub = hub.clone();
        tokio::spawn(async move {
            match client.start_activity(activity.id).await {
                Ok(()) => registry.request_state_refresh(&hub).await,
                Err(error) => {
                    tracing::warn!(%hub, activity = %activity.slug, %error, "start activity failed");
                }
            }
        });
        Ok(())
    }

    /// Power off in response to an activity-addressed bus command.
    ///
    /// The activity slug must resolve even though the action targets the
    /// whole hub — a command aimed at an unknown activity is not acted on.
    ///
    /// # Errors
    ///
    /// Returns [`HarmonyError::NotFound`] when the hub or activity slug does
    /// not resolve.
    #[tracing::instrument(skip(self))]
    pub async fn power_off_activity(&self, hub: &Slug, activity: &Slug) -> Result<(), HarmonyError> {
        self.registry.resolve_activity(hub, activity).await?;
        self.power_off(hub).await
    }

    /// Power the addressed hub off.
    ///
    /// Same fire-and-forget contract as [`start_activity`](Self::start_activity).
    ///
    /// # Errors
    ///
    /// Returns [`HarmonyError::NotFound`] when the hub slug does not resolve.
    #[tracing::instrument(skip(self))]
    pub async fn power_off(&self, hub: &Slug) -> Result<(), HarmonyError> {
        let client = self.registry.client(hub).await?;
        let registry = Arc::clone(&self.registry);
        let hub = hub.clone();
        tokio::spawn(async move {
            match client.power_off().await {
                Ok(()) => registry.request_state_refresh(&hub).await,
                Err(error) => tracing::warn!(%hub, %error, "power off failed"),
            }
        });
        Ok(())
    }
}

//! Publish gateway — namespaces and emits retained messages to the bus.
//!
//! Stateless; the sole indirection point so the topic namespace is applied
//! uniformly to every outbound message.

use std::sync::Arc;

use harmony_domain::error::HarmonyError;

use crate::ports::MessagePublisher;

/// Namespacing wrapper around a [`MessagePublisher`].
pub struct PublishGateway<P> {
    publisher: Arc<P>,
    namespace: String,
}

impl<P> Clone for PublishGateway<P> {
    fn clone(&self) -> Self {
        Self {
            publisher: Arc::clone(&self.publisher),
            namespace: self.namespace.clone(),
        }
    }
}

impl<P: MessagePublisher> PublishGateway<P> {
    /// Create a gateway that prefixes every topic with `namespace`.
    pub fn new(publisher: Arc<P>, namespace: impl Into<String>) -> Self {
        Self {
            publisher,
            namespace: namespace.into(),
        }
    }

    /// The configured topic namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Publish a retained message under the configured namespace.
    ///
    /// # Errors
    ///
    /// Propagates the bus failure from the underlying publisher.
    pub async fn retained(&self, topic: &str, payload: &str) -> Result<(), HarmonyError> {
        let topic = format!("{}/{topic}", self.namespace);
        self.publisher.publish(&topic, payload, true).await
    }
}

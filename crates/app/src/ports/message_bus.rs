//! Message bus port — publish semantics only.
//!
//! Connection and reconnection handling belong to the transport adapter;
//! the core relies solely on retained, idempotent publishes for delivery
//! guarantees (no transactions, no exactly-once).

use std::future::Future;

use harmony_domain::error::HarmonyError;

/// Outbound publishing side of the message bus.
pub trait MessagePublisher: Send + Sync {
    /// Publish a plain-text payload to a fully qualified topic.
    ///
    /// With `retain` set, the broker stores the message and delivers it to
    /// any future subscriber until it is superseded.
    fn publish(
        &self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> impl Future<Output = Result<(), HarmonyError>> + Send;
}

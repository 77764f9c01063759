//! Hub capability port — the control surface of one physical hub.
//!
//! The native hub control protocol lives behind this boundary; the core only
//! relies on these four operations, all asynchronous and independently
//! failable. No timeout is imposed here — a hung call stalls only that hub's
//! own polling cadence, never other hubs.

use std::future::Future;

use harmony_domain::activity::ActivityId;
use harmony_domain::error::HarmonyError;

/// Raw activity record as reported by the device, before the catalog poller
/// derives its slug.
#[derive(Debug, Clone)]
pub struct ActivityInfo {
    /// Device-assigned identifier.
    pub id: ActivityId,
    /// Human-readable display name.
    pub label: String,
    /// Whether the hub classifies this as an audio/video activity.
    pub is_av_activity: bool,
}

/// Capability handle to one reachable hub.
pub trait HubClient: Send + Sync {
    /// List the activities currently configured on the hub.
    fn list_activities(
        &self,
    ) -> impl Future<Output = Result<Vec<ActivityInfo>, HarmonyError>> + Send;

    /// Read the id of the currently running activity.
    ///
    /// Returns [`ActivityId::OFF`] when no activity is running.
    fn current_activity_id(&self) -> impl Future<Output = Result<ActivityId, HarmonyError>> + Send;

    /// Switch the hub into the given activity.
    fn start_activity(
        &self,
        id: ActivityId,
    ) -> impl Future<Output = Result<(), HarmonyError>> + Send;

    /// Power the hub off (stop the running activity).
    fn power_off(&self) -> impl Future<Output = Result<(), HarmonyError>> + Send;
}

//! State snapshot — the last known true device state for one hub.

use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityId};

/// Last observed hub state.
///
/// Overwritten atomically on each successful state poll and compared against
/// its prior value to detect transitions. A hub reporting an activity id
/// that is absent from the catalog (including the off sentinel) is recorded
/// as powered off with no current activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Whether the hub reports no running activity.
    pub off: bool,
    /// The running activity, when recognized in the catalog.
    pub current_activity: Option<Activity>,
}

impl StateSnapshot {
    /// Snapshot for a hub running a known activity.
    #[must_use]
    pub fn running(activity: Activity) -> Self {
        Self {
            off: false,
            current_activity: Some(activity),
        }
    }

    /// Snapshot for a hub with no recognized running activity.
    #[must_use]
    pub fn powered_off() -> Self {
        Self {
            off: true,
            current_activity: None,
        }
    }

    /// Identity of the current activity, used for transition detection.
    #[must_use]
    pub fn current_id(&self) -> Option<ActivityId> {
        self.current_activity.as_ref().map(|activity| activity.id)
    }
}

//! # harmony-adapter-virtual
//!
//! Virtual/demo hub that implements the hub capability port with a
//! simulated device, for testing and demonstration purposes.
//!
//! The real hub control protocol and hub discovery live outside this
//! workspace; the registry's `register`/`deregister` pair is the integration
//! point a discovery adapter would drive. This adapter keeps the binary
//! runnable end-to-end against a broker without any hardware.
//!
//! ## Dependency rule
//! Depends on `harmony-app` (port traits) and `harmony-domain` only.

use std::future::Future;
use std::sync::Mutex;

use harmony_app::ports::{ActivityInfo, HubClient};
use harmony_domain::activity::ActivityId;
use harmony_domain::error::{HarmonyError, NotFoundError};

/// Simulated hub with a fixed activity list and a mutable current activity.
pub struct VirtualHub {
    activities: Vec<ActivityInfo>,
    current: Mutex<ActivityId>,
}

impl VirtualHub {
    /// Create a hub with the given activities, initially powered off.
    #[must_use]
    pub fn new(activities: Vec<ActivityInfo>) -> Self {
        Self {
            activities,
            current: Mutex::new(ActivityId::OFF),
        }
    }

    fn knows(&self, id: ActivityId) -> bool {
        self.activities.iter().any(|activity| activity.id == id)
    }
}

/// Demo fixture: a typical living-room activity set.
impl Default for VirtualHub {
    fn default() -> Self {
        Self::new(vec![
            ActivityInfo {
                id: ActivityId::new(1),
                label: "Watch TV".to_string(),
                is_av_activity: true,
            },
            ActivityInfo {
                id: ActivityId::new(2),
                label: "Listen to Music".to_string(),
                is_av_activity: true,
            },
            ActivityInfo {
                id: ActivityId::new(3),
                label: "Play Games".to_string(),
                is_av_activity: false,
            },
        ])
    }
}

impl HubClient for VirtualHub {
    fn list_activities(
        &self,
    ) -> impl Future<Output = Result<Vec<ActivityInfo>, HarmonyError>> + Send {
        let activities = self.activities.clone();
        async move { Ok(activities) }
    }

    fn current_activity_id(&self) -> impl Future<Output = Result<ActivityId, HarmonyError>> + Send {
        let current = *self.current.lock().unwrap();
        async move { Ok(current) }
    }

    fn start_activity(
        &self,
        id: ActivityId,
    ) -> impl Future<Output = Result<(), HarmonyError>> + Send {
        let result = if self.knows(id) {
            *self.current.lock().unwrap() = id;
            Ok(())
        } else {
            Err(HarmonyError::hub(NotFoundError {
                entity: "Activity",
                id: id.to_string(),
            }))
        };
        async move { result }
    }

    fn power_off(&self) -> impl Future<Output = Result<(), HarmonyError>> + Send {
        *self.current.lock().unwrap() = ActivityId::OFF;
        async { Ok(()) }
    }
}

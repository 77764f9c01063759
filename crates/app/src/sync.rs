//! Per-hub catalog poller and state synchronization engine.
//!
//! Each registered hub is driven by exactly one [`HubSynchronizer`] task
//! that owns both refresh cadences, so two ticks for the same hub can never
//! interleave writes to the shared caches. Capability failures are logged
//! and swallowed here — the previous cache stays untouched and the next
//! regular tick retries naturally.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tokio::time::Instant;

use harmony_domain::activity::{Activity, ActivityId};
use harmony_domain::slug::Slug;
use harmony_domain::snapshot::StateSnapshot;

use crate::gateway::PublishGateway;
use crate::ports::{HubClient, MessagePublisher};
use crate::registry::PollIntervals;

/// Mutable per-hub caches, shared between the poll task and the read facade.
#[derive(Default)]
pub(crate) struct HubCaches {
    /// id → activity, rebuilt wholesale on each successful catalog poll.
    pub(crate) catalog: HashMap<ActivityId, Activity>,
    /// Last known true device state; `None` before the first successful poll.
    pub(crate) snapshot: Option<StateSnapshot>,
}

impl HubCaches {
    /// Catalog contents ordered by slug for deterministic output.
    pub(crate) fn sorted_activities(&self) -> Vec<Activity> {
        let mut activities: Vec<_> = self.catalog.values().cloned().collect();
        activities.sort_by(|a, b| a.slug.cmp(&b.slug));
        activities
    }
}

/// Drives catalog and state refreshes for one hub.
pub(crate) struct HubSynchronizer<C, P> {
    slug: Slug,
    client: Arc<C>,
    caches: Arc<RwLock<HubCaches>>,
    gateway: PublishGateway<P>,
}

impl<C, P> HubSynchronizer<C, P>
where
    C: HubClient,
    P: MessagePublisher,
{
    pub(crate) fn new(
        slug: Slug,
        client: Arc<C>,
        caches: Arc<RwLock<HubCaches>>,
        gateway: PublishGateway<P>,
    ) -> Self {
        Self {
            slug,
            client,
            caches,
            gateway,
        }
    }

    /// Poll loop: two recurring cadences plus out-of-cycle state refresh
    /// requests. The initial polls happen during registration, so both
    /// intervals start one full period out.
    pub(crate) async fn run(self, intervals: PollIntervals, mut refresh_rx: mpsc::Receiver<()>) {
        let mut catalog_ticks = tokio::time::interval_at(
            Instant::now() + intervals.activities,
            intervals.activities,
        );
        let mut state_ticks =
            tokio::time::interval_at(Instant::now() + intervals.state, intervals.state);

        loop {
            tokio::select! {
                _ = catalog_ticks.tick() => self.refresh_catalog().await,
                _ = state_ticks.tick() => self.refresh_state().await,
                Some(()) = refresh_rx.recv() => self.refresh_state().await,
            }
        }
    }

    /// Rebuild the activity catalog from the hub.
    ///
    /// On failure the previous catalog is retained unchanged
    /// (stale-but-available policy).
    pub(crate) async fn refresh_catalog(&self) {
        tracing::debug!(hub = %self.slug, "updating activities");
        match self.client.list_activities().await {
            Ok(infos) => {
                let catalog: HashMap<_, _> = infos
                    .into_iter()
                    .map(|info| {
                        let activity = Activity::new(info.id, info.label, info.is_av_activity);
                        (activity.id, activity)
                    })
                    .collect();
                self.caches.write().await.catalog = catalog;
            }
            Err(error) => {
                tracing::warn!(hub = %self.slug, %error, "activity poll failed");
            }
        }
    }

    /// Poll the current activity, overwrite the snapshot, and publish a
    /// burst when the activity identity changed.
    ///
    /// An id that is neither the off sentinel nor present in the catalog is
    /// treated as powered off; identity comparison by `Option<ActivityId>`
    /// keeps repeated unknown polls from republishing.
    pub(crate) async fn refresh_state(&self) {
        tracing::debug!(hub = %self.slug, "updating state");
        let previous = self.caches.read().await.snapshot.clone();

        let id = match self.client.current_activity_id().await {
            Ok(id) => id,
            Err(error) => {
                tracing::warn!(hub = %self.slug, %error, "state poll failed");
                return;
            }
        };

        let (snapshot, activities) = {
            let mut caches = self.caches.write().await;
            let snapshot = match caches.catalog.get(&id) {
                Some(activity) => StateSnapshot::running(activity.clone()),
                None => StateSnapshot::powered_off(),
            };
            caches.snapshot = Some(snapshot.clone());
            (snapshot, caches.sorted_activities())
        };

        let changed = previous
            .as_ref()
            .is_none_or(|prev| prev.current_id() != snapshot.current_id());
        if changed {
            self.publish_burst(&snapshot, &activities).await;
        }
    }

    /// Emit the retained state of the whole hub: current activity slug,
    /// on/off state, and one boolean flag per known activity, so a late
    /// subscriber can reconstruct full state without polling.
    ///
    /// An empty `current_activity` payload clears the broker-retained slug
    /// when the hub turns off.
    async fn publish_burst(&self, snapshot: &StateSnapshot, activities: &[Activity]) {
        let hub = &self.slug;
        let current_slug = snapshot
            .current_activity
            .as_ref()
            .map_or("", |activity| activity.slug.as_str());
        let state = if snapshot.off { "off" } else { "on" };

        self.emit(&format!("hubs/{hub}/current_activity"), current_slug)
            .await;
        self.emit(&format!("hubs/{hub}/state"), state).await;

        for activity in activities {
            let payload = if snapshot.current_id() == Some(activity.id) {
                "on"
            } else {
                "off"
            };
            self.emit(
                &format!("hubs/{hub}/activities/{}/state", activity.slug),
                payload,
            )
            .await;
        }
    }

    async fn emit(&self, topic: &str, payload: &str) {
        if let Err(error) = self.gateway.retained(topic, payload).await {
            tracing::warn!(hub = %self.slug, topic, %error, "publish failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;

    use harmony_domain::error::HarmonyError;

    use crate::ports::ActivityInfo;

    /// Hub stub that replays a scripted sequence of current-activity ids.
    struct ScriptedHub {
        activities: Vec<ActivityInfo>,
        fail_listing: bool,
        ids: Mutex<VecDeque<Result<ActivityId, ()>>>,
    }

    impl ScriptedHub {
        fn new(activities: Vec<(i64, &str)>) -> Self {
            Self {
                activities: activities
                    .into_iter()
                    .map(|(id, label)| ActivityInfo {
                        id: ActivityId::new(id),
                        label: label.to_string(),
                        is_av_activity: true,
                    })
                    .collect(),
                fail_listing: false,
                ids: Mutex::new(VecDeque::new()),
            }
        }

        fn script(self, ids: &[Result<i64, ()>]) -> Self {
            *self.ids.lock().unwrap() = ids
                .iter()
                .map(|entry| entry.map(ActivityId::new))
                .collect();
            self
        }
    }

    impl HubClient for ScriptedHub {
        fn list_activities(
            &self,
        ) -> impl Future<Output = Result<Vec<ActivityInfo>, HarmonyError>> + Send {
            let result = if self.fail_listing {
                Err(HarmonyError::hub(std::io::Error::other("listing failed")))
            } else {
                Ok(self.activities.clone())
            };
            async move { result }
        }

        fn current_activity_id(
            &self,
        ) -> impl Future<Output = Result<ActivityId, HarmonyError>> + Send {
            let next = self.ids.lock().unwrap().pop_front();
            async move {
                match next {
                    Some(Ok(id)) => Ok(id),
                    Some(Err(())) => Err(HarmonyError::hub(std::io::Error::other("poll failed"))),
                    None => Ok(ActivityId::OFF),
                }
            }
        }

        fn start_activity(
            &self,
            _id: ActivityId,
        ) -> impl Future<Output = Result<(), HarmonyError>> + Send {
            async { Ok(()) }
        }

        fn power_off(&self) -> impl Future<Output = Result<(), HarmonyError>> + Send {
            async { Ok(()) }
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        messages: Mutex<Vec<(String, String)>>,
    }

    impl RecordingPublisher {
        fn topics_and_payloads(&self) -> Vec<(String, String)> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl MessagePublisher for RecordingPublisher {
        fn publish(
            &self,
            topic: &str,
            payload: &str,
            retain: bool,
        ) -> impl Future<Output = Result<(), HarmonyError>> + Send {
            assert!(retain, "state publishes must be retained");
            self.messages
                .lock()
                .unwrap()
                .push((topic.to_string(), payload.to_string()));
            async { Ok(()) }
        }
    }

    fn synchronizer(
        hub: ScriptedHub,
    ) -> (HubSynchronizer<ScriptedHub, RecordingPublisher>, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::default());
        let gateway = PublishGateway::new(Arc::clone(&publisher), "harmony-api");
        let sync = HubSynchronizer::new(
            Slug::normalize("Living Room"),
            Arc::new(hub),
            Arc::new(RwLock::new(HubCaches::default())),
            gateway,
        );
        (sync, publisher)
    }

    #[tokio::test]
    async fn should_publish_full_burst_on_first_state_poll() {
        let hub = ScriptedHub::new(vec![(1, "Watch TV"), (2, "Listen to Music")])
            .script(&[Ok(1)]);
        let (sync, publisher) = synchronizer(hub);

        sync.refresh_catalog().await;
        sync.refresh_state().await;

        assert_eq!(
            publisher.topics_and_payloads(),
            vec![
                (
                    "harmony-api/hubs/living-room/current_activity".to_string(),
                    "watch-tv".to_string()
                ),
                (
                    "harmony-api/hubs/living-room/state".to_string(),
                    "on".to_string()
                ),
                (
                    "harmony-api/hubs/living-room/activities/listen-to-music/state".to_string(),
                    "off".to_string()
                ),
                (
                    "harmony-api/hubs/living-room/activities/watch-tv/state".to_string(),
                    "on".to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn should_publish_exactly_one_burst_for_identical_polls() {
        let hub = ScriptedHub::new(vec![(1, "Watch TV"), (2, "Listen to Music")])
            .script(&[Ok(1), Ok(1)]);
        let (sync, publisher) = synchronizer(hub);

        sync.refresh_catalog().await;
        sync.refresh_state().await;
        let after_first = publisher.topics_and_payloads().len();
        sync.refresh_state().await;

        assert_eq!(after_first, 4);
        assert_eq!(publisher.topics_and_payloads().len(), after_first);
    }

    #[tokio::test]
    async fn should_flip_everything_off_when_sentinel_is_polled() {
        let hub = ScriptedHub::new(vec![(1, "Watch TV"), (2, "Listen to Music")])
            .script(&[Ok(1), Ok(1), Ok(-1)]);
        let (sync, publisher) = synchronizer(hub);

        sync.refresh_catalog().await;
        sync.refresh_state().await;
        sync.refresh_state().await;
        sync.refresh_state().await;

        let messages = publisher.topics_and_payloads();
        let burst = &messages[4..];
        assert_eq!(
            burst,
            &[
                (
                    "harmony-api/hubs/living-room/current_activity".to_string(),
                    String::new()
                ),
                (
                    "harmony-api/hubs/living-room/state".to_string(),
                    "off".to_string()
                ),
                (
                    "harmony-api/hubs/living-room/activities/listen-to-music/state".to_string(),
                    "off".to_string()
                ),
                (
                    "harmony-api/hubs/living-room/activities/watch-tv/state".to_string(),
                    "off".to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn should_mark_exactly_one_activity_on_after_burst() {
        let hub = ScriptedHub::new(vec![(1, "Watch TV"), (2, "Listen to Music"), (3, "Play Games")])
            .script(&[Ok(2)]);
        let (sync, publisher) = synchronizer(hub);

        sync.refresh_catalog().await;
        sync.refresh_state().await;

        let on_topics: Vec<_> = publisher
            .topics_and_payloads()
            .into_iter()
            .filter(|(topic, payload)| topic.contains("/activities/") && payload == "on")
            .collect();
        assert_eq!(
            on_topics,
            vec![(
                "harmony-api/hubs/living-room/activities/listen-to-music/state".to_string(),
                "on".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn should_keep_previous_catalog_when_listing_fails() {
        let caches = Arc::new(RwLock::new(HubCaches::default()));
        let gateway =
            PublishGateway::new(Arc::new(RecordingPublisher::default()), "harmony-api");

        let sync = HubSynchronizer::new(
            Slug::normalize("Living Room"),
            Arc::new(ScriptedHub::new(vec![(1, "Watch TV")])),
            Arc::clone(&caches),
            gateway.clone(),
        );
        sync.refresh_catalog().await;
        assert_eq!(caches.read().await.catalog.len(), 1);

        let mut failing_hub = ScriptedHub::new(vec![]);
        failing_hub.fail_listing = true;
        let failing = HubSynchronizer::new(
            Slug::normalize("Living Room"),
            Arc::new(failing_hub),
            Arc::clone(&caches),
            gateway,
        );
        failing.refresh_catalog().await;

        assert_eq!(caches.read().await.catalog.len(), 1);
    }

    #[tokio::test]
    async fn should_keep_previous_snapshot_when_state_poll_fails() {
        let hub = ScriptedHub::new(vec![(1, "Watch TV")]).script(&[Ok(1), Err(())]);
        let (sync, publisher) = synchronizer(hub);

        sync.refresh_catalog().await;
        sync.refresh_state().await;
        let after_first = publisher.topics_and_payloads().len();
        sync.refresh_state().await;

        assert_eq!(publisher.topics_and_payloads().len(), after_first);
        let caches = sync.caches.read().await;
        assert_eq!(
            caches.snapshot.as_ref().and_then(StateSnapshot::current_id),
            Some(ActivityId::new(1))
        );
    }

    #[tokio::test]
    async fn should_treat_unrecognized_id_as_powered_off() {
        let hub = ScriptedHub::new(vec![(1, "Watch TV")]).script(&[Ok(99), Ok(99)]);
        let (sync, publisher) = synchronizer(hub);

        sync.refresh_catalog().await;
        sync.refresh_state().await;
        sync.refresh_state().await;

        let messages = publisher.topics_and_payloads();
        // one burst only, reporting off
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[1],
            (
                "harmony-api/hubs/living-room/state".to_string(),
                "off".to_string()
            )
        );
        assert!(sync.caches.read().await.snapshot.as_ref().unwrap().off);
    }

    #[tokio::test]
    async fn should_report_empty_state_before_any_catalog_poll() {
        let hub = ScriptedHub::new(vec![(1, "Watch TV")]).script(&[Ok(1)]);
        let (sync, publisher) = synchronizer(hub);

        // state poll before the catalog is populated: id 1 is unknown
        sync.refresh_state().await;

        let messages = publisher.topics_and_payloads();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[1],
            (
                "harmony-api/hubs/living-room/state".to_string(),
                "off".to_string()
            )
        );
    }
}

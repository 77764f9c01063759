//! Hub lifecycle registry — one owned connection record per hub slug.
//!
//! The registry is the only mutation point for hub membership:
//! [`register`](HubRegistry::register) when a hub becomes reachable,
//! [`deregister`](HubRegistry::deregister) when it is lost. A hub that goes
//! unreachable and later reappears is a brand-new connection with cold
//! caches — there is no reconnection state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;

use harmony_domain::activity::Activity;
use harmony_domain::error::NotFoundError;
use harmony_domain::slug::Slug;
use harmony_domain::snapshot::StateSnapshot;

use crate::gateway::PublishGateway;
use crate::ports::{HubClient, MessagePublisher};
use crate::sync::{HubCaches, HubSynchronizer};

/// Recurring poll cadences, shared by every hub in the registry.
#[derive(Debug, Clone, Copy)]
pub struct PollIntervals {
    /// How often the activity catalog is rebuilt.
    pub activities: Duration,
    /// How often the current activity/power state is polled.
    pub state: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            activities: Duration::from_millis(60_000),
            state: Duration::from_millis(5_000),
        }
    }
}

/// Registration failures.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two distinct hubs normalized to the same slug; the first one wins.
    #[error("hub slug already registered: {0}")]
    SlugTaken(Slug),
}

/// Everything owned on behalf of one reachable hub.
///
/// Dropping the connection aborts the poll task before the caches go away,
/// so a pending tick can never write into (or publish for) a hub that is no
/// longer registered.
struct HubConnection<C> {
    client: Arc<C>,
    caches: Arc<RwLock<HubCaches>>,
    refresh_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl<C> Drop for HubConnection<C> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Registry of active hubs and their poll tasks.
pub struct HubRegistry<C, P> {
    hubs: RwLock<HashMap<Slug, HubConnection<C>>>,
    gateway: PublishGateway<P>,
    intervals: PollIntervals,
}

impl<C, P> HubRegistry<C, P>
where
    C: HubClient + 'static,
    P: MessagePublisher + 'static,
{
    /// Create an empty registry publishing through `gateway`.
    pub fn new(gateway: PublishGateway<P>, intervals: PollIntervals) -> Self {
        Self {
            hubs: RwLock::new(HashMap::new()),
            gateway,
            intervals,
        }
    }

    /// Register a reachable hub under the slug derived from its name.
    ///
    /// The slug is reserved and the connection inserted under a short write
    /// lock, so concurrent registrations for the same slug serialize
    /// cleanly. The poll task performs an immediate catalog poll and state
    /// poll before arming both recurring timers; a hub whose initial poll
    /// hangs stalls only its own task, never registry reads for other hubs.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SlugTaken`] when the slug is already
    /// occupied by another connection.
    #[tracing::instrument(skip(self, client))]
    pub async fn register(&self, name: &str, client: C) -> Result<Slug, RegistryError> {
        let slug = Slug::normalize(name);
        let mut hubs = self.hubs.write().await;
        if hubs.contains_key(&slug) {
            return Err(RegistryError::SlugTaken(slug));
        }

        let client = Arc::new(client);
        let caches = Arc::new(RwLock::new(HubCaches::default()));
        let synchronizer = HubSynchronizer::new(
            slug.clone(),
            Arc::clone(&client),
            Arc::clone(&caches),
            self.gateway.clone(),
        );

        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let intervals = self.intervals;
        let task = tokio::spawn(async move {
            synchronizer.refresh_catalog().await;
            synchronizer.refresh_state().await;
            synchronizer.run(intervals, refresh_rx).await;
        });

        hubs.insert(
            slug.clone(),
            HubConnection {
                client,
                caches,
                refresh_tx,
                task,
            },
        );
        tracing::info!(hub = %slug, "hub registered");
        Ok(slug)
    }

    /// Remove a hub that became unreachable: cancel its poll task and drop
    /// all cached state. Idempotent if the slug is unknown.
    #[tracing::instrument(skip(self))]
    pub async fn deregister(&self, slug: &Slug) {
        if self.hubs.write().await.remove(slug).is_some() {
            tracing::info!(hub = %slug, "hub removed");
        }
    }

    /// Whether no hub is currently registered.
    pub async fn is_empty(&self) -> bool {
        self.hubs.read().await.is_empty()
    }

    /// Slugs of all registered hubs, sorted.
    pub async fn slugs(&self) -> Vec<Slug> {
        let mut slugs: Vec<_> = self.hubs.read().await.keys().cloned().collect();
        slugs.sort();
        slugs
    }

    /// Catalog contents for one hub, ordered by slug.
    ///
    /// Empty until the first successful catalog poll.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the slug is not registered.
    pub async fn activities(&self, slug: &Slug) -> Result<Vec<Activity>, NotFoundError> {
        let hubs = self.hubs.read().await;
        let connection = hubs.get(slug).ok_or_else(|| hub_not_found(slug))?;
        Ok(connection.caches.read().await.sorted_activities())
    }

    /// Last known state snapshot for one hub.
    ///
    /// `None` until the first successful state poll.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when the slug is not registered.
    pub async fn status(&self, slug: &Slug) -> Result<Option<StateSnapshot>, NotFoundError> {
        let hubs = self.hubs.read().await;
        let connection = hubs.get(slug).ok_or_else(|| hub_not_found(slug))?;
        let snapshot = connection.caches.read().await.snapshot.clone();
        Ok(snapshot)
    }

    /// Ask the hub's poll task for an immediate out-of-cycle state refresh.
    ///
    /// Best-effort: a refresh already queued or a just-removed hub makes
    /// this a no-op.
    pub async fn request_state_refresh(&self, slug: &Slug) {
        if let Some(connection) = self.hubs.read().await.get(slug) {
            let _ = connection.refresh_tx.try_send(());
        }
    }

    /// Capability handle for one hub.
    pub(crate) async fn client(&self, slug: &Slug) -> Result<Arc<C>, NotFoundError> {
        let hubs = self.hubs.read().await;
        let connection = hubs.get(slug).ok_or_else(|| hub_not_found(slug))?;
        Ok(Arc::clone(&connection.client))
    }

    /// Resolve an activity slug against one hub's catalog (first match by
    /// slug equality), returning the capability handle alongside.
    pub(crate) async fn resolve_activity(
        &self,
        hub: &Slug,
        activity: &Slug,
    ) -> Result<(Arc<C>, Activity), NotFoundError> {
        let hubs = self.hubs.read().await;
        let connection = hubs.get(hub).ok_or_else(|| hub_not_found(hub))?;
        let caches = connection.caches.read().await;
        let found = caches
            .catalog
            .values()
            .find(|candidate| candidate.slug == *activity)
            .cloned()
            .ok_or_else(|| NotFoundError {
                entity: "Activity",
                id: activity.to_string(),
            })?;
        Ok((Arc::clone(&connection.client), found))
    }
}

fn hub_not_found(slug: &Slug) -> NotFoundError {
    NotFoundError {
        entity: "Hub",
        id: slug.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use harmony_domain::activity::ActivityId;
    use harmony_domain::error::HarmonyError;

    use crate::ports::ActivityInfo;

    struct StubHub {
        activities: Vec<ActivityInfo>,
        current: Mutex<ActivityId>,
        fail_listing: bool,
        hang_listing: bool,
    }

    impl StubHub {
        fn new(activities: Vec<(i64, &str)>, current: i64) -> Self {
            Self {
                activities: activities
                    .into_iter()
                    .map(|(id, label)| ActivityInfo {
                        id: ActivityId::new(id),
                        label: label.to_string(),
                        is_av_activity: false,
                    })
                    .collect(),
                current: Mutex::new(ActivityId::new(current)),
                fail_listing: false,
                hang_listing: false,
            }
        }
    }

    impl HubClient for StubHub {
        fn list_activities(
            &self,
        ) -> impl Future<Output = Result<Vec<ActivityInfo>, HarmonyError>> + Send {
            let hang = self.hang_listing;
            let result = if self.fail_listing {
                Err(HarmonyError::hub(std::io::Error::other("unreachable")))
            } else {
                Ok(self.activities.clone())
            };
            async move {
                if hang {
                    std::future::pending::<()>().await;
                }
                result
            }
        }

        fn current_activity_id(
            &self,
        ) -> impl Future<Output = Result<ActivityId, HarmonyError>> + Send {
            let current = *self.current.lock().unwrap();
            async move { Ok(current) }
        }

        fn start_activity(
            &self,
            id: ActivityId,
        ) -> impl Future<Output = Result<(), HarmonyError>> + Send {
            *self.current.lock().unwrap() = id;
            async { Ok(()) }
        }

        fn power_off(&self) -> impl Future<Output = Result<(), HarmonyError>> + Send {
            *self.current.lock().unwrap() = ActivityId::OFF;
            async { Ok(()) }
        }
    }

    #[derive(Default)]
    struct CountingPublisher {
        published: AtomicUsize,
    }

    impl MessagePublisher for CountingPublisher {
        fn publish(
            &self,
            _topic: &str,
            _payload: &str,
            _retain: bool,
        ) -> impl Future<Output = Result<(), HarmonyError>> + Send {
            self.published.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        }
    }

    fn registry(
        intervals: PollIntervals,
    ) -> (Arc<HubRegistry<StubHub, CountingPublisher>>, Arc<CountingPublisher>) {
        let publisher = Arc::new(CountingPublisher::default());
        let gateway = PublishGateway::new(Arc::clone(&publisher), "harmony-api");
        (Arc::new(HubRegistry::new(gateway, intervals)), publisher)
    }

    fn slow_intervals() -> PollIntervals {
        PollIntervals {
            activities: Duration::from_secs(3600),
            state: Duration::from_secs(3600),
        }
    }

    #[tokio::test]
    async fn should_poll_immediately_on_registration() {
        let (registry, publisher) = registry(slow_intervals());

        let slug = registry
            .register("Living Room", StubHub::new(vec![(1, "Watch TV")], 1))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(slug.as_str(), "living-room");
        assert_eq!(registry.activities(&slug).await.unwrap().len(), 1);
        let status = registry.status(&slug).await.unwrap().unwrap();
        assert_eq!(status.current_id(), Some(ActivityId::new(1)));
        // current_activity + state + one per-activity flag
        assert_eq!(publisher.published.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn should_reject_second_registration_for_same_slug() {
        let (registry, _) = registry(slow_intervals());

        registry
            .register("Living Room", StubHub::new(vec![], -1))
            .await
            .unwrap();
        let result = registry
            .register("living room", StubHub::new(vec![], -1))
            .await;

        assert!(matches!(result, Err(RegistryError::SlugTaken(_))));
        assert_eq!(registry.slugs().await.len(), 1);
    }

    #[tokio::test]
    async fn should_list_empty_catalog_when_first_poll_failed() {
        let (registry, _) = registry(slow_intervals());
        let mut hub = StubHub::new(vec![(1, "Watch TV")], 1);
        hub.fail_listing = true;

        let slug = registry.register("Living Room", hub).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(registry.activities(&slug).await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn should_be_idempotent_when_deregistering_unknown_slug() {
        let (registry, _) = registry(slow_intervals());
        registry.deregister(&Slug::from("ghost")).await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn should_stop_publishing_after_deregistration() {
        let intervals = PollIntervals {
            activities: Duration::from_millis(5),
            state: Duration::from_millis(5),
        };
        let (registry, publisher) = registry(intervals);

        let slug = registry
            .register("Living Room", StubHub::new(vec![(1, "Watch TV")], 1))
            .await
            .unwrap();
        registry.deregister(&slug).await;

        let settled = publisher.published.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(publisher.published.load(Ordering::SeqCst), settled);
        assert!(registry.status(&slug).await.is_err());
    }

    #[tokio::test]
    async fn should_refresh_state_out_of_cycle_on_request() {
        let (registry, publisher) = registry(slow_intervals());
        let slug = registry
            .register("Living Room", StubHub::new(vec![(1, "Watch TV"), (2, "Listen to Music")], -1))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let before = publisher.published.load(Ordering::SeqCst);
        {
            let hubs = registry.hubs.read().await;
            *hubs.get(&slug).unwrap().client.current.lock().unwrap() = ActivityId::new(2);
        }
        registry.request_state_refresh(&slug).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        // a full burst for the transition into "Listen to Music"
        assert_eq!(publisher.published.load(Ordering::SeqCst), before + 4);
        let status = registry.status(&slug).await.unwrap().unwrap();
        assert_eq!(status.current_id(), Some(ActivityId::new(2)));
    }

    #[tokio::test]
    async fn should_keep_reads_responsive_while_a_registration_poll_hangs() {
        let (registry, _) = registry(slow_intervals());
        let slug = registry
            .register("Living Room", StubHub::new(vec![(1, "Watch TV")], 1))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut hung = StubHub::new(vec![(1, "Watch TV")], -1);
        hung.hang_listing = true;
        registry.register("Bedroom", hung).await.unwrap();

        let slugs = tokio::time::timeout(Duration::from_millis(200), registry.slugs())
            .await
            .expect("reads must not wait on another hub's poll");
        assert_eq!(slugs.len(), 2);

        let status = tokio::time::timeout(Duration::from_millis(200), registry.status(&slug))
            .await
            .expect("reads must not wait on another hub's poll")
            .unwrap();
        assert_eq!(
            status.unwrap().current_id(),
            Some(ActivityId::new(1))
        );
    }

    #[tokio::test]
    async fn should_resolve_activity_by_slug() {
        let (registry, _) = registry(slow_intervals());
        let slug = registry
            .register("Living Room", StubHub::new(vec![(1, "Watch TV")], -1))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let (_, activity) = registry
            .resolve_activity(&slug, &Slug::from("watch-tv"))
            .await
            .unwrap();
        assert_eq!(activity.id, ActivityId::new(1));

        let missing = registry
            .resolve_activity(&slug, &Slug::from("play-games"))
            .await;
        assert!(missing.is_err());
    }
}

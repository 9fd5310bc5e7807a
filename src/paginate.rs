//! Per-collection fetch coordination: decides when the next page is needed,
//! issues it, and folds the response into the collection's cache partition.
//!
//! One [`FetchCoordinator`] runs per paginated collection (scenes, tags,
//! performers, studios). The four are fully independent; within one
//! coordinator at most one fetch is in flight, so page N is never issued
//! before page N-1 has settled.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{ApiError, Entity, QueryName};
use crate::cache::{CollectionCache, CollectionPage, Fingerprint, MergePolicy};
use crate::filter::{FindFilter, SceneFilter};
use crate::scroll::{ObserverConfig, TriggerSensor};

pub type PageResult<T> = Result<CollectionPage<T>, ApiError>;

/// One page request: the common filter (with pagination fields filled in by
/// the coordinator) plus the structured scene predicate. Collection-level
/// queries without a structured predicate ignore `scene_filter`.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub filter: FindFilter,
    pub scene_filter: Option<SceneFilter>,
}

/// A remote source of collection pages. Implemented by the GraphQL client
/// for each collection query.
pub trait PageSource<T>: Send + Sync + 'static {
    fn fetch(&self, request: PageRequest) -> BoxFuture<'static, PageResult<T>>;
}

/// A fetch transitioning from in-flight to success or failure. Carries the
/// fingerprint that was active when the fetch was issued so late responses
/// for a superseded filter can be recognized and dropped.
pub struct FetchSettled<T> {
    fingerprint: Fingerprint,
    page: u32,
    result: PageResult<T>,
}

/// Published to subscribers whenever a partition gains items or a revised
/// total. The UI layer re-renders on these instead of watching state hooks.
#[derive(Debug, Clone)]
pub struct PartitionChanged {
    pub query: QueryName,
    pub fingerprint: Fingerprint,
    pub len: usize,
    pub total: u32,
}

/// Read-only view of the active partition, handed to the UI each render.
pub struct PaginatedSnapshot<'a, T> {
    pub items: &'a [T],
    pub has_more: bool,
    pub is_loading: bool,
    pub error: Option<&'a str>,
}

pub struct FetchCoordinator<T: Entity> {
    cache: CollectionCache<T>,
    source: Arc<dyn PageSource<T>>,
    sensor: TriggerSensor,
    filter: FindFilter,
    scene_filter: Option<SceneFilter>,
    fingerprint: Fingerprint,
    page_size: u32,
    loading: bool,
    error: Option<String>,
    result_tx: mpsc::Sender<FetchSettled<T>>,
    result_rx: mpsc::Receiver<FetchSettled<T>>,
    subscribers: Vec<mpsc::UnboundedSender<PartitionChanged>>,
}

impl<T: Entity + Send + 'static> FetchCoordinator<T> {
    pub fn new(
        query: QueryName,
        policy: MergePolicy,
        source: Arc<dyn PageSource<T>>,
        page_size: u32,
        observer: ObserverConfig,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::channel(10);
        let filter = FindFilter::new();
        let fingerprint = Fingerprint::of(query, &filter, None);
        Self {
            cache: CollectionCache::new(query, policy),
            source,
            sensor: TriggerSensor::new(observer),
            filter,
            scene_filter: None,
            fingerprint,
            page_size,
            loading: false,
            error: None,
            result_tx,
            result_rx,
            subscribers: Vec::new(),
        }
    }

    pub fn query(&self) -> QueryName {
        self.cache.query()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// The sensor to attach to the sentinel element after the last rendered
    /// item. Clones share state, so the host can hand this to an observer.
    pub fn sensor(&self) -> TriggerSensor {
        self.sensor.clone()
    }

    /// Subscribe to partition-changed notifications.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<PartitionChanged> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Switch the active semantic filter and start loading its first page.
    ///
    /// A new fingerprint gets a fresh partition; superseded partitions are
    /// evicted. Responses still in flight for the old fingerprint will be
    /// discarded when they settle. Setting an identical filter is a no-op.
    pub fn set_filter(&mut self, filter: FindFilter, scene_filter: Option<SceneFilter>) {
        let fingerprint = Fingerprint::of(self.query(), &filter, scene_filter.as_ref());
        if fingerprint == self.fingerprint && (self.loading || !self.cache.is_empty(fingerprint)) {
            return;
        }

        self.filter = filter;
        self.scene_filter = scene_filter;
        self.fingerprint = fingerprint;
        self.cache.evict_stale(fingerprint);
        self.loading = false;
        self.error = None;
        self.sensor.reset();
        self.load_more();
    }

    /// Drain settled fetches, then start the next page if the sentinel has
    /// fired and the guards allow it. Hosts call this once per event-loop
    /// turn; it never blocks.
    pub fn poll(&mut self) {
        while let Ok(settled) = self.result_rx.try_recv() {
            self.apply_settled(settled);
        }
        self.check_trigger();
    }

    /// Await the next settled fetch. For hosts that drive the coordinator
    /// directly instead of polling from an event loop.
    pub async fn settled(&mut self) -> Option<FetchSettled<T>> {
        self.result_rx.recv().await
    }

    /// Fold a settled fetch into the partition. Responses whose fingerprint
    /// no longer matches the active filter are dropped without touching any
    /// state; the partition they were fetched for is already gone.
    pub fn apply_settled(&mut self, settled: FetchSettled<T>) {
        if settled.fingerprint != self.fingerprint {
            debug!(
                query = self.query().label(),
                fingerprint = %settled.fingerprint,
                page = settled.page,
                "discarding stale page response"
            );
            return;
        }

        self.loading = false;
        match settled.result {
            Ok(page) => {
                self.error = None;
                let query = self.query();
                let merged = self.cache.apply(self.fingerprint, page);
                let len = merged.len();
                let total = merged.total;
                debug!(
                    query = query.label(),
                    fingerprint = %self.fingerprint,
                    page = settled.page,
                    len,
                    total,
                    "merged page"
                );
                let event = PartitionChanged {
                    query,
                    fingerprint: self.fingerprint,
                    len,
                    total,
                };
                self.publish(event);
            }
            Err(err) => {
                warn!(
                    query = self.query().label(),
                    page = settled.page,
                    error = %err,
                    "page fetch failed"
                );
                self.error = Some(err.user_message());
            }
        }
        // Re-arm on success and failure alike; a failed page is retried by
        // the user scrolling the sentinel back into view.
        self.sensor.reset();
    }

    pub fn has_more(&self) -> bool {
        self.cache.has_more(self.fingerprint)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn snapshot(&self) -> PaginatedSnapshot<'_, T> {
        PaginatedSnapshot {
            items: self
                .cache
                .get(self.fingerprint)
                .map(|p| p.items.as_slice())
                .unwrap_or(&[]),
            has_more: self.has_more(),
            is_loading: self.loading,
            error: self.error.as_deref(),
        }
    }

    fn check_trigger(&mut self) {
        if self.sensor.has_triggered() && !self.loading && self.has_more() {
            self.load_more();
        }
    }

    /// Issue the next page for the active partition. The first load falls
    /// out of the same arithmetic: an empty partition asks for page 1.
    fn load_more(&mut self) {
        let len = self.cache.len(self.fingerprint) as u32;
        let next_page = len.div_ceil(self.page_size) + 1;
        self.spawn_fetch(next_page);
    }

    fn spawn_fetch(&mut self, page: u32) {
        self.loading = true;
        let request = PageRequest {
            filter: self.filter.clone().page(page, self.page_size),
            scene_filter: self.scene_filter.clone(),
        };
        let source = Arc::clone(&self.source);
        let tx = self.result_tx.clone();
        let fingerprint = self.fingerprint;
        debug!(
            query = self.query().label(),
            fingerprint = %fingerprint,
            page,
            "fetching page"
        );

        tokio::spawn(async move {
            let result = source.fetch(request).await;
            let _ = tx
                .send(FetchSettled {
                    fingerprint,
                    page,
                    result,
                })
                .await;
        });
    }

    fn publish(&mut self, event: PartitionChanged) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

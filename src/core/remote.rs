//! Remote-backed resource controller
//!
//! [`RemoteController`] keeps a local cache of one resource collection in
//! sync with a [`DataSource`]. Calls may be in flight concurrently; their
//! results are reconciled with sequence stamps taken when each call starts:
//!
//! ```text
//! call starts ──▶ seq = next() ──▶ await source (timeout, close) ──▶ lock cache ──▶ apply if newer
//! ```
//!
//! - A list response never overwrites an id written by a mutation that
//!   started after the list call; items created after it started are kept
//!   and ids deleted after it started stay deleted.
//! - A list response that started before an already applied list response
//!   is discarded.
//! - A mutation result is applied unless a mutation that started later has
//!   already written the same id.
//!
//! Failures set [`RemoteController::last_error`] and leave the cache as it
//! was. The cache lock is never held across an await.

use crate::core::entity::Resource;
use crate::core::error::{ConsoleError, ConsoleResult, TransportError};
use crate::core::events::{ConsoleEvent, EventBus, ResourceEvent};
use crate::core::query::{BulkDeleteResult, ListParams, Page, PaginationMeta};
use crate::core::service::DataSource;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Kind of remote call, used to track loading per operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    List,
    Create,
    Update,
    Delete,
    BulkDelete,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::List,
        OperationKind::Create,
        OperationKind::Update,
        OperationKind::Delete,
        OperationKind::BulkDelete,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// The most recent failed call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastError {
    pub operation: OperationKind,
    pub code: &'static str,
    pub message: String,
}

/// In-flight call counters
#[derive(Debug, Default)]
struct InFlight {
    counts: [AtomicUsize; 5],
}

impl InFlight {
    fn count(&self, kind: OperationKind) -> usize {
        self.counts[kind.index()].load(Ordering::SeqCst)
    }

    fn total(&self) -> usize {
        self.counts.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }
}

/// Marks a call as in flight until dropped
///
/// Dropping happens on settlement, on cancellation of the caller's future
/// and during unwinding, so `loading` can never stay stuck.
struct LoadingGuard<'a> {
    in_flight: &'a InFlight,
    kind: OperationKind,
}

impl<'a> LoadingGuard<'a> {
    fn enter(in_flight: &'a InFlight, kind: OperationKind) -> Self {
        in_flight.counts[kind.index()].fetch_add(1, Ordering::SeqCst);
        Self { in_flight, kind }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.counts[self.kind.index()].fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Write {
    Fetched,
    Created,
    Updated,
    Deleted,
}

/// Start sequence of the call that last wrote an id
#[derive(Debug, Clone, Copy)]
struct Stamp {
    seq: u64,
    write: Write,
}

impl Stamp {
    fn is_mutation(&self) -> bool {
        self.write != Write::Fetched
    }
}

#[derive(Debug)]
struct CacheState<R> {
    items: Vec<R>,
    stamps: HashMap<String, Stamp>,
    last_refetch: u64,
    pagination: Option<PaginationMeta>,
    last_error: Option<LastError>,
}

impl<R> Default for CacheState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            stamps: HashMap::new(),
            last_refetch: 0,
            pagination: None,
            last_error: None,
        }
    }
}

impl<R: Resource> CacheState<R> {
    /// Whether a mutation started at `seq` may write `id`
    fn accepts_mutation(&self, id: &str, seq: u64) -> bool {
        self.stamps
            .get(id)
            .is_none_or(|stamp| !stamp.is_mutation() || stamp.seq < seq)
    }

    fn upsert(&mut self, item: R, seq: u64, write: Write) {
        self.stamps
            .insert(item.id().to_string(), Stamp { seq, write });
        match self.items.iter().position(|i| i.id() == item.id()) {
            Some(index) => self.items[index] = item,
            None => self.items.push(item),
        }
    }

    fn delete(&mut self, id: &str, seq: u64) {
        self.stamps.insert(
            id.to_string(),
            Stamp {
                seq,
                write: Write::Deleted,
            },
        );
        self.items.retain(|item| item.id() != id);
    }

    /// Merge a list response started at `seq` into the cache
    fn apply_refetch(&mut self, seq: u64, page: Page<R>) {
        let mut next = Vec::with_capacity(page.items.len());
        let mut listed = HashSet::new();

        for fresh in page.items {
            if !listed.insert(fresh.id().to_string()) {
                continue;
            }
            match self.stamps.get(fresh.id()) {
                Some(stamp) if stamp.seq > seq => {
                    if stamp.write == Write::Deleted {
                        continue;
                    }
                    match self.items.iter().find(|i| i.id() == fresh.id()) {
                        Some(cached) => next.push(cached.clone()),
                        None => next.push(fresh),
                    }
                }
                _ => next.push(fresh),
            }
        }

        for cached in &self.items {
            if listed.contains(cached.id()) {
                continue;
            }
            let created_later = self
                .stamps
                .get(cached.id())
                .is_some_and(|s| s.seq > seq && s.write == Write::Created);
            if created_later {
                next.push(cached.clone());
            }
        }

        self.stamps.retain(|_, stamp| stamp.seq > seq);
        for item in &next {
            self.stamps
                .entry(item.id().to_string())
                .or_insert(Stamp {
                    seq,
                    write: Write::Fetched,
                });
        }
        self.items = next;
        self.last_refetch = seq;
        self.pagination = Some(page.pagination);
        self.last_error = None;
    }
}

/// Remote-backed controller for one resource type
///
/// All methods take `&self`, so calls can run concurrently (e.g. with
/// `tokio::join!`, or from tasks sharing an `Arc<RemoteController<R>>`).
pub struct RemoteController<R: Resource> {
    source: Arc<dyn DataSource<R>>,
    state: Mutex<CacheState<R>>,
    sequence: AtomicU64,
    in_flight: InFlight,
    timeout: Option<Duration>,
    closed: watch::Sender<bool>,
    bus: Option<EventBus>,
}

impl<R: Resource> RemoteController<R> {
    pub fn new(source: Arc<dyn DataSource<R>>) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            source,
            state: Mutex::new(CacheState::default()),
            sequence: AtomicU64::new(0),
            in_flight: InFlight::default(),
            timeout: None,
            closed,
            bus: None,
        }
    }

    /// Fail calls that do not settle within `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    // === State ===

    /// Snapshot of the cached items
    pub fn items(&self) -> Vec<R> {
        self.state().items.clone()
    }

    pub fn get(&self, id: &str) -> Option<R> {
        self.state().items.iter().find(|i| i.id() == id).cloned()
    }

    /// Pagination of the last applied list response
    pub fn pagination(&self) -> Option<PaginationMeta> {
        self.state().pagination
    }

    pub fn last_error(&self) -> Option<LastError> {
        self.state().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.state().last_error = None;
    }

    /// Whether any call is in flight
    pub fn is_loading(&self) -> bool {
        self.in_flight.total() > 0
    }

    pub fn is_loading_kind(&self, kind: OperationKind) -> bool {
        self.in_flight.count(kind) > 0
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Cancel in-flight calls and ignore every later result
    pub fn close(&self) {
        if !self.closed.send_replace(true) {
            tracing::debug!(resource = R::resource_name(), "remote controller closed");
        }
    }

    // === Operations ===

    /// Fetch a page and reconcile it into the cache; returns the cache
    pub async fn fetch_list(&self, params: ListParams) -> ConsoleResult<Vec<R>> {
        let seq = self.next_seq();
        let _loading = self.begin(OperationKind::List)?;
        let page = self
            .run(OperationKind::List, self.source.list(&params))
            .await?;

        let mut state = self.state();
        self.ensure_open()?;
        if seq < state.last_refetch {
            tracing::warn!(
                resource = R::resource_name(),
                seq,
                applied = state.last_refetch,
                "discarding stale list response"
            );
            return Ok(state.items.clone());
        }

        state.apply_refetch(seq, page);
        tracing::debug!(resource = R::resource_name(), seq, count = state.items.len(), "list applied");
        self.publish(ResourceEvent::Refreshed {
            resource: R::resource_name().to_string(),
            count: state.items.len(),
        });
        Ok(state.items.clone())
    }

    pub async fn create(&self, form: R::Form) -> ConsoleResult<R> {
        let seq = self.next_seq();
        let _loading = self.begin(OperationKind::Create)?;
        let item = self
            .run(OperationKind::Create, self.source.create(form))
            .await?;

        let mut state = self.state();
        self.ensure_open()?;
        state.last_error = None;
        if state.accepts_mutation(item.id(), seq) {
            state.upsert(item.clone(), seq, Write::Created);
            self.publish_item(&item, true);
        }
        Ok(item)
    }

    pub async fn update(&self, id: &str, form: R::Form) -> ConsoleResult<R> {
        let seq = self.next_seq();
        let _loading = self.begin(OperationKind::Update)?;
        let item = self
            .run(OperationKind::Update, self.source.update(id, form))
            .await?;

        let mut state = self.state();
        self.ensure_open()?;
        state.last_error = None;
        if state.accepts_mutation(id, seq) {
            state.upsert(item.clone(), seq, Write::Updated);
            self.publish_item(&item, false);
        } else {
            tracing::warn!(resource = R::resource_name(), id = %id, seq, "superseded update result ignored");
        }
        Ok(item)
    }

    pub async fn remove(&self, id: &str) -> ConsoleResult<()> {
        let seq = self.next_seq();
        let _loading = self.begin(OperationKind::Delete)?;
        self.run(OperationKind::Delete, self.source.delete(id))
            .await?;

        let mut state = self.state();
        self.ensure_open()?;
        state.last_error = None;
        if state.accepts_mutation(id, seq) {
            state.delete(id, seq);
            self.publish(ResourceEvent::Deleted {
                resource: R::resource_name().to_string(),
                id: id.to_string(),
            });
        } else {
            tracing::warn!(resource = R::resource_name(), id = %id, seq, "superseded delete result ignored");
        }
        Ok(())
    }

    /// Delete several resources; only ids the source reports as deleted leave the cache
    pub async fn bulk_remove(&self, ids: &[String]) -> ConsoleResult<BulkDeleteResult> {
        let seq = self.next_seq();
        let _loading = self.begin(OperationKind::BulkDelete)?;
        let result = self
            .run(OperationKind::BulkDelete, self.source.bulk_delete(ids))
            .await?;

        let mut state = self.state();
        self.ensure_open()?;
        state.last_error = None;
        let mut applied = Vec::new();
        for id in &result.deleted {
            if state.accepts_mutation(id, seq) {
                state.delete(id, seq);
                applied.push(id.clone());
            }
        }
        if !applied.is_empty() {
            self.publish(ResourceEvent::BulkDeleted {
                resource: R::resource_name().to_string(),
                ids: applied,
            });
        }
        Ok(result)
    }

    // === Internals ===

    fn next_seq(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn state(&self) -> MutexGuard<'_, CacheState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_open(&self) -> ConsoleResult<()> {
        if self.is_closed() {
            return Err(ConsoleError::Cancelled);
        }
        Ok(())
    }

    /// Mark a call of `kind` as loading until the returned guard drops
    ///
    /// Callers keep the guard until the result is merged into the cache.
    fn begin(&self, kind: OperationKind) -> ConsoleResult<LoadingGuard<'_>> {
        self.ensure_open()?;
        Ok(LoadingGuard::enter(&self.in_flight, kind))
    }

    /// Drive one source call under the timeout and close()
    async fn run<T, F>(&self, kind: OperationKind, call: F) -> ConsoleResult<T>
    where
        F: Future<Output = ConsoleResult<T>> + Send,
    {
        let mut closed = self.closed.subscribe();

        let timed = async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout {
                        timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    }
                    .into()),
                },
                None => call.await,
            }
        };

        let result = tokio::select! {
            result = timed => result,
            _ = closed.wait_for(|closed| *closed) => Err(ConsoleError::Cancelled),
        };

        if let Err(err) = &result {
            self.record_failure(kind, err);
        }
        result
    }

    fn record_failure(&self, kind: OperationKind, err: &ConsoleError) {
        if matches!(err, ConsoleError::Cancelled) || self.is_closed() {
            return;
        }
        tracing::warn!(resource = R::resource_name(), operation = ?kind, error = %err, "remote call failed");
        self.state().last_error = Some(LastError {
            operation: kind,
            code: err.error_code(),
            message: err.to_string(),
        });
    }

    fn publish_item(&self, item: &R, created: bool) {
        if self.bus.is_none() {
            return;
        }
        let resource = R::resource_name().to_string();
        let id = item.id().to_string();
        let data = serde_json::to_value(item).unwrap_or_default();
        self.publish(if created {
            ResourceEvent::Created { resource, id, data }
        } else {
            ResourceEvent::Updated { resource, id, data }
        });
    }

    fn publish(&self, event: ResourceEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(ConsoleEvent::Resource(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_guard_releases_on_drop() {
        let in_flight = InFlight::default();
        {
            let _a = LoadingGuard::enter(&in_flight, OperationKind::List);
            let _b = LoadingGuard::enter(&in_flight, OperationKind::List);
            assert_eq!(in_flight.count(OperationKind::List), 2);
            assert_eq!(in_flight.total(), 2);
        }
        assert_eq!(in_flight.total(), 0);
    }

    #[test]
    fn test_loading_guard_releases_on_panic() {
        let in_flight = InFlight::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = LoadingGuard::enter(&in_flight, OperationKind::Delete);
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(in_flight.count(OperationKind::Delete), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_loading_covers_cache_update() {
        use crate::resources::Operator;
        use crate::storage::InMemoryDataSource;

        let source = InMemoryDataSource::with_items(Operator::filter_specs(), Operator::fixtures())
            .unwrap()
            .with_latency(Duration::from_millis(20));
        let remote = Arc::new(RemoteController::new(Arc::new(source)));

        // Holding the cache lock keeps the settled list from being applied
        let state = remote.state();
        let task = tokio::spawn({
            let remote = remote.clone();
            async move { remote.fetch_list(ListParams::new(1, 5)).await }
        });
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(remote.is_loading_kind(OperationKind::List));
        assert!(state.items.is_empty());
        drop(state);

        let items = task.await.unwrap().unwrap();
        assert_eq!(items.len(), 5);
        assert!(!remote.is_loading());
        assert_eq!(remote.items().len(), 5);
    }

    #[test]
    fn test_operation_kind_indices_are_distinct() {
        let indices: HashSet<usize> = OperationKind::ALL.iter().map(|k| k.index()).collect();
        assert_eq!(indices.len(), OperationKind::ALL.len());
    }
}

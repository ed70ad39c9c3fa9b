//! In-memory data source for tests, demos and development

use crate::core::controller::ResourceController;
use crate::core::entity::Resource;
use crate::core::error::{ConsoleError, ConsoleResult};
use crate::core::filter::{FilterEngine, FilterSpec};
use crate::core::query::{BulkDeleteResult, ListParams, Page};
use crate::core::service::DataSource;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// In-memory data source backed by a [`ResourceController`]
///
/// Listing applies the same search, filters, sorting and pagination rules
/// the HTTP API does. An optional artificial latency makes concurrent calls
/// observable in tests and demos.
#[derive(Clone)]
pub struct InMemoryDataSource<R: Resource> {
    store: Arc<RwLock<ResourceController<R>>>,
    latency: Option<Duration>,
}

impl<R: Resource> InMemoryDataSource<R> {
    /// Create an empty data source
    pub fn new(specs: Vec<FilterSpec>) -> Self {
        Self {
            store: Arc::new(RwLock::new(ResourceController::new(specs))),
            latency: None,
        }
    }

    /// Create a data source seeded with fixtures
    pub fn with_items(specs: Vec<FilterSpec>, items: Vec<R>) -> ConsoleResult<Self> {
        let controller = ResourceController::new(specs).with_items(items)?;
        Ok(Self {
            store: Arc::new(RwLock::new(controller)),
            latency: None,
        })
    }

    /// Create a data source seeded with fixtures and a configured filter engine
    pub fn with_engine(engine: FilterEngine, items: Vec<R>) -> ConsoleResult<Self> {
        let controller = ResourceController::with_engine(engine).with_items(items)?;
        Ok(Self {
            store: Arc::new(RwLock::new(controller)),
            latency: None,
        })
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Filter specs used when listing
    pub fn filter_specs(&self) -> ConsoleResult<Vec<FilterSpec>> {
        let store = self
            .store
            .read()
            .map_err(|e| ConsoleError::Internal(format!("Failed to acquire read lock: {}", e)))?;
        Ok(store.engine().specs().to_vec())
    }

    /// Snapshot of every stored item, in insertion order
    pub fn snapshot(&self) -> ConsoleResult<Vec<R>> {
        let store = self
            .store
            .read()
            .map_err(|e| ConsoleError::Internal(format!("Failed to acquire read lock: {}", e)))?;
        Ok(store.list().to_vec())
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl<R: Resource> DataSource<R> for InMemoryDataSource<R> {
    async fn list(&self, params: &ListParams) -> ConsoleResult<Page<R>> {
        self.delay().await;
        let store = self
            .store
            .read()
            .map_err(|e| ConsoleError::Internal(format!("Failed to acquire read lock: {}", e)))?;

        Ok(store.query(params))
    }

    async fn get(&self, id: &str) -> ConsoleResult<R> {
        self.delay().await;
        let store = self
            .store
            .read()
            .map_err(|e| ConsoleError::Internal(format!("Failed to acquire read lock: {}", e)))?;

        store
            .get(id)
            .cloned()
            .ok_or_else(|| ConsoleError::not_found(R::resource_name(), id))
    }

    async fn create(&self, form: R::Form) -> ConsoleResult<R> {
        self.delay().await;
        let mut store = self
            .store
            .write()
            .map_err(|e| ConsoleError::Internal(format!("Failed to acquire write lock: {}", e)))?;

        store.create(form)
    }

    async fn update(&self, id: &str, form: R::Form) -> ConsoleResult<R> {
        self.delay().await;
        let mut store = self
            .store
            .write()
            .map_err(|e| ConsoleError::Internal(format!("Failed to acquire write lock: {}", e)))?;

        store.update(id, form)
    }

    async fn delete(&self, id: &str) -> ConsoleResult<()> {
        self.delay().await;
        let mut store = self
            .store
            .write()
            .map_err(|e| ConsoleError::Internal(format!("Failed to acquire write lock: {}", e)))?;

        store.remove(id).map(|_| ())
    }

    async fn bulk_delete(&self, ids: &[String]) -> ConsoleResult<BulkDeleteResult> {
        self.delay().await;
        let mut store = self
            .store
            .write()
            .map_err(|e| ConsoleError::Internal(format!("Failed to acquire write lock: {}", e)))?;

        Ok(store.bulk_remove(ids))
    }
}

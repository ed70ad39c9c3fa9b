//! Data source abstraction behind the remote controller

use crate::core::entity::Resource;
use crate::core::error::ConsoleResult;
use crate::core::query::{BulkDeleteResult, ListParams, Page};
use async_trait::async_trait;

/// Remote resource API for one resource type
///
/// Implementations own the storage (an in-memory fixture set, an HTTP API)
/// and report missing ids as `ResourceError::NotFound` and rejected forms as
/// `ValidationError::FieldErrors`.
#[async_trait]
pub trait DataSource<R: Resource>: Send + Sync {
    /// List one page of resources matching the search term and filters
    async fn list(&self, params: &ListParams) -> ConsoleResult<Page<R>>;

    /// Get a resource by id
    async fn get(&self, id: &str) -> ConsoleResult<R>;

    /// Create a resource from form data; the source assigns the id
    async fn create(&self, form: R::Form) -> ConsoleResult<R>;

    /// Replace a resource's fields from form data
    async fn update(&self, id: &str, form: R::Form) -> ConsoleResult<R>;

    /// Delete a resource
    async fn delete(&self, id: &str) -> ConsoleResult<()>;

    /// Delete every listed resource; unknown ids are reported, not rejected
    async fn bulk_delete(&self, ids: &[String]) -> ConsoleResult<BulkDeleteResult>;
}

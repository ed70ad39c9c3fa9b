//! HTTP handlers of the resource API
//!
//! Every handler answers with an [`Envelope`]; failures are rendered by
//! [`ConsoleError`](crate::core::error::ConsoleError)'s `IntoResponse` impl with `success: false`.

use crate::core::entity::Resource;
use crate::core::error::ConsoleResult;
use crate::core::filter::FilterSpec;
use crate::core::query::{BulkDeleteRequest, BulkDeleteResult, Envelope, ListParams};
use crate::core::service::DataSource;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;

/// Shared state of one resource collection's routes
pub struct ResourceState<R: Resource> {
    pub source: Arc<dyn DataSource<R>>,
    pub specs: Arc<Vec<FilterSpec>>,
}

impl<R: Resource> Clone for ResourceState<R> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            specs: self.specs.clone(),
        }
    }
}

/// `GET {base}?page&limit&sortBy&sortOrder&search&filters[..]`
pub async fn list_resources<R: Resource>(
    State(state): State<ResourceState<R>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ConsoleResult<Json<Envelope<Vec<R>>>> {
    let params = ListParams::from_query_pairs(&pairs, &state.specs);
    tracing::debug!(
        resource = R::collection_name(),
        page = params.page(),
        limit = params.limit(),
        filters = params.filters.active().count(),
        "list"
    );
    let page = state.source.list(&params).await?;
    Ok(Json(Envelope::paged(page.items, page.pagination)))
}

/// `GET {base}/{id}`
pub async fn get_resource<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
) -> ConsoleResult<Json<Envelope<R>>> {
    let item = state.source.get(&id).await?;
    Ok(Json(Envelope::ok(item)))
}

/// `POST {base}` with the form as JSON body
pub async fn create_resource<R: Resource>(
    State(state): State<ResourceState<R>>,
    body: Bytes,
) -> ConsoleResult<(StatusCode, Json<Envelope<R>>)> {
    let form: R::Form = serde_json::from_slice(&body)?;
    let item = state.source.create(form).await?;
    tracing::info!(resource = R::collection_name(), id = %item.id(), "created");
    Ok((StatusCode::CREATED, Json(Envelope::ok(item))))
}

/// `PUT {base}/{id}` with the form as JSON body
pub async fn update_resource<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ConsoleResult<Json<Envelope<R>>> {
    let form: R::Form = serde_json::from_slice(&body)?;
    let item = state.source.update(&id, form).await?;
    tracing::info!(resource = R::collection_name(), id = %id, "updated");
    Ok(Json(Envelope::ok(item)))
}

/// `DELETE {base}/{id}`
pub async fn delete_resource<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
) -> ConsoleResult<Json<Envelope<Value>>> {
    state.source.delete(&id).await?;
    tracing::info!(resource = R::collection_name(), id = %id, "deleted");
    Ok(Json(Envelope::ok(json!({ "id": id }))))
}

/// `POST {base}/bulk-delete` with `{"ids": [...]}`
pub async fn bulk_delete_resources<R: Resource>(
    State(state): State<ResourceState<R>>,
    body: Bytes,
) -> ConsoleResult<Json<Envelope<BulkDeleteResult>>> {
    let request: BulkDeleteRequest = serde_json::from_slice(&body)?;
    let result = state.source.bulk_delete(&request.ids).await?;
    tracing::info!(
        resource = R::collection_name(),
        deleted = result.deleted.len(),
        missing = result.missing.len(),
        "bulk deleted"
    );
    Ok(Json(Envelope::ok(result)))
}

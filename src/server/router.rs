//! Router builder for resource collections

use super::handlers::{
    ResourceState, bulk_delete_resources, create_resource, delete_resource, get_resource,
    list_resources, update_resource,
};
use crate::core::entity::Resource;
use crate::core::filter::FilterSpec;
use crate::core::service::DataSource;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

/// Build the routes of one resource collection under `/api/{collection}`
///
/// - GET    /api/{collection}             - List with search, filters, sorting, pagination
/// - POST   /api/{collection}             - Create from form data
/// - POST   /api/{collection}/bulk-delete - Delete several ids
/// - GET    /api/{collection}/{id}        - Get one resource
/// - PUT    /api/{collection}/{id}        - Replace from form data
/// - DELETE /api/{collection}/{id}        - Delete one resource
pub fn resource_router<R: Resource>(
    source: Arc<dyn DataSource<R>>,
    specs: Vec<FilterSpec>,
) -> Router {
    let base = format!("/api/{}", R::collection_name());
    let state = ResourceState {
        source,
        specs: Arc::new(specs),
    };

    Router::new()
        .route(&base, get(list_resources::<R>).post(create_resource::<R>))
        .route(
            &format!("{base}/bulk-delete"),
            post(bulk_delete_resources::<R>),
        )
        .route(
            &format!("{base}/{{id}}"),
            get(get_resource::<R>)
                .put(update_resource::<R>)
                .delete(delete_resource::<R>),
        )
        .with_state(state)
}

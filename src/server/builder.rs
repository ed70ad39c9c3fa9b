//! ServerBuilder for fluent API to build the resource API server

use super::router::resource_router;
use crate::core::entity::Resource;
use crate::core::filter::FilterSpec;
use crate::core::service::DataSource;
use anyhow::{Result, bail};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the resource API server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .register::<Operator>(
///         InMemoryDataSource::with_items(Operator::filter_specs(), Operator::fixtures())?,
///         Operator::filter_specs(),
///     )?
///     .serve("127.0.0.1:3000")
///     .await?;
/// ```
#[derive(Default)]
pub struct ServerBuilder {
    collections: Vec<&'static str>,
    resource_routes: Vec<Router>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a resource collection from a data source
    ///
    /// Fails when a resource with the same collection name is already registered.
    pub fn register<R: Resource>(
        self,
        source: impl DataSource<R> + 'static,
        specs: Vec<FilterSpec>,
    ) -> Result<Self> {
        self.register_shared::<R>(Arc::new(source), specs)
    }

    /// Serve a resource collection from a shared data source
    pub fn register_shared<R: Resource>(
        mut self,
        source: Arc<dyn DataSource<R>>,
        specs: Vec<FilterSpec>,
    ) -> Result<Self> {
        let collection = R::collection_name();
        if self.collections.contains(&collection) {
            bail!("Resource collection '{}' is already registered", collection);
        }

        tracing::debug!(collection, filters = specs.len(), "registering resource routes");
        self.collections.push(collection);
        self.resource_routes.push(resource_router(source, specs));
        Ok(self)
    }

    /// Add routes that don't fit the resource pattern
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Collection names registered so far
    pub fn collections(&self) -> &[&'static str] {
        &self.collections
    }

    /// Build the final router
    ///
    /// Contains `/health`, the routes of every registered resource and the
    /// custom routes, wrapped in request tracing and a permissive CORS layer.
    pub fn build(self) -> Result<Router> {
        let collections: Arc<Vec<String>> =
            Arc::new(self.collections.iter().map(|c| c.to_string()).collect());

        let mut app = Router::new()
            .route("/health", get(health_check))
            .route("/healthz", get(health_check))
            .with_state(collections);

        for routes in self.resource_routes {
            app = app.merge(routes);
        }
        for routes in self.custom_routes {
            app = app.merge(routes);
        }

        Ok(app
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

async fn health_check(State(collections): State<Arc<Vec<String>>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "resource-console",
        "resources": collections.as_ref(),
    }))
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

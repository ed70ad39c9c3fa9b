//! Shared test harness for data source testing
//!
//! Provides operator forms, fixture-backed sources and a helper spawning the
//! resource API on an ephemeral port.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod data_source_tests;

use console::prelude::*;
use console::resources::{Operator, OperatorForm};
use tokio::net::TcpListener;

/// A valid operator form
pub fn operator_form(name: &str, region: &str, status: &str) -> OperatorForm {
    OperatorForm {
        name: name.to_string(),
        status: status.to_string(),
        region: region.to_string(),
        phone: "+998 90 123 45 67".to_string(),
        citizenship: "UZ".to_string(),
    }
}

/// In-memory operators seeded with the fixture set
pub fn operator_source() -> InMemoryDataSource<Operator> {
    InMemoryDataSource::with_items(Operator::filter_specs(), Operator::fixtures())
        .expect("fixtures have unique ids")
}

/// Serve `source` on 127.0.0.1 and return the API root (`http://addr/api`)
pub async fn spawn_api<R: Resource>(source: InMemoryDataSource<R>, specs: Vec<FilterSpec>) -> String {
    let app = ServerBuilder::new()
        .register::<R>(source, specs)
        .expect("resource registers")
        .build()
        .expect("router builds");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port is available");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server runs");
    });

    format!("http://{addr}/api")
}

/// HTTP data source talking to a freshly spawned fixture API
pub async fn http_operator_source() -> HttpDataSource<Operator> {
    let api = spawn_api(operator_source(), Operator::filter_specs()).await;
    HttpDataSource::for_api(&api, Duration::from_secs(5)).expect("client builds")
}

/// Ids of a slice of resources, in order
pub fn ids<R: Resource>(items: &[R]) -> Vec<String> {
    items.iter().map(|item| item.id().to_string()).collect()
}

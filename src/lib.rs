//! # Resource Console
//!
//! Generic list/CRUD controllers for administrative console screens, with a
//! mock resource API to run them against.
//!
//! ## Features
//!
//! - **Filter Engine**: Pure, order-preserving search and select/multiselect/date/numeric filters
//! - **Resource Controller**: In-memory CRUD with staged deletes and bulk delete
//! - **Remote Controller**: Async CRUD over a data source, safe under overlapping calls
//! - **Pagination**: Page windows with ellipsis markers
//! - **Filter Panel**: Typed filter values with change events
//! - **Resource API**: axum routes serving any data source, plus an HTTP data source consuming them
//! - **Configuration-Based**: Filters and search fields declared in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use console::prelude::*;
//! use console::resources::{Operator, OperatorForm};
//!
//! let mut controller =
//!     ResourceController::<Operator>::new(Operator::filter_specs()).with_items(Operator::fixtures())?;
//!
//! controller.set_search_term("toshkent");
//! controller.set_filter("status", FilterValue::select("active"));
//! let visible = controller.filtered_list();
//!
//! let remote = RemoteController::new(Arc::new(
//!     HttpDataSource::<Operator>::for_api("http://localhost:3000/api", Duration::from_secs(10))?,
//! ));
//! let operators = remote.fetch_list(ListParams::new(1, 20)).await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod resources;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        entity::Resource,
        field::{FieldFormat, FieldValue},
        service::DataSource,
    };

    // === Controllers ===
    pub use crate::core::{
        controller::ResourceController,
        filter_panel::FilterPanel,
        pagination::{PageItem, Pager, page_window},
        remote::{LastError, OperationKind, RemoteController},
    };

    // === Filtering & Queries ===
    pub use crate::core::{
        filter::{FilterEngine, FilterKind, FilterOption, FilterSpec, FilterValue, FilterValues},
        query::{BulkDeleteResult, Envelope, ListParams, Page, PaginationMeta, SortOrder},
    };

    // === Errors & Events ===
    pub use crate::core::{
        error::{ConsoleError, ConsoleResult},
        events::{ConsoleEvent, EventBus, FilterChange, ResourceEvent},
    };

    // === Validation ===
    pub use crate::core::validation::{FormRules, validators};

    // === Macros ===
    pub use crate::impl_resource;

    // === Storage ===
    pub use crate::storage::{HttpDataSource, InMemoryDataSource};

    // === Config ===
    pub use crate::config::{ConsoleConfig, RemoteConfig, ResourceConfig, ServerConfig};

    // === Server ===
    pub use crate::server::{ServerBuilder, resource_router};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use std::time::Duration;
}

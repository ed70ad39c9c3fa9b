//! Core module containing the resource abstraction, the filter engine and
//! the list controllers

pub mod controller;
pub mod entity;
pub mod error;
pub mod events;
pub mod field;
pub mod filter;
pub mod filter_panel;
pub mod pagination;
pub mod query;
pub mod remote;
pub mod service;
pub mod validation;

pub use controller::ResourceController;
pub use entity::Resource;
pub use error::{ConsoleError, ConsoleResult};
pub use events::{ConsoleEvent, EventBus, FilterChange, ResourceEvent};
pub use field::{FieldFormat, FieldValue};
pub use filter::{FilterEngine, FilterKind, FilterSpec, FilterValue, FilterValues};
pub use filter_panel::FilterPanel;
pub use pagination::{PageItem, Pager, page_window};
pub use query::{BulkDeleteResult, Envelope, ListParams, Page, PaginationMeta, SortOrder};
pub use remote::{LastError, OperationKind, RemoteController};
pub use service::DataSource;

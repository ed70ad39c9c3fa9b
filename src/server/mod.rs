//! Server module for serving resource collections over HTTP
//!
//! `ServerBuilder` registers one route set per resource:
//! - list with search, filters, sorting and pagination
//! - get, create, update and delete of single resources
//! - bulk delete
//!
//! plus a `/health` route listing the registered collections.

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::ResourceState;
pub use router::resource_router;

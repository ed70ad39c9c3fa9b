//! Data source implementations

pub mod http;
pub mod in_memory;

pub use http::HttpDataSource;
pub use in_memory::InMemoryDataSource;

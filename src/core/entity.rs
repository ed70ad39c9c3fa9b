//! Resource trait defining the core abstraction for every console record

use crate::core::error::ConsoleResult;
use crate::core::field::FieldValue;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Base trait for every record managed by a console screen.
///
/// All resources have:
/// - id: Unique string identifier
/// - name: Human-readable display name
/// - status: One of [`Resource::statuses`]
/// - created_at: Creation timestamp, never changed by updates
///
/// Every other field is replaced from a submitted [`Resource::Form`] on update.
/// Use the [`impl_resource!`](crate::impl_resource) macro to generate an
/// implementation from a struct definition.
pub trait Resource: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Form data submitted on create and update
    type Form: Clone + Send + Sync + Serialize + DeserializeOwned + 'static;

    /// Singular resource name used in messages (e.g., "operator")
    fn resource_name() -> &'static str;

    /// Plural collection name used in URLs and config (e.g., "operators")
    fn collection_name() -> &'static str;

    /// Allowed status values
    fn statuses() -> &'static [&'static str];

    /// Fields matched by free-text search
    fn search_fields() -> &'static [&'static str];

    // === Core Fields ===

    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn status(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    /// Get the value of a field by its serialized (camelCase) or Rust name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    // === Form handling ===

    /// Validate submitted form data; errors name every invalid field
    fn validate(form: &Self::Form) -> ConsoleResult<()>;

    /// Build a resource from validated form data
    ///
    /// `id` and `created_at` are supplied by the caller so that updates keep
    /// the identity of the record they replace.
    fn from_form(id: String, created_at: DateTime<Utc>, form: Self::Form) -> Self;

    /// Check if the resource is active
    fn is_active(&self) -> bool {
        self.status() == "active"
    }
}

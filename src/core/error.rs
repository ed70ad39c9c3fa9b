//! Typed error handling for the console core
//!
//! Every fallible operation in the crate returns a [`ConsoleError`], so callers
//! can match on the category instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: rejected form data or filter input
//! - [`ResourceError`]: operations targeting missing or duplicate resources
//! - [`TransportError`]: failures talking to a remote resource API
//! - [`ConfigError`]: configuration parsing and validation
//!
//! # Example
//!
//! ```rust,ignore
//! match controller.remove("99") {
//!     Ok(removed) => println!("removed {}", removed.id()),
//!     Err(ConsoleError::Resource(ResourceError::NotFound { id, .. })) => {
//!         println!("{} is already gone", id);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type of the console core
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Form or filter input was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The targeted resource does not exist (or already exists)
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The remote resource API could not be reached or answered with a failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The owning view was closed while the call was in flight
    #[error("Operation cancelled: the controller was closed")]
    Cancelled,

    /// `confirm_delete` was called without a staged delete
    #[error("No delete is pending confirmation")]
    NothingPending,

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body rendered by the resource API
///
/// Shares the `success`/`error` keys of the success envelope so that clients
/// can decode both with the same type.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Human-readable error message
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ConsoleError {
    /// HTTP status code used when this error crosses the API boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConsoleError::Validation(_) => StatusCode::BAD_REQUEST,
            ConsoleError::Resource(e) => e.status_code(),
            ConsoleError::Transport(e) => e.status_code(),
            ConsoleError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ConsoleError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            ConsoleError::NothingPending => StatusCode::CONFLICT,
            ConsoleError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::Validation(_) => "VALIDATION_ERROR",
            ConsoleError::Resource(e) => e.error_code(),
            ConsoleError::Transport(e) => e.error_code(),
            ConsoleError::Config(_) => "CONFIG_ERROR",
            ConsoleError::Cancelled => "CANCELLED",
            ConsoleError::NothingPending => "NOTHING_PENDING",
            ConsoleError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error names a resource that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConsoleError::Resource(ResourceError::NotFound { .. }))
    }

    /// Field errors carried by a validation failure, if any
    pub fn field_errors(&self) -> &[FieldValidationError] {
        match self {
            ConsoleError::Validation(ValidationError::FieldErrors(errors)) => errors,
            _ => &[],
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.error_code().to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ConsoleError::Resource(ResourceError::NotFound { resource, id }) => {
                Some(serde_json::json!({ "resource": resource, "id": id }))
            }
            ConsoleError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }

    pub(crate) fn not_found(resource: &str, id: &str) -> Self {
        ConsoleError::Resource(ResourceError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        })
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Resource Errors
// =============================================================================

/// Errors related to resource lookups
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Resource was not found
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: String },

    /// Resource already exists (conflict)
    #[error("{resource} with id '{id}' already exists")]
    AlreadyExists { resource: String, id: String },
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResourceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ResourceError::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ResourceError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            ResourceError::AlreadyExists { .. } => "RESOURCE_ALREADY_EXISTS",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more form fields are invalid
    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON format
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    /// A filter id that no spec declares
    #[error("Unknown filter '{filter_id}'")]
    UnknownFilter { filter_id: String },

    /// A filter value whose shape does not match the spec kind
    #[error("Filter '{filter_id}' expects a {expected} value")]
    FilterKindMismatch {
        filter_id: String,
        expected: &'static str,
    },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors raised while talking to a remote resource API
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server could not be reached
    #[error("Failed to reach {url}: {message}")]
    Connection { url: String, message: String },

    /// The call did not settle within the configured timeout
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Non-success HTTP status
    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },

    /// The envelope reported `success: false`
    #[error("Request failed: {message}")]
    Api { message: String },

    /// The response body could not be decoded
    #[error("Failed to decode response: {message}")]
    Decode { message: String },
}

impl TransportError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TransportError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::Connection { .. } => "TRANSPORT_CONNECTION",
            TransportError::Timeout { .. } => "TRANSPORT_TIMEOUT",
            TransportError::Status { .. } => "TRANSPORT_STATUS",
            TransportError::Api { .. } => "TRANSPORT_API",
            TransportError::Decode { .. } => "TRANSPORT_DECODE",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for ConsoleError {
    fn from(err: serde_yaml::Error) -> Self {
        ConsoleError::Config(ConfigError::ParseError {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        ConsoleError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

/// A specialized Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_and_status() {
        let err = ConsoleError::not_found("operator", "99");
        assert!(err.to_string().contains("operator"));
        assert!(err.to_string().contains("'99'"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "RESOURCE_NOT_FOUND");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_error_multiple_fields() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError::new("name", "must not be empty"),
            FieldValidationError::new("status", "must be one of [active, inactive]"),
        ]);
        let display = err.to_string();
        assert!(display.contains("name"));
        assert!(display.contains("status"));

        let err: ConsoleError = err.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_error_response_carries_details() {
        let response = ConsoleError::not_found("device", "d-1").to_response();
        assert!(!response.success);
        assert_eq!(response.code, "RESOURCE_NOT_FOUND");
        assert_eq!(response.details.unwrap()["id"], "d-1");
    }

    #[test]
    fn test_transport_error_codes() {
        let timeout: ConsoleError = TransportError::Timeout { timeout_ms: 50 }.into();
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(timeout.error_code(), "TRANSPORT_TIMEOUT");

        let status: ConsoleError = TransportError::Status {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(status.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: ConsoleError = json_err.into();
        assert!(matches!(
            err,
            ConsoleError::Validation(ValidationError::InvalidJson { .. })
        ));
    }
}

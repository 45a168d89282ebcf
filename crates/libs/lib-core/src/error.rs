//! # Centralized Error Handling
//!
//! This module defines the error type [`HookError`] shared by hooks, the
//! pipeline driver and the HTTP layer. It follows the `thiserror` pattern.
//!
//! ## Error Categories
//!
//! 1. **Client Errors** (4xx) - the record handed to a hook is unusable
//!    - [`MissingData`](HookError::MissingData) → 400 Bad Request
//!    - [`MalformedData`](HookError::MalformedData) → 400 Bad Request
//!    - [`InvalidBody`](HookError::InvalidBody) → 400 Bad Request
//!    - [`PayloadTooLarge`](HookError::PayloadTooLarge) → 413 Payload Too Large
//!
//! 2. **Server Errors** (5xx)
//!    - [`Config`](HookError::Config) → 500 Internal Server Error
//!    - [`Internal`](HookError::Internal) → 500 Internal Server Error
//!
//! 3. **Pipeline Errors**
//!    - [`Hook`](HookError::Hook) wraps the failure of a named hook and takes
//!      the status of the inner error.
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{HookError, Result};
//! use serde_json::Value;
//!
//! fn require_object(data: &Value) -> Result<()> {
//!     if !data.is_object() {
//!         return Err(HookError::MalformedData("expected an object".to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

/// Convenience type alias for `Result<T, HookError>`.
pub type Result<T> = std::result::Result<T, HookError>;

/// Error type for every hook and pipeline failure.
#[derive(Debug, Error)]
pub enum HookError {
    /// The context carries no `data` record.
    ///
    /// **HTTP Status**: 400 Bad Request
    #[error("Context has no data")]
    MissingData,

    /// The context `data` is present but is not a JSON object.
    ///
    /// **HTTP Status**: 400 Bad Request
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// An HTTP request body could not be parsed as JSON.
    ///
    /// **HTTP Status**: 400 Bad Request
    #[error("Invalid body: {0}")]
    InvalidBody(String),

    /// An HTTP request body exceeded the configured limit (bytes).
    ///
    /// **HTTP Status**: 413 Payload Too Large
    #[error("Payload too large: limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// A named hook inside a pipeline failed.
    #[error("Hook '{hook}' failed: {source}")]
    Hook {
        hook: &'static str,
        #[source]
        source: Box<HookError>,
    },

    /// Configuration error during startup or environment loading.
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (unexpected failures).
    ///
    /// **HTTP Status**: 500 Internal Server Error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HookError {
    /// Wrap this error with the name of the hook that produced it.
    pub fn in_hook(self, hook: &'static str) -> Self {
        HookError::Hook {
            hook,
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping any [`Hook`](HookError::Hook) wrappers.
    pub fn root(&self) -> &HookError {
        match self {
            HookError::Hook { source, .. } => source.root(),
            other => other,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HookError::MissingData | HookError::MalformedData(_) | HookError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            HookError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            HookError::Hook { source, .. } => source.status_code(),
            HookError::Config(_) | HookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message.
    ///
    /// For internal errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            HookError::Config(_) | HookError::Internal(_) => "An internal error occurred".to_string(),
            HookError::Hook { source, .. } => source.user_message(),
            other => other.to_string(),
        }
    }

    /// Stable error code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self.root() {
            HookError::MissingData => "MissingData",
            HookError::MalformedData(_) => "MalformedData",
            HookError::InvalidBody(_) => "InvalidBody",
            HookError::PayloadTooLarge(_) => "PayloadTooLarge",
            HookError::Config(_) => "Config",
            HookError::Internal(_) => "Internal",
            HookError::Hook { .. } => "Hook",
        }
    }
}

/// Implement Axum's `IntoResponse` for automatic error handling.
impl IntoResponse for HookError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Server error: {}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }

        let body = Json(json!({
            "error": self.user_message(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

/// Convert `anyhow::Error` to `HookError`.
impl From<anyhow::Error> for HookError {
    fn from(err: anyhow::Error) -> Self {
        HookError::Internal(err.to_string())
    }
}

/// Convert `serde_json::Error` to `HookError`.
impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        HookError::InvalidBody(format!("JSON error: {}", err))
    }
}

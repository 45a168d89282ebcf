//! # HTTP Request Handlers
//!
//! Handlers sit behind the [`run_hooks`](crate::middleware::run_hooks)
//! middleware, so every record they receive has already been stamped.
//!
//! ## Handler Modules
//!
//! - **[`records`]**: Record write endpoints
//!   - `POST /api/records` - Create a record
//!   - `PUT /api/records/{id}` - Replace a record
//!   - `PATCH /api/records/{id}` - Patch a record

pub mod records;

/// Liveness probe.
///
/// **Route**: `GET /health`
pub async fn health() -> &'static str {
    "OK"
}

//! # Middleware
//!
//! Axum middleware for request stamping, logging, and running record hooks.
//!
//! ## Modules
//!
//! - **[`mw_req_stamp`]**: Request ID and receive time stamping
//! - **[`mw_logging`]**: Structured request/response logging
//! - **[`mw_hooks`]**: Runs the hook pipeline over JSON request bodies

// region: --- Modules
pub mod mw_hooks;
pub mod mw_logging;
pub mod mw_req_stamp;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_hooks::run_hooks;
pub use mw_logging::log_requests;
pub use mw_req_stamp::{stamp_req, RequestStamp};
// endregion: --- Re-exports

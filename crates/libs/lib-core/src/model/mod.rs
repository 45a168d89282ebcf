//! # Model
//!
//! Per-request data threaded through the hook pipeline.

// region: --- Modules
pub mod context;
// endregion: --- Modules

// region: --- Re-exports
pub use context::{Context, Method};
// endregion: --- Re-exports

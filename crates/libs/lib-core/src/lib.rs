//! # Core Library
//!
//! Request context model, hooks, the hook pipeline, configuration and errors.

pub mod clock;
pub mod config;
pub mod error;
pub mod hooks;
pub mod model;
pub mod pipeline;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{HookError, Result};
pub use hooks::{update_timestamps, Hook, UpdateTimestamps};
pub use model::context::{Context, Method};
pub use pipeline::Pipeline;

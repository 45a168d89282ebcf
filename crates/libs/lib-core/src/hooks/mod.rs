//! # Hooks
//!
//! A hook is one narrow step of the request pipeline: it receives the
//! request [`Context`], may mutate it, and reports success or failure.
//!
//! ## Modules
//!
//! - **[`timestamps`]**: `updatedAt` / `createdAt` stamping

// region: --- Modules
pub mod timestamps;
// endregion: --- Modules

// region: --- Re-exports
pub use timestamps::{update_timestamps, UpdateTimestamps};
// endregion: --- Re-exports

use crate::error::Result;
use crate::model::Context;
use async_trait::async_trait;

/// Hook trait that every pipeline step implements.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Name used in logs and in [`HookError::Hook`](crate::HookError::Hook).
    fn name(&self) -> &'static str;

    /// Run the hook against the context.
    async fn run(&self, ctx: &mut Context) -> Result<()>;
}

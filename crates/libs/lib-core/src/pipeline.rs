//! # Hook Pipeline
//!
//! Ordered list of [`Hook`]s run against one [`Context`].
//!
//! Hooks run in insertion order. The first failure stops the chain and is
//! returned wrapped in [`HookError::Hook`] with the failing hook's name;
//! later hooks do not run.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lib_core::{Context, Pipeline, UpdateTimestamps};
//! use serde_json::json;
//!
//! async fn stamp() -> lib_core::Result<()> {
//!     let pipeline = Pipeline::new().with(UpdateTimestamps::new());
//!     let mut ctx = Context::create(json!({}));
//!     pipeline.run(&mut ctx).await
//! }
//! ```

use crate::config::Config;
use crate::error::{HookError, Result};
use crate::hooks::{Hook, UpdateTimestamps};
use crate::model::Context;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered hook chain, cheap to clone and share across requests.
#[derive(Clone, Default)]
pub struct Pipeline {
    hooks: Vec<Arc<dyn Hook>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain holding only the timestamp hook built from `config`.
    pub fn default_chain(config: &Config) -> Self {
        Self::new().with(UpdateTimestamps::from_config(config))
    }

    /// Append a hook (builder style).
    pub fn with(mut self, hook: impl Hook + 'static) -> Self {
        self.push(hook);
        self
    }

    /// Append a hook.
    pub fn push(&mut self, hook: impl Hook + 'static) {
        self.hooks.push(Arc::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hook names in run order.
    pub fn names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    /// Run every hook in order, stopping at the first failure.
    pub async fn run(&self, ctx: &mut Context) -> Result<()> {
        for hook in &self.hooks {
            debug!(hook = hook.name(), method = %ctx.method, "[PIPELINE] running hook");

            if let Err(err) = hook.run(ctx).await {
                warn!(hook = hook.name(), error = %err, "[PIPELINE] hook failed");
                return Err(err.in_hook(hook.name()));
            }
        }

        Ok(())
    }

    /// Continuation form of [`run`](Self::run): `done` is called exactly once.
    pub async fn run_with<F>(&self, ctx: &mut Context, done: F)
    where
        F: FnOnce(Option<HookError>),
    {
        done(self.run(ctx).await.err())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("hooks", &self.names()).finish()
    }
}

//! # Timestamp Hook
//!
//! Sets the update timestamp on the record of a [`Context`] and, for
//! records being created, the creation timestamp.
//!
//! ## Usage
//!
//! ```rust
//! use lib_core::{update_timestamps, Context};
//! use serde_json::json;
//!
//! let mut ctx = Context::create(json!({}));
//! update_timestamps(&mut ctx, |err| assert!(err.is_none()));
//! assert!(ctx.timestamp("updatedAt").is_some());
//! ```

use crate::clock::{Clock, SystemClock};
use crate::config::{core_config, Config};
use crate::error::{HookError, Result};
use crate::hooks::Hook;
use crate::model::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lib_utils::format_time;
use serde_json::Value;
use tracing::debug;

/// Hook that stamps `updatedAt` (and `createdAt` on create).
#[derive(Debug, Clone)]
pub struct UpdateTimestamps<C = SystemClock> {
    clock: C,
    updated_at_field: String,
    created_at_field: String,
    stamp_created_at: bool,
}

impl UpdateTimestamps<SystemClock> {
    /// Hook using the global configuration and the system clock.
    pub fn new() -> Self {
        Self::from_config(core_config())
    }

    /// Hook using `config` and the system clock.
    pub fn from_config(config: &Config) -> Self {
        Self {
            clock: SystemClock,
            updated_at_field: config.updated_at_field.clone(),
            created_at_field: config.created_at_field.clone(),
            stamp_created_at: config.stamp_created_at,
        }
    }
}

impl Default for UpdateTimestamps<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> UpdateTimestamps<C> {
    /// Swap the time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> UpdateTimestamps<C2> {
        UpdateTimestamps {
            clock,
            updated_at_field: self.updated_at_field,
            created_at_field: self.created_at_field,
            stamp_created_at: self.stamp_created_at,
        }
    }

    pub fn updated_at_field(&self) -> &str {
        &self.updated_at_field
    }

    pub fn created_at_field(&self) -> &str {
        &self.created_at_field
    }

    /// Stamp the record and return the instant written.
    ///
    /// `createdAt` is only written on create, and never over a value the
    /// caller already supplied.
    pub fn apply(&self, ctx: &mut Context) -> Result<DateTime<Utc>> {
        let is_new = ctx.is_new();
        let data = ctx.data_object_mut()?;

        let now = self.clock.now();
        let stamp = Value::String(format_time(now));

        data.insert(self.updated_at_field.clone(), stamp.clone());

        if is_new && self.stamp_created_at && !data.contains_key(&self.created_at_field) {
            data.insert(self.created_at_field.clone(), stamp);
        }

        debug!(
            method = %ctx.method,
            id = ?ctx.id,
            at = %now,
            "[HOOK] update_timestamps"
        );

        Ok(now)
    }
}

#[async_trait]
impl<C: Clock> Hook for UpdateTimestamps<C> {
    fn name(&self) -> &'static str {
        "update_timestamps"
    }

    async fn run(&self, ctx: &mut Context) -> Result<()> {
        self.apply(ctx).map(|_| ())
    }
}

/// Continuation form of the hook.
///
/// Stamps `ctx` with the global configuration and the system clock, then
/// calls `done` exactly once: with `None` on success, with the error
/// otherwise. Never panics on a missing or malformed record.
pub fn update_timestamps<F>(ctx: &mut Context, done: F)
where
    F: FnOnce(Option<HookError>),
{
    done(UpdateTimestamps::new().apply(ctx).err())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, ManualClock};
    use crate::model::Method;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use std::cell::Cell;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn fixed_hook() -> UpdateTimestamps<FixedClock> {
        UpdateTimestamps::from_config(&Config::default()).with_clock(FixedClock(fixed_now()))
    }

    #[test]
    fn test_update_timestamps_sets_updated_at() {
        let mut ctx = Context::new(Method::Update).with_data(json!({}));
        let calls = Cell::new(0);

        update_timestamps(&mut ctx, |err| {
            assert!(err.is_none());
            calls.set(calls.get() + 1);
        });

        assert_eq!(calls.get(), 1);
        assert!(ctx.timestamp("updatedAt").is_some());
    }

    #[test]
    fn test_update_timestamps_reports_missing_data() {
        let mut ctx = Context::new(Method::Patch);
        let calls = Cell::new(0);

        update_timestamps(&mut ctx, |err| {
            assert!(matches!(err, Some(HookError::MissingData)));
            calls.set(calls.get() + 1);
        });

        assert_eq!(calls.get(), 1);
        assert!(ctx.data.is_none());
    }

    #[test]
    fn test_malformed_data_is_left_alone() {
        let mut ctx = Context::new(Method::Patch).with_data(json!("not a record"));

        let err = fixed_hook().apply(&mut ctx).unwrap_err();

        assert!(matches!(err, HookError::MalformedData(_)));
        assert_eq!(ctx.data, Some(json!("not a record")));
    }

    #[test]
    fn test_create_stamps_created_at_with_same_instant() {
        let mut ctx = Context::create(json!({ "text": "hello" }));

        let at = fixed_hook().apply(&mut ctx).unwrap();

        assert_eq!(at, fixed_now());
        assert_eq!(
            ctx.data,
            Some(json!({
                "text": "hello",
                "updatedAt": "2024-01-01T00:00:00.000Z",
                "createdAt": "2024-01-01T00:00:00.000Z",
            }))
        );
    }

    #[test]
    fn test_create_keeps_supplied_created_at() {
        let mut ctx = Context::create(json!({ "createdAt": "2020-05-05T05:05:05.000Z" }));

        fixed_hook().apply(&mut ctx).unwrap();

        assert_eq!(
            ctx.timestamp("createdAt"),
            Some(Utc.with_ymd_and_hms(2020, 5, 5, 5, 5, 5).unwrap())
        );
        assert_eq!(ctx.timestamp("updatedAt"), Some(fixed_now()));
    }

    #[test]
    fn test_update_and_patch_do_not_add_created_at() {
        for method in [Method::Update, Method::Patch] {
            let mut ctx = Context::new(method).with_id("42").with_data(json!({}));

            fixed_hook().apply(&mut ctx).unwrap();

            assert_eq!(ctx.timestamp("updatedAt"), Some(fixed_now()));
            assert_eq!(ctx.timestamp("createdAt"), None);
        }
    }

    #[test]
    fn test_created_at_can_be_disabled() {
        let config = Config {
            stamp_created_at: false,
            ..Config::default()
        };
        let hook = UpdateTimestamps::from_config(&config).with_clock(FixedClock(fixed_now()));
        let mut ctx = Context::create(json!({}));

        hook.apply(&mut ctx).unwrap();

        assert_eq!(ctx.data, Some(json!({ "updatedAt": "2024-01-01T00:00:00.000Z" })));
    }

    #[test]
    fn test_custom_field_names() {
        let config = Config {
            updated_at_field: "modified".to_string(),
            created_at_field: "born".to_string(),
            stamp_created_at: true,
        };
        let hook = UpdateTimestamps::from_config(&config).with_clock(FixedClock(fixed_now()));
        let mut ctx = Context::create(json!({}));

        hook.apply(&mut ctx).unwrap();

        assert_eq!(hook.updated_at_field(), "modified");
        assert_eq!(hook.created_at_field(), "born");
        assert_eq!(ctx.timestamp("modified"), Some(fixed_now()));
        assert_eq!(ctx.timestamp("born"), Some(fixed_now()));
        assert_eq!(ctx.timestamp("updatedAt"), None);
    }

    #[test]
    fn test_second_run_never_goes_backward() {
        let hook = UpdateTimestamps::from_config(&Config::default())
            .with_clock(ManualClock::new(fixed_now()));
        let mut ctx = Context::new(Method::Patch).with_data(json!({}));

        hook.apply(&mut ctx).unwrap();
        let first = ctx.timestamp("updatedAt").unwrap();

        hook.clock.advance(Duration::milliseconds(250));
        hook.apply(&mut ctx).unwrap();
        let second = ctx.timestamp("updatedAt").unwrap();

        assert!(second >= first);
        assert_eq!(second - first, Duration::milliseconds(250));
    }

    #[test]
    fn test_system_clock_runs_are_monotonic() {
        let hook = UpdateTimestamps::from_config(&Config::default());
        let mut ctx = Context::new(Method::Update).with_data(json!({}));

        hook.apply(&mut ctx).unwrap();
        let first = ctx.timestamp("updatedAt").unwrap();
        hook.apply(&mut ctx).unwrap();
        let second = ctx.timestamp("updatedAt").unwrap();

        assert!(second >= first);
    }

    #[tokio::test]
    async fn test_hook_trait_run() {
        let hook = fixed_hook();
        let mut ctx = Context::create(json!({}));

        hook.run(&mut ctx).await.unwrap();

        assert_eq!(hook.name(), "update_timestamps");
        assert_eq!(ctx.timestamp("updatedAt"), Some(fixed_now()));
    }
}

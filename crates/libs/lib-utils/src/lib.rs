//! # Utilities Library
//!
//! Shared utility functions for environment variables and time.

pub mod envs;
pub mod time;

// Re-export commonly used functions
pub use envs::{get_env, get_env_or, get_env_parse, get_env_parse_or};
pub use time::{now_utc, format_time, parse_utc};

//! # Hook Configuration
//!
//! This module manages hook configuration loaded from environment variables.
//! Configuration is validated on startup to fail fast if misconfigured.
//!
//! ## Global Config Access
//!
//! Use [`core_config()`] to access the global configuration instance:
//!
//! ```rust,no_run
//! use lib_core::config::core_config;
//!
//! let config = core_config();
//! let field = &config.updated_at_field;
//! ```
//!
//! Call [`init_config()`] once at application startup to load the environment.
//! Without it, [`core_config()`] hands out [`Config::default()`].

use lib_utils::{get_env_or, get_env_parse_or};
use std::sync::OnceLock;

/// Default field receiving the update timestamp.
pub const DEFAULT_UPDATED_AT_FIELD: &str = "updatedAt";

/// Default field receiving the creation timestamp.
pub const DEFAULT_CREATED_AT_FIELD: &str = "createdAt";

/// Hook configuration loaded from environment variables.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Field set to "now" on every write (`HOOK_UPDATED_AT_FIELD`).
    pub updated_at_field: String,

    /// Field set to "now" when a record is created (`HOOK_CREATED_AT_FIELD`).
    pub created_at_field: String,

    /// Whether creates also receive `created_at_field` (`HOOK_STAMP_CREATED_AT`).
    pub stamp_created_at: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            updated_at_field: DEFAULT_UPDATED_AT_FIELD.to_string(),
            created_at_field: DEFAULT_CREATED_AT_FIELD.to_string(),
            stamp_created_at: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let updated_at_field = get_env_or("HOOK_UPDATED_AT_FIELD", DEFAULT_UPDATED_AT_FIELD)
            .trim()
            .to_string();
        let created_at_field = get_env_or("HOOK_CREATED_AT_FIELD", DEFAULT_CREATED_AT_FIELD)
            .trim()
            .to_string();

        let stamp_created_at = get_env_parse_or("HOOK_STAMP_CREATED_AT", true)
            .map_err(|_| "HOOK_STAMP_CREATED_AT must be 'true' or 'false'".to_string())?;

        Ok(Self {
            updated_at_field,
            created_at_field,
            stamp_created_at,
        })
    }

    /// Validate field names.
    pub fn validate(&self) -> Result<(), String> {
        if self.updated_at_field != self.updated_at_field.trim()
            || self.created_at_field != self.created_at_field.trim()
        {
            return Err("Timestamp field names cannot have surrounding whitespace".to_string());
        }

        if self.updated_at_field.trim().is_empty() {
            return Err("HOOK_UPDATED_AT_FIELD cannot be empty".to_string());
        }

        if self.created_at_field.trim().is_empty() {
            return Err("HOOK_CREATED_AT_FIELD cannot be empty".to_string());
        }

        if self.updated_at_field == self.created_at_field {
            return Err("HOOK_UPDATED_AT_FIELD and HOOK_CREATED_AT_FIELD must differ".to_string());
        }

        Ok(())
    }
}

/// Global configuration instance (initialized once at startup).
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Initialize the global configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Environment variables are invalid
/// - Configuration validation fails
/// - Config has already been initialized (or already read through [`core_config()`])
pub fn init_config() -> Result<(), String> {
    let config = Config::from_env()?;
    config.validate()?;

    CONFIG.set(config)
        .map_err(|_| "Config has already been initialized".to_string())
}

/// Get a reference to the global configuration.
pub fn core_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

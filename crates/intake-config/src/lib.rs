//! Loading the intake rule configuration.
//!
//! The configuration file carries the per-column rules, the required
//! column list and optional `[annotation]` / `[store]` tables.

pub mod error;
pub mod loader;
pub mod paths;

pub use error::{ConfigError, Result};
pub use loader::{IntakeConfig, load_config, parse_config};
pub use paths::{
    ConfigFormat, ConfigLocation, ConfigOrigin, DEFAULT_CONFIG_FILE, RULES_ENV_VAR, locate_config,
};

//! Configuration loading.
//!
//! This module loads the session settings from `procline.toml`.

pub mod error;
pub mod loader;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, DEFAULT_CONFIG_FILE};

//! Session configuration models for `procline.toml`.
//!
//! This module defines the structure of the configuration file that
//! controls how an interactive session presents itself and reports errors.

use serde::Deserialize;
use serde::Serialize;

/// Represents settings from `procline.toml`.
///
/// Every field is optional in the file; missing fields take their defaults.
///
/// # Example
///
/// ```toml
/// # procline.toml
/// prompt = "> "
/// line_separator = "\n"
/// log_filter = "info"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Text written before each input line.
    pub prompt: String,

    /// Terminator appended to every failure message written to the
    /// connection.
    pub line_separator: String,

    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt: "$ ".to_string(),
            line_separator: "\n".to_string(),
            log_filter: "warn".to_string(),
        }
    }
}

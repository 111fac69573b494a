//! Configuration file loader for `procline.toml`.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use pl_protocol::config_models::SessionConfig;
use std::path::Path;

/// File name looked up when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "procline.toml";

/// Loads the session configuration from `path`.
///
/// A missing file is not an error: the defaults are returned instead.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML or has fields of the wrong type
/// - `line_separator` is empty
///
/// # Example
///
/// ```rust,no_run
/// use pl_core::config::loader::load_config;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("procline.toml"))?;
/// println!("prompt: {}", config.prompt);
/// # Ok(())
/// # }
/// ```
pub fn load_config(path: &Path) -> ConfigResult<SessionConfig> {
    // If the file doesn't exist, return defaults
    if !path.exists() {
        return Ok(SessionConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let config: SessionConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;

    validate(path, &config)?;
    Ok(config)
}

fn validate(path: &Path, config: &SessionConfig) -> ConfigResult<()> {
    if config.line_separator.is_empty() {
        return Err(ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            reason: "line_separator must not be empty".to_string(),
        });
    }
    Ok(())
}

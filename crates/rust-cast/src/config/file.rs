//! File-based configuration loading.
//!
//! A config file is TOML with the same shape as [`RecordConfig`]:
//!
//! ```toml
//! typing = "instant"
//! capture = "ansi"
//! seed = 7
//!
//! [header]
//! title = "demo"
//! idle_time_limit = 2.0
//! ```

use std::path::Path;

use super::RecordConfig;
use crate::error::{CastError, Result};

/// Parse a configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RecordConfig> {
    let config: RecordConfig =
        toml::from_str(content).map_err(|e| CastError::config(e.message().to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<RecordConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| CastError::input_read(path, e))?;
    parse_config(&content).map_err(|e| match e {
        CastError::Config { message } => {
            CastError::config(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

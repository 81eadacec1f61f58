//! Error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading [`DispatchConfig`](crate::config::DispatchConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured file does not exist.
    #[error("Config file not found: {0}")]
    MissingFile(PathBuf),

    /// The `config` crate failed to build or deserialize.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

//! Dispatcher configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Runtime knobs for [`ErrorMapLayer`](crate::layer::ErrorMapLayer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Carry the recorded errors onto a response produced by a matched action.
    pub keep_recorded_errors: bool,
    /// Emit a debug event when a recorded error matches no map.
    pub log_unmatched: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            keep_recorded_errors: true,
            log_unmatched: true,
        }
    }
}

/// Loads [`DispatchConfig`] from an optional file and the environment.
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader reading `ERRMAP__*` variables and no file.
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: "ERRMAP".to_string(),
        }
    }

    /// Set config file path. The format follows the file extension.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Set environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration. Environment variables override the file.
    pub fn load(&self) -> Result<DispatchConfig, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.clone()));
            }
            info!(path = %path.display(), "Loading error map config file");
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::Path};
use tracing::debug;

/// Set by the local launcher; only changes the startup banner.
pub const RUNNING_LOCALLY_ENV: &str = "SERVER_RUNNING_LOCALLY";

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(config_path).await
}

pub async fn load_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from: {}", path.display());

    let config_str = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    let config: Config = serde_yaml::from_str(&config_str)
        .map_err(|e| Error::config(format!("invalid {}: {}", path.display(), e)))?;

    config.validate()?;
    Ok(config)
}

impl Config {
    /// Rejects bundles whose required keys are present but blank.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("api_key", &self.api_key),
            ("model_name", &self.model_name),
            ("data_file_name", &self.data_file_name),
            ("target", &self.target),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config(format!("missing required key '{}'", key)));
            }
        }

        if self.model.base_url.trim().is_empty() {
            return Err(Error::config("model.base_url must not be empty"));
        }

        Ok(())
    }

    /// Browser URL that signs the caller in with the configured key.
    pub fn access_url(&self) -> String {
        format!("http://127.0.0.1:{}?api_key={}", self.server.port, self.api_key)
    }
}

pub fn running_locally() -> bool {
    env::var(RUNNING_LOCALLY_ENV)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

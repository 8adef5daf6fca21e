use serde::{Deserialize, Serialize};
use sl_data::EndpointSet;
use sl_types::{config_error, SlResult};
use std::path::Path;

/// Environment variable overriding [`SyncConfig::base_url`].
pub const BASE_URL_ENV: &str = "SIGHTLINE_BASE_URL";
/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_ENV: &str = "SIGHTLINE_CONFIG";

/// Where the synchronizer fetches from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub base_url: String,
    pub endpoints: EndpointSet,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            endpoints: EndpointSet::default(),
        }
    }
}

impl SyncConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    /// Load from a JSON file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SlResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: SyncConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the file named by `SIGHTLINE_CONFIG`, then
    /// `SIGHTLINE_BASE_URL`.
    pub fn from_env() -> SlResult<Self> {
        let config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `SIGHTLINE_BASE_URL` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            self.base_url = base_url;
        }
        self
    }

    pub fn validate(&self) -> SlResult<()> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(config_error!("base_url must not be empty"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(config_error!("base_url must be an http(s) URL, got '{}'", base));
        }
        for (name, path) in [
            ("summary", &self.endpoints.summary),
            ("timeseries", &self.endpoints.timeseries),
            ("risks", &self.endpoints.risks),
        ] {
            if path.trim().is_empty() {
                return Err(config_error!("endpoint path for {} must not be empty", name));
            }
        }
        Ok(())
    }
}

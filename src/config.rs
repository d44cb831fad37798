//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL override and the last used username.
//!
//! Configuration is stored at `~/.config/petrack/config.json`. The base URL
//! can also be overridden with the `PETRACK_API_URL` environment variable
//! (a `.env` file is honored).

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "petrack";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Base URL of the Pet Manager API
/// (Swagger: https://pet-manager-api.geia.vip/q/swagger-ui/)
const DEFAULT_API_BASE_URL: &str = "https://pet-manager-api.geia.vip";

/// Environment variable overriding the API base URL
const API_URL_ENV_VAR: &str = "PETRACK_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
    /// Cache directory override, mainly for tests; defaults to the
    /// platform cache dir when unset.
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let path = Self::config_path()?;
        let mut config: Self = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                config.api_base_url = Some(url);
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The API base URL, without a trailing slash.
    pub fn base_url(&self) -> String {
        let url = self
            .api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL);
        url.trim_end_matches('/').to_string()
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

//! Application settings

use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Host-wide settings shared by every web part instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Upper bound for a data fetch, in milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Upper bound for loading all dependencies of an instance, in milliseconds
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,
    /// Base URL third-party libraries are loaded from
    #[serde(default = "default_cdn_base")]
    pub cdn_base: String,
    /// Result-count cap applied to every remote query
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_load_timeout_ms() -> u64 {
    15_000
}

fn default_cdn_base() -> String {
    "https://cdnjs.cloudflare.com/ajax/libs".to_string()
}

fn default_max_records() -> usize {
    100
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
            load_timeout_ms: default_load_timeout_ms(),
            cdn_base: default_cdn_base(),
            max_records: default_max_records(),
        }
    }
}

impl AppSettings {
    /// Load settings from the user config directory, falling back to
    /// built-in defaults when the file is missing or unreadable
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings.json, using built-in defaults: {}", e);
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let settings = Self::load_from_path(&config_path)?;
        info!("Loaded settings from {:?}", config_path);
        Ok(settings)
    }

    /// Load settings from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the settings file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "vizpart", "vizpart")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("settings.json"))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// CDN base without a trailing slash
    pub fn cdn_base(&self) -> &str {
        self.cdn_base.trim_end_matches('/')
    }
}

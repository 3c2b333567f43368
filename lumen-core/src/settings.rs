//! Editor settings.
//!
//! Built-in defaults, overridden field by field from
//! `<config_dir>/lumen/config.toml`, then by `LUMEN_URL` and finally by an
//! explicit backend URL from the command line.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use serde::Deserialize;

use crate::error::SettingsError;

pub const URL_ENV_VAR: &str = "LUMEN_URL";

/// Polling faster than this just hammers the backend.
const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub tempo_step: f64,
    pub request_timeout_ms: u64,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            poll_interval_ms: 1000,
            tempo_step: 5.0,
            request_timeout_ms: 5000,
            log_level: "info".to_string(),
        }
    }
}

/// `<config_dir>/lumen`, where settings, keybindings and the log live.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lumen"))
}

fn user_settings_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

impl Settings {
    /// Defaults merged with the user's config file, if there is one.
    pub fn load() -> Result<Self, SettingsError> {
        match user_settings_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    pub fn with_env(self) -> Self {
        let url = env::var(URL_ENV_VAR).ok();
        self.with_base_url(url)
    }

    /// Override the backend URL. Blank values are ignored.
    pub fn with_base_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().trim_end_matches('/').to_string();
        }
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

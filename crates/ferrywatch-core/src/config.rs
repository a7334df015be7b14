//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the alerts API base URL, the guest identity hint and the list page size.
//!
//! Configuration is stored at `~/.config/ferrywatch/config.json`. Values
//! from the environment (`FERRYWATCH_API_URL`, `FERRYWATCH_IDENTITY`,
//! `FERRYWATCH_TOKEN`) take precedence; the token is never written to disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_API_BASE_URL;
use crate::models::request::DEFAULT_PER_PAGE;

/// Application name used for the config directory path
const APP_NAME: &str = "ferrywatch";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const ENV_API_URL: &str = "FERRYWATCH_API_URL";
const ENV_IDENTITY: &str = "FERRYWATCH_IDENTITY";
const ENV_TOKEN: &str = "FERRYWATCH_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    /// Identifies a guest (e.g. by email) when no token is available.
    pub identity_hint: Option<String>,
    pub per_page: Option<u32>,
    #[serde(skip)]
    pub token: Option<String>,
}

impl Config {
    /// Load from the default path, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Override fields from variables found by `lookup`. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_blank(ENV_API_URL) {
            self.api_base_url = Some(url);
        }
        if let Some(identity) = non_blank(ENV_IDENTITY) {
            self.identity_hint = Some(identity);
        }
        if let Some(token) = non_blank(ENV_TOKEN) {
            self.token = Some(token);
        }
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.filter(|&n| n > 0).unwrap_or(DEFAULT_PER_PAGE)
    }
}

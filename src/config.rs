//! Configuration Management
//!
//! Handles persistent configuration storage for wordbook.

use crate::api::ApiSettings;
use crate::resource::{BookIdentity, BookSchema, TitlePolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Service address used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8010";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Base URL of the words/books service
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Request deadline in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub book_title_policy: TitlePolicy,
    #[serde(default)]
    pub book_identity: BookIdentity,
    /// Where tracked state is kept
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl Config {
    /// Directory holding config, state and log files
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("wordbook"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective endpoint (CLI/env > config > default)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Get effective state file (CLI > config > config dir)
    pub fn effective_state_file(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.state_file.clone())
            .or_else(|| Self::config_dir().map(|p| p.join("state.json")))
            .unwrap_or_else(|| PathBuf::from("wordbook-state.json"))
    }

    pub fn book_schema(&self) -> BookSchema {
        BookSchema {
            title: self.book_title_policy,
            identity: self.book_identity,
        }
    }

    /// Build connection settings for the effective endpoint
    pub fn api_settings(&self, cli_endpoint: Option<&str>) -> Result<ApiSettings> {
        let endpoint = self.effective_endpoint(cli_endpoint);
        let mut settings = ApiSettings::new(&endpoint)
            .with_context(|| format!("Invalid service endpoint '{}'", endpoint))?;
        if let Some(secs) = self.timeout_secs {
            settings = settings.with_timeout(Duration::from_secs(secs));
        }
        Ok(settings)
    }

    /// Set endpoint and save
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<()> {
        ApiSettings::new(endpoint)
            .with_context(|| format!("Invalid service endpoint '{}'", endpoint))?;
        self.endpoint = Some(endpoint.to_string());
        self.save()
    }
}

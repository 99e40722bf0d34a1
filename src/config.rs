use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use crate::controller::autocomplete::AutocompleteSettings;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub autocomplete: AutocompleteConfig,
    #[serde(default)]
    pub journal: JournalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteConfig {
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_journal_path")]
    pub csv_path: String,
}

fn default_base_url() -> String { "http://127.0.0.1:8000".to_string() }
fn default_request_timeout() -> u64 { 30 }
fn default_debounce() -> u64 { 300 }
fn default_min_query_chars() -> usize { 2 }
fn default_cache_ttl() -> u64 { 60 }
fn default_journal_path() -> String { "predictions.csv".to_string() }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            min_query_chars: default_min_query_chars(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            csv_path: default_journal_path(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AutocompleteConfig {
    pub fn settings(&self) -> AutocompleteSettings {
        AutocompleteSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            min_query_chars: self.min_query_chars,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub api_url: Option<String>,
    pub skip_health_check: bool,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Like `load`, but a missing file means built-in defaults
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            tracing::warn!("Config file {} not found, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(url) = &env.api_url {
            self.api.base_url = url.clone();
        }
    }
}

impl EnvConfig {
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        Self {
            api_url: std::env::var("PREDICT_API_URL").ok().filter(|v| !v.is_empty()),
            skip_health_check: std::env::var("PREDICT_SKIP_HEALTH_CHECK")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::orchestrator;
use crate::runtime::RuntimeConfig;

/// Configuration for a Nabi session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Per-turn timeout in seconds
    pub timeout_secs: u64,
    /// Recursion limit passed to the agent runtime
    pub recursion_limit: u32,
    /// Tool-call concurrency passed to the agent runtime
    pub max_concurrency: u32,
    /// Opening assistant greeting
    pub greeting: Option<String>,
    /// API keys (alternative to environment variables)
    #[serde(default)]
    pub api_keys: ApiKeys,
}

/// API key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub weathermap: Option<String>,
    pub perplexity: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            timeout_secs: orchestrator::DEFAULT_TIMEOUT.as_secs(),
            recursion_limit: runtime.recursion_limit,
            max_concurrency: runtime.max_concurrency,
            greeting: None,
            api_keys: ApiKeys::default(),
        }
    }
}

impl SessionConfig {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nabi")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for NABI_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("NABI_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to parse config file, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "failed to read config file, using defaults");
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        SessionConfig::default().save()?;
        Ok(path)
    }

    /// The per-turn budget as a [`Duration`].
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Runtime configuration with this file's limits applied.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            recursion_limit: self.recursion_limit,
            max_concurrency: self.max_concurrency,
            ..RuntimeConfig::default()
        }
    }

    /// Get an API key for a collaborator, checking config then env
    pub fn get_api_key(&self, service: &str) -> Option<String> {
        let from_config = match service {
            "weathermap" => self.api_keys.weathermap.clone(),
            "perplexity" => self.api_keys.perplexity.clone(),
            _ => None,
        };

        if from_config.is_some() {
            return from_config;
        }

        let env_var = match service {
            "weathermap" => "WEATHERMAP_API_KEY",
            "perplexity" => "PERPLEXITY_API_KEY",
            _ => return None,
        };

        std::env::var(env_var).ok()
    }
}

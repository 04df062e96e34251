//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.prisme.toml` files, and resolving the Gemini API key.

use crate::analysis::roster::{Roster, DEFAULT_THINKERS};
use crate::generation::GeminiConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use tracing::{debug, info};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".prisme.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Gemini model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Gemini API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key. Prefer the GEMINI_API_KEY environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_api_url(),
            api_key: None,
            timeout_seconds: None,
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Thinkers every subject is analyzed through, in order.
    #[serde(default = "default_thinkers")]
    pub thinkers: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thinkers: default_thinkers(),
        }
    }
}

fn default_thinkers() -> Vec<String> {
    DEFAULT_THINKERS.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must load. Otherwise `default_path` is used when it
    /// exists and defaults apply when it does not. A default file that exists
    /// but does not parse is an error: it may be the one holding the API key.
    pub fn resolve(explicit: Option<&Path>, default_path: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config from: {}", path.display());
            return Self::load(path);
        }

        if default_path.exists() {
            let config = Self::load(default_path)?;
            info!("Loaded default config from {}", default_path.display());
            Ok(config)
        } else {
            debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and the environment variables backing them) take
    /// precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref api_url) = args.api_url {
            self.model.api_url = api_url.clone();
        }
        if let Some(ref api_key) = args.api_key {
            self.model.api_key = Some(api_key.clone());
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = Some(timeout);
        }
    }

    /// The API key, or an error if none was configured.
    pub fn api_key(&self) -> Result<&str> {
        match self.model.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => bail!(
                "GEMINI_API_KEY is not set. Define it in the environment or a .env file \
                 (or pass --api-key)"
            ),
        }
    }

    /// Socket address the server binds to.
    ///
    /// The host may be an IPv4 or IPv6 literal or a resolvable hostname.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let host = self.server.host.trim();
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        (host, self.server.port)
            .to_socket_addrs()
            .with_context(|| format!("Invalid bind address: {}", self.server.host))?
            .next()
            .with_context(|| format!("No address found for host: {}", self.server.host))
    }

    /// Gemini client settings. Fails if the API key is missing.
    pub fn gemini(&self) -> Result<GeminiConfig> {
        Ok(GeminiConfig {
            api_url: self.model.api_url.clone(),
            model: self.model.name.clone(),
            api_key: self.api_key()?.to_string(),
            timeout_seconds: self.model.timeout_seconds,
        })
    }

    /// The thinker roster built from the analysis settings.
    pub fn roster(&self) -> Result<Roster> {
        Roster::new(&self.analysis.thinkers).context("Invalid [analysis] thinkers")
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

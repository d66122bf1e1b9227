//! Gateway configuration model.
//!
//! Loaded from a JSON file; every section has defaults so a file holding only
//! `api_keys` is a complete configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::error::ConfigError;

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Root configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Validate)]
pub struct GatewayConfig {
    /// Provider API keys, one pool credential each
    #[serde(default)]
    pub api_keys: Vec<String>,
    /// Legacy single-key form, folded into `api_keys`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,
    #[serde(default)]
    #[validate(nested)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    #[validate(nested)]
    pub upstream: UpstreamConfig,
}

impl GatewayConfig {
    /// All configured keys in order, legacy `api_key` first.
    ///
    /// Fails with `NoCredentials` when the list is empty or any entry is blank.
    pub fn credentials(&self) -> Result<Vec<String>, ConfigError> {
        let keys: Vec<String> = self
            .api_key
            .iter()
            .chain(self.api_keys.iter())
            .map(|k| k.trim().to_string())
            .collect();

        if keys.is_empty() || keys.iter().any(String::is_empty) {
            return Err(ConfigError::NoCredentials);
        }
        Ok(keys)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    #[validate(length(min = 1_u64))]
    pub host: String,
    #[serde(default = "default_port")]
    #[validate(range(min = 1_u16))]
    pub port: u16,
    /// Maximum accepted request body (images are inlined, so this is large)
    #[serde(default = "default_body_limit")]
    #[validate(range(min = 1024_usize))]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), body_limit_bytes: default_body_limit() }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4949
}

fn default_body_limit() -> usize {
    100 * 1024 * 1024
}

/// Retry executor settings. Timeouts are milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct RetryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_retries")]
    #[validate(range(max = 20_u32))]
    pub retries: u32,
    #[serde(default = "default_factor")]
    #[validate(range(min = 1.0_f64, max = 10.0_f64))]
    pub factor: f64,
    #[serde(default = "default_min_timeout", alias = "minTimeout")]
    pub min_timeout: u64,
    #[serde(default = "default_max_timeout", alias = "maxTimeout")]
    pub max_timeout: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            retries: default_retries(),
            factor: default_factor(),
            min_timeout: default_min_timeout(),
            max_timeout: default_max_timeout(),
        }
    }
}

fn default_retries() -> u32 {
    5
}

fn default_factor() -> f64 {
    2.0
}

fn default_min_timeout() -> u64 {
    1000
}

fn default_max_timeout() -> u64 {
    5000
}

/// Debug switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebugConfig {
    #[serde(default)]
    pub stream: StreamDebugConfig,
}

/// Raw stream increment capture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamDebugConfig {
    /// Write every streamed call's raw increments to `dir`
    #[serde(default)]
    pub log: bool,
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

impl Default for StreamDebugConfig {
    fn default() -> Self {
        Self { log: false, dir: default_log_dir() }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

/// Provider endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,
    #[serde(default)]
    #[validate(nested)]
    pub proxy: UpstreamProxyConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), proxy: UpstreamProxyConfig::default() }
    }
}

fn default_base_url() -> String {
    DEFAULT_PROVIDER_BASE_URL.to_string()
}

/// Explicit outbound proxy. When disabled, reqwest falls back to the
/// `HTTPS_PROXY`/`HTTP_PROXY`/`NO_PROXY` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct UpstreamProxyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
}

use std::fs;
use std::path::Path;

use gembridge_types::{ConfigError, GatewayConfig};
use validator::Validate;

/// Default config file, resolved against the working directory.
pub const CONFIG_FILE: &str = "genai.config.json";

/// Load, validate and sanity-check the gateway configuration.
///
/// A config without at least one non-blank API key is rejected here so the
/// server never starts with an empty credential pool.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound { path: path.display().to_string() });
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::from_io_error(&e))?;
    let config = parse_config(&content)?;

    tracing::info!(
        "Loaded config from {} ({} credential(s), retry {})",
        path.display(),
        config.credentials()?.len(),
        if config.retry.enabled { "on" } else { "off" }
    );
    Ok(config)
}

/// Parse and validate a config document.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig =
        serde_json::from_str(content).map_err(|e| ConfigError::from_json_error(&e))?;
    config.validate().map_err(|e| ConfigError::from_validation(&e))?;
    config.credentials()?;
    Ok(config)
}

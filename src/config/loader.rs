// src/config/loader.rs

use crate::config::{AppConfig, ConfigValidator};
use crate::error::{Result, SyncError};
use secrecy::SecretString;
use std::path::Path;
use tracing::{debug, info, warn};

pub const ENV_BASE_URL: &str = "SETTINGS_SYNC_BASE_URL";
pub const ENV_AUTH_TOKEN: &str = "SETTINGS_SYNC_AUTH_TOKEN";
pub const ENV_REQUEST_TIMEOUT: &str = "SETTINGS_SYNC_REQUEST_TIMEOUT";

/// Load configuration from file or defaults, then apply environment overrides
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    let mut config = if config_path.exists() {
        info!("Loading configuration from file: {}", config_path.display());
        load_from_file(config_path)?
    } else {
        info!("Configuration file not found, using defaults");
        AppConfig::default()
    };

    override_with_env(&mut config);

    ConfigValidator::validate(&config)?;

    debug!("Configuration loaded and validated successfully");
    Ok(config)
}

/// Load a configuration file that must exist, as `check-config` does
pub fn load_existing_config(config_path: &Path) -> Result<AppConfig> {
    if !config_path.exists() {
        return Err(SyncError::ConfigNotFound {
            path: config_path.display().to_string(),
        });
    }
    load_config(config_path)
}

fn load_from_file(config_path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(config_path).map_err(|e| SyncError::Io {
        operation: "read_config".to_string(),
        message: format!("Failed to read {}: {e}", config_path.display()),
    })?;

    serde_yaml::from_str(&content).map_err(|e| SyncError::ConfigParse {
        message: format!("Failed to parse config file: {e}"),
        line: e.location().map(|loc| loc.line()),
    })
}

fn override_with_env(config: &mut AppConfig) {
    if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
        info!("Overriding base URL from environment variable: {}", base_url);
        config.client.base_url = base_url;
    }

    if let Ok(token) = std::env::var(ENV_AUTH_TOKEN) {
        info!("Overriding auth token from environment variable");
        config.client.auth_token = Some(SecretString::new(token));
    }

    if let Ok(timeout_str) = std::env::var(ENV_REQUEST_TIMEOUT) {
        if let Ok(timeout) = timeout_str.parse::<u64>() {
            info!("Overriding request timeout from environment: {}s", timeout);
            config.client.request_timeout_secs = timeout;
        } else {
            warn!("Invalid {} environment variable: {}", ENV_REQUEST_TIMEOUT, timeout_str);
        }
    }
}

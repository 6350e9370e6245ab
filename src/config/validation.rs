// src/config/validation.rs

use crate::config::AppConfig;
use crate::error::{Result, SyncError};
use tracing::{debug, warn};
use url::Url;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> Result<()> {
        debug!("Starting configuration validation");

        if let Err(e) = Self::validate_client(config) {
            warn!("Client config validation failed: {}", e);
            return Err(e);
        }
        debug!("Client config validation passed");

        if let Err(e) = Self::validate_token(config) {
            warn!("Token config validation failed: {}", e);
            return Err(e);
        }
        debug!("Token config validation passed");

        // Building the registry runs its structural checks.
        let registry = match config.registry() {
            Ok(registry) => registry,
            Err(e) => {
                warn!("Group validation failed: {}", e);
                return Err(e);
            }
        };
        debug!("Group validation passed");

        // The token slot must stay outside every group payload.
        if let Some(key) = registry.field_keys().find(|key| *key == config.token.key) {
            return Err(SyncError::config(
                format!("Field key '{key}' collides with the token key"),
                Some("token.key"),
            ));
        }

        debug!("Configuration validation completed successfully");
        Ok(())
    }

    fn validate_client(config: &AppConfig) -> Result<()> {
        Self::validate_url(&config.client.base_url, "client.base_url")?;

        if let Some(proxy_url) = config.client.proxy_url.as_deref() {
            Self::validate_proxy_url(proxy_url)?;
        }

        if config.client.connect_timeout_secs == 0 {
            return Err(SyncError::config(
                "Connect timeout cannot be 0",
                Some("client.connect_timeout_secs"),
            ));
        }

        if config.client.request_timeout_secs == 0 {
            return Err(SyncError::config(
                "Request timeout cannot be 0",
                Some("client.request_timeout_secs"),
            ));
        }

        if !config.list_endpoint.starts_with('/') {
            return Err(SyncError::config(
                format!("List endpoint must be an absolute path: {}", config.list_endpoint),
                Some("list_endpoint"),
            ));
        }

        Ok(())
    }

    fn validate_token(config: &AppConfig) -> Result<()> {
        if config.token.key.trim().is_empty() {
            return Err(SyncError::config("Token key cannot be empty", Some("token.key")));
        }
        if !config.token.reset_endpoint.starts_with('/') {
            return Err(SyncError::config(
                format!(
                    "Token reset endpoint must be an absolute path: {}",
                    config.token.reset_endpoint
                ),
                Some("token.reset_endpoint"),
            ));
        }
        Ok(())
    }

    fn validate_url(url_str: &str, field_name: &str) -> Result<()> {
        let url = Url::parse(url_str).map_err(|e| {
            SyncError::config(format!("Invalid URL '{url_str}': {e}"), Some(field_name))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SyncError::config(
                format!("Unsupported URL scheme '{scheme}' in {url_str}"),
                Some(field_name),
            )),
        }
    }

    fn validate_proxy_url(proxy_url: &str) -> Result<()> {
        if proxy_url.trim().is_empty() {
            return Ok(());
        }
        let url = Url::parse(proxy_url).map_err(|e| {
            SyncError::config(format!("Invalid proxy URL '{proxy_url}': {e}"), Some("client.proxy_url"))
        })?;

        match url.scheme() {
            "http" | "https" | "socks5" => Ok(()),
            scheme => Err(SyncError::config(
                format!("Unsupported proxy scheme '{scheme}'"),
                Some("client.proxy_url"),
            )),
        }
    }
}

// src/lib.rs

// --- Модули ---
pub mod busy;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod liveness;
pub mod page;
pub mod save;
pub mod schema;
pub mod store;
pub mod token;
pub mod transport;

// --- Зависимости и пере-экспорты ---
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

pub use config::AppConfig;
pub use error::{Result, SyncError};
pub use page::{Collaborators, SettingsPage};
pub use schema::{FieldDescriptor, FieldKind, GroupId, GroupSchema, Registry};
pub use transport::{HttpTransport, Transport};

pub const DEFAULT_CONFIG_PATH: &str = "settings-sync.yaml";
pub const ENV_CONFIG_PATH: &str = "SETTINGS_SYNC_CONFIG";

/// Загружает и логирует конфигурацию.
pub fn setup_configuration(config_path_override: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = config_path_override.unwrap_or_else(|| {
        std::env::var(ENV_CONFIG_PATH).map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    });

    let config_path_display = config_path.display().to_string();
    if config_path.exists() {
        info!(config.path = %config_path_display, "Using configuration file");
    } else {
        info!(config.path = %config_path_display, "Optional configuration file not found. Using defaults and environment variables.");
    }

    let app_config = config::load_config(&config_path).map_err(|e| {
        error!(
            config.path = %config_path_display,
            error = ?e,
            "Failed to load or validate configuration."
        );
        e
    })?;

    info!(
        client.base_url = %app_config.client.base_url,
        config.groups.custom = !app_config.groups.is_empty(),
        "Configuration loaded and validated successfully."
    );
    Ok(app_config)
}

/// Собирает страницу настроек поверх HTTP-транспорта.
pub fn build_page(config: &AppConfig, collaborators: Collaborators) -> Result<SettingsPage> {
    let transport = HttpTransport::new(&config.client)?;
    SettingsPage::new(config, Arc::new(transport), collaborators)
}

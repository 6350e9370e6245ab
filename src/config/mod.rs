// src/config/mod.rs

pub mod app;
pub mod loader;
pub mod validation;

pub use app::{AppConfig, ClientConfig, TokenConfig};
pub use loader::{load_config, load_existing_config};
pub use validation::ConfigValidator;

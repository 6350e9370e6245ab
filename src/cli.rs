use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "settings-sync",
    version,
    about = "View and edit grouped remote settings",
    long_about = "Fetches the integration settings of an admin backend, lets you edit them and saves one group at a time, and manages the backend access token."
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "SETTINGS_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "SETTINGS_SYNC_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the configured groups and their fields
    Groups,

    /// Fetch and print current values
    Show {
        /// Only print this group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Fetch, apply edits and save one group
    Save {
        /// Group to save
        group: String,

        /// Field edit, repeatable
        #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },

    /// Regenerate the access token
    ResetToken,

    /// Validate configuration file
    CheckConfig {
        /// Configuration file to validate
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

// src/config/app.rs

use crate::error::Result;
use crate::schema::{GroupId, GroupSchema, Registry};
use crate::transport::DEFAULT_SUCCESS_CODE;
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub auth_token: Option<SecretString>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub proxy_url: Option<String>,
    #[serde(default = "default_success_code")]
    pub success_code: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            proxy_url: None,
            success_code: default_success_code(),
        }
    }
}

/// Where the access token lives among the fetched items.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    #[serde(default = "default_token_key")]
    pub key: String,
    #[serde(default = "default_token_group")]
    pub group: GroupId,
    #[serde(default = "default_reset_endpoint")]
    pub reset_endpoint: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            key: default_token_key(),
            group: default_token_group(),
            reset_endpoint: default_reset_endpoint(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub token: TokenConfig,
    /// Custom group table; the built-in one is used when empty.
    #[serde(default)]
    pub groups: Vec<GroupSchema>,
    /// Label id → display text.
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default = "default_list_endpoint")]
    pub list_endpoint: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            token: TokenConfig::default(),
            groups: Vec::new(),
            labels: HashMap::new(),
            list_endpoint: default_list_endpoint(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://127.0.0.1:5244/api".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_success_code() -> i64 {
    DEFAULT_SUCCESS_CODE
}

fn default_token_key() -> String {
    "token".to_string()
}

fn default_token_group() -> GroupId {
    GroupId::new("0")
}

fn default_reset_endpoint() -> String {
    "/admin/setting/reset_token".to_string()
}

fn default_list_endpoint() -> String {
    "/admin/setting/list".to_string()
}

impl AppConfig {
    /// The registry this configuration describes.
    pub fn registry(&self) -> Result<Registry> {
        if self.groups.is_empty() {
            Ok(Registry::builtin())
        } else {
            Registry::new(self.groups.clone())
        }
    }
}

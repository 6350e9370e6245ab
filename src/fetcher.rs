// src/fetcher.rs

use crate::error::{Result, SyncError};
use crate::schema::GroupId;
use crate::transport::Transport;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// One remote configuration entry as reported by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingItem {
    pub key: String,
    #[serde(default)]
    pub value: String,
    pub group: GroupId,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<i64>,
}

impl SettingItem {
    pub fn new(key: impl Into<String>, value: impl Into<String>, group: impl Into<GroupId>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            group: group.into(),
            kind: None,
            help: None,
            options: None,
            flag: None,
        }
    }
}

/// One-shot retrieval of setting items for a set of groups.
#[derive(Clone)]
pub struct SettingFetcher {
    transport: Arc<dyn Transport>,
    list_endpoint: String,
    success_code: i64,
}

impl SettingFetcher {
    pub fn new(transport: Arc<dyn Transport>, list_endpoint: impl Into<String>, success_code: i64) -> Self {
        Self {
            transport,
            list_endpoint: list_endpoint.into(),
            success_code,
        }
    }

    /// Fetches every item of `groups`. Never retries.
    #[instrument(skip(self, groups), fields(groups = groups.len()))]
    pub async fn fetch_items(&self, groups: &[GroupId]) -> Result<Vec<SettingItem>> {
        if groups.is_empty() {
            return Err(SyncError::EmptyGroupSet);
        }

        let filter = groups
            .iter()
            .map(GroupId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        debug!(filter = %filter, "Requesting setting items");

        let envelope = self
            .transport
            .get(&self.list_endpoint, &[("groups", filter)])
            .await?;
        let items: Vec<SettingItem> = envelope
            .into_data(self.success_code)?
            .unwrap_or_default();

        info!(items = items.len(), "Fetched setting items");
        Ok(items)
    }
}

// src/schema.rs

use crate::error::{Result, SyncError};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Label used for a group's save button when the schema names none.
pub const DEFAULT_BUTTON_LABEL: &str = "global.save";

/// Backend group holding the offline-download and cloud-drive settings.
pub const OFFLINE_DOWNLOAD_GROUP: &str = "5";

/// Identifier of a settings group.
///
/// Used both for schema names (`aria2`) and for the backend's numeric
/// setting groups (`5`); both integers and strings deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for GroupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for GroupId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            Raw::Str(s) => Self(s),
        })
    }
}

/// How a field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Free-form text input
    #[serde(rename = "input")]
    Text,
    /// Path chosen through the directory picker
    #[serde(rename = "folder")]
    Directory,
}

/// One editable slot within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub key: String,
    pub kind: FieldKind,
    pub label_id: String,
}

impl FieldDescriptor {
    pub fn text(key: impl Into<String>, label_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: FieldKind::Text,
            label_id: label_id.into(),
        }
    }

    pub fn directory(key: impl Into<String>, label_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: FieldKind::Directory,
            label_id: label_id.into(),
        }
    }
}

/// A cluster of fields submitted together to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSchema {
    pub id: GroupId,
    /// Backend group the fields are listed under.
    pub fetch_group: GroupId,
    pub title_id: String,
    pub endpoint: String,
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub button_label_id: Option<String>,
}

impl GroupSchema {
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    pub fn button_label_id(&self) -> &str {
        self.button_label_id.as_deref().unwrap_or(DEFAULT_BUTTON_LABEL)
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Immutable table of group definitions.
///
/// Cloning is cheap; all clones share the same frozen group list.
#[derive(Debug, Clone)]
pub struct Registry {
    groups: Arc<[GroupSchema]>,
}

impl Registry {
    /// Builds a registry after checking its structural rules.
    pub fn new(groups: Vec<GroupSchema>) -> Result<Self> {
        Self::validate(&groups)?;
        debug!(groups = groups.len(), "Settings registry built");
        Ok(Self {
            groups: groups.into(),
        })
    }

    fn validate(groups: &[GroupSchema]) -> Result<()> {
        if groups.is_empty() {
            return Err(SyncError::config(
                "At least one settings group must be declared",
                Some("groups"),
            ));
        }

        let mut ids = HashSet::new();
        let mut keys = HashSet::new();
        for group in groups {
            if group.id.as_str().trim().is_empty() {
                return Err(SyncError::config("Group id cannot be empty", Some("groups.id")));
            }
            if group.fetch_group.as_str().trim().is_empty() {
                return Err(SyncError::config(
                    format!("Group '{}' has no backend group to fetch from", group.id),
                    Some("groups.fetch_group"),
                ));
            }
            if !ids.insert(&group.id) {
                return Err(SyncError::config(
                    format!("Duplicate group id: {}", group.id),
                    Some("groups.id"),
                ));
            }
            if !group.endpoint.starts_with('/') {
                return Err(SyncError::config(
                    format!(
                        "Endpoint of group '{}' must be an absolute path: {}",
                        group.id, group.endpoint
                    ),
                    Some("groups.endpoint"),
                ));
            }
            if group.fields.is_empty() {
                return Err(SyncError::config(
                    format!("Group '{}' declares no fields", group.id),
                    Some("groups.fields"),
                ));
            }
            for field in &group.fields {
                if field.key.trim().is_empty() {
                    return Err(SyncError::config(
                        format!("Group '{}' has a field with an empty key", group.id),
                        Some("groups.fields.key"),
                    ));
                }
                // Two groups sharing a key would share one edit slot.
                if !keys.insert(field.key.as_str()) {
                    return Err(SyncError::config(
                        format!("Duplicate field key: {}", field.key),
                        Some("groups.fields.key"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// All groups in declaration order.
    pub fn list_groups(&self) -> &[GroupSchema] {
        &self.groups
    }

    pub fn group(&self, id: &GroupId) -> Option<&GroupSchema> {
        self.groups.iter().find(|g| &g.id == id)
    }

    /// Every field key across all groups.
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().flat_map(GroupSchema::field_keys)
    }

    /// Finds the descriptor for `key` in whichever group declares it.
    pub fn field(&self, key: &str) -> Option<(&GroupSchema, &FieldDescriptor)> {
        self.groups
            .iter()
            .find_map(|g| g.field(key).map(|f| (g, f)))
    }

    /// Backend groups the list request must cover: the fetch group of every
    /// schema plus `extra`, de-duplicated, in declaration order.
    pub fn fetch_groups<'a>(&self, extra: impl IntoIterator<Item = &'a GroupId>) -> Vec<GroupId> {
        let mut seen = HashSet::new();
        self.groups
            .iter()
            .map(|g| g.fetch_group.clone())
            .chain(extra.into_iter().cloned())
            .filter(|id| seen.insert(id.clone()))
            .collect()
    }

    /// The stock table of download-tool and cloud-drive integrations.
    pub fn builtin() -> Self {
        fn group(id: &str, endpoint: &str, fields: Vec<FieldDescriptor>) -> GroupSchema {
            GroupSchema {
                id: GroupId::new(id),
                fetch_group: GroupId::new(OFFLINE_DOWNLOAD_GROUP),
                title_id: format!("settings_other.{id}"),
                endpoint: endpoint.to_string(),
                fields,
                button_label_id: None,
            }
        }

        let groups = vec![
            group(
                "aria2",
                "/admin/setting/set_aria2",
                vec![
                    FieldDescriptor::text("aria2_uri", "aria2_uri"),
                    FieldDescriptor::text("aria2_secret", "aria2_secret"),
                ],
            ),
            group(
                "qbittorrent",
                "/admin/setting/set_qbit",
                vec![
                    FieldDescriptor::text("qbittorrent_url", "qbittorrent_url"),
                    FieldDescriptor::text("qbittorrent_seedtime", "qbittorrent_seedtime"),
                ],
            ),
            group(
                "transmission",
                "/admin/setting/set_transmission",
                vec![
                    FieldDescriptor::text("transmission_uri", "transmission_uri"),
                    FieldDescriptor::text("transmission_seedtime", "transmission_seedtime"),
                ],
            ),
            group(
                "115",
                "/admin/setting/set_115",
                vec![FieldDescriptor::directory(
                    "115_temp_dir",
                    "settings_other.115_temp_dir",
                )],
            ),
            group(
                "115_open",
                "/admin/setting/set_115_open",
                vec![FieldDescriptor::directory(
                    "115_open_temp_dir",
                    "settings_other.115_open_temp_dir",
                )],
            ),
            group(
                "123_pan",
                "/admin/setting/set_123_pan",
                vec![FieldDescriptor::directory(
                    "123_pan_temp_dir",
                    "settings_other.123_temp_dir",
                )],
            ),
            group(
                "123_open",
                "/admin/setting/set_123_open",
                vec![
                    FieldDescriptor::directory(
                        "123_open_temp_dir",
                        "settings_other.123_open_temp_dir",
                    ),
                    FieldDescriptor::text(
                        "123_open_callback_url",
                        "settings_other.123_open_callback_url",
                    ),
                ],
            ),
            group(
                "pikpak",
                "/admin/setting/set_pikpak",
                vec![FieldDescriptor::directory(
                    "pikpak_temp_dir",
                    "settings_other.pikpak_temp_dir",
                )],
            ),
            group(
                "thunder",
                "/admin/setting/set_thunder",
                vec![FieldDescriptor::directory(
                    "thunder_temp_dir",
                    "settings_other.thunder_temp_dir",
                )],
            ),
            group(
                "thunder_browser",
                "/admin/setting/set_thunder_browser",
                vec![FieldDescriptor::directory(
                    "thunder_browser_temp_dir",
                    "settings_other.thunder_browser_temp_dir",
                )],
            ),
            group(
                "thunderx",
                "/admin/setting/set_thunderx",
                vec![FieldDescriptor::directory(
                    "thunderx_temp_dir",
                    "settings_other.thunderX_temp_dir",
                )],
            ),
        ];

        Self {
            groups: groups.into(),
        }
    }
}

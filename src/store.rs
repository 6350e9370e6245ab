// src/store.rs

use crate::fetcher::SettingItem;
use crate::schema::Registry;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::watch;
use tracing::debug;

/// Outcome of one hydration pass.
///
/// Keys the registry declares but the backend did not return are defaulted
/// to an empty string; they are listed here so the gap stays visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationReport {
    pub hydrated: usize,
    pub missing_keys: Vec<String>,
}

impl HydrationReport {
    pub fn is_complete(&self) -> bool {
        self.missing_keys.is_empty()
    }
}

/// Live, editable mirror of the fetched values.
///
/// Each key maps to a watch cell so bindings can follow individual fields.
/// Locks are only held for the duration of a map access.
pub struct EditState {
    registry: Registry,
    token_key: String,
    cells: RwLock<HashMap<String, watch::Sender<String>>>,
    items: RwLock<HashMap<String, SettingItem>>,
}

impl EditState {
    pub fn new(registry: Registry, token_key: impl Into<String>) -> Self {
        Self {
            registry,
            token_key: token_key.into(),
            cells: RwLock::new(HashMap::new()),
            items: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn token_key(&self) -> &str {
        &self.token_key
    }

    /// Overwrites every registry slot and the token slot from `items`.
    ///
    /// Unsaved edits are discarded. Keys outside the registry that were set
    /// through [`EditState::set_value`] are left alone.
    pub fn hydrate(&self, items: &[SettingItem]) -> HydrationReport {
        let by_key: HashMap<&str, &SettingItem> =
            items.iter().map(|item| (item.key.as_str(), item)).collect();

        let mut report = HydrationReport::default();
        let keys = self
            .registry
            .field_keys()
            .chain(std::iter::once(self.token_key.as_str()));
        for key in keys {
            match by_key.get(key) {
                Some(item) => {
                    self.set_value(key, item.value.clone());
                    report.hydrated += 1;
                }
                None => {
                    debug!(key, "No setting item for field, defaulting to empty");
                    self.set_value(key, String::new());
                    report.missing_keys.push(key.to_string());
                }
            }
        }

        *self.items.write() = items
            .iter()
            .map(|item| (item.key.clone(), item.clone()))
            .collect();

        debug!(
            hydrated = report.hydrated,
            missing = report.missing_keys.len(),
            "Edit state hydrated"
        );
        report
    }

    /// Current value of `key`, empty when unknown.
    pub fn get_value(&self, key: &str) -> String {
        self.cells
            .read()
            .get(key)
            .map(|cell| cell.borrow().clone())
            .unwrap_or_default()
    }

    /// Updates one slot and wakes its subscribers if the value changed.
    pub fn set_value(&self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(cell) = self.cells.read().get(key) {
            cell.send_if_modified(|current| replace_if_changed(current, value));
            return;
        }

        let mut cells = self.cells.write();
        match cells.get(key) {
            // Created by a racing subscriber between the two lock scopes.
            Some(cell) => {
                cell.send_if_modified(|current| replace_if_changed(current, value));
            }
            None => {
                let (sender, _) = watch::channel(value);
                cells.insert(key.to_string(), sender);
            }
        }
    }

    /// Observable handle on one slot; the slot is created empty if needed.
    pub fn subscribe(&self, key: &str) -> watch::Receiver<String> {
        if let Some(cell) = self.cells.read().get(key) {
            return cell.subscribe();
        }
        self.cells
            .write()
            .entry(key.to_string())
            .or_insert_with(|| watch::channel(String::new()).0)
            .subscribe()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cells.read().contains_key(key)
    }

    /// Values of `keys`, in the given order, read at call time.
    pub fn snapshot<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Map<String, Value> {
        let cells = self.cells.read();
        keys.into_iter()
            .map(|key| {
                let value = cells
                    .get(key)
                    .map(|cell| cell.borrow().clone())
                    .unwrap_or_default();
                (key.to_string(), Value::String(value))
            })
            .collect()
    }

    /// Backend metadata for `key` from the last hydration.
    pub fn item(&self, key: &str) -> Option<SettingItem> {
        self.items.read().get(key).cloned()
    }

    pub fn token(&self) -> String {
        self.get_value(&self.token_key)
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let key = self.token_key.clone();
        self.set_value(&key, token);
    }
}

fn replace_if_changed(current: &mut String, value: String) -> bool {
    if *current == value {
        false
    } else {
        *current = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn state() -> EditState {
        EditState::new(Registry::builtin(), "token")
    }

    #[test]
    fn hydrate_fills_every_registry_key() {
        let state = state();
        let report = state.hydrate(&[SettingItem::new("aria2_uri", "http://x", "5")]);

        assert_eq!(state.get_value("aria2_uri"), "http://x");
        assert!(state.contains("pikpak_temp_dir"));
        assert_eq!(state.get_value("pikpak_temp_dir"), "");
        assert_eq!(report.hydrated, 1);
        assert!(report.missing_keys.contains(&"aria2_secret".to_string()));
        assert!(report.missing_keys.contains(&"token".to_string()));
    }

    #[test]
    fn hydrate_discards_unsaved_edits() {
        let state = state();
        state.hydrate(&[SettingItem::new("aria2_secret", "s3cr3t", "5")]);
        state.set_value("aria2_secret", "draft");
        state.hydrate(&[SettingItem::new("aria2_secret", "s3cr3t", "5")]);
        assert_eq!(state.get_value("aria2_secret"), "s3cr3t");
    }

    #[test]
    fn unknown_key_reads_empty() {
        assert_eq!(state().get_value("nope"), "");
    }

    #[test]
    fn token_slot_hydrates_from_its_item() {
        let state = state();
        state.hydrate(&[SettingItem::new("token", "abc", "0")]);
        assert_eq!(state.token(), "abc");
    }

    #[test]
    fn item_metadata_is_kept() {
        let state = state();
        let mut item = SettingItem::new("aria2_uri", "http://x", "5");
        item.help = Some("RPC endpoint".to_string());
        state.hydrate(&[item]);
        assert_eq!(state.item("aria2_uri").and_then(|i| i.help).as_deref(), Some("RPC endpoint"));
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let state = state();
        let mut rx = state.subscribe("thunder_temp_dir");
        state.set_value("thunder_temp_dir", "/downloads");
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), "/downloads");
    }

    #[test]
    fn identical_write_does_not_notify() {
        let state = state();
        state.set_value("aria2_uri", "http://x");
        let rx = state.subscribe("aria2_uri");
        state.set_value("aria2_uri", "http://x");
        assert!(!rx.has_changed().unwrap());
    }

    proptest! {
        #[test]
        fn set_then_get_round_trips(
            key in "[a-z_]{1,16}",
            value in ".*",
            other in "[A-Z]{1,8}",
            noise in ".*",
        ) {
            let state = state();
            state.set_value(&key, value.clone());
            state.set_value(&other, noise);
            prop_assert_eq!(state.get_value(&key), value);
        }

        #[test]
        fn hydrated_keys_match_items(values in proptest::collection::vec(".*", 15)) {
            let state = state();
            let registry = Registry::builtin();
            let keys: Vec<&str> = registry.field_keys().collect();
            let items: Vec<SettingItem> = keys
                .iter()
                .zip(values.iter())
                .step_by(2)
                .map(|(k, v)| SettingItem::new(*k, v.clone(), "g"))
                .collect();

            state.hydrate(&items);

            for item in &items {
                prop_assert_eq!(state.get_value(&item.key), item.value.clone());
            }
            for key in keys.iter().skip(1).step_by(2) {
                prop_assert_eq!(state.get_value(key), "");
            }
        }
    }
}

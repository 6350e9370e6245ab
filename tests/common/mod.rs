//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use settings_sync::collaborators::{Clipboard, ClipboardError, DirectoryPicker, Notifier, StaticLabels};
use settings_sync::config::AppConfig;
use settings_sync::page::Collaborators;
use settings_sync::{build_page, SettingsPage};
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LIST_PATH: &str = "/admin/setting/list";
pub const RESET_PATH: &str = "/admin/setting/reset_token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Notifier that remembers everything it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notices.lock().push(Notice::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notices.lock().push(Notice::Error(message.to_string()));
    }
}

#[derive(Debug, Default)]
pub struct RecordingClipboard {
    copied: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn copied(&self) -> Vec<String> {
        self.copied.lock().clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        self.copied.lock().push(text.to_string());
        Ok(())
    }
}

/// Picker that always answers with the same choice.
#[derive(Debug, Clone)]
pub struct FixedPicker(pub Option<String>);

#[async_trait]
impl DirectoryPicker for FixedPicker {
    async fn pick_directory(&self, _current: &str) -> Option<String> {
        self.0.clone()
    }
}

/// Page wired to a mock backend with recording collaborators.
pub struct TestPage {
    pub page: SettingsPage,
    pub notifier: Arc<RecordingNotifier>,
    pub clipboard: Arc<RecordingClipboard>,
}

impl TestPage {
    pub fn new(server: &MockServer) -> Self {
        Self::with_config(test_config(server), None)
    }

    pub fn with_picker(server: &MockServer, choice: Option<&str>) -> Self {
        Self::with_config(test_config(server), Some(FixedPicker(choice.map(str::to_string))))
    }

    pub fn with_config(config: AppConfig, picker: Option<FixedPicker>) -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let clipboard = Arc::new(RecordingClipboard::default());
        let mut collaborators = Collaborators {
            notifier: notifier.clone(),
            clipboard: clipboard.clone(),
            labels: Arc::new(StaticLabels::new(HashMap::from([(
                "settings_other.reset_token_success".to_string(),
                "Token reset".to_string(),
            )]))),
            ..Collaborators::default()
        };
        if let Some(picker) = picker {
            collaborators.picker = Arc::new(picker);
        }

        let page = build_page(&config, collaborators).expect("page should build");
        Self {
            page,
            notifier,
            clipboard,
        }
    }
}

pub fn test_config(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.client.base_url = server.uri();
    config.client.request_timeout_secs = 5;
    config
}

pub fn envelope(data: Value) -> Value {
    json!({ "code": 200, "message": "success", "data": data })
}

pub fn failure(code: i64, message: &str) -> Value {
    json!({ "code": code, "message": message, "data": null })
}

pub fn item(key: &str, value: &str, group: i64) -> Value {
    json!({ "key": key, "value": value, "group": group, "type": "string", "help": "", "flag": 0 })
}

/// Mounts a list endpoint answering with `items`.
pub async fn mount_items(server: &MockServer, items: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(Value::Array(items))))
        .mount(server)
        .await;
}

/// Body of every request received on `request_path`, decoded as JSON.
pub async fn bodies_for(server: &MockServer, request_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == request_path)
        .map(|r| r.body_json::<Value>().unwrap_or(Value::Null))
        .collect()
}

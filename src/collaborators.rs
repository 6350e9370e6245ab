// src/collaborators.rs

//! Seams to the outside world the engine consumes but does not own:
//! operator notifications, label lookup, directory picking and the clipboard.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{info, warn};

/// Surfaces operation outcomes to the operator.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);
}

/// Notifier that writes outcomes to the tracing pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "settings_sync::notify", "{message}");
    }

    fn error(&self, message: &str) {
        warn!(target: "settings_sync::notify", "{message}");
    }
}

/// Resolves a label id to display text.
pub trait LabelResolver: Send + Sync {
    fn resolve(&self, label_id: &str) -> String;
}

/// Label table with the id itself as fallback.
#[derive(Debug, Default, Clone)]
pub struct StaticLabels {
    labels: HashMap<String, String>,
}

impl StaticLabels {
    pub fn new(labels: HashMap<String, String>) -> Self {
        Self { labels }
    }
}

impl LabelResolver for StaticLabels {
    fn resolve(&self, label_id: &str) -> String {
        self.labels
            .get(label_id)
            .cloned()
            .unwrap_or_else(|| label_id.to_string())
    }
}

/// Lets the operator choose a directory on the remote storage.
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// `None` when the operator dismissed the picker.
    async fn pick_directory(&self, current: &str) -> Option<String>;
}

/// Picker for environments without an interactive chooser.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDirectoryPicker;

#[async_trait]
impl DirectoryPicker for NoDirectoryPicker {
    async fn pick_directory(&self, _current: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, thiserror::Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard stand-in that prints the text for the operator to copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        println!("{text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_labels_fall_back_to_id() {
        let labels = StaticLabels::new(HashMap::from([(
            "global.save".to_string(),
            "Save".to_string(),
        )]));
        assert_eq!(labels.resolve("global.save"), "Save");
        assert_eq!(labels.resolve("aria2_uri"), "aria2_uri");
    }

    #[tokio::test]
    async fn no_picker_returns_none() {
        assert_eq!(NoDirectoryPicker.pick_directory("/tmp").await, None);
    }
}

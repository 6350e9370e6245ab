// src/page.rs

use crate::busy::BusyFlag;
use crate::collaborators::{
    Clipboard, DirectoryPicker, LabelResolver, NoDirectoryPicker, Notifier, StaticLabels,
    StdoutClipboard, TracingNotifier,
};
use crate::config::AppConfig;
use crate::error::{Result, SyncError};
use crate::fetcher::SettingFetcher;
use crate::liveness::Liveness;
use crate::save::{SaveController, SaveOutcome};
use crate::schema::{FieldKind, GroupId, GroupSchema, Registry};
use crate::store::{EditState, HydrationReport};
use crate::token::{TokenOperation, TokenOutcome};
use crate::transport::Transport;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// External services the page talks to besides the backend.
#[derive(Clone)]
pub struct Collaborators {
    pub notifier: Arc<dyn Notifier>,
    pub labels: Arc<dyn LabelResolver>,
    pub picker: Arc<dyn DirectoryPicker>,
    pub clipboard: Arc<dyn Clipboard>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            notifier: Arc::new(TracingNotifier),
            labels: Arc::new(StaticLabels::default()),
            picker: Arc::new(NoDirectoryPicker),
            clipboard: Arc::new(StdoutClipboard),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Hydrated(HydrationReport),
    /// A fetch was already running.
    Skipped,
    /// The page was deactivated or re-activated before the items arrived.
    Stale,
}

/// How a group's fields are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Two text inputs side by side.
    Grid,
    /// One labelled control per row.
    Stacked,
}

impl Layout {
    fn for_group(schema: &GroupSchema) -> Self {
        match schema.fields.as_slice() {
            [first, _] if first.kind == FieldKind::Text => Self::Grid,
            _ => Self::Stacked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldForm {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: String,
    pub help: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupForm {
    pub id: GroupId,
    pub title: String,
    pub button_label: String,
    pub layout: Layout,
    pub busy: bool,
    pub fields: Vec<FieldForm>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenForm {
    pub title: String,
    pub value: String,
    pub busy: bool,
    pub copy_label: String,
    pub reset_label: String,
}

/// The settings page: registry, edit state and the operations bound to them.
pub struct SettingsPage {
    registry: Registry,
    state: Arc<EditState>,
    fetcher: SettingFetcher,
    saves: SaveController,
    token: TokenOperation,
    collaborators: Collaborators,
    liveness: Liveness,
    fetch_groups: Vec<GroupId>,
    loading: BusyFlag,
}

impl SettingsPage {
    pub fn new(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let registry = config.registry()?;
        let fetch_groups = registry.fetch_groups([&config.token.group]);
        let success_code = config.client.success_code;
        let liveness = Liveness::new();
        let state = Arc::new(EditState::new(registry.clone(), config.token.key.clone()));

        let fetcher = SettingFetcher::new(transport.clone(), config.list_endpoint.clone(), success_code);
        let saves = SaveController::new(
            state.clone(),
            transport.clone(),
            collaborators.notifier.clone(),
            liveness.clone(),
            success_code,
        );
        let token = TokenOperation::new(
            state.clone(),
            transport,
            collaborators.notifier.clone(),
            collaborators.labels.clone(),
            collaborators.clipboard.clone(),
            liveness.clone(),
            config.token.reset_endpoint.clone(),
            success_code,
        );

        debug!(groups = ?fetch_groups, "Settings page assembled");
        Ok(Self {
            registry,
            state,
            fetcher,
            saves,
            token,
            collaborators,
            liveness,
            fetch_groups,
            loading: BusyFlag::new(),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> &Arc<EditState> {
        &self.state
    }

    /// Group ids the list request covers.
    pub fn fetch_groups(&self) -> &[GroupId] {
        &self.fetch_groups
    }

    pub fn is_active(&self) -> bool {
        self.liveness.is_active()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_busy()
    }

    /// Starts a new active period and loads the current values.
    pub async fn activate(&self) -> Result<RefreshOutcome> {
        self.liveness.activate();
        info!("Settings page activated");
        self.refresh().await
    }

    /// Late responses for this page are dropped after this call.
    pub fn deactivate(&self) {
        self.liveness.deactivate();
        info!("Settings page deactivated");
    }

    /// Re-fetches all items and fully re-hydrates the edit state.
    ///
    /// On failure the edit state is left exactly as it was.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let Some(_guard) = self.loading.try_acquire() else {
            debug!("Fetch already in flight, ignoring");
            return Ok(RefreshOutcome::Skipped);
        };
        let ticket = self.liveness.ticket();

        let items = match self.fetcher.fetch_items(&self.fetch_groups).await {
            Ok(items) => items,
            Err(e) => {
                e.log("fetch_items");
                if !ticket.is_stale() {
                    self.collaborators.notifier.error(&e.user_message());
                }
                return Err(e);
            }
        };

        if ticket.is_stale() {
            debug!("Page went away during fetch, discarding items");
            return Ok(RefreshOutcome::Stale);
        }

        let report = self.state.hydrate(&items);
        if !report.is_complete() {
            warn!(
                missing = ?report.missing_keys,
                "Backend returned no item for some fields; they default to empty"
            );
        }
        Ok(RefreshOutcome::Hydrated(report))
    }

    pub fn get_value(&self, key: &str) -> String {
        self.state.get_value(key)
    }

    pub fn set_value(&self, key: &str, value: impl Into<String>) {
        self.state.set_value(key, value);
    }

    pub fn subscribe(&self, key: &str) -> watch::Receiver<String> {
        self.state.subscribe(key)
    }

    /// Lets the operator choose a path for a directory field.
    ///
    /// Returns the chosen path, or `None` when the picker was dismissed.
    pub async fn pick_directory(&self, key: &str) -> Result<Option<String>> {
        match self.registry.field(key) {
            Some((_, field)) if field.kind == FieldKind::Directory => {}
            _ => {
                return Err(SyncError::NotADirectoryField {
                    key: key.to_string(),
                })
            }
        }

        let ticket = self.liveness.ticket();
        let current = self.state.get_value(key);
        let chosen = self.collaborators.picker.pick_directory(&current).await;

        match chosen {
            Some(path) if !ticket.is_stale() => {
                self.state.set_value(key, path.clone());
                Ok(Some(path))
            }
            _ => Ok(None),
        }
    }

    pub async fn save(&self, group_id: &GroupId) -> Result<SaveOutcome> {
        self.saves.save(group_id).await
    }

    pub fn is_saving(&self, group_id: &GroupId) -> bool {
        self.saves.is_busy(group_id)
    }

    pub async fn reset_token(&self) -> Result<TokenOutcome> {
        self.token.reset_token().await
    }

    pub fn copy_token(&self) {
        self.token.copy_token();
    }

    /// Display model of every group, in registry order.
    pub fn form(&self) -> Vec<GroupForm> {
        let labels = &self.collaborators.labels;
        self.registry
            .list_groups()
            .iter()
            .map(|schema| GroupForm {
                id: schema.id.clone(),
                title: labels.resolve(&schema.title_id),
                button_label: labels.resolve(schema.button_label_id()),
                layout: Layout::for_group(schema),
                busy: self.saves.is_busy(&schema.id),
                fields: schema
                    .fields
                    .iter()
                    .map(|field| FieldForm {
                        key: field.key.clone(),
                        label: labels.resolve(&field.label_id),
                        kind: field.kind,
                        value: self.state.get_value(&field.key),
                        help: self.state.item(&field.key).and_then(|item| item.help),
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn token_form(&self) -> TokenForm {
        let labels = &self.collaborators.labels;
        TokenForm {
            title: labels.resolve("settings.token"),
            value: self.state.token(),
            busy: self.token.is_busy(),
            copy_label: labels.resolve("settings_other.copy_token"),
            reset_label: labels.resolve("settings_other.reset_token"),
        }
    }
}

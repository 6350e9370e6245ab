// src/save.rs

use crate::busy::BusyFlag;
use crate::collaborators::Notifier;
use crate::error::{Result, SyncError};
use crate::liveness::Liveness;
use crate::schema::{GroupId, GroupSchema};
use crate::store::EditState;
use crate::transport::Transport;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Flat field key → value body of a group submission.
pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The backend accepted the group; `message` is its confirmation text.
    Saved { message: String },
    /// A submission for the same group was still in flight.
    Skipped,
}

/// Snapshot of exactly the fields `schema` declares.
pub fn build_payload(state: &EditState, schema: &GroupSchema) -> Payload {
    state.snapshot(schema.field_keys())
}

/// Per-group save operation with one independent busy flag per group.
pub struct SaveController {
    state: Arc<EditState>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    liveness: Liveness,
    success_code: i64,
    busy: HashMap<GroupId, BusyFlag>,
}

impl SaveController {
    pub fn new(
        state: Arc<EditState>,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        liveness: Liveness,
        success_code: i64,
    ) -> Self {
        let busy = state
            .registry()
            .list_groups()
            .iter()
            .map(|g| (g.id.clone(), BusyFlag::new()))
            .collect();

        Self {
            state,
            transport,
            notifier,
            liveness,
            success_code,
            busy,
        }
    }

    pub fn is_busy(&self, group_id: &GroupId) -> bool {
        self.busy.get(group_id).is_some_and(BusyFlag::is_busy)
    }

    /// Submits the current values of one group.
    ///
    /// Re-entrant calls for a group that is still in flight return
    /// [`SaveOutcome::Skipped`] without issuing a request. Edit state is never
    /// modified, whatever the outcome.
    #[instrument(skip(self, group_id), fields(group = %group_id))]
    pub async fn save(&self, group_id: &GroupId) -> Result<SaveOutcome> {
        let schema = self
            .state
            .registry()
            .group(group_id)
            .ok_or_else(|| SyncError::UnknownGroup(group_id.clone()))?;
        let flag = self
            .busy
            .get(group_id)
            .ok_or_else(|| SyncError::UnknownGroup(group_id.clone()))?;

        let Some(guard) = flag.try_acquire() else {
            debug!("Save already in flight, ignoring");
            return Ok(SaveOutcome::Skipped);
        };

        let ticket = self.liveness.ticket();
        let payload = build_payload(&self.state, schema);
        debug!(fields = payload.len(), endpoint = %schema.endpoint, "Submitting group");

        let result = self.submit(schema, payload).await;
        drop(guard);

        let live = !ticket.is_stale();
        if !live {
            debug!("View went away during save, not notifying");
        }
        match result {
            Ok(message) => {
                info!("Group saved");
                if live {
                    self.notifier.success(&message);
                }
                Ok(SaveOutcome::Saved { message })
            }
            Err(e) => {
                e.log("save");
                if live {
                    self.notifier.error(&e.user_message());
                }
                Err(e)
            }
        }
    }

    async fn submit(&self, schema: &GroupSchema, payload: Payload) -> Result<String> {
        let body = Value::Object(payload);
        let envelope = self.transport.post(&schema.endpoint, Some(&body)).await?;
        let fallback = envelope.message.clone();
        let message: Option<String> = envelope.into_data(self.success_code)?;
        Ok(message.unwrap_or(fallback))
    }
}

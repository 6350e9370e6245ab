// src/token.rs

use crate::busy::BusyFlag;
use crate::collaborators::{Clipboard, LabelResolver, Notifier};
use crate::error::{Result, SyncError};
use crate::liveness::Liveness;
use crate::store::EditState;
use crate::transport::Transport;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const RESET_SUCCESS_LABEL: &str = "settings_other.reset_token_success";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    /// The token slot now holds the newly issued token.
    Reset { token: String },
    /// A reset was already in flight.
    Skipped,
    /// The token was regenerated but the view went away before it arrived.
    Stale,
}

/// Regenerates and copies the access token.
///
/// Independent of group schemas; it reads and writes only the token slot.
pub struct TokenOperation {
    state: Arc<EditState>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    labels: Arc<dyn LabelResolver>,
    clipboard: Arc<dyn Clipboard>,
    liveness: Liveness,
    reset_endpoint: String,
    success_code: i64,
    busy: BusyFlag,
}

impl TokenOperation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: Arc<EditState>,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        labels: Arc<dyn LabelResolver>,
        clipboard: Arc<dyn Clipboard>,
        liveness: Liveness,
        reset_endpoint: impl Into<String>,
        success_code: i64,
    ) -> Self {
        Self {
            state,
            transport,
            notifier,
            labels,
            clipboard,
            liveness,
            reset_endpoint: reset_endpoint.into(),
            success_code,
            busy: BusyFlag::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Asks the backend for a new token and stores it in the token slot.
    ///
    /// On failure the slot keeps its previous value.
    #[instrument(skip(self))]
    pub async fn reset_token(&self) -> Result<TokenOutcome> {
        let Some(guard) = self.busy.try_acquire() else {
            debug!("Token reset already in flight, ignoring");
            return Ok(TokenOutcome::Skipped);
        };

        let ticket = self.liveness.ticket();
        let result = self.request_token().await;
        drop(guard);

        match result {
            Ok(_) if ticket.is_stale() => {
                debug!("View went away during token reset, discarding response");
                Ok(TokenOutcome::Stale)
            }
            Ok(token) => {
                self.state.set_token(token.clone());
                info!("Access token regenerated");
                self.notifier.success(&self.labels.resolve(RESET_SUCCESS_LABEL));
                Ok(TokenOutcome::Reset { token })
            }
            Err(e) => {
                e.log("reset_token");
                if !ticket.is_stale() {
                    self.notifier.error(&e.user_message());
                }
                Err(e)
            }
        }
    }

    async fn request_token(&self) -> Result<String> {
        let envelope = self.transport.post(&self.reset_endpoint, None).await?;
        envelope
            .into_data::<String>(self.success_code)?
            .filter(|token| !token.is_empty())
            .ok_or_else(|| SyncError::transport("Token reset response carried no token"))
    }

    /// Hands the current token to the clipboard. No network, no state change.
    pub fn copy_token(&self) {
        let token = self.state.token();
        if let Err(e) = self.clipboard.copy(&token) {
            warn!(error = %e, "Failed to copy token");
        }
    }
}

//! Review session: the reviewer's position and decision state
//!
//! A session holds the item on screen, the last version of it the server
//! confirmed, and whether the two agree. Toggles and navigation both take
//! the session lock for their whole request/reconcile cycle, so a second
//! toggle always computes its delta from reconciled state and a navigation
//! never overtakes a pending toggle.
//!
//! Toggle cycle:
//! 1. evaluator decides whether the reason now applies
//! 2. aggregator builds the optimistic item, which is displayed right away
//! 3. the toggle is sent; the reply replaces local state (server wins)
//! 4. if the server reports the item complete, advance to the next
//!    unfilled item
//!
//! A failed send keeps the optimistic item on screen but marks it
//! `Unconfirmed` and returns the error.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::core::aggregator;
use crate::core::client::SyncClient;
use crate::types::{Criterion, EvidenceId, EvidenceItem, NavAction, ScreenError};

/// Whether the displayed item is known to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Confirmed,
    /// Last update did not persist; carries the failure message
    Unconfirmed(String),
}

/// Snapshot of what the reviewer sees.
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Item on screen (may hold an unconfirmed optimistic change)
    pub displayed: EvidenceItem,
    /// Last state the server confirmed for the displayed id
    pub confirmed: EvidenceItem,
    pub sync: SyncState,
    /// Last unfilled-navigation found nothing left to screen
    pub all_filled: bool,
}

impl ViewState {
    fn confirmed(item: EvidenceItem, all_filled: bool) -> Self {
        Self {
            displayed: item.clone(),
            confirmed: item,
            sync: SyncState::Confirmed,
            all_filled,
        }
    }

    pub fn current_id(&self) -> &EvidenceId {
        self.displayed.id()
    }
}

/// What a confirmed toggle led to.
#[derive(Debug, Clone)]
pub enum ToggleOutcome {
    /// Item not complete yet; the view stays on it
    Stayed(EvidenceItem),
    /// Item complete; the view moved to the next unfilled item
    Advanced { decided: EvidenceItem, next: EvidenceItem },
    /// Item complete and nothing else is unfilled
    AllFilled(EvidenceItem),
    /// Toggle persisted, but moving on failed; the view stays
    AdvanceFailed { decided: EvidenceItem, error: ScreenError },
}

/// One reviewer working through a collection.
pub struct ReviewSession {
    client: SyncClient,
    criteria: Vec<Criterion>,
    auto_advance: bool,
    state: Mutex<ViewState>,
}

impl ReviewSession {
    /// Open a session at `start`, or at the first unfilled item.
    pub async fn start(client: SyncClient, start: Option<EvidenceId>) -> Result<Self, ScreenError> {
        let criteria = client.criteria().await?;
        let state = match start {
            Some(id) => ViewState::confirmed(client.fetch(&id).await?, false),
            None => {
                let first = client.navigate(&EvidenceId::Int(0), &NavAction::First).await?;
                let nav = client
                    .navigate(first.evidence.id(), &NavAction::FirstUnfilled)
                    .await?;
                ViewState::confirmed(nav.evidence, nav.all_filled)
            }
        };
        info!(
            server = client.base_url(),
            current = %state.current_id(),
            criteria = criteria.len(),
            "review session started"
        );
        Ok(Self {
            client,
            criteria,
            auto_advance: true,
            state: Mutex::new(state),
        })
    }

    /// Keep the view on a decided item instead of moving on.
    pub fn without_auto_advance(mut self) -> Self {
        self.auto_advance = false;
        self
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn criterion(&self, id: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id == id)
    }

    pub async fn view(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    /// Set `criterion` on the displayed item to `new_checked`.
    pub async fn toggle(&self, criterion: &Criterion, new_checked: bool) -> Result<ToggleOutcome, ScreenError> {
        let mut state = self.state.lock().await;

        let applies = criterion.should_exclude(new_checked);
        let optimistic = aggregator::apply_toggle(&state.displayed, &criterion.reason_key, new_checked);
        let id = optimistic.id().clone();
        state.displayed = optimistic;

        let reply = match self.client.submit_toggle(&id, &criterion.reason_key, applies).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(id = %id, reason = %criterion.reason_key, error = %err, "toggle not persisted");
                state.sync = SyncState::Unconfirmed(err.to_string());
                return Err(err);
            }
        };

        if !reply.evidence.exclude_reasons().same_set(state.displayed.exclude_reasons()) {
            debug!(id = %id, "server normalized reasons differently; adopting server state");
        }
        state.displayed = reply.evidence.clone();
        state.confirmed = reply.evidence.clone();
        state.sync = SyncState::Confirmed;
        if !reply.complete {
            // an undecided item means the collection is not filled either
            state.all_filled = false;
        }

        if !reply.complete || !self.auto_advance {
            return Ok(ToggleOutcome::Stayed(reply.evidence));
        }

        match self.client.navigate(&id, &NavAction::NextUnfilled).await {
            Ok(nav) if nav.all_filled => {
                state.all_filled = true;
                Ok(ToggleOutcome::AllFilled(reply.evidence))
            }
            Ok(nav) => {
                *state = ViewState::confirmed(nav.evidence.clone(), false);
                Ok(ToggleOutcome::Advanced {
                    decided: reply.evidence,
                    next: nav.evidence,
                })
            }
            Err(error) => {
                warn!(id = %id, error = %error, "advance after decision failed");
                Ok(ToggleOutcome::AdvanceFailed {
                    decided: reply.evidence,
                    error,
                })
            }
        }
    }

    /// Move the view. On failure the current item stays displayed.
    pub async fn navigate(&self, action: &NavAction) -> Result<ViewState, ScreenError> {
        let mut state = self.state.lock().await;
        if let SyncState::Unconfirmed(reason) = &state.sync {
            warn!(id = %state.current_id(), %reason, "leaving item with unconfirmed changes");
        }

        let nav = self.client.navigate(state.current_id(), action).await?;
        *state = ViewState::confirmed(nav.evidence, nav.all_filled);
        Ok(state.clone())
    }

    /// Drop any unconfirmed change and reload the item from the server.
    pub async fn refresh(&self) -> Result<ViewState, ScreenError> {
        let mut state = self.state.lock().await;
        let item = self.client.fetch(state.current_id()).await?;
        let all_filled = state.all_filled;
        *state = ViewState::confirmed(item, all_filled);
        Ok(state.clone())
    }
}

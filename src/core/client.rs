//! Sync client: talks to the screening server
//!
//! Every call either returns the server's authoritative answer or an
//! explicit `ScreenError`. Non-success statuses are checked before any body
//! is parsed.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::types::{
    Criterion, ErrorBody, EvidenceId, EvidenceItem, ExcludeReasons, HealthResponse, NavAction,
    NavigateRequest, NavigateResponse, SaveRequest, ScreenError, ToggleReasonRequest, ToggleResponse,
};

/// HTTP client for one screening server.
#[derive(Debug, Clone)]
pub struct SyncClient {
    http: Client,
    base_url: String,
}

impl SyncClient {
    pub fn new(base_url: &str) -> Result<Self, ScreenError> {
        Self::with_timeout(base_url, None)
    }

    /// Client with an optional per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ScreenError> {
        let mut builder = Client::builder().user_agent(concat!("screener/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one toggle: `applies == true` records `reason` against the item.
    pub async fn submit_toggle(
        &self,
        id: &EvidenceId,
        reason: &str,
        applies: bool,
    ) -> Result<ToggleResponse, ScreenError> {
        let body = ToggleReasonRequest {
            id: id.clone(),
            toggle: applies,
            exclude_reason: reason.to_string(),
        };
        debug!(id = %id, reason, applies, "submitting toggle");
        let resp = self
            .http
            .patch(self.url("/evidence/toggle-exclude-reason"))
            .json(&body)
            .send()
            .await?;
        let reply: ToggleResponse = decode(resp).await?;
        check_reply(&reply);
        Ok(reply)
    }

    /// Replace the item's whole reason set.
    pub async fn submit_batch(&self, id: &EvidenceId, reasons: &ExcludeReasons) -> Result<ToggleResponse, ScreenError> {
        let body = SaveRequest {
            cluster_id: id.clone(),
            include: Some(reasons.is_empty()),
            exclude_reasons: reasons.clone(),
        };
        let resp = self.http.patch(self.url("/evidence/save")).json(&body).send().await?;
        let reply: ToggleResponse = decode(resp).await?;
        check_reply(&reply);
        Ok(reply)
    }

    pub async fn navigate(&self, current: &EvidenceId, action: &NavAction) -> Result<NavigateResponse, ScreenError> {
        let (kind, target_id) = action.to_wire();
        let body = NavigateRequest {
            cluster_id: current.clone(),
            action: kind,
            target_id,
        };
        debug!(from = %current, action = %action, "navigating");
        let resp = self.http.post(self.url("/evidence/navigate")).json(&body).send().await?;
        decode(resp).await
    }

    pub async fn fetch(&self, id: &EvidenceId) -> Result<EvidenceItem, ScreenError> {
        let resp = self.http.get(self.url(&format!("/evidence/{}", id))).send().await?;
        decode(resp).await
    }

    pub async fn criteria(&self) -> Result<Vec<Criterion>, ScreenError> {
        let resp = self.http.get(self.url("/criteria")).send().await?;
        decode(resp).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ScreenError> {
        let resp = self.http.get(self.url("/health")).send().await?;
        decode(resp).await
    }
}

/// Check the status, then parse the body. A 404 whose body names an id
/// becomes `NotFound`; every other failure is `Transport`.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ScreenError> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<T>()
            .await
            .map_err(|e| ScreenError::Transport(format!("undecodable response: {}", e)));
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.error)
        .unwrap_or(text);
    warn!(%status, %message, "server rejected request");

    Err(match status.as_u16() {
        404 => not_found_from(&message).unwrap_or_else(|| ScreenError::Transport(format!("{}: {}", status, message))),
        422 => ScreenError::Validation(message),
        _ => ScreenError::Transport(format!("{}: {}", status, message)),
    })
}

/// Recover the id from a "evidence <id> not found" message.
fn not_found_from(message: &str) -> Option<ScreenError> {
    let id = message.strip_prefix("evidence ")?.strip_suffix(" not found")?;
    Some(ScreenError::NotFound(EvidenceId::from(id)))
}

/// The evidence in a reply is authoritative; a status field that disagrees
/// with it is logged and otherwise ignored.
fn check_reply(reply: &ToggleResponse) {
    if reply.selection_status.is_include() != reply.evidence.include() {
        warn!(
            id = %reply.id,
            status = ?reply.selection_status,
            "selection status disagrees with returned evidence; using evidence"
        );
    }
}

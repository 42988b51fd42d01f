//! Request and response bodies exchanged with the screening server

use serde::{Deserialize, Serialize};

use crate::types::{EvidenceId, EvidenceItem, ExcludeReasons, NavigateKind};

/// Single-reason toggle. `toggle == true` means the reason applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleReasonRequest {
    pub id: EvidenceId,
    pub toggle: bool,
    pub exclude_reason: String,
}

/// Batch save: replaces the item's whole reason set.
///
/// `include` is accepted for compatibility with older clients; the server
/// derives inclusion from `exclude_reasons` and ignores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub cluster_id: EvidenceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<bool>,
    #[serde(default)]
    pub exclude_reasons: ExcludeReasons,
}

/// Overall status as reported next to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSelectionStatus", rename_all = "lowercase")]
pub enum SelectionStatus {
    Include,
    Exclude,
}

impl SelectionStatus {
    pub fn of(item: &EvidenceItem) -> Self {
        if item.include() {
            SelectionStatus::Include
        } else {
            SelectionStatus::Exclude
        }
    }

    pub fn is_include(&self) -> bool {
        *self == SelectionStatus::Include
    }
}

/// Older servers report the status as a bool or as a word.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelectionStatus {
    Flag(bool),
    Word(String),
}

impl From<RawSelectionStatus> for SelectionStatus {
    fn from(raw: RawSelectionStatus) -> Self {
        let include = match raw {
            RawSelectionStatus::Flag(flag) => flag,
            RawSelectionStatus::Word(word) => matches!(
                word.trim().to_lowercase().as_str(),
                "include" | "true" | "yes" | "y" | "t" | "on" | "1"
            ),
        };
        if include {
            SelectionStatus::Include
        } else {
            SelectionStatus::Exclude
        }
    }
}

/// Authoritative decision returned for toggles and saves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub id: EvidenceId,
    pub selection_status: SelectionStatus,
    pub remaining_exclusions: ExcludeReasons,
    /// Stored state actually changed
    pub changed: bool,
    /// The item is now fully decided
    pub complete: bool,
    pub evidence: EvidenceItem,
}

impl ToggleResponse {
    pub fn new(evidence: EvidenceItem, changed: bool, complete: bool) -> Self {
        Self {
            id: evidence.id().clone(),
            selection_status: SelectionStatus::of(&evidence),
            remaining_exclusions: evidence.exclude_reasons().clone(),
            changed,
            complete,
            evidence,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateRequest {
    pub cluster_id: EvidenceId,
    pub action: NavigateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<EvidenceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateResponse {
    pub evidence: EvidenceItem,
    pub min_id: Option<EvidenceId>,
    pub max_id: Option<EvidenceId>,
    #[serde(default)]
    pub all_filled: bool,
}

/// Body of every non-success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub items: usize,
    pub filled: usize,
}

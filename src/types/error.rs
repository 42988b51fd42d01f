//! Error taxonomy for store, navigation and sync failures

use thiserror::Error;

use crate::types::EvidenceId;

/// Every failure the screening core can report.
///
/// Pure evaluation never produces one of these. "No unfilled item left" is
/// not an error either; see `Navigation::all_filled`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    /// Input that cannot be normalized (reason *sets* always can)
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("evidence {0} not found")]
    NotFound(EvidenceId),

    #[error("collection is empty")]
    EmptyCollection,

    /// Network failure, non-success status, or undecodable response
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl ScreenError {
    /// Stable code string (for logs and API error bodies)
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::EmptyCollection => "EMPTY_COLLECTION",
            Self::Transport(_) => "TRANSPORT",
            Self::Storage(_) => "STORAGE",
        }
    }
}

impl From<reqwest::Error> for ScreenError {
    fn from(err: reqwest::Error) -> Self {
        ScreenError::Transport(err.to_string())
    }
}

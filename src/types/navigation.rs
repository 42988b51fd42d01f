//! Navigation intents and outcomes

use serde::{Deserialize, Serialize};

use crate::types::{EvidenceId, EvidenceItem};

/// Where the reviewer wants to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    First,
    Prev,
    Next,
    Last,
    Goto(EvidenceId),
    /// First unfilled item from the start of the collection
    FirstUnfilled,
    /// Next unfilled item after the current one, wrapping around
    NextUnfilled,
}

impl std::fmt::Display for NavAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavAction::First => write!(f, "first"),
            NavAction::Prev => write!(f, "prev"),
            NavAction::Next => write!(f, "next"),
            NavAction::Last => write!(f, "last"),
            NavAction::Goto(id) => write!(f, "goto({})", id),
            NavAction::FirstUnfilled => write!(f, "firstUnfilled"),
            NavAction::NextUnfilled => write!(f, "unfilled"),
        }
    }
}

/// Action names as they appear in navigate requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigateKind {
    #[serde(rename = "first")]
    First,
    #[serde(rename = "prev")]
    Prev,
    #[serde(rename = "next")]
    Next,
    #[serde(rename = "last")]
    Last,
    #[serde(rename = "goto")]
    Goto,
    #[serde(rename = "firstUnfilled")]
    FirstUnfilled,
    #[serde(rename = "unfilled", alias = "nextUnfilled")]
    Unfilled,
}

impl NavAction {
    /// Split into the wire action name and an optional explicit target.
    pub fn to_wire(&self) -> (NavigateKind, Option<EvidenceId>) {
        match self {
            NavAction::First => (NavigateKind::First, None),
            NavAction::Prev => (NavigateKind::Prev, None),
            NavAction::Next => (NavigateKind::Next, None),
            NavAction::Last => (NavigateKind::Last, None),
            NavAction::Goto(target) => (NavigateKind::Goto, Some(target.clone())),
            NavAction::FirstUnfilled => (NavigateKind::FirstUnfilled, None),
            NavAction::NextUnfilled => (NavigateKind::Unfilled, None),
        }
    }

    /// Rebuild from the wire form. A `goto` without explicit target jumps to
    /// `current` itself.
    pub fn from_wire(kind: NavigateKind, current: &EvidenceId, target: Option<EvidenceId>) -> Self {
        match kind {
            NavigateKind::First => NavAction::First,
            NavigateKind::Prev => NavAction::Prev,
            NavigateKind::Next => NavAction::Next,
            NavigateKind::Last => NavAction::Last,
            NavigateKind::Goto => NavAction::Goto(target.unwrap_or_else(|| current.clone())),
            NavigateKind::FirstUnfilled => NavAction::FirstUnfilled,
            NavigateKind::Unfilled => NavAction::NextUnfilled,
        }
    }
}

/// Result of resolving a navigation intent.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub evidence: EvidenceItem,
    /// No unfilled item remains; `evidence` is the unchanged current item
    pub all_filled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let kind: NavigateKind = serde_json::from_str("\"nextUnfilled\"").unwrap();
        assert_eq!(kind, NavigateKind::Unfilled);
        assert_eq!(serde_json::to_string(&NavigateKind::Unfilled).unwrap(), "\"unfilled\"");
        assert_eq!(
            serde_json::to_string(&NavigateKind::FirstUnfilled).unwrap(),
            "\"firstUnfilled\""
        );
    }

    #[test]
    fn test_goto_defaults_to_current() {
        let current = EvidenceId::Int(5);
        assert_eq!(
            NavAction::from_wire(NavigateKind::Goto, &current, None),
            NavAction::Goto(EvidenceId::Int(5))
        );
        assert_eq!(
            NavAction::from_wire(NavigateKind::Goto, &current, Some(EvidenceId::Int(8))),
            NavAction::Goto(EvidenceId::Int(8))
        );
    }
}

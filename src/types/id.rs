//! Evidence identifiers

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Key of an evidence item within its collection.
///
/// Integers and strings are both accepted on the wire. Text that is the
/// canonical decimal form of an integer (`"7"`, `"-3"`) is the same key as
/// that integer; anything else (`"007"`, `"+7"`, `"w-12"`) stays text. The
/// rule is shared by JSON decoding and `FromStr`, so a key read from a URL
/// path matches the key read from the store file.
///
/// The derived order puts every integer before every string; integers
/// compare numerically, strings lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum EvidenceId {
    Int(i64),
    Text(String),
}

impl EvidenceId {
    fn from_text(text: &str) -> Self {
        match text.parse::<i64>() {
            Ok(n) if n.to_string() == text => EvidenceId::Int(n),
            _ => EvidenceId::Text(text.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for EvidenceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => EvidenceId::Int(n),
            RawId::Text(s) => EvidenceId::from_text(&s),
        })
    }
}

impl From<i64> for EvidenceId {
    fn from(value: i64) -> Self {
        EvidenceId::Int(value)
    }
}

impl From<i32> for EvidenceId {
    fn from(value: i32) -> Self {
        EvidenceId::Int(i64::from(value))
    }
}

impl From<&str> for EvidenceId {
    fn from(value: &str) -> Self {
        EvidenceId::from_text(value)
    }
}

impl FromStr for EvidenceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(EvidenceId::from_text(s))
    }
}

impl std::fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvidenceId::Int(n) => write!(f, "{}", n),
            EvidenceId::Text(s) => write!(f, "{}", s),
        }
    }
}

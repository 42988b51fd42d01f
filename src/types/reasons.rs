//! Normalized exclusion-reason container
//!
//! Storage files and older clients send reasons as a JSON array, as a
//! `;`/`,` separated string, or as `null`. Everything is normalized on read
//! into one ordered, duplicate-free sequence. Only the string form is split;
//! array entries are whole keys and may contain separators.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static! {
    static ref RE_LIST_SEPARATOR: Regex = Regex::new(r"[;,]").unwrap();
}

/// Ordered set of exclusion reasons.
///
/// Insertion order is kept for display and storage; membership is what
/// matters for evaluation. Entries are trimmed and never blank or duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Vec<String>")]
pub struct ExcludeReasons(Vec<String>);

impl ExcludeReasons {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from whole keys, dropping blanks and duplicates.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut reasons = Self::new();
        for entry in raw {
            reasons.insert(entry.as_ref());
        }
        reasons
    }

    /// Parse a separated list such as `"not english; not software"`.
    pub fn parse(text: &str) -> Self {
        Self::from_raw(RE_LIST_SEPARATOR.split(text))
    }

    /// Add a reason. Returns `false` if it was blank or already present.
    pub fn insert(&mut self, reason: &str) -> bool {
        let reason = reason.trim();
        if reason.is_empty() || self.contains(reason) {
            return false;
        }
        self.0.push(reason.to_string());
        true
    }

    /// Remove a reason. Returns `false` if it was not present.
    pub fn remove(&mut self, reason: &str) -> bool {
        let reason = reason.trim();
        let before = self.0.len();
        self.0.retain(|r| r != reason);
        self.0.len() != before
    }

    pub fn contains(&self, reason: &str) -> bool {
        let reason = reason.trim();
        self.0.iter().any(|r| r == reason)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Same members, ignoring order.
    pub fn same_set(&self, other: &ExcludeReasons) -> bool {
        self.len() == other.len() && self.iter().all(|r| other.contains(r))
    }

    /// Keep only the entries for which `f` returns a replacement, then
    /// re-apply set semantics.
    pub fn filter_map<F>(&self, f: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out = Self::new();
        for reason in &self.0 {
            if let Some(mapped) = f(reason) {
                out.insert(&mapped);
            }
        }
        out
    }
}

impl From<Value> for ExcludeReasons {
    /// Never fails: anything that is not a string or an array of strings
    /// normalizes to the empty set.
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::parse(&text),
            Value::Array(items) => Self::from_raw(items.iter().filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })),
            _ => Self::new(),
        }
    }
}

impl From<ExcludeReasons> for Vec<String> {
    fn from(reasons: ExcludeReasons) -> Self {
        reasons.0
    }
}

impl<'a> IntoIterator for &'a ExcludeReasons {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for ExcludeReasons {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

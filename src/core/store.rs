//! Evidence store: the authoritative, file-backed evidence collection
//!
//! Holds items ordered by id, applies toggles and batch saves with the
//! server-side normalization (trimmed, lowercased reasons; the placeholder
//! `<unspecified reason>` dropped once a real reason exists), tracks which
//! criteria a reviewer has touched per item, and decides when an item counts
//! as filled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::aggregator;
use crate::core::navigator::EvidenceCollection;
use crate::types::{Criterion, EvidenceId, EvidenceItem, ExcludeReasons, ScreenError, ToggleResponse};
use crate::UNSPECIFIED_REASON;

/// When an item counts as filled (decided).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillPolicy {
    /// The reviewer acted on at least one criterion, or reasons are stored
    #[default]
    AnyDecision,
    /// Every configured criterion has been toggled at least once
    AllVisited,
}

impl std::str::FromStr for FillPolicy {
    type Err = ScreenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any-decision" | "any" => Ok(FillPolicy::AnyDecision),
            "all-visited" | "all" => Ok(FillPolicy::AllVisited),
            other => Err(ScreenError::Validation(format!("unknown fill policy '{}'", other))),
        }
    }
}

impl std::fmt::Display for FillPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillPolicy::AnyDecision => write!(f, "any-decision"),
            FillPolicy::AllVisited => write!(f, "all-visited"),
        }
    }
}

/// Lowercase, trim and collapse inner whitespace. Empty means "no reason".
pub fn sanitize_reason(reason: &str) -> Option<String> {
    let cleaned = reason.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Server-side normalization of a whole reason set.
pub fn normalize_reasons(reasons: &ExcludeReasons) -> ExcludeReasons {
    let mut normalized = reasons.filter_map(sanitize_reason);
    if normalized.len() > 1 {
        normalized.remove(UNSPECIFIED_REASON);
    }
    normalized
}

#[derive(Debug, Clone)]
struct StoredRecord {
    item: EvidenceItem,
    visited: BTreeSet<String>,
}

/// On-disk layout.
#[derive(Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    items: Vec<EvidenceItem>,
    #[serde(default)]
    visited: Vec<VisitedEntry>,
}

#[derive(Serialize, Deserialize)]
struct VisitedEntry {
    id: EvidenceId,
    criteria: Vec<String>,
}

/// A storage file is either the full document or a bare item array.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoreDocument {
    Full(StoreFile),
    Items(Vec<EvidenceItem>),
}

/// Ordered evidence collection with persistence.
#[derive(Debug)]
pub struct EvidenceStore {
    path: Option<PathBuf>,
    records: BTreeMap<EvidenceId, StoredRecord>,
    criteria: Vec<Criterion>,
    policy: FillPolicy,
}

impl EvidenceStore {
    /// In-memory store (nothing is written to disk).
    pub fn new(
        items: Vec<EvidenceItem>,
        criteria: Vec<Criterion>,
        policy: FillPolicy,
    ) -> Result<Self, ScreenError> {
        let mut store = Self {
            path: None,
            records: BTreeMap::new(),
            criteria: normalize_criteria(criteria),
            policy,
        };
        for item in items {
            store.insert_loaded(item, BTreeSet::new())?;
        }
        Ok(store)
    }

    /// Load a store from a JSON file; later changes are written back to it.
    pub fn open(
        path: impl AsRef<Path>,
        criteria: Vec<Criterion>,
        policy: FillPolicy,
    ) -> Result<Self, ScreenError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ScreenError::Storage(format!("{}: {}", path.display(), e)))?;
        let doc: StoreDocument = serde_json::from_str(&json)
            .map_err(|e| ScreenError::Storage(format!("{}: {}", path.display(), e)))?;
        let (items, visited) = match doc {
            StoreDocument::Full(file) => (file.items, file.visited),
            StoreDocument::Items(items) => (items, Vec::new()),
        };

        let mut store = Self::new(Vec::new(), criteria, policy)?;
        let mut visited: BTreeMap<EvidenceId, Vec<String>> =
            visited.into_iter().map(|v| (v.id, v.criteria)).collect();
        for item in items {
            let seen = visited
                .remove(item.id())
                .unwrap_or_default()
                .iter()
                .filter_map(|k| sanitize_reason(k))
                .collect();
            store.insert_loaded(item, seen)?;
        }
        store.path = Some(path.to_path_buf());

        info!(
            path = %path.display(),
            items = store.len(),
            filled = store.filled_count(),
            policy = %store.policy,
            "evidence collection loaded"
        );
        Ok(store)
    }

    fn insert_loaded(&mut self, item: EvidenceItem, visited: BTreeSet<String>) -> Result<(), ScreenError> {
        let id = item.id().clone();
        if self.records.contains_key(&id) {
            return Err(ScreenError::Validation(format!("duplicate evidence id {}", id)));
        }
        let reasons = normalize_reasons(item.exclude_reasons());
        let item = aggregator::replace_reasons(&item, reasons);
        self.records.insert(id, StoredRecord { item, visited });
        Ok(())
    }

    /// Write the collection back to its file, if it has one.
    ///
    /// The document goes to a sibling temp file first and is then renamed
    /// over the original.
    pub fn save(&self) -> Result<(), ScreenError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = StoreFile {
            saved_at: Some(Utc::now()),
            items: self.records.values().map(|r| r.item.clone()).collect(),
            visited: self
                .records
                .iter()
                .filter(|(_, r)| !r.visited.is_empty())
                .map(|(id, r)| VisitedEntry {
                    id: id.clone(),
                    criteria: r.visited.iter().cloned().collect(),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| ScreenError::Storage(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| ScreenError::Storage(format!("{}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| ScreenError::Storage(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), items = self.records.len(), "evidence collection saved");
        Ok(())
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn policy(&self) -> FillPolicy {
        self.policy
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filled_count(&self) -> usize {
        self.records.keys().filter(|id| self.is_filled(id)).count()
    }

    pub fn first_id(&self) -> Option<EvidenceId> {
        self.records.keys().next().cloned()
    }

    pub fn last_id(&self) -> Option<EvidenceId> {
        self.records.keys().next_back().cloned()
    }

    pub fn item(&self, id: &EvidenceId) -> Result<EvidenceItem, ScreenError> {
        self.records
            .get(id)
            .map(|r| r.item.clone())
            .ok_or_else(|| ScreenError::NotFound(id.clone()))
    }

    /// Add (`applies == true`) or remove one exclusion reason.
    pub fn toggle_reason(
        &mut self,
        id: &EvidenceId,
        reason: &str,
        applies: bool,
    ) -> Result<ToggleResponse, ScreenError> {
        let key = sanitize_reason(reason)
            .ok_or_else(|| ScreenError::Validation("exclude reason must not be empty".to_string()))?;
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| ScreenError::NotFound(id.clone()))?;

        let previous = record.clone();
        let toggled = aggregator::apply_reason(&record.item, &key, applies);
        let updated = aggregator::replace_reasons(&toggled, normalize_reasons(toggled.exclude_reasons()));
        let changed = !updated.exclude_reasons().same_set(record.item.exclude_reasons());
        let newly_visited = record.visited.insert(key.clone());
        record.item = updated.clone();

        debug!(id = %id, reason = %key, applies, changed, "exclude reason toggled");
        self.commit(id, previous, updated, changed || newly_visited, changed)
    }

    /// Replace the item's whole reason set. A batch save submits the full
    /// form, so every configured criterion counts as visited.
    pub fn save_reasons(&mut self, id: &EvidenceId, reasons: &ExcludeReasons) -> Result<ToggleResponse, ScreenError> {
        let keys: Vec<String> = self.criteria.iter().map(|c| c.reason_key.clone()).collect();
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| ScreenError::NotFound(id.clone()))?;

        let previous = record.clone();
        let updated = aggregator::replace_reasons(&record.item, normalize_reasons(reasons));
        let changed = !updated.exclude_reasons().same_set(record.item.exclude_reasons());
        let before = record.visited.len();
        record.visited.extend(keys);
        record.visited.extend(updated.exclude_reasons().iter().cloned());
        let newly_visited = record.visited.len() != before;
        record.item = updated.clone();

        debug!(id = %id, reasons = %updated.exclude_reasons(), changed, "exclude reasons saved");
        self.commit(id, previous, updated, changed || newly_visited, changed)
    }

    /// Persist a record change. If the write fails the record goes back to
    /// `previous`, so a retry sees the same state as the first attempt.
    fn commit(
        &mut self,
        id: &EvidenceId,
        previous: StoredRecord,
        updated: EvidenceItem,
        dirty: bool,
        changed: bool,
    ) -> Result<ToggleResponse, ScreenError> {
        if dirty {
            if let Err(e) = self.save() {
                warn!(id = %id, error = %e, "save failed, change rolled back");
                self.records.insert(id.clone(), previous);
                return Err(e);
            }
        }
        Ok(ToggleResponse::new(updated, changed, self.is_filled(id)))
    }
}

impl EvidenceCollection for EvidenceStore {
    fn ordered_ids(&self) -> Vec<EvidenceId> {
        self.records.keys().cloned().collect()
    }

    fn get(&self, id: &EvidenceId) -> Option<EvidenceItem> {
        self.records.get(id).map(|r| r.item.clone())
    }

    fn is_filled(&self, id: &EvidenceId) -> bool {
        let Some(record) = self.records.get(id) else {
            return false;
        };
        let any_decision = !record.visited.is_empty() || !record.item.exclude_reasons().is_empty();
        match self.policy {
            FillPolicy::AllVisited if !self.criteria.is_empty() => self
                .criteria
                .iter()
                .all(|c| record.visited.contains(&c.reason_key)),
            _ => any_decision,
        }
    }
}

fn normalize_criteria(criteria: Vec<Criterion>) -> Vec<Criterion> {
    criteria
        .into_iter()
        .map(|mut c| {
            if let Some(key) = sanitize_reason(&c.reason_key) {
                c.reason_key = key;
            }
            c
        })
        .collect()
}

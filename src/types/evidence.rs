//! Evidence item: one candidate document under screening

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{EvidenceId, ExcludeReasons};

/// Keys that are derived on output and must never be read back as payload.
const DERIVED_KEYS: [&str; 3] = ["include", "selectionStatus", "selection_status"];

/// One evidence item.
///
/// `include` is not a field: it is derived from the reason set on every
/// read and every serialization, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EvidenceRecord", into = "EvidenceRecord")]
pub struct EvidenceItem {
    id: EvidenceId,
    exclude_reasons: ExcludeReasons,
    payload: Map<String, Value>,
}

impl EvidenceItem {
    pub fn new(id: impl Into<EvidenceId>) -> Self {
        Self {
            id: id.into(),
            exclude_reasons: ExcludeReasons::new(),
            payload: Map::new(),
        }
    }

    /// Attach a descriptive field (title, abstract, doi, ...).
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        if !DERIVED_KEYS.contains(&key) {
            self.payload.insert(key.to_string(), value.into());
        }
        self
    }

    /// Copy of this item carrying a different reason set.
    pub fn with_exclude_reasons(&self, reasons: ExcludeReasons) -> Self {
        Self {
            id: self.id.clone(),
            exclude_reasons: reasons,
            payload: self.payload.clone(),
        }
    }

    pub fn id(&self) -> &EvidenceId {
        &self.id
    }

    pub fn exclude_reasons(&self) -> &ExcludeReasons {
        &self.exclude_reasons
    }

    /// True iff no exclusion reason applies.
    pub fn include(&self) -> bool {
        self.exclude_reasons.is_empty()
    }

    pub fn selection_status(&self) -> &'static str {
        if self.include() {
            "include"
        } else {
            "exclude"
        }
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Payload title, if the storage collaborator supplied one.
    pub fn title(&self) -> Option<&str> {
        self.payload.get("title").and_then(Value::as_str)
    }
}

/// Wire/storage shape of an evidence item.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvidenceRecord {
    #[serde(alias = "id", alias = "cluster_id")]
    cluster_id: EvidenceId,
    #[serde(default, skip_deserializing)]
    include: bool,
    #[serde(default, alias = "exclude_reasons", alias = "exclusionReasons")]
    exclude_reasons: ExcludeReasons,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl From<EvidenceRecord> for EvidenceItem {
    fn from(mut record: EvidenceRecord) -> Self {
        for key in DERIVED_KEYS {
            record.payload.remove(key);
        }
        Self {
            id: record.cluster_id,
            exclude_reasons: record.exclude_reasons,
            payload: record.payload,
        }
    }
}

impl From<EvidenceItem> for EvidenceRecord {
    fn from(item: EvidenceItem) -> Self {
        Self {
            include: item.include(),
            cluster_id: item.id,
            exclude_reasons: item.exclude_reasons,
            payload: item.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_include_derived_on_read() {
        let item: EvidenceItem = serde_json::from_str(
            r#"{"clusterId": 4, "include": true, "excludeReasons": "not english", "title": "T"}"#,
        )
        .unwrap();
        assert!(!item.include());
        assert_eq!(item.title(), Some("T"));
        assert!(!item.payload().contains_key("include"));
    }

    #[test]
    fn test_include_derived_on_write() {
        let item = EvidenceItem::new(1).with_field("title", "Paper");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["clusterId"], 1);
        assert_eq!(json["include"], true);
        assert_eq!(json["excludeReasons"], serde_json::json!([]));
        assert_eq!(json["title"], "Paper");

        let excluded = item.with_exclude_reasons(ExcludeReasons::parse("low quality"));
        let json = serde_json::to_value(&excluded).unwrap();
        assert_eq!(json["include"], false);
    }

    #[test]
    fn test_aliases_and_missing_reasons() {
        let item: EvidenceItem =
            serde_json::from_str(r#"{"id": "w7", "selection_status": "exclude"}"#).unwrap();
        assert_eq!(item.id(), &EvidenceId::from("w7"));
        assert!(item.include());
        assert!(item.payload().is_empty());
    }

    #[test]
    fn test_with_field_ignores_derived_keys() {
        let item = EvidenceItem::new(1).with_field("include", false);
        assert!(item.include());
        assert!(item.payload().is_empty());
    }
}

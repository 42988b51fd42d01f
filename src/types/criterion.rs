//! Screening criteria (static configuration)

use serde::{Deserialize, Serialize};

/// How a criterion is phrased to the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionType {
    /// "Checked" reads as: this inclusion condition holds
    Include,
    /// "Checked" reads as: this exclusion does not apply
    Exclude,
}

impl std::fmt::Display for CriterionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CriterionType::Include => write!(f, "include"),
            CriterionType::Exclude => write!(f, "exclude"),
        }
    }
}

/// One checkbox in the screening form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    pub id: String,
    pub criterion_type: CriterionType,
    /// Exclusion reason recorded when this criterion is not met
    pub reason_key: String,
    pub label: String,
}

impl Criterion {
    pub fn new(id: &str, criterion_type: CriterionType, reason_key: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            criterion_type,
            reason_key: reason_key.to_string(),
            label: label.to_string(),
        }
    }

    pub fn include(id: &str, reason_key: &str, label: &str) -> Self {
        Self::new(id, CriterionType::Include, reason_key, label)
    }

    pub fn exclude(id: &str, reason_key: &str, label: &str) -> Self {
        Self::new(id, CriterionType::Exclude, reason_key, label)
    }

    /// The entity-resolution systems review criteria the tool ships with.
    pub fn defaults() -> Vec<Criterion> {
        vec![
            Self::include("include_0", "not er", "is about entity resolution (or a derivative)"),
            Self::include("include_1", "not published 2010-2025", "published 01.01.2010 - 15.06.2025"),
            Self::include("include_2", "not english", "written in English"),
            Self::include("include_3", "not accessible", "access to full text available"),
            Self::include(
                "include_4",
                "not most comprehensive system description",
                "most comprehensive description of the system according to its authors",
            ),
            Self::exclude("exclude_1", "not peer reviewed", "does not have a peer-reviewed paper"),
            Self::exclude("exclude_2", "not software", "does not describe software"),
            Self::exclude(
                "exclude_3",
                "not e2e",
                "focused on a component of ER without the end-to-end ER process",
            ),
            Self::exclude("exclude_4", "not generic er", "describes an application of ER, not ER"),
            Self::exclude(
                "exclude_5",
                "not system",
                "describes a technique, method or experiment instead of a system",
            ),
            Self::exclude("exclude_6", "secondary study", "is a secondary study (review, mapping study)"),
            Self::exclude("exclude_7", "low quality", "is low quality (only after QA)"),
        ]
    }

    /// Load a criteria list from a JSON file.
    pub fn load_all(path: &str) -> Result<Vec<Criterion>, crate::types::ScreenError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| crate::types::ScreenError::Storage(format!("{}: {}", path, e)))?;
        serde_json::from_str(&json)
            .map_err(|e| crate::types::ScreenError::Validation(format!("{}: {}", path, e)))
    }
}

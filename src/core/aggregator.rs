//! Decision aggregator: applies criterion toggles to one evidence item
//!
//! Every function returns a new item and leaves its input untouched, so a
//! caller can hold on to the pre-toggle value until the server confirms.
//! Inclusion is never set here; it follows from the reason set.

use crate::types::{EvidenceItem, ExcludeReasons};

/// Apply a checkbox toggle. `new_checked == true` removes `reason_key`,
/// `false` adds it. Both directions are idempotent.
pub fn apply_toggle(current: &EvidenceItem, reason_key: &str, new_checked: bool) -> EvidenceItem {
    apply_reason(current, reason_key, !new_checked)
}

/// Add (`applies == true`) or remove `reason_key`.
pub fn apply_reason(current: &EvidenceItem, reason_key: &str, applies: bool) -> EvidenceItem {
    let mut reasons = current.exclude_reasons().clone();
    if applies {
        reasons.insert(reason_key);
    } else {
        reasons.remove(reason_key);
    }
    current.with_exclude_reasons(reasons)
}

/// Replace the whole reason set (batch save).
pub fn replace_reasons(current: &EvidenceItem, reasons: ExcludeReasons) -> EvidenceItem {
    current.with_exclude_reasons(reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(reasons: &str) -> EvidenceItem {
        EvidenceItem::new(1).with_exclude_reasons(ExcludeReasons::parse(reasons))
    }

    #[test]
    fn test_exclusion_on_empty_item() {
        let before = item("");
        assert!(before.include());
        let after = apply_toggle(&before, "not english", false);
        assert_eq!(after.exclude_reasons().as_slice(), ["not english"]);
        assert!(!after.include());
        assert!(before.include(), "input must not be mutated");
    }

    #[test]
    fn test_clearing_one_of_two_reasons() {
        let after = apply_toggle(&item("not english; not software"), "not english", true);
        assert_eq!(after.exclude_reasons().as_slice(), ["not software"]);
        assert!(!after.include());
    }

    #[test]
    fn test_clearing_last_reason_includes() {
        let after = apply_toggle(&item("not software"), "not software", true);
        assert!(after.exclude_reasons().is_empty());
        assert!(after.include());
    }

    #[test]
    fn test_idempotent() {
        let base = item("a");
        for checked in [true, false] {
            let once = apply_toggle(&base, "b", checked);
            let twice = apply_toggle(&once, "b", checked);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_round_trip_restores_set() {
        for start in ["", "x", "x;y", "y;x"] {
            let base = item(start);
            let back = apply_toggle(&apply_toggle(&base, "r", false), "r", true);
            assert!(back.exclude_reasons().same_set(base.exclude_reasons()));
        }
    }

    #[test]
    fn test_duplicates_collapse_to_single_removal() {
        let base: EvidenceItem =
            serde_json::from_str(r#"{"clusterId": 1, "excludeReasons": ["dup", "dup", "dup"]}"#).unwrap();
        assert_eq!(base.exclude_reasons().len(), 1);
        let after = apply_toggle(&base, "dup", true);
        assert!(after.include());
    }

    #[test]
    fn test_invariant_across_sequence() {
        let keys = ["a", "b", "c"];
        let mut current = item("");
        for step in 0..24 {
            let key = keys[step % keys.len()];
            current = apply_toggle(&current, key, step % 4 < 2);
            assert_eq!(current.include(), current.exclude_reasons().is_empty());
            let mut seen = current.exclude_reasons().as_slice().to_vec();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), current.exclude_reasons().len());
        }
    }

    #[test]
    fn test_replace_reasons() {
        let after = replace_reasons(&item("a"), ExcludeReasons::new());
        assert!(after.include());
    }
}

//! Integration tests for decisions and navigation
//!
//! Tests the full path: criterion → evaluator → aggregator / store → navigator

use pretty_assertions::assert_eq;
use screener::core::{apply_toggle, navigate, EvidenceCollection, EvidenceStore, FillPolicy};
use screener::types::{Criterion, EvidenceId, EvidenceItem, ExcludeReasons, NavAction, ScreenError};

fn item_with(reasons: &str) -> EvidenceItem {
    EvidenceItem::new(1).with_exclude_reasons(ExcludeReasons::parse(reasons))
}

fn collection(n: i64) -> EvidenceStore {
    let items = (1..=n)
        .map(|i| EvidenceItem::new(i).with_field("title", format!("Paper {}", i)))
        .collect();
    EvidenceStore::new(items, Criterion::defaults(), FillPolicy::AnyDecision).unwrap()
}

fn id(n: i64) -> EvidenceId {
    EvidenceId::Int(n)
}

/// Empty item, exclusion applied through an unchecked include-type box
#[test]
fn test_scenario_a_first_exclusion() {
    let english = Criterion::include("include_2", "not english", "written in English");
    let item = item_with("");
    assert!(item.include());
    assert!(english.is_checked(item.exclude_reasons()));

    let after = apply_toggle(&item, &english.reason_key, false);
    assert_eq!(after.exclude_reasons().as_slice(), ["not english"]);
    assert!(!after.include());
    assert!(!english.is_checked(after.exclude_reasons()));
}

#[test]
fn test_scenario_b_one_reason_remains() {
    let after = apply_toggle(&item_with("not english; not software"), "not english", true);
    assert_eq!(after.exclude_reasons().as_slice(), ["not software"]);
    assert!(!after.include());
}

#[test]
fn test_scenario_c_last_reason_cleared() {
    let software = Criterion::exclude("exclude_2", "not software", "does not describe software");
    let after = apply_toggle(&item_with("not software"), &software.reason_key, true);
    assert!(after.exclude_reasons().is_empty());
    assert!(after.include());
    assert!(software.is_checked(after.exclude_reasons()));
}

#[test]
fn test_scenario_d_goto_missing() {
    let store = collection(5);
    let err = navigate(&store, &id(2), &NavAction::Goto(EvidenceId::from("9999"))).unwrap_err();
    assert_eq!(err, ScreenError::NotFound(id(9999)));
    // The caller's current item is untouched; it is still resolvable
    assert_eq!(store.item(&id(2)).unwrap().id(), &id(2));
}

#[test]
fn test_scenario_e_all_filled_from_last() {
    let mut store = collection(3);
    for i in 1..=3 {
        store.toggle_reason(&id(i), "not er", i % 2 == 0).unwrap();
    }
    assert_eq!(store.filled_count(), 3);

    let nav = navigate(&store, &id(3), &NavAction::NextUnfilled).unwrap();
    assert!(nav.all_filled);
    assert_eq!(nav.evidence.id(), &id(3));
}

#[test]
fn test_boundaries_are_no_ops() {
    let store = collection(4);
    let first = store.first_id().unwrap();
    let last = store.last_id().unwrap();
    assert_eq!(navigate(&store, &first, &NavAction::Prev).unwrap().evidence.id(), &first);
    assert_eq!(navigate(&store, &last, &NavAction::Next).unwrap().evidence.id(), &last);
}

#[test]
fn test_screening_walk_with_unfilled_navigation() {
    let mut store = collection(4);
    let mut current = navigate(&store, &id(1), &NavAction::FirstUnfilled).unwrap().evidence;
    let mut visited = Vec::new();

    loop {
        visited.push(current.id().clone());
        let resp = store.toggle_reason(current.id(), "low quality", false).unwrap();
        assert!(resp.complete);
        assert!(resp.evidence.include());
        let nav = navigate(&store, current.id(), &NavAction::NextUnfilled).unwrap();
        if nav.all_filled {
            break;
        }
        current = nav.evidence;
    }

    assert_eq!(visited, vec![id(1), id(2), id(3), id(4)]);
    assert!(store.ordered_ids().iter().all(|i| store.is_filled(i)));
}

#[test]
fn test_invariant_holds_in_store_and_items() {
    let mut store = collection(2);
    let criteria = Criterion::defaults();
    for (step, criterion) in criteria.iter().cycle().take(30).enumerate() {
        let target = id(1 + (step as i64 % 2));
        let applies = criterion.should_exclude(step % 3 == 0);
        let resp = store.toggle_reason(&target, &criterion.reason_key, applies).unwrap();
        assert_eq!(resp.evidence.include(), resp.evidence.exclude_reasons().is_empty());
        assert_eq!(resp.selection_status.is_include(), resp.evidence.include());
        assert_eq!(resp.remaining_exclusions, *resp.evidence.exclude_reasons());
    }
}

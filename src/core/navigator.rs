//! Navigator: resolves navigation intents against an ordered collection
//!
//! Resolution is stateless. The caller owns the "current item"; this module
//! only answers where an action leads from it.
//!
//! - first / last: ends of the collection
//! - prev / next: adjacent item, no-op at the boundary
//! - goto: the target, or `NotFound`
//! - firstUnfilled: first unfilled item from the start
//! - nextUnfilled: first unfilled item after the current one, wrapping
//!   around to the start and ending at the current item

use tracing::debug;

use crate::types::{EvidenceId, EvidenceItem, NavAction, Navigation, ScreenError};

/// An ordered evidence collection owned by the storage collaborator.
pub trait EvidenceCollection {
    /// All ids in collection order (stable and total).
    fn ordered_ids(&self) -> Vec<EvidenceId>;

    fn get(&self, id: &EvidenceId) -> Option<EvidenceItem>;

    /// Completeness predicate. Its policy belongs to the collection.
    fn is_filled(&self, id: &EvidenceId) -> bool;
}

/// Resolve `action` from `current` and return the item it leads to.
pub fn navigate<C>(collection: &C, current: &EvidenceId, action: &NavAction) -> Result<Navigation, ScreenError>
where
    C: EvidenceCollection + ?Sized,
{
    let ids = collection.ordered_ids();
    if ids.is_empty() {
        return Err(ScreenError::EmptyCollection);
    }

    let (target, all_filled) = match action {
        NavAction::First => (ids[0].clone(), false),
        NavAction::Last => (ids[ids.len() - 1].clone(), false),
        NavAction::Prev => {
            let pos = position_of(&ids, current);
            let target = match pos {
                Position::At(0) | Position::Before(0) => current.clone(),
                Position::At(i) | Position::Before(i) => ids[i - 1].clone(),
            };
            (target, false)
        }
        NavAction::Next => {
            let next = match position_of(&ids, current) {
                Position::At(i) => i + 1,
                Position::Before(i) => i,
            };
            (ids.get(next).cloned().unwrap_or_else(|| current.clone()), false)
        }
        NavAction::Goto(target) => {
            if !ids.contains(target) {
                return Err(ScreenError::NotFound(target.clone()));
            }
            (target.clone(), false)
        }
        NavAction::FirstUnfilled => match ids.iter().find(|id| !collection.is_filled(id)) {
            Some(id) => (id.clone(), false),
            None => (current.clone(), true),
        },
        NavAction::NextUnfilled => {
            let split = match position_of(&ids, current) {
                Position::At(i) => i + 1,
                Position::Before(i) => i,
            };
            let (upto, after) = ids.split_at(split);
            match after.iter().chain(upto.iter()).find(|id| !collection.is_filled(id)) {
                Some(id) => (id.clone(), false),
                None => (current.clone(), true),
            }
        }
    };

    debug!(from = %current, action = %action, to = %target, all_filled, "navigation resolved");

    let evidence = collection
        .get(&target)
        .ok_or_else(|| ScreenError::NotFound(target.clone()))?;
    Ok(Navigation { evidence, all_filled })
}

/// Where `current` sits in `ids`.
enum Position {
    /// Present at this index
    At(usize),
    /// Absent; this many ids sort before it
    Before(usize),
}

fn position_of(ids: &[EvidenceId], current: &EvidenceId) -> Position {
    match ids.iter().position(|id| id == current) {
        Some(i) => Position::At(i),
        None => Position::Before(ids.iter().filter(|id| *id < current).count()),
    }
}

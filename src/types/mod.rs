//! Core types for the screening service

mod id;
mod reasons;
mod evidence;
mod criterion;
mod navigation;
mod wire;
mod error;

pub use id::EvidenceId;
pub use reasons::ExcludeReasons;
pub use evidence::EvidenceItem;
pub use criterion::{Criterion, CriterionType};
pub use navigation::{NavAction, NavigateKind, Navigation};
pub use wire::{
    ToggleReasonRequest, SaveRequest, SelectionStatus, ToggleResponse,
    NavigateRequest, NavigateResponse, ErrorBody, HealthResponse,
};
pub use error::ScreenError;

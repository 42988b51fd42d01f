//! Core modules for the screening service

pub mod evaluator;
pub mod aggregator;
pub mod navigator;
pub mod store;
pub mod api;
pub mod client;
pub mod session;

pub use evaluator::{is_checked, should_exclude};
pub use aggregator::{apply_toggle, apply_reason, replace_reasons};
pub use navigator::{navigate, EvidenceCollection};
pub use store::{EvidenceStore, FillPolicy, sanitize_reason, normalize_reasons};
pub use api::{create_router, run_server};
pub use client::SyncClient;
pub use session::{ReviewSession, SyncState, ToggleOutcome, ViewState};

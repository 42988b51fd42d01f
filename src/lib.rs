//! Screener: evidence screening against inclusion/exclusion criteria
//!
//! An evidence item is included iff no exclusion reason applies. Criteria
//! toggle reasons on and off, the server keeps the authoritative state, and
//! reviewers walk the collection item by item.

pub mod core;
pub mod types;

// =============================================================================
// REASONS
// =============================================================================

/// Placeholder reason recorded when an item was excluded without a reason.
/// Dropped as soon as a real reason is present.
pub const UNSPECIFIED_REASON: &str = "<unspecified reason>";

// =============================================================================
// DEFAULTS
// =============================================================================

/// Default listen address for `--serve`
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Default server URL for `--review`
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "screener=info";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

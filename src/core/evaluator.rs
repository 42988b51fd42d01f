//! Criterion evaluator: checkbox state from an item's reason set
//!
//! Both criterion types collapse onto one underlying flag: a criterion is
//! checked iff its reason key is absent, and unchecking it always means the
//! reason now applies.

use crate::types::{Criterion, CriterionType, ExcludeReasons};

/// Checked iff `reason_key` is absent from `reasons`.
///
/// `criterion_type` only changes how the checkbox is labeled, not what it
/// tests.
pub fn is_checked(_criterion_type: CriterionType, reason_key: &str, reasons: &ExcludeReasons) -> bool {
    !reasons.contains(reason_key)
}

/// Whether the reason applies after the reviewer sets the box to `new_checked`.
pub fn should_exclude(_criterion_type: CriterionType, new_checked: bool) -> bool {
    !new_checked
}

impl Criterion {
    pub fn is_checked(&self, reasons: &ExcludeReasons) -> bool {
        is_checked(self.criterion_type, &self.reason_key, reasons)
    }

    pub fn should_exclude(&self, new_checked: bool) -> bool {
        should_exclude(self.criterion_type, new_checked)
    }
}

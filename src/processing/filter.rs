//! Record filtering for [`crate::types::RecordSet`].

use crate::types::{FilterCriteria, RecordSet};

/// Returns a new [`RecordSet`] with the records matching every predicate of `criteria`.
///
/// - An empty product or region set matches nothing (deselecting everything shows no data).
/// - The date range is inclusive at both ends; `start > end` matches nothing.
/// - Relative record order is preserved, so filtering is idempotent.
pub fn filter(records: &RecordSet, criteria: &FilterCriteria) -> RecordSet {
    if criteria.allowed_products.is_empty() || criteria.allowed_regions.is_empty() {
        return RecordSet::default();
    }
    records.filter_records(|r| criteria.matches(r))
}

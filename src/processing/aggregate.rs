//! Group-and-sum aggregation over a [`RecordSet`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{AggregationResult, Group, GroupBy, GroupKey, Measure, RecordSet, SortOrder};

/// Sum `measure` per distinct `group_by` key.
///
/// - [`SortOrder::KeyAscending`] yields keys in natural order (chronological for dates).
/// - [`SortOrder::ValueDescending`] yields the largest sums first; equal sums are ordered by
///   ascending key.
///
/// Each group's values are added in a canonical order, so the sums do not depend on the order
/// of `records`. An empty `records` yields an empty result.
pub fn aggregate(records: &RecordSet, group_by: GroupBy, measure: Measure, order: SortOrder) -> AggregationResult {
    let mut buckets: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for record in records {
        buckets
            .entry(GroupKey::of(record, group_by))
            .or_default()
            .push(measure.value_of(record));
    }

    let mut groups: Vec<Group> = buckets
        .into_iter()
        .map(|(key, mut values)| {
            values.sort_by(f64::total_cmp);
            Group {
                key,
                value: values.iter().sum(),
            }
        })
        .collect();

    if order == SortOrder::ValueDescending {
        // BTreeMap iteration already sorted by key; a stable sort keeps that as the tie-break.
        groups.sort_by(|a, b| b.value.total_cmp(&a.value));
    }

    AggregationResult::new(groups)
}

/// Like [`aggregate`], but fails with [`PipelineError::EmptyInput`] when `records` is empty.
///
/// Use this where at least one group is structurally required (top-level summaries).
pub fn aggregate_nonempty(
    records: &RecordSet,
    group_by: GroupBy,
    measure: Measure,
    order: SortOrder,
) -> PipelineResult<AggregationResult> {
    if records.is_empty() {
        return Err(PipelineError::EmptyInput {
            context: format!("aggregation by {group_by:?}"),
        });
    }
    Ok(aggregate(records, group_by, measure, order))
}

/// The three line-total breakdowns charted by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Breakdown {
    /// Daily totals, chronological.
    pub by_date: AggregationResult,
    /// Region totals, largest first.
    pub by_region: AggregationResult,
    /// Product totals, largest first.
    pub by_product: AggregationResult,
}

pub fn breakdown(records: &RecordSet) -> Breakdown {
    Breakdown {
        by_date: aggregate(records, GroupBy::Date, Measure::LineTotal, SortOrder::KeyAscending),
        by_region: aggregate(records, GroupBy::Region, Measure::LineTotal, SortOrder::ValueDescending),
        by_product: aggregate(records, GroupBy::Product, Measure::LineTotal, SortOrder::ValueDescending),
    }
}

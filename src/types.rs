//! Core data model types for the sales pipeline.
//!
//! Loading produces a [`RecordSet`] of [`SalesRecord`]s. Every downstream stage borrows it
//! read-only and returns a newly allocated value ([`RecordSet`], [`AggregationResult`], ...).

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single sales line.
///
/// `line_total` is always derived from `quantity * unit_price` at construction; there is no
/// way to build a record with a line total read from input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    date: NaiveDate,
    product: String,
    region: String,
    quantity: u64,
    unit_price: f64,
    line_total: f64,
}

impl SalesRecord {
    /// Create a record. `product` and `region` are trimmed of surrounding whitespace.
    pub fn new(
        date: NaiveDate,
        product: impl AsRef<str>,
        region: impl AsRef<str>,
        quantity: u64,
        unit_price: f64,
    ) -> Self {
        Self {
            date,
            product: product.as_ref().trim().to_owned(),
            region: region.as_ref().trim().to_owned(),
            quantity,
            unit_price,
            line_total: quantity as f64 * unit_price,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    /// `quantity * unit_price`.
    pub fn line_total(&self) -> f64 {
        self.line_total
    }
}

/// Ordered, immutable collection of [`SalesRecord`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<SalesRecord>,
}

impl RecordSet {
    /// Create a record set, keeping the given order.
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SalesRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Create a new record set containing only records that match `predicate`.
    ///
    /// Relative order is preserved.
    pub fn filter_records<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&SalesRecord) -> bool,
    {
        let records = self
            .records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        Self { records }
    }

    /// Distinct product names in order of first appearance.
    pub fn unique_products(&self) -> Vec<String> {
        unique_in_order(self.records.iter().map(|r| r.product.as_str()))
    }

    /// Distinct region names in order of first appearance.
    pub fn unique_regions(&self) -> Vec<String> {
        unique_in_order(self.records.iter().map(|r| r.region.as_str()))
    }

    /// Earliest and latest record date, or `None` for an empty set.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().map(|r| r.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a SalesRecord;
    type IntoIter = std::slice::Iter<'a, SalesRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<SalesRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = SalesRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_owned)
        .collect()
}

/// Dimension used to partition records before summing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Date,
    Product,
    Region,
}

/// Numeric field summed by the aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// `quantity * unit_price` (the only measure used by the dashboard).
    #[default]
    LineTotal,
    /// Units sold.
    Quantity,
}

impl Measure {
    pub(crate) fn value_of(self, record: &SalesRecord) -> f64 {
        match self {
            Measure::LineTotal => record.line_total,
            Measure::Quantity => record.quantity as f64,
        }
    }
}

/// Ordering of an [`AggregationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Natural key order, ascending (temporal grouping).
    KeyAscending,
    /// Largest sum first; ties broken by ascending key.
    ValueDescending,
}

/// A grouping key value.
///
/// All keys within one [`AggregationResult`] share a variant, so the derived ordering is the
/// natural one (chronological for dates, lexicographic for text).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Date(NaiveDate),
    Text(String),
}

impl GroupKey {
    pub(crate) fn of(record: &SalesRecord, group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::Date => GroupKey::Date(record.date),
            GroupBy::Product => GroupKey::Text(record.product.clone()),
            GroupBy::Region => GroupKey::Text(record.region.clone()),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            GroupKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<NaiveDate> for GroupKey {
    fn from(d: NaiveDate) -> Self {
        GroupKey::Date(d)
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::Text(s.to_owned())
    }
}

/// One `(key, sum)` entry of an [`AggregationResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub key: GroupKey,
    pub value: f64,
}

/// Ordered `(key, sum)` pairs, one per distinct grouping key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregationResult {
    groups: Vec<Group>,
}

impl AggregationResult {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// `true` when there is nothing to chart ("no data" state).
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Sum for `key`, if the key is present.
    pub fn get(&self, key: &GroupKey) -> Option<f64> {
        self.groups.iter().find(|g| &g.key == key).map(|g| g.value)
    }

    /// Sum over all groups.
    pub fn total(&self) -> f64 {
        self.groups.iter().map(|g| g.value).sum()
    }

    /// Date-keyed entries as `(date, sum)` pairs, in result order.
    ///
    /// Text-keyed entries are skipped.
    pub fn as_daily_series(&self) -> Vec<(NaiveDate, f64)> {
        self.groups
            .iter()
            .filter_map(|g| match g.key {
                GroupKey::Date(d) => Some((d, g.value)),
                GroupKey::Text(_) => None,
            })
            .collect()
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `start <= date <= end`. Always `false` when `start > end`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Conjunction of set-membership and date-range predicates.
///
/// An empty product or region set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub allowed_products: BTreeSet<String>,
    pub allowed_regions: BTreeSet<String>,
    pub date_range: DateRange,
}

impl FilterCriteria {
    pub fn new<P, R>(products: P, regions: R, date_range: DateRange) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            allowed_products: products.into_iter().map(Into::into).collect(),
            allowed_regions: regions.into_iter().map(Into::into).collect(),
            date_range,
        }
    }

    /// Criteria with no products or regions and an unbounded date range. Matches nothing until
    /// products and regions are added.
    pub fn select_none() -> Self {
        Self::new(
            Vec::<String>::new(),
            Vec::<String>::new(),
            DateRange::new(NaiveDate::MIN, NaiveDate::MAX),
        )
    }

    /// Criteria that select every product, every region and the full date span of `records`.
    ///
    /// Returns `None` for an empty record set (there is no date span to select).
    pub fn select_all(records: &RecordSet) -> Option<Self> {
        let (start, end) = records.date_bounds()?;
        Some(Self::new(
            records.unique_products(),
            records.unique_regions(),
            DateRange::new(start, end),
        ))
    }

    /// `true` if `record` satisfies every predicate.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.allowed_products.contains(record.product())
            && self.allowed_regions.contains(record.region())
            && self.date_range.contains(record.date())
    }
}

/// Scalar metrics shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryMetrics {
    /// Sum of line totals.
    pub total_sales: f64,
    /// Sum of quantities.
    pub total_quantity: u64,
    /// Arithmetic mean of unit prices (per record, unweighted).
    pub mean_unit_price: f64,
    pub record_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> RecordSet {
        RecordSet::new(vec![
            SalesRecord::new(d("2024-01-03"), " B ", "South", 1, 10.0),
            SalesRecord::new(d("2024-01-01"), "A", " North", 2, 5.0),
            SalesRecord::new(d("2024-01-02"), "B", "North ", 3, 1.5),
        ])
    }

    #[test]
    fn record_derives_line_total_and_trims_text() {
        let r = SalesRecord::new(d("2024-01-01"), "  Widget ", "\tNorth\n", 3, 2.5);
        assert_eq!(r.product(), "Widget");
        assert_eq!(r.region(), "North");
        assert_eq!(r.line_total(), 7.5);
    }

    #[test]
    fn unique_values_keep_first_appearance_order() {
        let rs = sample();
        assert_eq!(rs.unique_products(), vec!["B".to_string(), "A".to_string()]);
        assert_eq!(rs.unique_regions(), vec!["South".to_string(), "North".to_string()]);
    }

    #[test]
    fn date_bounds_spans_min_and_max() {
        assert_eq!(sample().date_bounds(), Some((d("2024-01-01"), d("2024-01-03"))));
        assert_eq!(RecordSet::default().date_bounds(), None);
    }

    #[test]
    fn filter_records_returns_new_set_and_leaves_original() {
        let rs = sample();
        let out = rs.filter_records(|r| r.quantity() > 1);
        assert_eq!(out.len(), 2);
        assert_eq!(rs.len(), 3);
    }

    #[test]
    fn inverted_date_range_contains_nothing() {
        let range = DateRange::new(d("2024-01-05"), d("2024-01-01"));
        assert!(!range.contains(d("2024-01-03")));
        assert!(!range.contains(d("2024-01-05")));
    }

    #[test]
    fn select_all_matches_every_record() {
        let rs = sample();
        let criteria = FilterCriteria::select_all(&rs).unwrap();
        assert!(rs.iter().all(|r| criteria.matches(r)));
        assert!(FilterCriteria::select_all(&RecordSet::default()).is_none());
    }

    #[test]
    fn select_none_spans_all_dates_but_matches_no_record() {
        let rs = sample();
        let mut criteria = FilterCriteria::select_none();
        assert!(!rs.iter().any(|r| criteria.matches(r)));

        criteria.allowed_products = rs.unique_products().into_iter().collect();
        criteria.allowed_regions = rs.unique_regions().into_iter().collect();
        assert!(rs.iter().all(|r| criteria.matches(r)));
    }

    #[test]
    fn group_keys_order_naturally() {
        assert!(GroupKey::from(d("2024-01-01")) < GroupKey::from(d("2024-01-02")));
        assert!(GroupKey::from("Apple") < GroupKey::from("Banana"));
        assert_eq!(GroupKey::from(d("2024-02-09")).to_string(), "2024-02-09");
    }

    #[test]
    fn daily_series_skips_text_keys() {
        let agg = AggregationResult::new(vec![
            Group { key: d("2024-01-01").into(), value: 3.0 },
            Group { key: "x".into(), value: 4.0 },
        ]);
        assert_eq!(agg.as_daily_series(), vec![(d("2024-01-01"), 3.0)]);
        assert_eq!(agg.total(), 7.0);
    }
}

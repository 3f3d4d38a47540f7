//! In-memory record transformations.
//!
//! The processing layer operates on [`crate::types::RecordSet`] values produced by loading.
//! Every function borrows its input and returns a newly allocated value.
//!
//! Currently implemented:
//!
//! - [`filter()`]: set-membership + date-range filtering
//! - [`aggregate()`]: group by date/product/region and sum a measure
//! - [`summarize()`]: total sales, total quantity, mean unit price
//!
//! ## Example: filter → aggregate
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sales_pipeline::processing::{aggregate, filter};
//! use sales_pipeline::types::{
//!     DateRange, FilterCriteria, GroupBy, GroupKey, Measure, RecordSet, SalesRecord, SortOrder,
//! };
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let records = RecordSet::new(vec![
//!     SalesRecord::new(day, "A", "North", 2, 5.0),
//!     SalesRecord::new(day, "B", "South", 1, 10.0),
//! ]);
//!
//! let by_region = aggregate(&records, GroupBy::Region, Measure::LineTotal, SortOrder::ValueDescending);
//! assert_eq!(by_region.get(&GroupKey::from("North")), Some(10.0));
//!
//! let north = FilterCriteria::new(["A", "B"], ["North"], DateRange::new(day, day));
//! let filtered = filter(&records, &north);
//! assert_eq!(filtered.len(), 1);
//! ```

pub mod aggregate;
pub mod filter;
pub mod summary;

pub use aggregate::{aggregate, aggregate_nonempty, breakdown, Breakdown};
pub use filter::filter;
pub use summary::summarize;

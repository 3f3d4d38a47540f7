//! `sales-pipeline` turns tabular sales records into the numbers behind a sales dashboard:
//! summary metrics, per-date/region/product totals, filtered views, a linear trend forecast,
//! and an `.xlsx` export.
//!
//! The primary entrypoints are [`ingestion::load`], which parses a CSV (or, with the `excel`
//! feature, a workbook) into a [`types::RecordSet`], and [`pipeline::run`], which composes the
//! processing stages for a given [`types::FilterCriteria`].
//!
//! ## Input
//!
//! Sources need a header row with at least a date, product, region, quantity and unit price
//! column. By default both Portuguese (`data, produto, regiao, quantidade, preco_unitario`) and
//! English (`date, product, region, quantity, unit_price`) headers are accepted, in any order;
//! see [`config::ColumnMapping`]. The line total is always recomputed as
//! `quantity * unit_price`, even if the source has such a column.
//!
//! ## Quick example
//!
//! ```rust
//! use sales_pipeline::config::PipelineConfig;
//! use sales_pipeline::ingestion::{load, LoadOptions, SalesSource};
//! use sales_pipeline::pipeline::run;
//! use sales_pipeline::types::{FilterCriteria, GroupKey};
//!
//! let csv = "\
//! data,produto,regiao,quantidade,preco_unitario
//! 2024-01-01,A,North,2,5.0
//! 2024-01-01,B,South,1,10.0
//! ";
//! let records = load(&SalesSource::from_bytes("vendas.csv", csv), &LoadOptions::default()).unwrap();
//!
//! let mut criteria = FilterCriteria::select_all(&records).unwrap();
//! criteria.allowed_regions = ["North".to_string()].into();
//!
//! let report = run(&records, &criteria, &PipelineConfig::default());
//! assert_eq!(report.full.summary.as_ref().unwrap().total_sales, 20.0);
//! assert_eq!(report.full.breakdown.by_region.get(&GroupKey::from("South")), Some(10.0));
//! assert_eq!(report.filtered_records.len(), 1);
//! // A single date is not enough for a trend line.
//! assert!(report.forecast.is_err());
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: loading entrypoints, format-specific loaders, observers, dataset cache
//! - [`types`]: records, record sets, criteria and aggregation results
//! - [`processing`]: filtering, aggregation, summary metrics
//! - [`forecast`]: OLS trend fit and extrapolation
//! - [`export`]: `.xlsx` serialization
//! - [`pipeline`]: orchestration of the above into a [`pipeline::DashboardReport`]
//! - [`config`]: [`config::PipelineConfig`]
//! - [`error`]: the shared [`PipelineError`]

pub mod config;
pub mod error;
pub mod export;
pub mod forecast;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod types;

pub use error::{ErrorKind, PipelineError, PipelineResult};

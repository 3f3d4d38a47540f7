//! Pipeline orchestration.
//!
//! [`run`] composes the pure stages over an already-loaded [`RecordSet`]:
//!
//! ```text
//! full ──► breakdown / summarize ───────────────► full view
//!   │
//!   ├──► filter(criteria) ──► breakdown / summarize ──► filtered view
//!   │                    └──► export_spreadsheet ─────► workbook bytes
//!   │
//!   └──► aggregate(by date) ──► fit_and_forecast ─────► forecast
//! ```
//!
//! Each stage owns its output. Stage failures are kept per stage in the [`DashboardReport`]
//! rather than aborting the run, so a forecast or export failure never hides the aggregates.

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::export::export_spreadsheet_with;
use crate::forecast::{fit_and_forecast, ForecastSeries};
use crate::processing::{breakdown, filter, summarize, Breakdown};
use crate::types::{FilterCriteria, RecordSet, SummaryMetrics};

/// Breakdowns and summary metrics for one record set.
#[derive(Debug)]
pub struct View {
    pub breakdown: Breakdown,
    /// `Err(EmptyInput)` when the set is empty; render as "no data".
    pub summary: PipelineResult<SummaryMetrics>,
}

impl View {
    fn of(records: &RecordSet) -> Self {
        Self {
            breakdown: breakdown(records),
            summary: summarize(records),
        }
    }
}

/// Everything the presentation layer needs for one run.
#[derive(Debug)]
pub struct DashboardReport {
    /// Aggregates over the full record set.
    pub full: View,
    /// The records surviving the active filter.
    pub filtered_records: RecordSet,
    /// Aggregates over `filtered_records`.
    pub filtered: View,
    /// Trend forecast over the full daily series (filters do not apply).
    pub forecast: PipelineResult<ForecastSeries>,
    /// `.xlsx` workbook of `filtered_records`.
    pub export: PipelineResult<Vec<u8>>,
}

/// Run every stage over `records` with the active `criteria`.
pub fn run(records: &RecordSet, criteria: &FilterCriteria, config: &PipelineConfig) -> DashboardReport {
    let full = View::of(records);

    let filtered_records = filter(records, criteria);
    log::info!(
        "filter kept {} of {} records ({} products, {} regions, {}..={})",
        filtered_records.len(),
        records.len(),
        criteria.allowed_products.len(),
        criteria.allowed_regions.len(),
        criteria.date_range.start,
        criteria.date_range.end
    );
    let filtered = View::of(&filtered_records);

    let forecast = fit_and_forecast(&full.breakdown.by_date.as_daily_series(), config.forecast_horizon_days);
    if let Err(e) = &forecast {
        log::warn!("forecast unavailable: {e}");
    }

    let export = export_spreadsheet_with(&filtered_records, &config.columns, &config.export);
    if let Err(e) = &export {
        log::warn!("export failed: {e}");
    }

    DashboardReport {
        full,
        filtered_records,
        filtered,
        forecast,
        export,
    }
}

/// Serializable projection of a [`DashboardReport`]; failed stages carry their error message.
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub full: ViewSummary<'a>,
    pub filtered: ViewSummary<'a>,
    pub filtered_record_count: usize,
    pub forecast: StageOutcome<&'a ForecastSeries>,
    pub export_bytes: StageOutcome<usize>,
}

#[derive(Debug, Serialize)]
pub struct ViewSummary<'a> {
    pub breakdown: &'a Breakdown,
    pub summary: StageOutcome<&'a SummaryMetrics>,
}

/// Outcome of one stage in a [`ReportSummary`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome<T> {
    Ok(T),
    Unavailable(String),
}

impl<T> StageOutcome<T> {
    fn from_result<'r, U>(result: &'r PipelineResult<U>, f: impl FnOnce(&'r U) -> T) -> Self {
        match result {
            Ok(v) => StageOutcome::Ok(f(v)),
            Err(e) => StageOutcome::Unavailable(e.to_string()),
        }
    }
}

impl<'a> ViewSummary<'a> {
    fn of(view: &'a View) -> Self {
        Self {
            breakdown: &view.breakdown,
            summary: StageOutcome::from_result(&view.summary, |s| s),
        }
    }
}

impl DashboardReport {
    /// Borrowing, serializable summary (omits the record and byte payloads).
    pub fn summary(&self) -> ReportSummary<'_> {
        ReportSummary {
            full: ViewSummary::of(&self.full),
            filtered: ViewSummary::of(&self.filtered),
            filtered_record_count: self.filtered_records.len(),
            forecast: StageOutcome::from_result(&self.forecast, |f| f),
            export_bytes: StageOutcome::from_result(&self.export, Vec::len),
        }
    }
}

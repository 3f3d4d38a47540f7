//! Linear trend forecasting over daily totals.
//!
//! Fits `total = intercept + slope * t` by ordinary least squares, where `t` is the number of
//! days since the first date of the series, and extrapolates it day by day past the last date.
//!
//! The series is expected to be the date-grouped line totals of the **full** record set
//! (see [`crate::processing::breakdown`]); active filters do not affect the trend.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sales_pipeline::forecast::fit_and_forecast;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let series = [(day(1), 10.0), (day(2), 20.0), (day(3), 30.0)];
//!
//! let forecast = fit_and_forecast(&series, 2).unwrap();
//! assert!((forecast.model.slope - 10.0).abs() < 1e-9);
//! assert_eq!(forecast.points[0].date, day(4));
//! assert!((forecast.points[0].value - 40.0).abs() < 1e-9);
//! ```

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

/// Minimum number of distinct dates needed to fit a line.
pub const MIN_DISTINCT_DATES: usize = 2;

/// Fitted trend line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendModel {
    /// Change in daily total per day.
    pub slope: f64,
    /// Fitted total at `origin`.
    pub intercept: f64,
    /// Day zero of the regression (earliest date in the series).
    pub origin: NaiveDate,
    /// Latest date in the series.
    pub last_observed: NaiveDate,
}

impl TrendModel {
    /// Fitted value at `date` (dates before `origin` extrapolate backwards).
    pub fn predict(&self, date: NaiveDate) -> f64 {
        let t = (date - self.origin).num_days() as f64;
        self.intercept + self.slope * t
    }
}

/// One extrapolated day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Fitted model plus the extrapolated horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    pub model: TrendModel,
    /// `horizon_days` consecutive days starting the day after `model.last_observed`.
    pub points: Vec<ForecastPoint>,
}

/// Fit an OLS trend to `(date, total)` pairs.
///
/// Fails with [`PipelineError::InsufficientData`] when fewer than two distinct dates are
/// present, and with [`PipelineError::MalformedInput`] on a non-finite total.
pub fn fit(series: &[(NaiveDate, f64)]) -> PipelineResult<TrendModel> {
    let distinct = series.iter().map(|(d, _)| *d).collect::<BTreeSet<_>>();
    let (Some(&origin), Some(&last_observed)) = (distinct.first(), distinct.last()) else {
        return Err(insufficient(0));
    };
    if distinct.len() < MIN_DISTINCT_DATES {
        return Err(insufficient(distinct.len()));
    }
    if let Some((d, v)) = series.iter().find(|(_, v)| !v.is_finite()) {
        return Err(PipelineError::malformed(format!("non-finite daily total {v} on {d}")));
    }

    let n = series.len() as f64;
    let xs: Vec<f64> = series
        .iter()
        .map(|(d, _)| (*d - origin).num_days() as f64)
        .collect();
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = series.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (sxy, sxx) = xs
        .iter()
        .zip(series.iter().map(|(_, y)| *y))
        .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            let dx = x - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });

    // Two distinct dates guarantee a non-zero spread in x.
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    log::debug!(
        "fitted trend over {} points ({origin}..={last_observed}): slope={slope}, intercept={intercept}",
        series.len()
    );

    Ok(TrendModel {
        slope,
        intercept,
        origin,
        last_observed,
    })
}

/// Extrapolate `model` for `horizon_days` days after its last observed date.
pub fn extrapolate(model: &TrendModel, horizon_days: u32) -> Vec<ForecastPoint> {
    (1..=u64::from(horizon_days))
        .map_while(|k| model.last_observed.checked_add_days(Days::new(k)))
        .map(|date| ForecastPoint {
            date,
            value: model.predict(date),
        })
        .collect()
}

/// Fit a trend to `series` and extrapolate it `horizon_days` days.
pub fn fit_and_forecast(series: &[(NaiveDate, f64)], horizon_days: u32) -> PipelineResult<ForecastSeries> {
    let model = fit(series)?;
    Ok(ForecastSeries {
        points: extrapolate(&model, horizon_days),
        model,
    })
}

fn insufficient(actual: usize) -> PipelineError {
    PipelineError::InsufficientData {
        required: MIN_DISTINCT_DATES,
        actual,
    }
}

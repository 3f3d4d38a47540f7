//! Header resolution and typed value parsing shared by the CSV and workbook loaders.

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::ColumnMapping;
use crate::error::{PipelineError, PipelineResult};

/// Timestamp layouts accepted in addition to the configured date formats. Only the calendar
/// date is kept.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Source column index for each logical field, plus the header actually matched.
#[derive(Debug, Clone)]
pub(crate) struct ColumnProjection {
    pub date: (usize, String),
    pub product: (usize, String),
    pub region: (usize, String),
    pub quantity: (usize, String),
    pub unit_price: (usize, String),
}

/// Map logical columns to source column indexes. Column order in the source is irrelevant;
/// headers are compared after trimming.
///
/// Reports every missing column at once.
pub(crate) fn project_columns(headers: &[String], mapping: &ColumnMapping) -> PipelineResult<ColumnProjection> {
    let find = |aliases: &[String]| -> Option<(usize, String)> {
        aliases.iter().find_map(|alias| {
            headers
                .iter()
                .position(|h| h.trim() == alias.as_str())
                .map(|idx| (idx, alias.clone()))
        })
    };

    let date = find(mapping.date.as_slice());
    let product = find(mapping.product.as_slice());
    let region = find(mapping.region.as_slice());
    let quantity = find(mapping.quantity.as_slice());
    let unit_price = find(mapping.unit_price.as_slice());

    match (date, product, region, quantity, unit_price) {
        (Some(date), Some(product), Some(region), Some(quantity), Some(unit_price)) => Ok(ColumnProjection {
            date,
            product,
            region,
            quantity,
            unit_price,
        }),
        (date, product, region, quantity, unit_price) => {
            let missing: Vec<String> = [
                (date.is_none(), &mapping.date),
                (product.is_none(), &mapping.product),
                (region.is_none(), &mapping.region),
                (quantity.is_none(), &mapping.quantity),
                (unit_price.is_none(), &mapping.unit_price),
            ]
            .into_iter()
            .filter(|(absent, _)| *absent)
            .map(|(_, aliases)| format!("'{}'", aliases.join("'|'")))
            .collect();
            Err(PipelineError::malformed(format!(
                "missing required column {}. headers={:?}",
                missing.join(", "),
                headers
            )))
        }
    }
}

fn parse_error(row: usize, column: &str, raw: &str, message: impl Into<String>) -> PipelineError {
    PipelineError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message: message.into(),
    }
}

/// Parse a text date using `formats` in order, then the timestamp layouts.
pub(crate) fn parse_date(row: usize, column: &str, raw: &str, formats: &[String]) -> PipelineResult<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(parse_error(row, column, raw, "missing date"));
    }
    if let Some(d) = formats
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(trimmed, f).ok())
    {
        return Ok(d);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| {
            parse_error(
                row,
                column,
                raw,
                format!("unrecognized date (expected one of {formats:?})"),
            )
        })
}

/// Parse a non-negative integer quantity. Integral decimals such as `"2.0"` are accepted.
pub(crate) fn parse_quantity(row: usize, column: &str, raw: &str) -> PipelineResult<u64> {
    let trimmed = raw.trim();
    if let Ok(q) = trimmed.parse::<u64>() {
        return Ok(q);
    }
    match trimmed.parse::<f64>() {
        Ok(v) => quantity_from_f64(row, column, raw, v),
        Err(e) => Err(parse_error(row, column, raw, e.to_string())),
    }
}

pub(crate) fn quantity_from_f64(row: usize, column: &str, raw: &str, v: f64) -> PipelineResult<u64> {
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(parse_error(row, column, raw, "expected a whole number"));
    }
    if v < 0.0 {
        return Err(parse_error(row, column, raw, "quantity must be >= 0"));
    }
    if v > u64::MAX as f64 {
        return Err(parse_error(row, column, raw, "quantity out of range"));
    }
    Ok(v as u64)
}

/// Parse a non-negative, finite unit price.
pub(crate) fn parse_price(row: usize, column: &str, raw: &str) -> PipelineResult<f64> {
    let v = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| parse_error(row, column, raw, e.to_string()))?;
    price_from_f64(row, column, raw, v)
}

pub(crate) fn price_from_f64(row: usize, column: &str, raw: &str, v: f64) -> PipelineResult<f64> {
    if !v.is_finite() {
        return Err(parse_error(row, column, raw, "price must be finite"));
    }
    if v < 0.0 {
        return Err(parse_error(row, column, raw, "price must be >= 0"));
    }
    Ok(v)
}

#![cfg(feature = "excel")]

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use chrono::{Days, NaiveDate};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{RecordSet, SalesRecord};

use super::fields::{self, ColumnProjection};
use super::unified::{LoadOptions, SheetSelection};

/// Load a workbook (`.xlsx`, `.xls`, `.ods`, etc.) from disk.
///
/// Behavior:
/// - Picks the sheet named by `options.sheet`, or the first sheet
/// - Detects the first non-empty row as the header row
/// - Validates that every required column exists as a header
/// - Reads remaining rows into [`SalesRecord`]s; fully empty rows are skipped
pub fn load_excel_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> PipelineResult<RecordSet> {
    let mut workbook = open_workbook_auto(path)?;
    load_from_workbook(&mut workbook, options)
}

/// Load a workbook held in memory, such as an upload or a buffer produced by
/// [`crate::export::export_spreadsheet`]. The container format is sniffed from the content.
pub fn load_workbook_from_bytes(bytes: &[u8], options: &LoadOptions) -> PipelineResult<RecordSet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    load_from_workbook(&mut workbook, options)
}

fn load_from_workbook<RS>(workbook: &mut Sheets<RS>, options: &LoadOptions) -> PipelineResult<RecordSet>
where
    RS: std::io::Read + std::io::Seek,
{
    let sheet = match &options.sheet {
        SheetSelection::First => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| PipelineError::malformed("workbook has no sheets"))?,
        SheetSelection::Named(name) => name.clone(),
    };

    let range = workbook.worksheet_range(&sheet)?;
    let records = load_sheet_range(&range, options).map_err(|e| wrap_malformed_with_sheet(&sheet, e))?;
    Ok(RecordSet::new(records))
}

fn load_sheet_range(range: &calamine::Range<Data>, options: &LoadOptions) -> PipelineResult<Vec<SalesRecord>> {
    let (header_row_idx, cols) = build_header_projection(range, options)?;
    // The range may begin below sheet row 1 when leading rows are blank.
    let first_sheet_row = range.start().map_or(0, |(row, _)| row as usize);

    let mut records = Vec::new();
    for (idx0, row) in range.rows().enumerate() {
        if idx0 <= header_row_idx || row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }

        // 1-based sheet row, as shown by spreadsheet applications.
        let user_row = first_sheet_row + idx0 + 1;
        let cell = |(idx, _): &(usize, String)| row.get(*idx).unwrap_or(&Data::Empty);

        let date = convert_date(user_row, &cols.date.1, cell(&cols.date), &options.date_formats)?;
        let product = cell_to_string(cell(&cols.product));
        let region = cell_to_string(cell(&cols.region));
        let quantity = convert_quantity(user_row, &cols.quantity.1, cell(&cols.quantity))?;
        let unit_price = convert_price(user_row, &cols.unit_price.1, cell(&cols.unit_price))?;

        records.push(SalesRecord::new(date, product, region, quantity, unit_price));
    }

    Ok(records)
}

fn wrap_malformed_with_sheet(sheet: &str, err: PipelineError) -> PipelineError {
    match err {
        PipelineError::MalformedInput { message } => PipelineError::MalformedInput {
            message: format!("sheet '{sheet}': {message}"),
        },
        PipelineError::ParseError {
            row,
            column,
            raw,
            message,
        } => PipelineError::ParseError {
            row,
            column: format!("{sheet}:{column}"),
            raw,
            message,
        },
        other => other,
    }
}

fn build_header_projection(
    range: &calamine::Range<Data>,
    options: &LoadOptions,
) -> PipelineResult<(usize, ColumnProjection)> {
    let (header_row_idx, header_cells) = range
        .rows()
        .enumerate()
        .find(|(_, row)| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|(idx0, row)| (idx0, row.iter().map(cell_to_string).collect::<Vec<_>>()))
        .ok_or_else(|| PipelineError::malformed("sheet has no non-empty rows (no header row found)"))?;

    let cols = fields::project_columns(&header_cells, &options.columns)?;
    Ok((header_row_idx, cols))
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Empty => String::new(),
        _ => c.to_string(),
    }
}

fn cell_error(row: usize, column: &str, c: &Data, message: &str) -> PipelineError {
    PipelineError::ParseError {
        row,
        column: column.to_string(),
        raw: c.to_string(),
        message: message.to_string(),
    }
}

/// Excel serial day 0 in the 1900 date system (the 1900 leap-year bug makes day 60 ambiguous;
/// serials from 61 onward map correctly).
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

fn date_from_serial(row: usize, column: &str, c: &Data, serial: f64) -> PipelineResult<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return Err(cell_error(row, column, c, "expected a date serial >= 1"));
    }
    excel_epoch()
        .checked_add_days(Days::new(serial.floor() as u64))
        .ok_or_else(|| cell_error(row, column, c, "date serial out of range"))
}

fn convert_date(row: usize, column: &str, c: &Data, formats: &[String]) -> PipelineResult<NaiveDate> {
    match c {
        Data::DateTime(dt) => date_from_serial(row, column, c, dt.as_f64()),
        Data::Float(f) => date_from_serial(row, column, c, *f),
        Data::Int(i) => date_from_serial(row, column, c, *i as f64),
        Data::String(s) | Data::DateTimeIso(s) => fields::parse_date(row, column, s, formats),
        _ => Err(cell_error(row, column, c, "expected date")),
    }
}

fn convert_quantity(row: usize, column: &str, c: &Data) -> PipelineResult<u64> {
    match c {
        Data::Int(i) => u64::try_from(*i).map_err(|_| cell_error(row, column, c, "quantity must be >= 0")),
        Data::Float(f) => fields::quantity_from_f64(row, column, &c.to_string(), *f),
        Data::String(s) => fields::parse_quantity(row, column, s),
        _ => Err(cell_error(row, column, c, "expected integer")),
    }
}

fn convert_price(row: usize, column: &str, c: &Data) -> PipelineResult<f64> {
    match c {
        Data::Float(f) => fields::price_from_f64(row, column, &c.to_string(), *f),
        Data::Int(i) => fields::price_from_f64(row, column, &c.to_string(), *i as f64),
        Data::String(s) => fields::parse_price(row, column, s),
        _ => Err(cell_error(row, column, c, "expected number")),
    }
}

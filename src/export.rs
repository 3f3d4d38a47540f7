//! Spreadsheet export.
//!
//! Writes a [`RecordSet`] to a single-sheet `.xlsx` workbook held in memory. Columns follow the
//! record field order (date, product, region, quantity, unit price, line total) under the
//! canonical headers of a [`ColumnMapping`]; rows keep the record set's order.

use std::path::Path;

use chrono::Datelike;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};

use crate::config::{ColumnMapping, ExportOptions};
use crate::error::{PipelineError, PipelineResult};
use crate::types::{RecordSet, SalesRecord};

/// Serialize `records` with the default headers and sheet name.
pub fn export_spreadsheet(records: &RecordSet) -> PipelineResult<Vec<u8>> {
    export_spreadsheet_with(records, &ColumnMapping::default(), &ExportOptions::default())
}

/// Serialize `records` to an `.xlsx` byte buffer.
///
/// Fails with [`PipelineError::Serialization`] if a cell value cannot be represented (a
/// non-finite number, a date outside Excel's range) or the workbook cannot be assembled.
pub fn export_spreadsheet_with(
    records: &RecordSet,
    columns: &ColumnMapping,
    options: &ExportOptions,
) -> PipelineResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(&options.sheet_name)?;

    let header_format = Format::new().set_bold();
    for (col, header) in columns.export_headers().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    let date_format = Format::new().set_num_format(&options.date_format);
    for (idx0, record) in records.iter().enumerate() {
        let row = u32::try_from(idx0 + 1).map_err(|_| PipelineError::Serialization {
            message: format!("too many rows for one worksheet ({})", records.len()),
        })?;
        write_record(sheet, row, record, &date_format)?;
    }

    sheet.autofit();
    let buffer = workbook.save_to_buffer()?;
    log::debug!("exported {} records ({} bytes)", records.len(), buffer.len());
    Ok(buffer)
}

/// Serialize `records` and write the workbook to `path`.
pub fn export_to_path(
    records: &RecordSet,
    path: impl AsRef<Path>,
    columns: &ColumnMapping,
    options: &ExportOptions,
) -> PipelineResult<()> {
    let buffer = export_spreadsheet_with(records, columns, options)?;
    std::fs::write(path, buffer)?;
    Ok(())
}

fn write_record(sheet: &mut Worksheet, row: u32, record: &SalesRecord, date_format: &Format) -> PipelineResult<()> {
    let date = record.date();
    let excel_date = u16::try_from(date.year())
        .ok()
        .and_then(|y| ExcelDateTime::from_ymd(y, date.month() as u8, date.day() as u8).ok())
        .ok_or_else(|| PipelineError::Serialization {
            message: format!("row {}: date {date} is outside the spreadsheet date range", row + 1),
        })?;

    sheet.write_datetime_with_format(row, 0, &excel_date, date_format)?;
    sheet.write_string(row, 1, record.product())?;
    sheet.write_string(row, 2, record.region())?;
    sheet.write_number(row, 3, finite(row, "quantity", record.quantity() as f64)?)?;
    sheet.write_number(row, 4, finite(row, "unit_price", record.unit_price())?)?;
    sheet.write_number(row, 5, finite(row, "line_total", record.line_total())?)?;
    Ok(())
}

fn finite(row: u32, column: &str, value: f64) -> PipelineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PipelineError::Serialization {
            message: format!("row {}: {column} value {value} is not a finite number", row + 1),
        })
    }
}

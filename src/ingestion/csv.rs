//! CSV loading.

use std::path::Path;

use crate::error::PipelineResult;
use crate::types::{RecordSet, SalesRecord};

use super::fields::{self, ColumnProjection};
use super::unified::LoadOptions;

/// Load a CSV file into a [`RecordSet`].
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain every required column (any accepted alias, any order).
/// - Every row must carry a parseable date, quantity and unit price; the first bad row fails
///   the whole load. Blank product or region cells load as empty labels.
pub fn load_csv_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> PipelineResult<RecordSet> {
    let mut rdr = reader_builder(options).from_path(path)?;
    load_csv_from_reader(&mut rdr, options)
}

/// Load CSV data held in memory (e.g. an uploaded file).
pub fn load_csv_from_bytes(bytes: &[u8], options: &LoadOptions) -> PipelineResult<RecordSet> {
    let mut rdr = reader_builder(options).from_reader(bytes);
    load_csv_from_reader(&mut rdr, options)
}

/// Load CSV data from an existing CSV reader.
pub fn load_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    options: &LoadOptions,
) -> PipelineResult<RecordSet> {
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    let cols = fields::project_columns(&headers, &options.columns)?;

    let mut records = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let row = result?;
        records.push(parse_row(user_row, &row, &cols, &options.date_formats)?);
    }

    Ok(RecordSet::new(records))
}

fn reader_builder(options: &LoadOptions) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).delimiter(options.delimiter);
    builder
}

fn parse_row(
    user_row: usize,
    row: &csv::StringRecord,
    cols: &ColumnProjection,
    date_formats: &[String],
) -> PipelineResult<SalesRecord> {
    let cell = |(idx, _): &(usize, String)| row.get(*idx).unwrap_or("");

    let date = fields::parse_date(user_row, &cols.date.1, cell(&cols.date), date_formats)?;
    let product = cell(&cols.product);
    let region = cell(&cols.region);
    let quantity = fields::parse_quantity(user_row, &cols.quantity.1, cell(&cols.quantity))?;
    let unit_price = fields::parse_price(user_row, &cols.unit_price.1, cell(&cols.unit_price))?;

    Ok(SalesRecord::new(date, product, region, quantity, unit_price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn trims_text_and_derives_line_total() {
        let input = "data,produto,regiao,quantidade,preco_unitario\n2024-01-01,  A ,North  ,2,5.0\n";
        let rs = load_csv_from_bytes(input.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(rs.len(), 1);
        let r = &rs.as_slice()[0];
        assert_eq!(r.product(), "A");
        assert_eq!(r.region(), "North");
        assert_eq!(r.line_total(), 10.0);
    }

    #[test]
    fn blank_product_or_region_is_kept_as_empty_label() {
        let input = "data,produto,regiao,quantidade,preco_unitario\n2024-01-01,  ,North,2,5.0\n2024-01-02,B,,1,3.0\n";
        let rs = load_csv_from_bytes(input.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.as_slice()[0].product(), "");
        assert_eq!(rs.as_slice()[1].region(), "");
        assert_eq!(rs.as_slice()[1].line_total(), 3.0);
    }

    #[test]
    fn ignores_line_total_column_in_input() {
        let input = "data,produto,regiao,quantidade,preco_unitario,total_venda\n2024-01-01,A,North,3,2.5,999\n";
        let rs = load_csv_from_bytes(input.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(rs.as_slice()[0].line_total(), 7.5);
    }

    #[test]
    fn honours_custom_delimiter() {
        let input = "date;product;region;quantity;unit_price\n2024-01-01;A;North;1;4\n";
        let opts = LoadOptions {
            delimiter: b';',
            ..Default::default()
        };
        let rs = load_csv_from_bytes(input.as_bytes(), &opts).unwrap();
        assert_eq!(rs.as_slice()[0].line_total(), 4.0);
    }

    #[test]
    fn empty_input_is_missing_columns() {
        let err = load_csv_from_bytes(b"", &LoadOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn header_only_input_loads_empty_set() {
        let input = "data,produto,regiao,quantidade,preco_unitario\n";
        let rs = load_csv_from_bytes(input.as_bytes(), &LoadOptions::default()).unwrap();
        assert!(rs.is_empty());
    }

    #[test]
    fn ragged_row_is_malformed_input() {
        let input = "data,produto,regiao,quantidade,preco_unitario\n2024-01-01,A,North\n";
        let err = load_csv_from_bytes(input.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }
}

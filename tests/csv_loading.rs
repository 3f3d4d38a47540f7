use chrono::NaiveDate;

use sales_pipeline::ErrorKind;
use sales_pipeline::ingestion::LoadOptions;
use sales_pipeline::ingestion::csv::{load_csv_from_path, load_csv_from_reader};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

#[test]
fn load_csv_from_path_happy_path() {
    let rs = load_csv_from_path("tests/fixtures/vendas_small.csv", &LoadOptions::default()).unwrap();

    assert_eq!(rs.len(), 4);
    let third = &rs.as_slice()[2];
    assert_eq!(third.date(), d(2));
    assert_eq!(third.product(), "A");
    assert_eq!(third.region(), "South");
    assert_eq!(third.quantity(), 3);
    assert_eq!(third.line_total(), 15.0);
}

#[test]
fn line_total_is_derived_for_every_row_regardless_of_column_order() {
    let rs = load_csv_from_path("tests/fixtures/vendas_reordered.csv", &LoadOptions::default()).unwrap();

    assert_eq!(rs.len(), 2);
    for r in &rs {
        assert_eq!(r.line_total(), r.quantity() as f64 * r.unit_price());
    }
    assert_eq!(rs.as_slice()[0].line_total(), 10.0);
}

#[test]
fn load_csv_accepts_english_headers() {
    let input = "region,product,date,unit_price,quantity\nNorth,A,2024-01-05,2.5,4\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let rs = load_csv_from_reader(&mut rdr, &LoadOptions::default()).unwrap();
    assert_eq!(rs.as_slice()[0].date(), d(5));
    assert_eq!(rs.as_slice()[0].line_total(), 10.0);
}

#[test]
fn load_csv_errors_on_missing_required_column() {
    let input = "data,produto,quantidade,preco_unitario\n2024-01-01,A,2,5.0\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let err = load_csv_from_reader(&mut rdr, &LoadOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    let msg = err.to_string();
    assert!(msg.contains("malformed input"));
    assert!(msg.contains("missing required column 'regiao'|'region'"));
}

#[test]
fn load_csv_errors_on_unparseable_date_without_partial_result() {
    let err = load_csv_from_path("tests/fixtures/vendas_bad_date.csv", &LoadOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    let msg = err.to_string();
    assert!(msg.contains("failed to parse value at row 3"));
    assert!(msg.contains("column 'data'"));
    assert!(msg.contains("raw='not-a-date'"));
}

#[test]
fn load_csv_errors_on_negative_quantity() {
    let input = "data,produto,regiao,quantidade,preco_unitario\n2024-01-01,A,North,-2,5.0\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let err = load_csv_from_reader(&mut rdr, &LoadOptions::default()).unwrap_err();
    assert!(err.to_string().contains("column 'quantidade'"));
}

#[test]
fn missing_file_is_io_error() {
    let err = load_csv_from_path("tests/fixtures/does_not_exist.csv", &LoadOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

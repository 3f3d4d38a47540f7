use std::io::Write;

use sales_pipeline::ErrorKind;
use sales_pipeline::config::{DEFAULT_SOURCE_PATH, PipelineConfig};
use sales_pipeline::ingestion::{load, load_or_default, DatasetCache, LoadOptions, SalesSource, SourceFormat};

fn tmp_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

#[test]
fn load_infers_csv_from_extension() {
    let f = tmp_file(
        ".csv",
        "data,produto,regiao,quantidade,preco_unitario\n2024-01-01,A,North,2,5.0\n",
    );
    let rs = load(&SalesSource::from_path(f.path()), &LoadOptions::default()).unwrap();
    assert_eq!(rs.len(), 1);
}

#[test]
fn default_source_is_used_when_nothing_is_uploaded() {
    let rs = load_or_default(None, DEFAULT_SOURCE_PATH, &LoadOptions::default()).unwrap();
    assert!(!rs.is_empty());
    for r in &rs {
        assert_eq!(r.product(), r.product().trim());
        assert_eq!(r.region(), r.region().trim());
        assert_eq!(r.line_total(), r.quantity() as f64 * r.unit_price());
    }
}

#[test]
fn uploaded_source_replaces_the_default() {
    let csv = std::fs::read("tests/fixtures/vendas_small.csv").unwrap();
    let upload = SalesSource::from_bytes("vendas_small.csv", csv);
    let rs = load_or_default(Some(&upload), "does/not/exist.csv", &LoadOptions::default()).unwrap();
    assert_eq!(rs.len(), 4);
}

#[test]
fn semicolon_delimited_csv_via_config() {
    let config = PipelineConfig::from_json_str(r#"{ "delimiter": ";" }"#).unwrap();
    let f = tmp_file(
        ".csv",
        "data;produto;regiao;quantidade;preco_unitario\n2024-01-01;A;North;2;5.5\n",
    );
    let rs = load(&SalesSource::from_path(f.path()), &LoadOptions::from_config(&config)).unwrap();
    assert_eq!(rs.as_slice()[0].line_total(), 11.0);
}

#[test]
fn tsv_upload_ignores_configured_delimiter() {
    let config = PipelineConfig::from_json_str(r#"{ "delimiter": ";" }"#).unwrap();
    let tsv = "regiao\tdata\tproduto\tquantidade\tpreco_unitario\nSouth\t2024-01-02\tB\t3\t1.5\n";
    let rs = load(&SalesSource::from_bytes("x.tsv", tsv), &LoadOptions::from_config(&config)).unwrap();
    assert_eq!(rs.len(), 1);
    assert_eq!(rs.as_slice()[0].region(), "South");
    assert_eq!(rs.as_slice()[0].line_total(), 4.5);
}

#[test]
fn forced_format_reads_extensionless_file() {
    let f = tmp_file("", "date,product,region,quantity,unit_price\n2024-01-01,A,North,1,3.0\n");
    let opts = LoadOptions {
        format: Some(SourceFormat::Csv),
        ..Default::default()
    };
    let rs = load(&SalesSource::from_path(f.path()), &opts).unwrap();
    assert_eq!(rs.len(), 1);
}

#[test]
fn missing_default_source_is_io_error() {
    let err = load_or_default(None, "tests/fixtures/missing.csv", &LoadOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn cache_reuses_records_for_identical_uploads() {
    let csv = std::fs::read("tests/fixtures/vendas_small.csv").unwrap();
    let mut cache = DatasetCache::new();
    let opts = LoadOptions::default();

    let (k1, first) = cache
        .load(&SalesSource::from_bytes("a.csv", csv.clone()), &opts)
        .unwrap();
    let (k2, second) = cache.load(&SalesSource::from_bytes("b.csv", csv), &opts).unwrap();

    assert_eq!(k1, k2);
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.stats().misses, 1);
}

use std::sync::{Arc, Mutex};

use sales_pipeline::PipelineError;
use sales_pipeline::ingestion::{
    cli_observer, load, CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadOptions, LoadSeverity, LoadStats,
    SalesSource,
};

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<usize>>,
    failures: Mutex<Vec<LoadSeverity>>,
    alerts: Mutex<Vec<LoadSeverity>>,
}

impl LoadObserver for RecordingObserver {
    fn on_success(&self, _ctx: &LoadContext, stats: LoadStats) {
        self.successes.lock().unwrap().push(stats.rows);
    }

    fn on_failure(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &PipelineError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &LoadContext, severity: LoadSeverity, _error: &PipelineError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

#[test]
fn success_reports_row_count() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions::default().with_observer(obs.clone());

    load(&SalesSource::from_path("tests/fixtures/vendas_small.csv"), &opts).unwrap();

    assert_eq!(*obs.successes.lock().unwrap(), vec![4]);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn missing_file_is_critical_and_alerts() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions::default().with_observer(obs.clone());

    let _ = load(&SalesSource::from_path("tests/fixtures/nope.csv"), &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![LoadSeverity::Critical]);
}

#[test]
fn malformed_input_is_error_without_alert_by_default() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = LoadOptions::default().with_observer(obs.clone());

    let _ = load(&SalesSource::from_path("tests/fixtures/vendas_bad_date.csv"), &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![LoadSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lowered_threshold_alerts_on_malformed_input() {
    let obs = Arc::new(RecordingObserver::default());
    let mut opts = LoadOptions::default().with_observer(obs.clone());
    opts.alert_at_or_above = LoadSeverity::Error;

    let _ = load(&SalesSource::from_path("tests/fixtures/vendas_bad_date.csv"), &opts).unwrap_err();

    assert_eq!(*obs.alerts.lock().unwrap(), vec![LoadSeverity::Error]);
}

#[test]
fn composite_fans_out_to_file_and_recorder() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("load.log");
    let recorder = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new()
        .with(recorder.clone())
        .with(Arc::new(FileObserver::create(&log_path).unwrap()));
    let opts = LoadOptions::default().with_observer(Arc::new(composite));

    load(&SalesSource::from_path("tests/fixtures/vendas_small.csv"), &opts).unwrap();

    assert_eq!(*recorder.successes.lock().unwrap(), vec![4]);
    let logged = std::fs::read_to_string(&log_path).unwrap();
    assert!(logged.contains("vendas_small.csv"));
    assert!(logged.contains("rows=4"));
}

#[test]
fn cli_observer_appends_failures_to_load_log() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("load.log");
    let opts = LoadOptions::default().with_observer(cli_observer(Some(&log_path)).unwrap());

    load(&SalesSource::from_path("tests/fixtures/vendas_small.csv"), &opts).unwrap();
    let _ = load(&SalesSource::from_path("tests/fixtures/nope.csv"), &opts).unwrap_err();

    let logged = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = logged.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("rows=4"));
    assert!(lines[1].contains("severity=Critical"));
    assert!(lines[2].contains("ALERT"));
}


use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::{PipelineError, PipelineResult};

use super::unified::SourceFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (load failed on bad input).
    Error,
    /// Critical error (the source could not be read at all).
    Critical,
}

/// Context about a load attempt.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// Description of the source (path, or upload name and size).
    pub source: String,
    /// Format used for loading.
    pub format: SourceFormat,
}

/// Minimal stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of loaded records.
    pub rows: usize,
}

/// Observer interface for load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    /// Called when loading succeeds.
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called when loading fails.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &PipelineError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &PipelineError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans every callback out to the observers it holds, in insertion order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer to the end of the fan-out list.
    pub fn with(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    fn each(&self, f: impl Fn(&dyn LoadObserver)) {
        self.observers.iter().for_each(|o| f(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &PipelineError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &PipelineError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Observer for a command-line run: [`LogObserver`], plus a [`FileObserver`] on `load_log`
/// when one is given. Fails if the load log cannot be opened.
pub fn cli_observer(load_log: Option<&Path>) -> PipelineResult<Arc<dyn LoadObserver>> {
    let Some(path) = load_log else {
        return Ok(Arc::new(LogObserver));
    };
    let composite = CompositeObserver::new()
        .with(Arc::new(LogObserver))
        .with(Arc::new(FileObserver::create(path)?));
    Ok(Arc::new(composite))
}

/// Forwards load events to the `log` facade (target `sales_pipeline::load`).
#[derive(Debug, Default)]
pub struct LogObserver;

const LOG_TARGET: &str = "sales_pipeline::load";

impl LoadObserver for LogObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        log::info!(
            target: LOG_TARGET,
            "ok format={:?} source={} rows={}",
            ctx.format,
            ctx.source,
            stats.rows
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &PipelineError) {
        let level = match severity {
            LoadSeverity::Info => log::Level::Info,
            LoadSeverity::Warning => log::Level::Warn,
            LoadSeverity::Error | LoadSeverity::Critical => log::Level::Error,
        };
        log::log!(
            target: LOG_TARGET,
            level,
            "[{:?}] format={:?} source={} err={}",
            severity,
            ctx.format,
            ctx.source,
            error
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &PipelineError) {
        log::error!(
            target: LOG_TARGET,
            "ALERT [{:?}] format={:?} source={} err={}",
            severity,
            ctx.format,
            ctx.source,
            error
        );
    }
}

/// Appends one line per load event to a file opened at construction.
///
/// Line layout: `<rfc3339 timestamp> <event> severity=<..> format=<..> source=<..> <detail>`.
/// Write failures after construction are dropped.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileObserver {
    /// Open (or create) `path` for appending.
    pub fn create(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(&self, event: &str, severity: Option<LoadSeverity>, ctx: &LoadContext, detail: &str) {
        let severity = severity.map_or_else(|| "-".to_string(), |s| format!("{s:?}"));
        let line = format!(
            "{} {event} severity={severity} format={:?} source={} {detail}",
            Utc::now().to_rfc3339(),
            ctx.format,
            ctx.source
        );
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.record("ok", None, ctx, &format!("rows={}", stats.rows));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &PipelineError) {
        self.record("fail", Some(severity), ctx, &format!("err={error}"));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &PipelineError) {
        self.record("ALERT", Some(severity), ctx, &format!("err={error}"));
    }
}

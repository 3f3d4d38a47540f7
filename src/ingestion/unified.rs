//! Unified loading entrypoint.
//!
//! Most callers should use [`load`] (or [`load_or_default`] when the source is optional),
//! which turns a [`SalesSource`] into a [`crate::types::RecordSet`].
//!
//! - If [`LoadOptions::format`] is `None`, the format is inferred from the file extension of the
//!   path (or of the uploaded file's name).
//! - If a [`super::observability::LoadObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ColumnMapping, PipelineConfig};
use crate::error::{ErrorKind, PipelineError, PipelineResult};
use crate::types::RecordSet;

use super::csv;
use super::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Delimited text, split on [`LoadOptions::delimiter`].
    Csv,
    /// Tab-separated text. Always split on `\t`, whatever delimiter is configured.
    Tsv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Which worksheet to read from a workbook source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SheetSelection {
    /// The first sheet (default).
    #[default]
    First,
    /// A sheet by name.
    Named(String),
}

/// Where records come from.
#[derive(Clone, PartialEq, Eq)]
pub enum SalesSource {
    /// A file on disk.
    Path(PathBuf),
    /// An in-memory upload. `name` is the original file name, used for format inference.
    Bytes { name: String, bytes: Vec<u8> },
}

impl SalesSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Human-readable identity of the source, for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Bytes { name, bytes } => format!("{name} ({} bytes)", bytes.len()),
        }
    }

    fn name_for_inference(&self) -> &Path {
        match self {
            Self::Path(p) => p,
            Self::Bytes { name, .. } => Path::new(name),
        }
    }
}

impl fmt::Debug for SalesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Self::Bytes { name, bytes } => f
                .debug_struct("Bytes")
                .field("name", name)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Options controlling loading.
///
/// Use [`Default`] for common cases, or [`LoadOptions::from_config`] to honour a
/// [`PipelineConfig`].
#[derive(Clone)]
pub struct LoadOptions {
    /// If `None`, infer the format from the file extension.
    pub format: Option<SourceFormat>,
    /// Workbook-specific sheet choice.
    pub sheet: SheetSelection,
    /// Header aliases for the required columns.
    pub columns: ColumnMapping,
    /// `chrono` date formats tried in order for text dates.
    pub date_formats: Vec<String>,
    /// CSV field delimiter.
    pub delimiter: u8,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("format", &self.format)
            .field("sheet", &self.sheet)
            .field("columns", &self.columns)
            .field("date_formats", &self.date_formats)
            .field("delimiter", &(self.delimiter as char))
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl LoadOptions {
    /// Options matching `config`, with no observer attached.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            format: None,
            sheet: SheetSelection::default(),
            columns: config.columns.clone(),
            date_formats: config.date_formats.clone(),
            // `PipelineConfig::validate` guarantees an ASCII delimiter.
            delimiter: u8::try_from(config.delimiter).unwrap_or(b','),
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }

    /// Attach an observer.
    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// Load `source` into a [`RecordSet`].
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row count stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use sales_pipeline::ingestion::{load, LoadOptions, SalesSource};
///
/// # fn main() -> Result<(), sales_pipeline::PipelineError> {
/// let records = load(&SalesSource::from_path("vendas.csv"), &LoadOptions::default())?;
/// println!("records={}", records.len());
/// # Ok(())
/// # }
/// ```
///
/// An uploaded buffer works the same way; its name drives format inference:
///
/// ```rust
/// use sales_pipeline::ingestion::{load, LoadOptions, SalesSource};
///
/// let csv = "data,produto,regiao,quantidade,preco_unitario\n2024-01-01,A,North,2,5.0\n";
/// let upload = SalesSource::from_bytes("upload.csv", csv.as_bytes());
/// let records = load(&upload, &LoadOptions::default()).unwrap();
/// assert_eq!(records.as_slice()[0].line_total(), 10.0);
/// ```
pub fn load(source: &SalesSource, options: &LoadOptions) -> PipelineResult<RecordSet> {
    let format = resolve_format(source, options)?;

    let ctx = LoadContext {
        source: source.describe(),
        format,
    };

    let result = match format {
        SourceFormat::Csv => load_delimited(source, options),
        SourceFormat::Tsv => load_delimited(
            source,
            &LoadOptions {
                delimiter: b'\t',
                ..options.clone()
            },
        ),
        SourceFormat::Excel => load_excel_dispatch(source, options),
    };

    match &result {
        Ok(records) => log::debug!("loaded {} records from {}", records.len(), ctx.source),
        Err(e) => log::debug!("loading {} failed: {e}", ctx.source),
    }

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(records) => obs.on_success(&ctx, LoadStats { rows: records.len() }),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

/// Load `source`, or the file at `default_path` when no source is supplied.
pub fn load_or_default(
    source: Option<&SalesSource>,
    default_path: impl AsRef<Path>,
    options: &LoadOptions,
) -> PipelineResult<RecordSet> {
    match source {
        Some(source) => load(source, options),
        None => load(&SalesSource::from_path(default_path.as_ref()), options),
    }
}

fn severity_for_error(e: &PipelineError) -> LoadSeverity {
    match e.kind() {
        ErrorKind::Io => LoadSeverity::Critical,
        _ => LoadSeverity::Error,
    }
}

/// The format `load` will use: the forced one, else the one inferred from the name.
pub(crate) fn resolve_format(source: &SalesSource, options: &LoadOptions) -> PipelineResult<SourceFormat> {
    match options.format {
        Some(f) => Ok(f),
        None => infer_format(source.name_for_inference()),
    }
}

fn infer_format(path: &Path) -> PipelineResult<SourceFormat> {
    let ext = path.extension().and_then(|s| s.to_str()).ok_or_else(|| {
        PipelineError::malformed(format!(
            "cannot infer format: source has no extension ({})",
            path.display()
        ))
    })?;

    SourceFormat::from_extension(ext).ok_or_else(|| {
        PipelineError::malformed(format!(
            "cannot infer format from extension '{ext}' for source ({})",
            path.display()
        ))
    })
}

fn load_delimited(source: &SalesSource, options: &LoadOptions) -> PipelineResult<RecordSet> {
    match source {
        SalesSource::Path(p) => csv::load_csv_from_path(p, options),
        SalesSource::Bytes { bytes, .. } => csv::load_csv_from_bytes(bytes, options),
    }
}

fn load_excel_dispatch(source: &SalesSource, options: &LoadOptions) -> PipelineResult<RecordSet> {
    // Avoid unused warnings when the feature is off.
    let _ = (source, options);

    #[cfg(feature = "excel")]
    {
        use super::excel;

        match source {
            SalesSource::Path(p) => excel::load_excel_from_path(p, options),
            SalesSource::Bytes { bytes, .. } => excel::load_workbook_from_bytes(bytes, options),
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(PipelineError::malformed(
            "workbook loading not enabled (enable cargo feature 'excel')",
        ))
    }
}

use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by every pipeline stage.
///
/// Loader, aggregator, forecaster and exporter share this enum; use [`PipelineError::kind`]
/// to branch on the broad failure class instead of matching individual variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Workbook reading error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV reading error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input does not have the expected shape (missing required columns, unknown format, etc.).
    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    /// A value could not be parsed into the field's type.
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A non-empty record set was required but none was supplied.
    #[error("empty input: {context} requires at least one record")]
    EmptyInput { context: String },

    /// Not enough distinct data points to fit a trend.
    #[error("insufficient data: need at least {required} distinct dates, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Export failed while building the spreadsheet.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// Configuration could not be read or parsed.
    #[error("config error: {message}")]
    Config { message: String },
}

/// Broad classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source could not be read at all.
    Io,
    /// Bad or missing columns, unparseable values.
    MalformedInput,
    /// A summary needed at least one record.
    EmptyInput,
    /// Forecasting needs at least two distinct dates.
    InsufficientData,
    /// Export-time failure.
    Serialization,
    /// Invalid configuration.
    Config,
}

impl PipelineError {
    /// Returns the failure class for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Io(_) => ErrorKind::Io,
            #[cfg(feature = "excel")]
            PipelineError::Excel(calamine::Error::Io(_)) => ErrorKind::Io,
            #[cfg(feature = "excel")]
            PipelineError::Excel(_) => ErrorKind::MalformedInput,
            PipelineError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => ErrorKind::Io,
                _ => ErrorKind::MalformedInput,
            },
            PipelineError::MalformedInput { .. } | PipelineError::ParseError { .. } => {
                ErrorKind::MalformedInput
            }
            PipelineError::EmptyInput { .. } => ErrorKind::EmptyInput,
            PipelineError::InsufficientData { .. } => ErrorKind::InsufficientData,
            PipelineError::Serialization { .. } => ErrorKind::Serialization,
            PipelineError::Config { .. } => ErrorKind::Config,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        PipelineError::MalformedInput {
            message: message.into(),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for PipelineError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        PipelineError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, PipelineError};

    #[test]
    fn kind_classifies_parse_errors_as_malformed_input() {
        let err = PipelineError::ParseError {
            row: 2,
            column: "data".to_string(),
            raw: "nope".to_string(),
            message: "bad date".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().contains("row 2 column 'data'"));
    }

    #[test]
    fn kind_classifies_io_errors() {
        let err = PipelineError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn xlsx_errors_become_serialization_errors() {
        let err = PipelineError::from(rust_xlsxwriter::XlsxError::ParameterError(
            "bad cell".to_string(),
        ));
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }
}

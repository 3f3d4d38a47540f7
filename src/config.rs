//! Pipeline configuration.
//!
//! [`PipelineConfig`] has a usable [`Default`] and can also be read from a JSON file; any field
//! missing from the file keeps its default.
//!
//! ```json
//! {
//!   "default_source": "data/vendas.csv",
//!   "forecast_horizon_days": 14,
//!   "export": { "sheet_name": "Sales" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Source used when the caller does not supply one.
pub const DEFAULT_SOURCE_PATH: &str = "data/vendas.csv";

/// Default number of days extrapolated by the forecaster.
pub const DEFAULT_FORECAST_HORIZON_DAYS: u32 = 30;

/// Header aliases for each logical input column.
///
/// The first alias of each list is the canonical header, used on export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub date: Vec<String>,
    pub product: Vec<String>,
    pub region: Vec<String>,
    pub quantity: Vec<String>,
    pub unit_price: Vec<String>,
    /// Header written for the derived line total. Never read on load.
    pub line_total: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        fn aliases(names: &[&str]) -> Vec<String> {
            names.iter().map(|s| s.to_string()).collect()
        }
        Self {
            date: aliases(&["data", "date"]),
            product: aliases(&["produto", "product"]),
            region: aliases(&["regiao", "region"]),
            quantity: aliases(&["quantidade", "quantity"]),
            unit_price: aliases(&["preco_unitario", "unit_price"]),
            line_total: "total_venda".to_string(),
        }
    }
}

impl ColumnMapping {
    /// Headers in record field order, as written by the exporter.
    pub fn export_headers(&self) -> [&str; 6] {
        [
            canonical(&self.date, "date"),
            canonical(&self.product, "product"),
            canonical(&self.region, "region"),
            canonical(&self.quantity, "quantity"),
            canonical(&self.unit_price, "unit_price"),
            self.line_total.as_str(),
        ]
    }
}

fn canonical<'a>(aliases: &'a [String], fallback: &'a str) -> &'a str {
    aliases.first().map(String::as_str).unwrap_or(fallback)
}

/// Options for spreadsheet export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Worksheet name.
    pub sheet_name: String,
    /// Excel number format applied to the date column.
    pub date_format: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Vendas".to_string(),
            date_format: "yyyy-mm-dd".to_string(),
        }
    }
}

/// Top-level configuration shared by the loader, forecaster and exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Source loaded when none is supplied.
    pub default_source: PathBuf,
    pub columns: ColumnMapping,
    /// `chrono` format strings tried in order when parsing text dates.
    pub date_formats: Vec<String>,
    /// CSV field delimiter.
    pub delimiter: char,
    pub forecast_horizon_days: u32,
    pub export: ExportOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_source: PathBuf::from(DEFAULT_SOURCE_PATH),
            columns: ColumnMapping::default(),
            date_formats: vec![
                "%Y-%m-%d".to_string(),
                "%Y/%m/%d".to_string(),
                "%d/%m/%Y".to_string(),
            ],
            delimiter: ',',
            forecast_horizon_days: DEFAULT_FORECAST_HORIZON_DAYS,
            export: ExportOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a JSON config document.
    pub fn from_json_str(text: &str) -> PipelineResult<Self> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| PipelineError::Config {
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> PipelineResult<()> {
        if !self.delimiter.is_ascii() {
            return Err(PipelineError::Config {
                message: format!("delimiter must be a single ASCII character, got {:?}", self.delimiter),
            });
        }
        if self.date_formats.is_empty() {
            return Err(PipelineError::Config {
                message: "date_formats must not be empty".to_string(),
            });
        }
        let cols = &self.columns;
        for (name, aliases) in [
            ("date", &cols.date),
            ("product", &cols.product),
            ("region", &cols.region),
            ("quantity", &cols.quantity),
            ("unit_price", &cols.unit_price),
        ] {
            if aliases.is_empty() {
                return Err(PipelineError::Config {
                    message: format!("column '{name}' needs at least one header alias"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = PipelineConfig::from_json_str(
            r#"{ "forecast_horizon_days": 7, "export": { "sheet_name": "Sales" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.forecast_horizon_days, 7);
        assert_eq!(cfg.export.sheet_name, "Sales");
        assert_eq!(cfg.export.date_format, "yyyy-mm-dd");
        assert_eq!(cfg.default_source, PathBuf::from(DEFAULT_SOURCE_PATH));
        assert_eq!(cfg.columns, ColumnMapping::default());
    }

    #[test]
    fn rejects_non_ascii_delimiter() {
        let err = PipelineConfig::from_json_str(r#"{ "delimiter": "§" }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn rejects_empty_alias_list() {
        let err = PipelineConfig::from_json_str(r#"{ "columns": { "region": [] } }"#).unwrap_err();
        assert!(err.to_string().contains("column 'region'"));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = PipelineConfig::from_json_str("{ not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn export_headers_follow_record_field_order() {
        let mapping = ColumnMapping::default();
        let headers = mapping.export_headers();
        assert_eq!(
            headers,
            ["data", "produto", "regiao", "quantidade", "preco_unitario", "total_venda"]
        );
    }
}

//! # sales-report
//!
//! Command-line front end for the sales pipeline: loads a source, applies a filter, logs the
//! dashboard numbers and optionally writes the filtered workbook and a JSON report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use sales_pipeline::config::PipelineConfig;
use sales_pipeline::ingestion::{cli_observer, load_or_default, LoadOptions, SalesSource, SheetSelection};
use sales_pipeline::pipeline::{run, DashboardReport};
use sales_pipeline::types::{AggregationResult, FilterCriteria};

#[derive(Parser)]
#[command(name = "sales-report")]
#[command(about = "Sales dashboard numbers from a CSV or workbook", long_about = None)]
struct Cli {
    /// Input file (CSV or workbook). Defaults to the configured default source.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worksheet to read when the input is a workbook (default: first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Keep only these products (repeatable; default: all)
    #[arg(long = "product")]
    products: Vec<String>,

    /// Keep only these regions (repeatable; default: all)
    #[arg(long = "region")]
    regions: Vec<String>,

    /// First date to keep, YYYY-MM-DD (default: earliest date in the data)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date to keep, YYYY-MM-DD (default: latest date in the data)
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Forecast horizon in days (overrides the config)
    #[arg(long)]
    horizon: Option<u32>,

    /// Write the filtered records to this .xlsx file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write a JSON report to this file ("-" for stdout)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Append load outcomes (successes, failures, alerts) to this file
    #[arg(long)]
    load_log: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_path(path).with_context(|| format!("reading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(h) = cli.horizon {
        config.forecast_horizon_days = h;
    }

    let observer = cli_observer(cli.load_log.as_deref()).context("opening load log")?;
    let mut options = LoadOptions::from_config(&config).with_observer(observer);
    if let Some(sheet) = &cli.sheet {
        options.sheet = SheetSelection::Named(sheet.clone());
    }

    let source = cli.input.as_ref().map(SalesSource::from_path);
    let records = load_or_default(source.as_ref(), &config.default_source, &options).context("loading sales records")?;

    // An empty source still runs so every view reports "no data".
    let mut criteria = FilterCriteria::select_all(&records).unwrap_or_else(|| {
        log::warn!("source contains no records");
        FilterCriteria::select_none()
    });
    if !cli.products.is_empty() {
        criteria.allowed_products = cli.products.iter().cloned().collect();
    }
    if !cli.regions.is_empty() {
        criteria.allowed_regions = cli.regions.iter().cloned().collect();
    }
    if let Some(start) = cli.start {
        criteria.date_range.start = start;
    }
    if let Some(end) = cli.end {
        criteria.date_range.end = end;
    }

    let report = run(&records, &criteria, &config);
    log_report(&report);

    if let Some(path) = &cli.export {
        let bytes = report.export.as_ref().map_err(|e| anyhow::anyhow!("{e}"))?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {} filtered records to {}", report.filtered_records.len(), path.display());
    }

    if let Some(path) = &cli.json {
        let json = serde_json::to_string_pretty(&report.summary())?;
        if path.as_os_str() == "-" {
            println!("{json}");
        } else {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        }
    }

    Ok(())
}

fn log_report(report: &DashboardReport) {
    for (label, view) in [("all records", &report.full), ("filtered", &report.filtered)] {
        match &view.summary {
            Ok(m) => log::info!(
                "{label}: total sales {:.2}, quantity {}, mean unit price {:.2}",
                m.total_sales,
                m.total_quantity,
                m.mean_unit_price
            ),
            Err(e) => log::info!("{label}: no data ({e})"),
        }
        log_groups(label, "region", &view.breakdown.by_region);
        log_groups(label, "product", &view.breakdown.by_product);
    }

    match &report.forecast {
        Ok(f) => {
            if let (Some(first), Some(last)) = (f.points.first(), f.points.last()) {
                log::info!(
                    "forecast: slope {:.4}/day, {} -> {:.2}, {} -> {:.2}",
                    f.model.slope,
                    first.date,
                    first.value,
                    last.date,
                    last.value
                );
            }
        }
        Err(e) => log::warn!("cannot forecast: {e}"),
    }
}

fn log_groups(label: &str, dimension: &str, groups: &AggregationResult) {
    if groups.is_empty() {
        return;
    }
    let rendered: Vec<String> = groups
        .groups()
        .iter()
        .map(|g| format!("{}={:.2}", g.key, g.value))
        .collect();
    log::info!("{label} by {dimension}: {}", rendered.join(", "));
}

//! Record loading entrypoints and implementations.
//!
//! Most callers should use [`load`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`LoadOptions`])
//! - parses rows into typed [`crate::types::SalesRecord`]s
//! - optionally reports success/failure/alerts to a [`LoadObserver`]
//!
//! Format-specific functions are also available under [`csv`] and (feature `excel`) `excel`.
//! [`DatasetCache`] memoizes loads by content hash.

pub mod cache;
pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
mod fields;
pub mod observability;
pub mod unified;

pub use cache::{CacheKey, CacheStats, DatasetCache};
pub use observability::{cli_observer, CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, LogObserver};
pub use unified::{load, load_or_default, LoadOptions, SalesSource, SheetSelection, SourceFormat};

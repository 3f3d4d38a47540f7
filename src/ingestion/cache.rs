//! Explicit cache of loaded record sets.
//!
//! Interactive callers re-run the pipeline on every selection change; the cache lets them skip
//! re-parsing a source whose content has not changed. Entries are keyed by a hash of the source
//! bytes together with the options that affect parsing, and are only removed by
//! [`DatasetCache::invalidate`] or [`DatasetCache::clear`].

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::PipelineResult;
use crate::types::RecordSet;

use super::unified::{load, resolve_format, LoadOptions, SalesSource};

/// Identity of a cached record set: content hash plus parsing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(u64);

impl CacheKey {
    /// Compute the key for `source` under `options`. Path sources are read from disk.
    pub fn for_source(source: &SalesSource, options: &LoadOptions) -> PipelineResult<Self> {
        let mut hasher = DefaultHasher::new();
        match source {
            SalesSource::Path(p) => std::fs::read(p)?.hash(&mut hasher),
            SalesSource::Bytes { bytes, .. } => bytes.hash(&mut hasher),
        }
        resolve_format(source, options)?.hash(&mut hasher);
        options.sheet.hash(&mut hasher);
        options.columns.hash(&mut hasher);
        options.date_formats.hash(&mut hasher);
        options.delimiter.hash(&mut hasher);
        Ok(Self(hasher.finish()))
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Content-addressed cache of loaded [`RecordSet`]s.
///
/// Owned by the caller; there is no process-wide instance.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<CacheKey, Arc<RecordSet>>,
    stats: CacheStats,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached record set for `source`, loading and caching it on a miss.
    ///
    /// Failed loads are not cached.
    ///
    /// A path source is read once; the key and the parsed records both come from that snapshot.
    pub fn load(&mut self, source: &SalesSource, options: &LoadOptions) -> PipelineResult<(CacheKey, Arc<RecordSet>)> {
        let snapshot;
        let source = match source {
            SalesSource::Path(p) => {
                snapshot = SalesSource::from_bytes(p.display().to_string(), std::fs::read(p)?);
                &snapshot
            }
            SalesSource::Bytes { .. } => source,
        };

        let key = CacheKey::for_source(source, options)?;
        if let Some(records) = self.entries.get(&key) {
            self.stats.hits += 1;
            log::debug!("dataset cache hit for {}", source.describe());
            return Ok((key, Arc::clone(records)));
        }

        self.stats.misses += 1;
        let records = Arc::new(load(source, options)?);
        self.entries.insert(key, Arc::clone(&records));
        Ok((key, records))
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<RecordSet>> {
        self.entries.get(key).cloned()
    }

    /// Drop one entry. Returns `true` if it was present.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

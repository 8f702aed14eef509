//! Memoized pattern parsing.
//!
//! Configuration systems tend to hold a small set of distinct shift
//! patterns and evaluate them over and over. [`PatternCache`] maps
//! trimmed pattern text to its parsed [`ShiftSpec`] so each distinct
//! pattern is parsed once per cache. The cache is an explicit value:
//! construct one and share it wherever memoized parsing should apply;
//! there is no process-wide instance.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::Result;
use crate::spec::ShiftSpec;

/// A read-many/write-one cache of parsed shift patterns.
///
/// Lookups share a read lock and never block each other; an insert
/// takes the write lock briefly and publishes a fully built,
/// immutable spec behind an [`Arc`]. Parse failures are returned to
/// the caller and never stored. Entries live for the cache's
/// lifetime; there is no eviction.
///
/// # Examples
///
/// ```
/// use calshift::PatternCache;
///
/// let cache = PatternCache::new();
/// let a = cache.parse("D$1").unwrap();
/// let b = cache.parse("  D$1  ").unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Default)]
pub struct PatternCache {
    entries: RwLock<HashMap<String, Arc<ShiftSpec>>>,
}

impl PatternCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `pattern`, reusing the cached spec when one exists.
    ///
    /// Keys are trimmed patterns, so `"D$1"` and `"  D$1 "` share one
    /// entry. Blank patterns yield a fresh identity spec and bypass
    /// the cache. When two threads race on the same new pattern, the
    /// first stored spec wins and both callers receive it.
    ///
    /// # Errors
    ///
    /// Any [`ShiftError`](crate::ShiftError) from parsing; the cache
    /// is left untouched in that case.
    pub fn parse(&self, pattern: &str) -> Result<Arc<ShiftSpec>> {
        let key = pattern.trim();
        if key.is_empty() {
            return Ok(Arc::new(ShiftSpec::parse(key)?));
        }

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(spec) = entries.get(key) {
                return Ok(Arc::clone(spec));
            }
        }

        // Parse with no lock held; only a success gets published.
        let spec = Arc::new(ShiftSpec::parse(key)?);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key.to_string()).or_insert(spec)))
    }

    /// Number of distinct patterns currently cached.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

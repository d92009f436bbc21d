//! LRU cache of finished translations. Parsing, resolving, and rendering
//! the same query string repeatedly is pure waste; the result only changes
//! when the query text, dialect, flags, or mapping version change.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::{SqlDialectKind, TranslatorConfig};
use crate::Translation;

/// Cache lookup key. Whitespace runs in the query text are collapsed so
/// reformatted copies of the same query share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    normalized_query: String,
    dialect: String,
    collection_join_subquery: bool,
    /// Mapping-file version; a reloaded catalog must not serve stale SQL.
    schema_version: String,
}

impl CacheKey {
    pub fn new(
        query: &str,
        dialect: SqlDialectKind,
        collection_join_subquery: bool,
        schema_version: &str,
    ) -> Self {
        let normalized = query.split_whitespace().collect::<Vec<&str>>().join(" ");
        CacheKey {
            normalized_query: normalized,
            dialect: dialect.to_string(),
            collection_join_subquery,
            schema_version: schema_version.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    translation: Translation,
    /// Logical access tick. Wall clocks have second granularity and tie
    /// under load; a counter gives a total LRU order.
    last_accessed: u64,
}

/// Translation cache with LRU eviction and hit/miss counters.
pub struct TranslationCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    /// Per-key computation locks: at most one translation runs per key,
    /// other callers for the same key block and then read the cached
    /// result.
    in_flight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
    enabled: bool,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    clock: AtomicU64,
}

impl TranslationCache {
    pub fn new(enabled: bool, capacity: usize) -> Self {
        TranslationCache {
            entries: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            enabled,
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            clock: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(config.cache_enabled, config.cache_capacity)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Translation> {
        if !self.enabled {
            return None;
        }
        let tick = self.tick();
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(key) {
            entry.last_accessed = tick;
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(entry.translation.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    pub fn insert(&self, key: CacheKey, translation: Translation) {
        if !self.enabled || self.capacity == 0 {
            return;
        }
        let tick = self.tick();
        let mut entries = self.entries.lock().unwrap();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            self.evict_lru(&mut entries);
        }
        entries.insert(
            key,
            CacheEntry {
                translation,
                last_accessed: tick,
            },
        );
    }

    /// Counter-free lookup for the post-wait recheck; the caller already
    /// recorded its miss.
    fn peek(&self, key: &CacheKey) -> Option<Translation> {
        let tick = self.tick();
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get_mut(key)?;
        entry.last_accessed = tick;
        Some(entry.translation.clone())
    }

    /// Cached lookup with at-most-one concurrent translation per key:
    /// losers of the race block on the key's slot, then find the winner's
    /// result already cached.
    pub fn get_or_translate<E>(
        &self,
        key: CacheKey,
        translate: impl FnOnce() -> Result<Translation, E>,
    ) -> Result<Translation, E> {
        if !self.enabled {
            return translate();
        }
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let slot = {
            let mut in_flight = self.in_flight.lock().unwrap();
            in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let guard = slot.lock().unwrap();
        if let Some(hit) = self.peek(&key) {
            return Ok(hit);
        }
        let result = translate();
        if let Ok(translation) = &result {
            self.insert(key.clone(), translation.clone());
        }
        drop(guard);
        self.in_flight.lock().unwrap().remove(&key);
        result
    }

    fn evict_lru(&self, entries: &mut HashMap<CacheKey, CacheEntry>) {
        if let Some((key, _)) = entries.iter().min_by_key(|(_, entry)| entry.last_accessed) {
            let key = key.clone();
            entries.remove(&key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn metrics(&self) -> CacheMetrics {
        let entries = self.entries.lock().unwrap();
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: entries.len(),
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::sql_generator::SqlStatement;

    fn translation(sql: &str) -> Translation {
        Translation {
            statement: SqlStatement {
                sql: sql.to_string(),
                parameters: vec![],
            },
            shape: None,
        }
    }

    #[test]
    fn whitespace_runs_share_a_key() {
        let a = CacheKey::new("from Person p  where\n p.name = :n", SqlDialectKind::Generic, true, "1");
        let b = CacheKey::new("from Person p where p.name = :n", SqlDialectKind::Generic, true, "1");
        assert_eq!(a, b);
    }

    #[test]
    fn dialect_and_flags_split_keys() {
        let a = CacheKey::new("from Person", SqlDialectKind::Generic, true, "1");
        let b = CacheKey::new("from Person", SqlDialectKind::Postgres, true, "1");
        let c = CacheKey::new("from Person", SqlDialectKind::Generic, false, "1");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn basic_hit_and_miss_counting() {
        let cache = TranslationCache::new(true, 16);
        let key = CacheKey::new("from Person", SqlDialectKind::Generic, true, "1");

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), translation("select * from person"));
        assert_eq!(cache.get(&key).unwrap().statement.sql, "select * from person");

        let metrics = cache.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.size, 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = TranslationCache::new(true, 2);
        let k1 = CacheKey::new("q1", SqlDialectKind::Generic, true, "1");
        let k2 = CacheKey::new("q2", SqlDialectKind::Generic, true, "1");
        let k3 = CacheKey::new("q3", SqlDialectKind::Generic, true, "1");

        cache.insert(k1.clone(), translation("s1"));
        cache.insert(k2.clone(), translation("s2"));
        cache.get(&k1);
        cache.insert(k3.clone(), translation("s3"));

        assert!(cache.get(&k1).is_some());
        assert!(cache.get(&k2).is_none());
        assert!(cache.get(&k3).is_some());
        assert_eq!(cache.metrics().evictions, 1);
    }

    #[test]
    fn get_or_translate_computes_once_per_key() {
        let cache = TranslationCache::new(true, 16);
        let key = CacheKey::new("from Person", SqlDialectKind::Generic, true, "1");
        let mut calls = 0;

        let first: Result<_, ()> = cache.get_or_translate(key.clone(), || {
            calls += 1;
            Ok(translation("s"))
        });
        assert_eq!(first.unwrap().statement.sql, "s");

        let second: Result<_, ()> = cache.get_or_translate(key, || {
            calls += 1;
            Ok(translation("other"))
        });
        assert_eq!(second.unwrap().statement.sql, "s");
        assert_eq!(calls, 1);
    }

    #[test]
    fn failed_translations_are_not_cached() {
        let cache = TranslationCache::new(true, 16);
        let key = CacheKey::new("bad query", SqlDialectKind::Generic, true, "1");

        let first: Result<Translation, &str> =
            cache.get_or_translate(key.clone(), || Err("parse error"));
        assert!(first.is_err());

        let second: Result<Translation, &str> =
            cache.get_or_translate(key, || Ok(translation("fixed")));
        assert_eq!(second.unwrap().statement.sql, "fixed");
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let cache = TranslationCache::new(false, 16);
        let key = CacheKey::new("from Person", SqlDialectKind::Generic, true, "1");
        cache.insert(key.clone(), translation("s"));
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.metrics().size, 0);
    }
}

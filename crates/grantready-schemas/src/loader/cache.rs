//! Caching layer for parsed documents
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::DocumentKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

/// Cache key: document kind plus the identifier it was requested under
pub type CacheKey = (DocumentKind, String);

/// Cache entry containing a parsed document and metadata
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached document content
    pub content: Value,
    /// Concrete document name in the store
    pub document_name: String,
    /// When this entry was cached
    pub cached_at: SystemTime,
    /// Source modification time when cached, if the store tracks one
    pub source_mtime: Option<SystemTime>,
}

impl CacheEntry {
    /// Create a new cache entry
    pub fn new(content: Value, document_name: String, source_mtime: Option<SystemTime>) -> Self {
        Self {
            content,
            document_name,
            cached_at: SystemTime::now(),
            source_mtime,
        }
    }

    /// Check if this cache entry is still valid.
    ///
    /// An entry cached with a modification time is stale once the source is
    /// newer or no longer reports one (deleted).
    pub fn is_valid(&self, current_mtime: Option<SystemTime>, max_age: Option<Duration>) -> bool {
        match (self.source_mtime, current_mtime) {
            (Some(cached), Some(current)) if current > cached => return false,
            (Some(_), None) => return false,
            _ => {}
        }

        if let Some(max_age) = max_age {
            if let Ok(elapsed) = self.cached_at.elapsed() {
                if elapsed > max_age {
                    return false;
                }
            }
        }

        true
    }

    /// Get the age of this cache entry
    pub fn age(&self) -> Option<Duration> {
        self.cached_at.elapsed().ok()
    }
}

/// Configuration for cache behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cache size (number of entries)
    pub max_entries: usize,
    /// Maximum age for cache entries, in seconds
    pub max_age_secs: Option<u64>,
    /// Whether to enable cache
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            max_age_secs: Some(3600),
            enabled: true,
        }
    }
}

impl CacheConfig {
    /// Maximum entry age as a duration
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age_secs.map(Duration::from_secs)
    }

    /// A configuration with caching turned off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// In-memory LRU cache for loaded documents
#[derive(Debug)]
pub struct DocumentCache {
    entries: HashMap<CacheKey, CacheEntry>,
    config: CacheConfig,
    access_order: Vec<CacheKey>,
}

impl DocumentCache {
    /// Create a new cache with default configuration
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create a new cache with custom configuration
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            access_order: Vec::new(),
        }
    }

    /// Get a cached entry if it exists and is still valid
    pub fn get(&mut self, key: &CacheKey, current_mtime: Option<SystemTime>) -> Option<CacheEntry> {
        if !self.config.enabled {
            return None;
        }

        let valid = self
            .entries
            .get(key)
            .map(|entry| entry.is_valid(current_mtime, self.config.max_age()))?;

        if valid {
            self.touch(key);
            self.entries.get(key).cloned()
        } else {
            self.remove(key);
            None
        }
    }

    /// Cache an entry, evicting the least recently used one when full
    pub fn put(&mut self, key: CacheKey, entry: CacheEntry) {
        if !self.config.enabled || self.config.max_entries == 0 {
            return;
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_entries {
            self.evict_lru();
        }

        self.entries.insert(key.clone(), entry);
        self.touch(&key);
    }

    /// Remove a specific entry from cache
    pub fn remove(&mut self, key: &CacheKey) -> bool {
        self.access_order.retain(|k| k != key);
        self.entries.remove(key).is_some()
    }

    /// Check if cache contains a key
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Clear all cache entries
    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
    }

    /// Drop entries older than the configured maximum age
    pub fn cleanup_expired(&mut self) -> usize {
        let max_age = self.config.max_age();
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_valid(None, max_age))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let ages: Vec<Duration> = self.entries.values().filter_map(CacheEntry::age).collect();
        let average_age = if ages.is_empty() {
            None
        } else {
            Some(ages.iter().sum::<Duration>() / ages.len() as u32)
        };

        CacheStats {
            total_entries: self.entries.len(),
            max_entries: self.config.max_entries,
            average_age,
            enabled: self.config.enabled,
        }
    }

    fn evict_lru(&mut self) {
        if let Some(oldest) = self.access_order.first().cloned() {
            self.remove(&oldest);
        }
    }

    fn touch(&mut self, key: &CacheKey) {
        self.access_order.retain(|k| k != key);
        self.access_order.push(key.clone());
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring and debugging
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub max_entries: usize,
    pub average_age: Option<Duration>,
    pub enabled: bool,
}

impl CacheStats {
    /// Cache utilization as a percentage
    pub fn utilization(&self) -> f64 {
        if self.max_entries == 0 {
            0.0
        } else {
            (self.total_entries as f64 / self.max_entries as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(name: &str) -> CacheKey {
        (DocumentKind::Schema, name.to_string())
    }

    fn entry(name: &str) -> CacheEntry {
        CacheEntry::new(json!({"title": name}), format!("{}.json", name), None)
    }

    #[test]
    fn test_cache_entry_validity() {
        let mtime = SystemTime::now();
        let entry = CacheEntry::new(json!({}), "grant.json".to_string(), Some(mtime));

        assert!(entry.is_valid(Some(mtime), None));
        assert!(!entry.is_valid(Some(mtime + Duration::from_secs(1)), None));

        // Source gone
        assert!(!entry.is_valid(None, None));

        let untracked = CacheEntry::new(json!({}), "grant.json".to_string(), None);
        assert!(untracked.is_valid(None, None));

        std::thread::sleep(Duration::from_millis(2));
        assert!(!entry.is_valid(Some(mtime), Some(Duration::from_millis(1))));
    }

    #[test]
    fn test_cache_operations() {
        let mut cache = DocumentCache::new();

        assert!(cache.get(&key("grant"), None).is_none());

        cache.put(key("grant"), entry("grant"));
        let cached = cache.get(&key("grant"), None).unwrap();
        assert_eq!(cached.content["title"], "grant");
        assert!(cache.contains(&key("grant")));

        assert!(cache.remove(&key("grant")));
        assert!(!cache.contains(&key("grant")));
    }

    #[test]
    fn test_cache_lru_eviction() {
        let mut cache = DocumentCache::with_config(CacheConfig {
            max_entries: 2,
            max_age_secs: None,
            enabled: true,
        });

        cache.put(key("grant"), entry("grant"));
        cache.put(key("audit"), entry("audit"));

        // Touch grant so audit becomes least recently used
        assert!(cache.get(&key("grant"), None).is_some());

        cache.put(key("disbursement"), entry("disbursement"));
        assert!(cache.contains(&key("grant")));
        assert!(!cache.contains(&key("audit")));
        assert!(cache.contains(&key("disbursement")));
    }

    #[test]
    fn test_stale_entry_is_dropped() {
        let mut cache = DocumentCache::new();
        let mtime = SystemTime::now();
        cache.put(
            key("grant"),
            CacheEntry::new(json!({}), "grant.json".to_string(), Some(mtime)),
        );

        assert!(cache.get(&key("grant"), Some(mtime + Duration::from_secs(5))).is_none());
        assert!(!cache.contains(&key("grant")));
    }

    #[test]
    fn test_deleted_source_is_dropped() {
        let mut cache = DocumentCache::new();
        cache.put(
            key("grant"),
            CacheEntry::new(json!({}), "grant.json".to_string(), Some(SystemTime::now())),
        );

        assert!(cache.get(&key("grant"), None).is_none());
        assert!(!cache.contains(&key("grant")));
    }

    #[test]
    fn test_disabled_cache() {
        let mut cache = DocumentCache::with_config(CacheConfig::disabled());
        cache.put(key("grant"), entry("grant"));

        assert!(cache.get(&key("grant"), None).is_none());
        assert!(!cache.contains(&key("grant")));
        assert!(!cache.stats().enabled);
    }

    #[test]
    fn test_cache_stats() {
        let cache = DocumentCache::new();
        let stats = cache.stats();

        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.max_entries, 256);
        assert_eq!(stats.utilization(), 0.0);
        assert!(stats.average_age.is_none());
    }
}

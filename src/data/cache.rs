use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use crate::data::types::TeamSuggestion;

pub struct SuggestionCache {
    cache: DashMap<String, CachedSuggestions>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

struct CachedSuggestions {
    teams: Vec<TeamSuggestion>,
    timestamp: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Hit rate in percent, 0 when nothing was looked up yet
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64 * 100.0
    }
}

impl SuggestionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn key(query: &str) -> String {
        query.trim().to_lowercase()
    }

    /// Store search results. A zero TTL disables caching.
    /// Every insert also sweeps expired entries.
    pub fn insert(&self, query: &str, teams: Vec<TeamSuggestion>) {
        if self.ttl.is_zero() {
            return;
        }

        self.cache.retain(|_, entry| entry.timestamp.elapsed() <= self.ttl);
        self.cache.insert(Self::key(query), CachedSuggestions {
            teams,
            timestamp: Instant::now(),
        });
    }

    /// Get results if not expired (evict on read)
    pub fn get(&self, query: &str) -> Option<Vec<TeamSuggestion>> {
        let key = Self::key(query);
        let found = self.cache.get(&key).and_then(|entry| {
            if entry.timestamp.elapsed() > self.ttl {
                drop(entry); // Drop the read lock
                self.cache.remove(&key);
                None
            } else {
                Some(entry.teams.clone())
            }
        });

        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

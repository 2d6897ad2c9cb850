use crate::models::{MatchResult, SearchQuery};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Seconds per cache-key time bucket (15 minutes)
const BUCKET_SECS: i64 = 900;

/// A cached, already-sorted search result with its own TTL
#[derive(Clone)]
struct CachedSearch {
    results: Arc<Vec<MatchResult>>,
    ttl: Duration,
}

/// Per-entry expiry policy: each insert carries its own TTL
struct PerEntryTtl;

impl moka::Expiry<String, CachedSearch> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedSearch,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Time-windowed memoization of ranked search results
///
/// Safe under concurrent searches: a `put` racing a `get` on the same
/// key hands out either the old or the new `Arc`, never a torn value.
/// Expired entries are never returned; eviction is handled by the
/// cache itself on top of the per-entry TTL check.
pub struct SearchCache {
    entries: moka::future::Cache<String, CachedSearch>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SearchCache {
    pub fn new(capacity: u64) -> Self {
        let entries = moka::future::Cache::builder()
            .max_capacity(capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self {
            entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a ranked result; absent and expired behave the same
    pub async fn get(&self, key: &str) -> Option<Arc<Vec<MatchResult>>> {
        match self.entries.get(key).await {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Cache hit: {}", key);
                Some(entry.results)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Cache miss: {}", key);
                None
            }
        }
    }

    /// Store a ranked result under its quantized key
    pub async fn put(&self, key: String, results: Vec<MatchResult>, ttl_secs: u64) {
        let entry = CachedSearch {
            results: Arc::new(results),
            ttl: Duration::from_secs(ttl_secs),
        };
        self.entries.insert(key, entry).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Hit/miss bookkeeping, useful for metrics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
}

/// Floor a timestamp to its 15-minute bucket boundary
///
/// Near-duplicate queries issued within the same quarter-hour share a
/// cache entry. Deliberate precision/hit-rate trade-off.
pub fn quantize_time(t: DateTime<Utc>) -> DateTime<Utc> {
    let secs = t.timestamp();
    let floored = secs - secs.rem_euclid(BUCKET_SECS);
    DateTime::from_timestamp(floored, 0).unwrap_or(t)
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Composite key over origin, destination and the quantized time
    pub fn search(query: &SearchQuery) -> String {
        format!(
            "search:{:.6}:{:.6}:{:.6}:{:.6}:{}",
            query.rider_origin.lat,
            query.rider_origin.lng,
            query.rider_dest.lat,
            query.rider_dest.lng,
            quantize_time(query.requested_time).to_rfc3339()
        )
    }
}

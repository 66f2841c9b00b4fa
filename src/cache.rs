//! TTL-bounded decision cache
//!
//! The cache is advisory: anything doubtful (expired entry, clock skew)
//! falls back to a miss and a fresh evaluation. A stale cache must never
//! make a request more permissive than re-evaluating would.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::types::{Action, Decision};

/// Sentinel resource id for actions with no single target
const NO_RESOURCE: &str = "-";

/// Cache key: principal, action, resource instance
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey {
    user_id: String,
    action: String,
    resource_id: String,
}

impl CacheKey {
    pub fn new(user_id: &str, action: &Action, resource_id: Option<&str>) -> Self {
        Self {
            user_id: user_id.to_string(),
            action: action.as_str().to_string(),
            resource_id: resource_id.unwrap_or(NO_RESOURCE).to_string(),
        }
    }
}

/// Entry with its expiry; replaced wholesale on `put`, never mutated
#[derive(Debug, Clone)]
struct CacheEntry {
    decision: Decision,
    expires_at: Instant,
}

/// Thread-safe decision cache with lazy TTL expiry
#[derive(Debug, Default)]
pub struct DecisionCache {
    entries: DashMap<CacheKey, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
}

/// Cache statistics
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub entries: usize,
}

impl DecisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live entry; expired entries are evicted and count as a miss
    pub fn get(&self, key: &CacheKey) -> Option<Decision> {
        if let Some(entry) = self.entries.get(key) {
            if Instant::now() < entry.expires_at {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.decision.clone());
            }
            drop(entry);
            self.entries.remove(key);
            self.expirations.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert a verdict; an existing entry is replaced along with its expiry
    pub fn put(&self, key: CacheKey, decision: Decision, ttl: Duration) {
        let entry = CacheEntry {
            decision,
            expires_at: Instant::now() + ttl,
        };
        self.entries.insert(key, entry);
    }

    /// Drop every expired entry
    pub fn sweep(&self) {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        let swept = before.saturating_sub(self.entries.len());
        self.expirations.fetch_add(swept as u64, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

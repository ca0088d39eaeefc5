//! Feed caching.
//!
//! Caches rendered global-feed pages for a short, declared TTL to shave load
//! off the hottest read path. Writes never invalidate entries synchronously:
//! a post created inside the cache window only becomes visible once the
//! window expires. That staleness is accepted, observable behavior.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

/// Default cache TTL: 20 seconds.
const DEFAULT_FEED_TTL_SECS: i64 = 20;

/// A cached feed page.
#[derive(Debug, Clone)]
struct CachedPage {
    /// Serialized page payload, stored verbatim.
    payload: serde_json::Value,
    /// When this cache entry was created.
    cached_at: DateTime<Utc>,
}

impl CachedPage {
    /// Check if this cache entry is stale.
    fn is_stale(&self, ttl_secs: i64) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age.num_seconds() >= ttl_secs
    }
}

/// In-process, time-bounded cache for feed pages.
///
/// Keys are `view:page` (e.g. `global:1`) so every page of a view is cached
/// independently, matching how the pages are requested.
#[derive(Clone)]
pub struct FeedCache {
    entries: Arc<RwLock<HashMap<String, CachedPage>>>,
    ttl_secs: i64,
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedCache {
    /// Create a new feed cache with the default TTL.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl_secs: DEFAULT_FEED_TTL_SECS,
        }
    }

    /// Create a new feed cache with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl_secs: ttl.as_secs() as i64,
        }
    }

    /// Generate the cache key for a view and page number.
    #[must_use]
    pub fn page_key(view: &str, page: u64) -> String {
        format!("{view}:{page}")
    }

    /// Get a cached page if present and not expired.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.is_stale(self.ttl_secs) {
            debug!(key = key, "Feed cache entry expired");
            return None;
        }
        debug!(key = key, "Feed cache hit");
        Some(entry.payload.clone())
    }

    /// Store a page payload under the given key.
    ///
    /// Expired entries are dropped on the same write lock, so the map is
    /// bounded by the keys requested within one TTL window.
    pub async fn set(&self, key: &str, payload: serde_json::Value) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_stale(self.ttl_secs));
        entries.insert(
            key.to_string(),
            CachedPage {
                payload,
                cached_at: Utc::now(),
            },
        );
    }
}

//! Process-wide cache for resolved asset URLs (product images, client
//! avatars).
//!
//! The cache is an explicit object with a defined lifecycle: constructed at
//! startup, injected into consumers, and clearable. Tests build isolated
//! instances instead of sharing a module-level singleton.
//!
//! # Staleness
//!
//! URL resolution is asynchronous, so two fetches for the same key can
//! resolve out of order. Each fetch takes a generation stamp before starting;
//! [`AssetUrlCache::insert`] only stores a response whose stamp is at least
//! as new as the stored one, so a slow stale response never overwrites a
//! fresher entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Generation-stamped key-value cache of resolved URLs.
#[derive(Default)]
pub struct AssetUrlCache {
    entries: RwLock<HashMap<String, (u64, String)>>,
    generation: AtomicU64,
}

impl AssetUrlCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a generation stamp for a fetch that is about to start.
    pub fn stamp(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get the cached URL for a key.
    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(key).map(|(_, url)| url.clone())
    }

    /// Store a resolved URL under the stamp its fetch took.
    ///
    /// Returns `false` (and leaves the entry alone) when a newer response
    /// already landed for this key.
    pub async fn insert(&self, key: &str, stamp: u64, url: impl Into<String>) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some((stored, _)) if *stored > stamp => false,
            _ => {
                entries.insert(key.to_string(), (stamp, url.into()));
                true
            }
        }
    }

    /// Drop one entry.
    pub async fn remove(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    /// Drop everything.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    /// Whether the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = AssetUrlCache::new();
        let stamp = cache.stamp();
        assert!(cache.insert("client-1", stamp, "https://cdn/a.png").await);
        assert_eq!(
            cache.get("client-1").await.as_deref(),
            Some("https://cdn/a.png")
        );
    }

    #[tokio::test]
    async fn test_stale_response_does_not_overwrite_newer_entry() {
        let cache = AssetUrlCache::new();

        // Two fetches start; the second resolves first.
        let old_stamp = cache.stamp();
        let new_stamp = cache.stamp();

        assert!(cache.insert("client-1", new_stamp, "https://cdn/new.png").await);
        assert!(!cache.insert("client-1", old_stamp, "https://cdn/old.png").await);

        assert_eq!(
            cache.get("client-1").await.as_deref(),
            Some("https://cdn/new.png")
        );
    }

    #[tokio::test]
    async fn test_clear_and_remove() {
        let cache = AssetUrlCache::new();
        let stamp = cache.stamp();
        cache.insert("a", stamp, "url-a").await;
        let stamp = cache.stamp();
        cache.insert("b", stamp, "url-b").await;
        assert_eq!(cache.len().await, 2);

        cache.remove("a").await;
        assert!(cache.get("a").await.is_none());

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}

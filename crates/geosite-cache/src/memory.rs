//! In-process cache implementation.
//!
//! [`MemoryCache`] keeps every bucket in a `HashMap` guarded by an `RwLock`.
//! Handles returned by [`Cache::bucket`] for the same name share storage, so
//! an invalidation through one handle is visible through all others.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::{Cache, CacheBucket};

type Entries = Arc<RwLock<HashMap<String, Vec<u8>>>>;

/// In-memory [`Cache`] shared across threads.
#[derive(Default)]
pub struct MemoryCache {
    buckets: RwLock<HashMap<String, Entries>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self, name: &str) -> Entries {
        {
            let buckets = self.buckets.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entries) = buckets.get(name) {
                return Arc::clone(entries);
            }
        }

        let mut buckets = self.buckets.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(buckets.entry(name.to_owned()).or_default())
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            entries: self.entries(name),
        })
    }
}

/// A single bucket backed by a shared map.
struct MemoryCacheBucket {
    name: String,
    entries: Entries,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &[u8]) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_vec());
    }

    fn remove(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn remove_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        tracing::debug!(bucket = %self.name, prefix, removed, "Removed cache entries");
        removed
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!(bucket = %self.name, "Cleared cache bucket");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(MemoryCache: Send, Sync);

    #[test]
    fn test_get_after_set() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("templates");

        assert_eq!(bucket.get("a.com/home"), None);
        bucket.set("a.com/home", b"one");
        assert_eq!(bucket.get("a.com/home"), Some(b"one".to_vec()));

        bucket.set("a.com/home", b"two");
        assert_eq!(bucket.get("a.com/home"), Some(b"two".to_vec()));
    }

    #[test]
    fn test_handles_share_storage() {
        let cache = MemoryCache::new();
        let writer = cache.bucket("templates");
        let reader = cache.bucket("templates");

        writer.set("k", b"v");
        assert_eq!(reader.get("k"), Some(b"v".to_vec()));

        reader.remove("k");
        assert_eq!(writer.get("k"), None);
    }

    #[test]
    fn test_buckets_are_isolated() {
        let cache = MemoryCache::new();
        cache.bucket("templates").set("k", b"template");
        cache.bucket("config").set("k", b"config");

        cache.bucket("templates").clear();

        assert_eq!(cache.bucket("templates").get("k"), None);
        assert_eq!(cache.bucket("config").get("k"), Some(b"config".to_vec()));
    }

    #[test]
    fn test_remove_prefix() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("templates");
        bucket.set("a.com/home", b"1");
        bucket.set("a.com/city", b"2");
        bucket.set("ab.com/home", b"3");

        let removed = bucket.remove_prefix("a.com/");

        assert_eq!(removed, 2);
        assert_eq!(bucket.get("a.com/home"), None);
        assert_eq!(bucket.get("ab.com/home"), Some(b"3".to_vec()));
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("config");

        bucket.remove("missing");
        assert_eq!(bucket.remove_prefix("missing"), 0);
    }
}

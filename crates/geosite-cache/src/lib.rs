//! Cache abstraction layer for geosite.
//!
//! This crate provides generic caching traits that decouple cache consumers
//! from the underlying storage mechanism. Two traits form the core API:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Key-value store with explicit invalidation
//!
//! Entries never expire on their own. They live until a caller removes them,
//! either one key at a time, by key prefix, or by clearing the bucket.
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: In-process implementation shared across threads
//!
//! # Example
//!
//! ```
//! use geosite_cache::{Cache, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let bucket = cache.bucket("templates");
//! bucket.set("example.com/home", b"<html>hello</html>");
//! assert!(bucket.get("example.com/home").is_some());
//!
//! bucket.remove_prefix("example.com/");
//! assert_eq!(bucket.get("example.com/home"), None);
//! ```

mod ext;
mod memory;

pub use ext::CacheBucketExt;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// Each bucket stores key-value pairs of raw bytes. Keys are opaque strings
/// chosen by the caller; a `/`-separated layout (e.g. `"{domain}/{page}"`)
/// makes [`remove_prefix`](CacheBucket::remove_prefix) useful for dropping a
/// whole group at once.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `None` on cache miss.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value in the cache, overwriting any existing entry.
    fn set(&self, key: &str, value: &[u8]);

    /// Remove a single entry. Missing keys are ignored.
    fn remove(&self, key: &str);

    /// Remove every entry whose key starts with `prefix`.
    ///
    /// Returns the number of removed entries.
    fn remove_prefix(&self, prefix: &str) -> usize;

    /// Remove every entry in the bucket.
    fn clear(&self);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// A `Cache` produces buckets that are logically isolated from each other.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    ///
    /// Calling `bucket` multiple times with the same name may return
    /// independent handles that share the same underlying storage.
    ///
    /// # Arguments
    ///
    /// * `name` - Bucket name (e.g., "templates", "config")
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
///
/// Every `get` returns `None`; every `set` is silently discarded.
/// Used as the bucket type for [`NullCache`].
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}

    fn remove(&self, _key: &str) {}

    fn remove_prefix(&self, _prefix: &str) -> usize {
        0
    }

    fn clear(&self) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when caching is disabled: every request re-reads from storage.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}

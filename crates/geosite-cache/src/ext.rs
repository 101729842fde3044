//! Extension trait for [`CacheBucket`] with typed convenience methods.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// Typed convenience methods for [`CacheBucket`].
///
/// Provides `get_json`/`set_json` for serde-serializable types and
/// `get_string`/`set_string` for UTF-8 strings. [`CacheBucket`] itself stays
/// object-safe and only deals in bytes.
///
/// # Example
///
/// ```
/// use geosite_cache::{Cache, CacheBucketExt, MemoryCache};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Settings { service: String }
///
/// let cache = MemoryCache::new();
/// let bucket = cache.bucket("config");
///
/// bucket.set_json("example.com", &Settings { service: "Plumbing".into() });
/// let settings: Option<Settings> = bucket.get_json("example.com");
/// assert_eq!(settings.unwrap().service, "Plumbing");
/// ```
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a JSON-deserialized value from the cache.
    ///
    /// Returns `None` on cache miss or deserialization failure.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get(key)?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Store a value as JSON in the cache.
    ///
    /// Logs and does nothing if serialization fails.
    fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, &bytes),
            Err(e) => tracing::warn!(key, error = %e, "Failed to serialize cache entry"),
        }
    }

    /// Retrieve a cached UTF-8 string.
    ///
    /// Returns `None` on cache miss or invalid UTF-8.
    fn get_string(&self, key: &str) -> Option<String> {
        let bytes = self.get(key)?;
        String::from_utf8(bytes).ok()
    }

    /// Store a string value in the cache.
    fn set_string(&self, key: &str, value: &str) {
        self.set(key, value.as_bytes());
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

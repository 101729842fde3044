//! Cached per-domain templates and configuration.
//!
//! Templates and configurations are read from [`DomainStorage`] on first use
//! and kept in cache buckets until invalidated. Failed reads are never cached,
//! so a template or configuration that appears later is picked up on the next
//! request.
//!
//! # Thread Safety
//!
//! Loads run without holding any lock. A generation counter is read before a
//! load and compared before its result is stored; if an invalidation happened
//! in between, the result is served to the caller but not cached. The compare
//! and the store happen under `store_lock`, which invalidation also takes, so
//! a stale value can never be written after the invalidation that dropped it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use geosite_cache::{Cache, CacheBucket, CacheBucketExt};
use geosite_storage::{DomainConfig, DomainStorage, StorageError};

/// What an invalidation drops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidationScope {
    /// Configuration and every template of one root domain.
    Domain(String),
    /// Everything.
    All,
}

/// Template and configuration access with explicit invalidation.
pub(crate) struct DomainStore {
    storage: Arc<dyn DomainStorage>,
    templates: Box<dyn CacheBucket>,
    configs: Box<dyn CacheBucket>,
    generation: AtomicU64,
    store_lock: Mutex<()>,
}

impl DomainStore {
    pub(crate) fn new(storage: Arc<dyn DomainStorage>, cache: &dyn Cache) -> Self {
        Self {
            storage,
            templates: cache.bucket("templates"),
            configs: cache.bucket("config"),
            generation: AtomicU64::new(0),
            store_lock: Mutex::new(()),
        }
    }

    /// Raw text of a template.
    pub(crate) fn template(&self, domain: &str, page: &str) -> Result<String, StorageError> {
        let key = format!("{domain}/{page}");
        if let Some(text) = self.templates.get_string(&key) {
            return Ok(text);
        }

        tracing::debug!(domain, page, "Template cache miss");
        let generation = self.generation.load(Ordering::Acquire);
        let text = self.storage.read_template(domain, page)?;
        self.store_if_current(generation, || self.templates.set_string(&key, &text));
        Ok(text)
    }

    /// Configuration of a domain.
    ///
    /// A missing or unreadable configuration is logged and replaced by an
    /// empty one, so placeholders fall back to their default literal.
    pub(crate) fn config(&self, domain: &str) -> DomainConfig {
        if let Some(config) = self.configs.get_json(domain) {
            return config;
        }

        tracing::debug!(domain, "Config cache miss");
        let generation = self.generation.load(Ordering::Acquire);
        match self.storage.read_config(domain) {
            Ok(config) => {
                self.store_if_current(generation, || self.configs.set_json(domain, &config));
                config
            }
            Err(e) => {
                tracing::warn!(domain, error = %e, "Failed to load domain configuration");
                DomainConfig::new()
            }
        }
    }

    /// Drop cached entries.
    pub(crate) fn invalidate(&self, scope: &InvalidationScope) {
        let _guard = self.store_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::AcqRel);

        match scope {
            InvalidationScope::Domain(domain) => {
                let domain = domain.to_lowercase();
                self.configs.remove(&domain);
                let removed = self.templates.remove_prefix(&format!("{domain}/"));
                tracing::info!(%domain, templates = removed, "Invalidated domain cache");
            }
            InvalidationScope::All => {
                self.configs.clear();
                self.templates.clear();
                tracing::info!("Invalidated all domain caches");
            }
        }
    }

    fn store_if_current(&self, generation: u64, store: impl FnOnce()) {
        let _guard = self.store_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::Acquire) == generation {
            store();
        }
    }
}

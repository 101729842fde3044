//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain_config::DomainConfig;
use crate::storage::{DomainStorage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores templates and configurations in memory. Use the builder methods
/// to configure the mock with test data, and the setters to change data
/// between requests. Read counters make cache behavior observable.
///
/// # Example
///
/// ```ignore
/// use geosite_storage::{DomainConfig, DomainStorage, MockStorage};
///
/// let storage = MockStorage::new()
///     .with_template("example.com", "city", "<h1>[City]</h1>")
///     .with_config("example.com", DomainConfig::new().with("main-service", "Plumbing"));
///
/// assert_eq!(storage.read_template("example.com", "city").unwrap(), "<h1>[City]</h1>");
/// assert_eq!(storage.template_reads(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    templates: RwLock<HashMap<(String, String), String>>,
    configs: RwLock<HashMap<String, Result<DomainConfig, String>>>,
    template_reads: AtomicUsize,
    config_reads: AtomicUsize,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_template(
        self,
        domain: impl Into<String>,
        page: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.set_template(domain, page, content);
        self
    }

    /// Add a domain configuration.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_config(self, domain: impl Into<String>, config: DomainConfig) -> Self {
        self.set_config(domain, config);
        self
    }

    /// Make the configuration of a domain fail to parse.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_broken_config(self, domain: impl Into<String>, message: impl Into<String>) -> Self {
        self.configs
            .write()
            .unwrap()
            .insert(domain.into(), Err(message.into()));
        self
    }

    /// Add or replace a template.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_template(
        &self,
        domain: impl Into<String>,
        page: impl Into<String>,
        content: impl Into<String>,
    ) {
        self.templates
            .write()
            .unwrap()
            .insert((domain.into(), page.into()), content.into());
    }

    /// Add or replace a domain configuration.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_config(&self, domain: impl Into<String>, config: DomainConfig) {
        self.configs
            .write()
            .unwrap()
            .insert(domain.into(), Ok(config));
    }

    /// Remove a template.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove_template(&self, domain: &str, page: &str) {
        self.templates
            .write()
            .unwrap()
            .remove(&(domain.to_owned(), page.to_owned()));
    }

    /// Number of `read_template` calls so far.
    #[must_use]
    pub fn template_reads(&self) -> usize {
        self.template_reads.load(Ordering::SeqCst)
    }

    /// Number of `read_config` calls so far.
    #[must_use]
    pub fn config_reads(&self) -> usize {
        self.config_reads.load(Ordering::SeqCst)
    }
}

impl DomainStorage for MockStorage {
    fn read_template(&self, domain: &str, page: &str) -> Result<String, StorageError> {
        self.template_reads.fetch_add(1, Ordering::SeqCst);
        self.templates
            .read()
            .unwrap()
            .get(&(domain.to_owned(), page.to_owned()))
            .cloned()
            .ok_or_else(|| {
                StorageError::not_found(format!("{domain}/{page}.html")).with_backend(BACKEND)
            })
    }

    fn read_config(&self, domain: &str) -> Result<DomainConfig, StorageError> {
        self.config_reads.fetch_add(1, Ordering::SeqCst);
        match self.configs.read().unwrap().get(domain) {
            Some(Ok(config)) => Ok(config.clone()),
            Some(Err(message)) => Err(StorageError::new(StorageErrorKind::Parse)
                .with_path(format!("{domain}/required.json"))
                .with_backend(BACKEND)
                .with_source(std::io::Error::other(message.clone()))),
            None => Err(
                StorageError::not_found(format!("{domain}/required.json")).with_backend(BACKEND)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_read_template_counts() {
        let storage = MockStorage::new().with_template("a.com", "home", "hello");

        assert_eq!(storage.read_template("a.com", "home").unwrap(), "hello");
        assert!(storage.read_template("a.com", "missing").unwrap_err().is_not_found());
        assert_eq!(storage.template_reads(), 2);
    }

    #[test]
    fn test_set_and_remove_template() {
        let storage = MockStorage::new().with_template("a.com", "home", "v1");

        storage.set_template("a.com", "home", "v2");
        assert_eq!(storage.read_template("a.com", "home").unwrap(), "v2");

        storage.remove_template("a.com", "home");
        assert!(storage.read_template("a.com", "home").unwrap_err().is_not_found());
    }

    #[test]
    fn test_read_config_variants() {
        let storage = MockStorage::new()
            .with_config("a.com", DomainConfig::new().with("main-service", "Plumbing"))
            .with_broken_config("b.com", "unexpected end of input");

        assert_eq!(
            storage
                .read_config("a.com")
                .unwrap()
                .get_text("main-service")
                .as_deref(),
            Some("Plumbing")
        );
        assert_eq!(
            storage.read_config("b.com").unwrap_err().kind,
            StorageErrorKind::Parse
        );
        assert!(storage.read_config("c.com").unwrap_err().is_not_found());
        assert_eq!(storage.config_reads(), 3);
    }
}

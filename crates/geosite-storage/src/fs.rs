//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading domain trees from the local filesystem.

use std::fs;
use std::path::PathBuf;

use crate::domain_config::DomainConfig;
use crate::storage::{
    DomainStorage, StorageError, StorageErrorKind, is_valid_domain_name, is_valid_page_name,
};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Default name of the per-domain configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "required.json";

/// Filesystem storage implementation.
///
/// Templates live at `{root}/{domain}/{page}.html`, the configuration at
/// `{root}/{domain}/{config_file}`. Domain and page names are validated before
/// any path is built, so requests can never escape `root`.
///
/// # Example
///
/// ```no_run
/// use std::path::PathBuf;
/// use geosite_storage::{DomainStorage, FsStorage};
///
/// let storage = FsStorage::new(PathBuf::from("domains")).with_config_file("site.json");
/// let home = storage.read_template("example.com", "home")?;
/// # Ok::<(), geosite_storage::StorageError>(())
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// Directory containing one subdirectory per domain.
    root: PathBuf,
    /// File name of the per-domain configuration.
    config_file: String,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config_file: DEFAULT_CONFIG_FILE.to_owned(),
        }
    }

    /// Use a different configuration file name.
    #[must_use]
    pub fn with_config_file(mut self, name: impl Into<String>) -> Self {
        self.config_file = name.into();
        self
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn domain_dir(&self, domain: &str) -> Result<PathBuf, StorageError> {
        if !is_valid_domain_name(domain) {
            return Err(StorageError::invalid_path(domain).with_backend(BACKEND));
        }
        Ok(self.root.join(domain))
    }

    fn read_file(path: PathBuf) -> Result<String, StorageError> {
        fs::read_to_string(&path)
            .map_err(|e| StorageError::io(e, Some(path)).with_backend(BACKEND))
    }
}

impl DomainStorage for FsStorage {
    fn read_template(&self, domain: &str, page: &str) -> Result<String, StorageError> {
        if !is_valid_page_name(page) {
            return Err(StorageError::invalid_path(page).with_backend(BACKEND));
        }
        let path = self.domain_dir(domain)?.join(format!("{page}.html"));
        tracing::debug!(path = %path.display(), "Reading template");
        Self::read_file(path)
    }

    fn read_config(&self, domain: &str) -> Result<DomainConfig, StorageError> {
        let path = self.domain_dir(domain)?.join(&self.config_file);
        let text = Self::read_file(path.clone())?;

        DomainConfig::from_json(&text).map_err(|e| {
            StorageError::new(StorageErrorKind::Parse)
                .with_path(path)
                .with_backend(BACKEND)
                .with_source(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn domain_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let domain = dir.path().join("example.com");
        fs::create_dir_all(&domain).unwrap();
        fs::write(domain.join("home.html"), "<h1>Home</h1>").unwrap();
        fs::write(domain.join("city.html"), "<h1>[City]</h1>").unwrap();
        fs::write(
            domain.join("required.json"),
            r#"{"main-service": "Plumbing", "Phone": "555-0100"}"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_read_template() {
        let dir = domain_tree();
        let storage = FsStorage::new(dir.path().to_path_buf());

        assert_eq!(
            storage.read_template("example.com", "city").unwrap(),
            "<h1>[City]</h1>"
        );
    }

    #[test]
    fn test_read_missing_template_is_not_found() {
        let dir = domain_tree();
        let storage = FsStorage::new(dir.path().to_path_buf());

        let err = storage.read_template("example.com", "about").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = domain_tree();
        let storage = FsStorage::new(dir.path().to_path_buf());

        let err = storage.read_template("example.com", "../home").unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::InvalidPath);

        let err = storage.read_template("..", "home").unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
    }

    #[test]
    fn test_read_config() {
        let dir = domain_tree();
        let storage = FsStorage::new(dir.path().to_path_buf());

        let config = storage.read_config("example.com").unwrap();

        assert_eq!(config.get_text("main-service").as_deref(), Some("Plumbing"));
        assert_eq!(config.get_text("Phone").as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_read_config_custom_file_name() {
        let dir = domain_tree();
        fs::write(
            dir.path().join("example.com/site.json"),
            r#"{"main-service": "Roofing"}"#,
        )
        .unwrap();
        let storage = FsStorage::new(dir.path().to_path_buf()).with_config_file("site.json");

        let config = storage.read_config("example.com").unwrap();

        assert_eq!(config.get_text("main-service").as_deref(), Some("Roofing"));
    }

    #[test]
    fn test_read_config_parse_error() {
        let dir = domain_tree();
        fs::write(dir.path().join("example.com/required.json"), "[1, 2").unwrap();
        let storage = FsStorage::new(dir.path().to_path_buf());

        let err = storage.read_config("example.com").unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::Parse);
        assert!(err.downcast_source::<serde_json::Error>().is_some());
    }

    #[test]
    fn test_read_config_missing_domain() {
        let dir = domain_tree();
        let storage = FsStorage::new(dir.path().to_path_buf());

        let err = storage.read_config("other.com").unwrap_err();

        assert!(err.is_not_found());
    }
}

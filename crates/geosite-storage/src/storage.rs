//! Storage trait and error types.
//!
//! Provides the core [`DomainStorage`] trait for reading per-domain templates
//! and configuration, along with [`StorageError`] for unified error handling
//! across backends.
//!
//! # Naming Convention
//!
//! Domains are bare root domains (`"example.com"`), never full hostnames.
//! Pages are template names without extension (`"home"`, `"city"`, `"about"`).
//! Storage implementations handle the mapping to their internal format.

use std::path::PathBuf;

use crate::domain_config::DomainConfig;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Domain or page name is not acceptable.
    InvalidPath,
    /// Resource exists but could not be parsed.
    Parse,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create an invalid path error with path.
    #[must_use]
    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::InvalidPath).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// Whether the error means the resource is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Parse => "Parse error",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Per-domain template and configuration source.
///
/// Implementations are consulted on cache misses only; callers are expected
/// to cache results and invalidate them explicitly.
pub trait DomainStorage: Send + Sync {
    /// Read the raw text of a page template.
    ///
    /// # Arguments
    ///
    /// * `domain` - Root domain (e.g., "example.com")
    /// * `page` - Template name without extension (e.g., "home", "city", "about")
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] with [`StorageErrorKind::NotFound`] if the
    /// template doesn't exist, [`StorageErrorKind::InvalidPath`] for rejected
    /// names, or another kind if it can't be read.
    fn read_template(&self, domain: &str, page: &str) -> Result<String, StorageError>;

    /// Read the flat configuration object of a domain.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the configuration is missing, unreadable,
    /// or not a JSON object ([`StorageErrorKind::Parse`]).
    fn read_config(&self, domain: &str) -> Result<DomainConfig, StorageError>;
}

/// Check whether `name` is a usable page name: ASCII letters, digits, `-`, `_`.
#[must_use]
pub fn is_valid_page_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Check whether `name` is a usable domain directory name.
///
/// Accepts dot-separated labels of ASCII letters, digits and `-`. Empty
/// labels (and therefore `.` and `..`) are rejected.
#[must_use]
pub fn is_valid_domain_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|label| {
            !label.is_empty()
                && label
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

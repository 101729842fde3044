//! Per-domain template and configuration storage for geosite.
//!
//! Every served root domain owns a small tree:
//!
//! ```text
//! {domains_dir}/
//! +-- example.com/
//!     +-- required.json   # flat key/value configuration
//!     +-- home.html       # root page
//!     +-- state.html      # state page
//!     +-- city.html       # city home page
//!     +-- about.html      # named page
//!     +-- 404.html        # not-found page
//! ```
//!
//! The crate provides:
//! - [`DomainStorage`] trait with `read_template()` and `read_config()` methods
//! - [`DomainConfig`]: The parsed flat configuration object
//! - [`FsStorage`] implementation for the directory layout above
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use geosite_storage::{DomainStorage, FsStorage};
//!
//! let storage = FsStorage::new(PathBuf::from("domains"));
//! let template = storage.read_template("example.com", "city")?;
//! let config = storage.read_config("example.com")?;
//! # Ok::<(), geosite_storage::StorageError>(())
//! ```

mod domain_config;
mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use domain_config::DomainConfig;
pub use fs::{DEFAULT_CONFIG_FILE, FsStorage};
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{DomainStorage, StorageError, StorageErrorKind, is_valid_domain_name, is_valid_page_name};

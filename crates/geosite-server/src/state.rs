//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use geosite_site::Site;
use tokio::sync::Mutex;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Page resolver.
    pub(crate) site: Arc<Site>,
    /// Geo database used by reloads.
    pub(crate) database: PathBuf,
    /// Application version for `ETag` computation.
    pub(crate) version: String,
    /// Serializes geo reloads.
    pub(crate) reload_lock: Mutex<()>,
}

impl AppState {
    pub(crate) fn new(site: Arc<Site>, database: PathBuf, version: String) -> Self {
        Self {
            site,
            database,
            version,
            reload_lock: Mutex::new(()),
        }
    }
}

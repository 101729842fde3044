//! HTTP server for geosite.
//!
//! This crate provides a thin axum adapter over [`geosite_site::Site`]:
//! - `GET /` and `GET /{page}`: pages resolved from the `Host` header
//! - `POST /api/invalidate`: drop cached templates and configuration
//! - `POST /api/geo/reload`: rebuild the geo index from the database
//!
//! # Quick Start
//!
//! ```ignore
//! use geosite_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         port: 8001,
//!         version: "1.0.0".to_owned(),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Client ──HTTP──► axum server (geosite-server)
//!                      │
//!                      ├─► Page routes ──► Site::respond ──► GeoIndex + templates
//!                      │
//!                      └─► Admin routes ──► Site::invalidate / Site::replace_geo_index
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use geosite_cache::MemoryCache;
use geosite_geo::GeoIndex;
use geosite_renderer::{SeedCache, SubstitutionEngine};
use geosite_site::{Site, SiteConfig};
use geosite_storage::{DEFAULT_CONFIG_FILE, DomainStorage, FsStorage};
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Root of the per-domain template/config tree.
    pub domains_dir: PathBuf,
    /// Name of the per-domain configuration file.
    pub config_file: String,
    /// `SQLite` geo database.
    pub database: PathBuf,
    /// Number of trailing host labels that form the root domain.
    pub root_labels: usize,
    /// Scheme of generated links and default request scheme.
    pub link_scheme: String,
    /// Domain configuration key holding the service name.
    pub service_field: String,
    /// Literal used for missing placeholder values.
    pub fallback: String,
    /// Extra placeholder tokens mapped to built-in tokens.
    pub aliases: Vec<(String, String)>,
    /// Application version (part of the `ETag`).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let site = SiteConfig::default();
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8001,
            domains_dir: PathBuf::from("domains"),
            config_file: DEFAULT_CONFIG_FILE.to_owned(),
            database: PathBuf::from("newcities.db"),
            root_labels: site.root_labels,
            link_scheme: site.link_scheme,
            service_field: site.service_field,
            fallback: geosite_renderer::DEFAULT_FALLBACK.to_owned(),
            aliases: Vec::new(),
            version: String::new(),
        }
    }
}

/// Load the geo index from the configured database.
///
/// # Errors
///
/// Returns [`ServerError::Geo`] if the database cannot be read or is empty.
pub async fn load_geo_index(config: &ServerConfig) -> Result<GeoIndex, ServerError> {
    let records = geosite_geo::load_sqlite(&config.database).await?;
    let index = GeoIndex::from_records(records);
    tracing::info!(
        states = index.state_count(),
        cities = index.city_count(),
        records = index.record_count(),
        "Built geo index"
    );
    Ok(index)
}

/// Build the page resolver for a configuration.
///
/// Templates are read from the filesystem and cached in memory until
/// invalidated.
#[must_use]
pub fn build_site(config: &ServerConfig, geo: Arc<GeoIndex>) -> Site {
    let storage: Arc<dyn DomainStorage> = Arc::new(
        FsStorage::new(config.domains_dir.clone()).with_config_file(config.config_file.clone()),
    );
    let engine = SubstitutionEngine::new(Arc::new(SeedCache::new()))
        .with_fallback(config.fallback.clone())
        .with_aliases(config.aliases.iter().cloned());
    let site_config = SiteConfig {
        root_labels: config.root_labels,
        link_scheme: config.link_scheme.clone(),
        service_field: config.service_field.clone(),
    };

    Site::new(geo, storage, &MemoryCache::new(), site_config).with_engine(engine)
}

/// Run the server.
///
/// Loads the geo index first; the server does not start without it.
///
/// # Errors
///
/// Returns an error if the geo index cannot be loaded or the server fails to
/// start.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let geo = Arc::new(load_geo_index(&config).await?);
    let site = Arc::new(build_site(&config, geo));

    let state = Arc::new(AppState::new(
        site,
        config.database.clone(),
        config.version.clone(),
    ));
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, domains = %config.domains_dir.display(), "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from geosite config.
#[must_use]
pub fn server_config_from_geosite_config(
    config: &geosite_config::Config,
    version: String,
) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        domains_dir: config.site_resolved.domains_dir.clone(),
        config_file: config.site_resolved.config_file.clone(),
        database: config.geo_resolved.database.clone(),
        root_labels: config.site_resolved.root_labels,
        link_scheme: config.site_resolved.link_scheme.clone(),
        service_field: config.site_resolved.service_field.clone(),
        fallback: config.placeholders.fallback.clone(),
        aliases: config
            .placeholders
            .aliases
            .iter()
            .map(|(alias, target)| (alias.clone(), target.clone()))
            .collect(),
        version,
    }
}

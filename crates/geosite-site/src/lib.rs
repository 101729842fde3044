//! Subdomain resolution and page rendering for geosite.
//!
//! This crate provides:
//! - [`Site`]: Resolves a `(host, page)` request to HTML
//! - [`resolve_subdomain`]: Parses `<service>-<city>-<st>` subdomains
//! - [`LinkBuilder`] and [`peer_cities`]: State, city and peer-city links
//! - [`TemplateEvaluator`]: Second-stage template evaluation (minijinja by default)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! use geosite_cache::MemoryCache;
//! use geosite_geo::GeoIndex;
//! use geosite_site::{PageRequest, PageStatus, Site, SiteConfig};
//! use geosite_storage::FsStorage;
//!
//! let geo = Arc::new(GeoIndex::default());
//! let storage = Arc::new(FsStorage::new(PathBuf::from("domains")));
//! let site = Site::new(geo, storage, &MemoryCache::new(), SiteConfig::default());
//!
//! let response = site.respond(&PageRequest::new("plumbing-austin-tx.example.com").with_page("about"));
//! if response.status == PageStatus::Ok {
//!     println!("{}", response.body);
//! }
//! ```

mod context;
mod domain;
mod error;
mod evaluator;
mod host;
mod links;
mod site;
mod subdomain;
mod util;

pub use domain::InvalidationScope;
pub use error::ResolveError;
pub use evaluator::{EvaluateError, JinjaEvaluator, TemplateEvaluator};
pub use host::{HostInfo, Scope};
pub use links::{LinkBuilder, MAX_PEER_CITIES, peer_cities};
pub use site::{
    CITY_TEMPLATE, HOME_TEMPLATE, NOT_FOUND_BODY, NOT_FOUND_TEMPLATE, PageRequest, PageStatus,
    RenderedPage, STATE_TEMPLATE, Site, SiteConfig, SiteResponse,
};
pub use subdomain::{SubdomainError, SubdomainTriple, resolve_subdomain};
pub use util::{canonical_url, has_template_syntax, insert_canonical_link, slugify, title_case};

//! Page resolution.
//!
//! Provides [`Site`], which turns a `(host, page)` request into HTML.
//!
//! # Scopes
//!
//! The host decides what is rendered:
//! - Root domain or `www.` alias: `home` template with links to every state
//! - `<st>.<root>` for a known state: `state` template with links to its cities
//! - `<service>-<city>-<st>.<root>`: `city` template (or a named page) rewritten
//!   by the [`SubstitutionEngine`] for that city
//!
//! Root and state templates, and city pages that still contain template syntax
//! after substitution, are rendered by the [`TemplateEvaluator`].
//!
//! # Thread Safety
//!
//! `Site` is designed for concurrent access:
//! - `geo()` returns `Arc<GeoIndex>` with minimal locking (just Arc clone)
//! - `replace_geo_index()` swaps the whole index; in-flight requests keep their snapshot
//! - `invalidate()` drops cached templates and configuration for later requests

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Local;
use geosite_cache::Cache;
use geosite_geo::GeoIndex;
use geosite_renderer::{SeedCache, SubstitutionContext, SubstitutionEngine};
use geosite_storage::{DomainConfig, DomainStorage, is_valid_page_name};
use serde::Serialize;

use crate::context::{CityContext, RootContext, SiteFields, StateContext, business_info};
use crate::domain::{DomainStore, InvalidationScope};
use crate::error::ResolveError;
use crate::evaluator::{EvaluateError, JinjaEvaluator, TemplateEvaluator};
use crate::host::{HostInfo, Scope};
use crate::links::{LinkBuilder, peer_cities};
use crate::subdomain::resolve_subdomain;
use crate::util::{canonical_url, has_template_syntax, insert_canonical_link, title_case};

/// Template of the root page.
pub const HOME_TEMPLATE: &str = "home";
/// Template of state pages.
pub const STATE_TEMPLATE: &str = "state";
/// Template of city home pages.
pub const CITY_TEMPLATE: &str = "city";
/// Template of not-found pages.
pub const NOT_FOUND_TEMPLATE: &str = "404";
/// Body served when a domain has no not-found template.
pub const NOT_FOUND_BODY: &str = "Page not found";

/// Site-wide settings.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Number of trailing host labels that form the root domain.
    pub root_labels: usize,
    /// Scheme of generated state and city links.
    pub link_scheme: String,
    /// Domain configuration key holding the service name.
    pub service_field: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_labels: 2,
            link_scheme: "https".to_owned(),
            service_field: "main-service".to_owned(),
        }
    }
}

/// A page request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// `Host` header value (port allowed).
    pub host: String,
    /// Named page, `None` for the host's home page.
    pub page: Option<String>,
    /// Request scheme for canonical URLs; defaults to the link scheme.
    pub scheme: Option<String>,
}

impl PageRequest {
    /// Request the home page of `host`.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Request a named page instead.
    #[must_use]
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Set the request scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }
}

/// A successfully rendered page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    /// Final HTML.
    pub body: String,
    /// Scope the host resolved to.
    pub scope: Scope,
    /// Template the page was rendered from.
    pub template: String,
}

/// Outcome class of a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageStatus {
    /// Page rendered.
    Ok,
    /// Not-found page served.
    NotFound,
}

/// A response body with its status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteResponse {
    /// Outcome class.
    pub status: PageStatus,
    /// HTML or plain-text body.
    pub body: String,
}

/// What a host resolved to.
enum Resolved {
    Root,
    State { code: String },
    City(CityMatch),
}

/// A city host matched against the geo index.
struct CityMatch {
    service_name: String,
    /// Title-cased display name.
    city_name: String,
    /// Lowercase state code.
    state_code: String,
    main_zip_code: String,
}

/// Per-request values shared by the scope renderers.
struct RequestParts<'a> {
    host: HostInfo,
    geo: Arc<GeoIndex>,
    config: DomainConfig,
    service: Option<String>,
    scheme: &'a str,
    page: Option<&'a str>,
}

/// Page resolution over a geo index, domain templates and configuration.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use geosite_cache::MemoryCache;
/// use geosite_geo::{GeoIndex, GeoRecord};
/// use geosite_site::{PageRequest, Site, SiteConfig};
/// use geosite_storage::{DomainConfig, DomainStorage, FsStorage};
///
/// let geo = Arc::new(GeoIndex::from_records([GeoRecord::new(
///     "Austin", "TX", "Texas", "73301", "73301",
/// )]));
/// let storage: Arc<dyn DomainStorage> = Arc::new(FsStorage::new("domains".into()));
/// let site = Site::new(geo, storage, &MemoryCache::new(), SiteConfig::default());
///
/// let response = site.respond(&PageRequest::new("plumbing-austin-tx.example.com"));
/// ```
pub struct Site {
    /// Current geo index snapshot (atomically swappable).
    geo: RwLock<Arc<GeoIndex>>,
    domains: DomainStore,
    engine: SubstitutionEngine,
    evaluator: Box<dyn TemplateEvaluator>,
    config: SiteConfig,
}

impl Site {
    /// Create a site.
    ///
    /// Uses a fresh [`SeedCache`], the default fallback literal and a
    /// [`JinjaEvaluator`]; replace them with [`with_engine`](Self::with_engine)
    /// and [`with_evaluator`](Self::with_evaluator).
    #[must_use]
    pub fn new(
        geo: Arc<GeoIndex>,
        storage: Arc<dyn DomainStorage>,
        cache: &dyn Cache,
        config: SiteConfig,
    ) -> Self {
        Self {
            geo: RwLock::new(geo),
            domains: DomainStore::new(storage, cache),
            engine: SubstitutionEngine::new(Arc::new(SeedCache::new())),
            evaluator: Box::new(JinjaEvaluator::new()),
            config,
        }
    }

    /// Use a configured substitution engine.
    #[must_use]
    pub fn with_engine(mut self, engine: SubstitutionEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Use a different template evaluator.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Box<dyn TemplateEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Site-wide settings.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Current geo index snapshot.
    #[must_use]
    pub fn geo(&self) -> Arc<GeoIndex> {
        Arc::clone(&self.geo.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in a rebuilt geo index.
    ///
    /// Requests already running keep the index they started with.
    pub fn replace_geo_index(&self, index: Arc<GeoIndex>) {
        tracing::info!(
            states = index.state_count(),
            records = index.record_count(),
            "Replaced geo index"
        );
        *self.geo.write().unwrap_or_else(PoisonError::into_inner) = index;
    }

    /// Drop cached templates and configuration.
    pub fn invalidate(&self, scope: &InvalidationScope) {
        self.domains.invalidate(scope);
    }

    /// Resolve a request to a rendered page.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] for every not-found condition: malformed
    /// hosts or subdomains, unknown geography, missing templates and failed
    /// template evaluation.
    pub fn resolve(&self, request: &PageRequest) -> Result<RenderedPage, ResolveError> {
        let host = HostInfo::parse(&request.host, self.config.root_labels)?;
        let geo = self.geo();
        let config = self.domains.config(&host.root_domain);
        let service = config
            .get_text(&self.config.service_field)
            .filter(|s| !s.is_empty());

        let resolved = detect_scope(&host, &geo, service.as_deref())?;
        let parts = RequestParts {
            host,
            geo,
            config,
            service,
            scheme: request.scheme.as_deref().unwrap_or(&self.config.link_scheme),
            page: request.page.as_deref().filter(|p| !p.is_empty()),
        };

        let page = match resolved {
            Resolved::Root => self.render_root(&parts)?,
            Resolved::State { code } => self.render_state(&parts, &code)?,
            Resolved::City(city) => self.render_city(&parts, &city)?,
        };

        tracing::debug!(
            host = %parts.host.host,
            scope = page.scope.as_str(),
            template = %page.template,
            "Resolved page"
        );
        Ok(page)
    }

    /// Resolve a request, serving the not-found page on failure.
    ///
    /// The not-found page is the domain's `404` template, rewritten for the
    /// city when the host names a known city, else served as-is. Without a
    /// `404` template the body is [`NOT_FOUND_BODY`].
    #[must_use]
    pub fn respond(&self, request: &PageRequest) -> SiteResponse {
        match self.resolve(request) {
            Ok(page) => SiteResponse {
                status: PageStatus::Ok,
                body: page.body,
            },
            Err(err) => {
                match &err {
                    ResolveError::MissingTemplate { .. } | ResolveError::Evaluation(_) => {
                        tracing::warn!(host = %request.host, page = ?request.page, error = %err, "Serving not-found page");
                    }
                    _ => {
                        tracing::debug!(host = %request.host, page = ?request.page, error = %err, "Serving not-found page");
                    }
                }
                SiteResponse {
                    status: PageStatus::NotFound,
                    body: self.not_found_body(request),
                }
            }
        }
    }

    fn render_root(&self, parts: &RequestParts<'_>) -> Result<RenderedPage, ResolveError> {
        reject_named_page(parts.page, Scope::Root)?;
        let template = self.template(&parts.host.root_domain, HOME_TEMPLATE)?;

        let body = if has_template_syntax(&template) {
            let links = self.links(&parts.host);
            let ctx = RootContext {
                state_links: links.state_links(parts.geo.states()),
                site: SiteFields::new(
                    &parts.config,
                    parts.service.clone(),
                    canonical_url(parts.scheme, &parts.host.host, "/"),
                ),
            };
            self.evaluate(&template, &ctx)?
        } else {
            template
        };

        Ok(RenderedPage {
            body,
            scope: Scope::Root,
            template: HOME_TEMPLATE.to_owned(),
        })
    }

    fn render_state(
        &self,
        parts: &RequestParts<'_>,
        code: &str,
    ) -> Result<RenderedPage, ResolveError> {
        reject_named_page(parts.page, Scope::State)?;
        let template = self.template(&parts.host.root_domain, STATE_TEMPLATE)?;

        let body = if has_template_syntax(&template) {
            let links = self.links(&parts.host);
            let cities = parts.geo.cities_in_state(code);
            let city_links = parts
                .service
                .as_deref()
                .map(|service| links.city_links(service, &cities, code))
                .unwrap_or_default();
            let ctx = StateContext {
                state: code.to_uppercase(),
                state_full_name: parts.geo.state_full_name(code).map(str::to_owned),
                city_links,
                site: SiteFields::new(
                    &parts.config,
                    parts.service.clone(),
                    canonical_url(parts.scheme, &parts.host.host, "/"),
                ),
            };
            self.evaluate(&template, &ctx)?
        } else {
            template
        };

        Ok(RenderedPage {
            body,
            scope: Scope::State,
            template: STATE_TEMPLATE.to_owned(),
        })
    }

    fn render_city(
        &self,
        parts: &RequestParts<'_>,
        city: &CityMatch,
    ) -> Result<RenderedPage, ResolveError> {
        let (template_name, path) = match parts.page {
            Some(page) if !is_valid_page_name(page) => {
                return Err(ResolveError::InvalidPage(page.to_owned()));
            }
            Some(page) => (page, format!("/{page}")),
            None => (CITY_TEMPLATE, "/".to_owned()),
        };
        let template = self.template(&parts.host.root_domain, template_name)?;

        let canonical = canonical_url(parts.scheme, &parts.host.host, &path);
        let ctx = substitution_context(
            &parts.geo,
            city,
            &parts.config,
            Some(canonical.clone()),
        );

        let mut body = self.engine.render(&template, &ctx);
        if let Some(with_link) = insert_canonical_link(&body, &canonical) {
            body = with_link;
        }

        if has_template_syntax(&body) {
            let others = parts
                .geo
                .other_cities_in_state(&city.state_code, &city.city_name);
            let links = self.links(&parts.host).city_links(
                &city.service_name,
                peer_cities(&others, &city.city_name),
                &city.state_code,
            );
            let eval_ctx = CityContext::new(&ctx, &parts.config, links, &Local::now());
            body = self.evaluate(&body, &eval_ctx)?;
        }

        Ok(RenderedPage {
            body,
            scope: Scope::City,
            template: template_name.to_owned(),
        })
    }

    fn not_found_body(&self, request: &PageRequest) -> String {
        let Ok(host) = HostInfo::parse(&request.host, self.config.root_labels) else {
            return NOT_FOUND_BODY.to_owned();
        };
        let Ok(template) = self.template(&host.root_domain, NOT_FOUND_TEMPLATE) else {
            return NOT_FOUND_BODY.to_owned();
        };

        let geo = self.geo();
        let config = self.domains.config(&host.root_domain);
        let service = config
            .get_text(&self.config.service_field)
            .filter(|s| !s.is_empty());

        match detect_scope(&host, &geo, service.as_deref()) {
            Ok(Resolved::City(city)) => {
                let ctx = substitution_context(&geo, &city, &config, None);
                self.engine.render(&template, &ctx)
            }
            _ => template,
        }
    }

    fn template(&self, domain: &str, page: &str) -> Result<String, ResolveError> {
        self.domains
            .template(domain, page)
            .map_err(|source| ResolveError::MissingTemplate {
                domain: domain.to_owned(),
                page: page.to_owned(),
                source,
            })
    }

    fn links(&self, host: &HostInfo) -> LinkBuilder {
        LinkBuilder::new(&self.config.link_scheme, &host.root_domain)
    }

    fn evaluate<T: Serialize>(&self, source: &str, ctx: &T) -> Result<String, ResolveError> {
        let value = serde_json::to_value(ctx).map_err(EvaluateError::from)?;
        Ok(self.evaluator.evaluate(source, &value)?)
    }
}

/// Decide the scope of a host.
fn detect_scope(
    host: &HostInfo,
    geo: &GeoIndex,
    service: Option<&str>,
) -> Result<Resolved, ResolveError> {
    if host.is_root() {
        return Ok(Resolved::Root);
    }

    if let Some(label) = host.sole_label()
        && label.len() == 2
        && label.bytes().all(|b| b.is_ascii_alphabetic())
        && geo.state_exists(label)
    {
        return Ok(Resolved::State {
            code: label.to_owned(),
        });
    }

    let service = service.ok_or_else(|| ResolveError::MissingService(host.root_domain.clone()))?;
    let triple = resolve_subdomain(&host.hostname, service)?;

    let unknown = || ResolveError::UnknownGeography {
        city: triple.city_slug.clone(),
        state: triple.state_code.clone(),
    };
    if !geo.state_exists(&triple.state_code) {
        return Err(unknown());
    }
    let info = geo
        .city_info(&triple.city_slug, &triple.state_code)
        .ok_or_else(unknown)?;

    Ok(Resolved::City(CityMatch {
        service_name: service.to_owned(),
        city_name: title_case(&info.city_name),
        state_code: triple.state_code.clone(),
        main_zip_code: info.main_zip_code.clone(),
    }))
}

fn reject_named_page(page: Option<&str>, scope: Scope) -> Result<(), ResolveError> {
    match page {
        Some(page) => Err(ResolveError::PageOutOfScope {
            page: page.to_owned(),
            scope: scope.as_str(),
        }),
        None => Ok(()),
    }
}

fn substitution_context(
    geo: &GeoIndex,
    city: &CityMatch,
    config: &DomainConfig,
    canonical_url: Option<String>,
) -> SubstitutionContext {
    SubstitutionContext {
        service_name: city.service_name.clone(),
        city_name: city.city_name.clone(),
        state_abbr: city.state_code.to_uppercase(),
        state_full_name: geo.state_full_name(&city.state_code).map(str::to_owned),
        zip_codes: geo.zip_codes_for_city(&city.city_name),
        primary_zip: Some(city.main_zip_code.clone()).filter(|zip| !zip.is_empty()),
        business: business_info(config),
        canonical_url,
    }
}

//! Page resolution errors.

use geosite_storage::StorageError;

use crate::evaluator::EvaluateError;
use crate::subdomain::SubdomainError;

/// Why a request did not produce a page.
///
/// Every variant is served as not-found; the variants only differ in what
/// gets logged.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// `Host` value is empty or malformed.
    #[error("Invalid host '{0}'")]
    InvalidHost(String),
    /// Subdomain does not match the city grammar.
    #[error(transparent)]
    MalformedSubdomain(#[from] SubdomainError),
    /// Domain configuration does not name a service.
    #[error("Domain {0} has no service configured")]
    MissingService(String),
    /// State or city is not in the geo index.
    #[error("Unknown location: {city} ({state})")]
    UnknownGeography {
        /// City slug from the subdomain.
        city: String,
        /// State code from the subdomain.
        state: String,
    },
    /// Page name is not a valid template name.
    #[error("Invalid page name '{0}'")]
    InvalidPage(String),
    /// Named pages exist only on city hosts.
    #[error("Page '{page}' is not served on {scope} hosts")]
    PageOutOfScope {
        /// Requested page.
        page: String,
        /// Scope of the host.
        scope: &'static str,
    },
    /// No template backs the requested page.
    #[error("Template {domain}/{page} unavailable: {source}")]
    MissingTemplate {
        /// Root domain.
        domain: String,
        /// Template name.
        page: String,
        /// Storage failure.
        source: StorageError,
    },
    /// Template evaluation failed.
    #[error(transparent)]
    Evaluation(#[from] EvaluateError),
}

//! Subdomain grammar.
//!
//! A city subdomain has the shape `<service-slug>-<city-slug>-<st>`:
//!
//! ```text
//! roof-repair-new-york-city-ny.example.com
//! \_________/ \___________/ \/
//!   service       city      state
//! ```
//!
//! The city slug may itself contain hyphens, so the grammar anchors on the
//! fixed-length state suffix and on the configured service slug prefix.

use crate::util::slugify;

/// A parsed `(service, city, state)` subdomain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubdomainTriple {
    /// Slug of the configured service (e.g. "roof-repair").
    pub service_slug: String,
    /// City slug with hyphens for spaces (e.g. "new-york-city").
    pub city_slug: String,
    /// Two-letter state code, lowercase.
    pub state_code: String,
}

/// Reason a subdomain does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubdomainError {
    /// Fewer than three characters.
    #[error("Subdomain '{0}' is too short")]
    TooShort(String),
    /// Last two characters are not both letters.
    #[error("Subdomain '{0}' does not end with a state code")]
    MissingStateCode(String),
    /// No `-` in front of the state code.
    #[error("Subdomain '{0}' has no separator before the state code")]
    MissingSeparator(String),
    /// Remainder does not start with `<service-slug>-`.
    #[error("Subdomain '{subdomain}' does not start with service '{service_slug}'")]
    ServiceMismatch {
        /// Subdomain being parsed.
        subdomain: String,
        /// Expected service slug.
        service_slug: String,
    },
    /// Nothing left for the city.
    #[error("Subdomain '{0}' has no city")]
    EmptyCity(String),
}

/// Parse the first label of `hostname` against the configured service name.
///
/// All three parts must be recovered; there is no partial result.
///
/// # Errors
///
/// Returns a [`SubdomainError`] naming the first grammar rule the subdomain
/// breaks.
///
/// # Example
///
/// ```
/// use geosite_site::resolve_subdomain;
///
/// let triple = resolve_subdomain("cleaning-new-york-city-ny.example.com", "Cleaning").unwrap();
/// assert_eq!(triple.city_slug, "new-york-city");
/// assert_eq!(triple.state_code, "ny");
/// ```
pub fn resolve_subdomain(
    hostname: &str,
    service_name: &str,
) -> Result<SubdomainTriple, SubdomainError> {
    let hostname = hostname.to_lowercase();
    let subdomain = hostname.split('.').next().unwrap_or_default();
    let bytes = subdomain.as_bytes();
    let len = bytes.len();

    if len < 3 {
        return Err(SubdomainError::TooShort(subdomain.to_owned()));
    }
    if !(bytes[len - 1].is_ascii_alphabetic() && bytes[len - 2].is_ascii_alphabetic()) {
        return Err(SubdomainError::MissingStateCode(subdomain.to_owned()));
    }
    if bytes[len - 3] != b'-' {
        return Err(SubdomainError::MissingSeparator(subdomain.to_owned()));
    }

    let state_code = &subdomain[len - 2..];
    let remainder = &subdomain[..len - 3];

    let service_slug = slugify(service_name);
    let city_slug = remainder
        .strip_prefix(service_slug.as_str())
        .and_then(|rest| rest.strip_prefix('-'))
        .filter(|_| !service_slug.is_empty())
        .ok_or_else(|| SubdomainError::ServiceMismatch {
            subdomain: subdomain.to_owned(),
            service_slug: service_slug.clone(),
        })?;

    if city_slug.is_empty() {
        return Err(SubdomainError::EmptyCity(subdomain.to_owned()));
    }

    Ok(SubdomainTriple {
        service_slug,
        city_slug: city_slug.to_owned(),
        state_code: state_code.to_owned(),
    })
}

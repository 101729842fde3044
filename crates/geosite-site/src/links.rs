//! State, city and peer-city links.

use serde_json::{Map, Value};

use crate::util::slugify;

/// Maximum number of peer cities linked from a city page.
pub const MAX_PEER_CITIES: usize = 10;

/// Builds absolute links within one root domain.
#[derive(Clone, Debug)]
pub struct LinkBuilder {
    scheme: String,
    root_domain: String,
}

impl LinkBuilder {
    /// Create a builder for `root_domain` using `scheme` (e.g. "https").
    #[must_use]
    pub fn new(scheme: impl Into<String>, root_domain: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            root_domain: root_domain.into(),
        }
    }

    /// `"{scheme}://{state}.{root}"`, with the state code lowercased.
    #[must_use]
    pub fn state_url(&self, state_code: &str) -> String {
        format!(
            "{}://{}.{}",
            self.scheme,
            state_code.to_lowercase(),
            self.root_domain
        )
    }

    /// `"{scheme}://{service-slug}-{city-slug}-{state}.{root}"`.
    #[must_use]
    pub fn city_url(&self, service_name: &str, city_name: &str, state_code: &str) -> String {
        format!(
            "{}://{}-{}-{}.{}",
            self.scheme,
            slugify(service_name),
            slugify(city_name),
            state_code.to_lowercase(),
            self.root_domain
        )
    }

    /// State code → state URL, in the order given.
    #[must_use]
    pub fn state_links<'a>(&self, states: impl IntoIterator<Item = &'a str>) -> Map<String, Value> {
        states
            .into_iter()
            .map(|state| (state.to_owned(), Value::String(self.state_url(state))))
            .collect()
    }

    /// City name → city URL, in the order given.
    #[must_use]
    pub fn city_links<'a>(
        &self,
        service_name: &str,
        cities: impl IntoIterator<Item = &'a String>,
        state_code: &str,
    ) -> Map<String, Value> {
        cities
            .into_iter()
            .map(|city| {
                let url = self.city_url(service_name, city, state_code);
                (city.clone(), Value::String(url))
            })
            .collect()
    }
}

/// Pick the peer cities shown on a city page.
///
/// Starts at offset `sum(char codes of current_city) mod N` in `others` and
/// takes up to [`MAX_PEER_CITIES`] cities, wrapping around the end. The same
/// city always gets the same selection, while different cities surface
/// different peers.
#[must_use]
pub fn peer_cities<'a>(others: &'a [String], current_city: &str) -> Vec<&'a String> {
    if others.is_empty() {
        return Vec::new();
    }

    let sum: u64 = current_city.chars().map(|c| u64::from(u32::from(c))).sum();
    let offset = usize::try_from(sum % others.len() as u64).unwrap_or_default();

    others
        .iter()
        .cycle()
        .skip(offset)
        .take(others.len().min(MAX_PEER_CITIES))
        .collect()
}

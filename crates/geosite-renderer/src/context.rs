//! Per-request substitution values.

/// Business fields taken from the domain configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BusinessInfo {
    /// Business name.
    pub name: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Contact email address.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

/// Read-only snapshot of the values a template is rewritten with.
///
/// `Option` fields that are `None` are rendered with the engine's fallback
/// literal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionContext {
    /// Display name of the service (e.g. "Roof Repair").
    pub service_name: String,
    /// Display name of the city.
    pub city_name: String,
    /// State code as it should appear in `[State]`.
    pub state_abbr: String,
    /// Full state name.
    pub state_full_name: Option<String>,
    /// All zip codes of the city, in index order.
    pub zip_codes: Vec<String>,
    /// Main zip code of the city.
    pub primary_zip: Option<String>,
    /// Business fields.
    pub business: BusinessInfo,
    /// Canonical URL of the page being rendered.
    pub canonical_url: Option<String>,
}

impl SubstitutionContext {
    /// Create a context for a city with empty optional fields.
    #[must_use]
    pub fn new(
        service_name: impl Into<String>,
        city_name: impl Into<String>,
        state_abbr: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            city_name: city_name.into(),
            state_abbr: state_abbr.into(),
            ..Self::default()
        }
    }

    /// Key the spintax seed is derived from: `"{city}|{state}"`, case as given.
    #[must_use]
    pub fn seed_key(&self) -> String {
        format!("{}|{}", self.city_name, self.state_abbr)
    }

    /// Zip codes joined with `", "`, skipping empty entries.
    #[must_use]
    pub fn joined_zip_codes(&self) -> String {
        self.zip_codes
            .iter()
            .filter(|zip| !zip.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

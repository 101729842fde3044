//! Evaluator contexts for root, state and city pages.

use chrono::{DateTime, TimeZone};
use geosite_renderer::{BusinessInfo, SubstitutionContext};
use geosite_storage::DomainConfig;
use serde::Serialize;
use serde_json::{Map, Value};

/// Configuration keys for the business name, in lookup order.
const BUSINESS_NAME_KEYS: &[&str] = &["Business Name", "Company Name"];
/// Configuration keys for the phone number used by `[Phone]`.
const PHONE_KEYS: &[&str] = &["Phone", "Phone No. Placeholder"];
/// Configuration keys for the email address.
const EMAIL_KEYS: &[&str] = &["Business Email", "Email"];
/// Configuration keys for the postal address.
const ADDRESS_KEYS: &[&str] = &["Business Address", "Address"];
/// Configuration keys for `company_name` in evaluator contexts.
const COMPANY_NAME_KEYS: &[&str] = &["Company Name", "company_name", "Business Name"];
/// Configuration keys for `phone` in evaluator contexts.
const CONTEXT_PHONE_KEYS: &[&str] = &["Phone No. Placeholder", "Phone"];

/// Business fields for placeholder substitution.
pub(crate) fn business_info(config: &DomainConfig) -> BusinessInfo {
    BusinessInfo {
        name: config.first_text(BUSINESS_NAME_KEYS),
        phone: config.first_text(PHONE_KEYS),
        email: config.first_text(EMAIL_KEYS),
        address: config.first_text(ADDRESS_KEYS),
    }
}

/// Fields shared by root and state pages.
#[derive(Serialize)]
pub(crate) struct SiteFields<'a> {
    pub required: &'a Map<String, Value>,
    pub canonical_url: String,
    pub favicon: Option<String>,
    pub main_service: Option<String>,
    pub company_name: Option<String>,
}

impl<'a> SiteFields<'a> {
    pub(crate) fn new(
        config: &'a DomainConfig,
        service_name: Option<String>,
        canonical_url: String,
    ) -> Self {
        Self {
            required: config.as_map(),
            canonical_url,
            favicon: config.get_text("favicon"),
            main_service: service_name,
            company_name: config.first_text(COMPANY_NAME_KEYS),
        }
    }
}

/// Root page: every state with its link.
#[derive(Serialize)]
pub(crate) struct RootContext<'a> {
    pub state_links: Map<String, Value>,
    #[serde(flatten)]
    pub site: SiteFields<'a>,
}

/// State page: the state and its cities with links.
#[derive(Serialize)]
pub(crate) struct StateContext<'a> {
    pub state: String,
    pub state_full_name: Option<String>,
    pub city_links: Map<String, Value>,
    #[serde(flatten)]
    pub site: SiteFields<'a>,
}

/// City home and named pages.
#[derive(Serialize)]
pub(crate) struct CityContext<'a> {
    pub other_city_links: Map<String, Value>,
    pub canonical_url: String,
    pub city: String,
    pub state: String,
    pub state_full_name: Option<String>,
    pub main_service: String,
    pub company_name: String,
    pub zip_codes: Vec<String>,
    pub city_zip_code: String,
    pub phone: String,
    pub required: &'a Map<String, Value>,
    pub month: String,
    pub year: String,
}

impl<'a> CityContext<'a> {
    pub(crate) fn new<Tz>(
        ctx: &SubstitutionContext,
        config: &'a DomainConfig,
        other_city_links: Map<String, Value>,
        now: &DateTime<Tz>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            other_city_links,
            canonical_url: ctx.canonical_url.clone().unwrap_or_default(),
            city: ctx.city_name.clone(),
            state: ctx.state_abbr.clone(),
            state_full_name: ctx.state_full_name.clone(),
            main_service: ctx.service_name.clone(),
            company_name: config.first_text(COMPANY_NAME_KEYS).unwrap_or_default(),
            zip_codes: ctx.zip_codes.clone(),
            city_zip_code: ctx.primary_zip.clone().unwrap_or_default(),
            phone: config.first_text(CONTEXT_PHONE_KEYS).unwrap_or_default(),
            required: config.as_map(),
            month: now.format("%B").to_string(),
            year: now.format("%Y").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn config() -> DomainConfig {
        DomainConfig::new()
            .with("main-service", "Plumbing")
            .with("Business Name", "Acme Plumbing")
            .with("Phone", "555-0100")
            .with("Phone No. Placeholder", "(555) 010-0100")
            .with("favicon", "/static/favicon.ico")
    }

    #[test]
    fn test_business_info_lookup_order() {
        let info = business_info(&config());

        assert_eq!(info.name.as_deref(), Some("Acme Plumbing"));
        assert_eq!(info.phone.as_deref(), Some("555-0100"));
        assert_eq!(info.email, None);
    }

    #[test]
    fn test_root_context_shape() {
        let config = config();
        let ctx = RootContext {
            state_links: Map::from_iter([("tx".to_owned(), json!("https://tx.example.com"))]),
            site: SiteFields::new(
                &config,
                Some("Plumbing".to_owned()),
                "https://example.com/".to_owned(),
            ),
        };

        let value = serde_json::to_value(&ctx).unwrap();

        assert_eq!(value["state_links"]["tx"], "https://tx.example.com");
        assert_eq!(value["main_service"], "Plumbing");
        assert_eq!(value["company_name"], "Acme Plumbing");
        assert_eq!(value["favicon"], "/static/favicon.ico");
        assert_eq!(value["required"]["Phone"], "555-0100");
    }

    #[test]
    fn test_city_context_fields() {
        let config = config();
        let mut sub = SubstitutionContext::new("Plumbing", "Austin", "TX");
        sub.zip_codes = vec!["73301".to_owned()];
        sub.primary_zip = Some("73301".to_owned());
        sub.canonical_url = Some("https://plumbing-austin-tx.example.com/".to_owned());
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();

        let value =
            serde_json::to_value(CityContext::new(&sub, &config, Map::new(), &now)).unwrap();

        assert_eq!(value["city"], "Austin");
        assert_eq!(value["state"], "TX");
        assert_eq!(value["phone"], "(555) 010-0100");
        assert_eq!(value["company_name"], "Acme Plumbing");
        assert_eq!(value["city_zip_code"], "73301");
        assert_eq!(value["zip_codes"], json!(["73301"]));
        assert_eq!(value["month"], "March");
        assert_eq!(value["year"], "2024");
    }
}

//! In-memory geographic index.
//!
//! Built once from [`GeoRecord`]s and read-only afterwards, so a shared
//! `Arc<GeoIndex>` can be queried from any number of threads without locking.

use std::collections::HashMap;

use crate::record::GeoRecord;

/// City lookup result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CityInfo {
    /// City name as stored in the source.
    pub city_name: String,
    /// Main zip code of the city.
    pub main_zip_code: String,
}

/// State, city and zip code lookups.
///
/// All state codes are normalized to lowercase, so lookups accept any case.
/// Zip lists are keyed by lowercased city name; the key insertion order is
/// kept so the substring fallback of [`zip_codes_for_city`] is deterministic.
///
/// [`zip_codes_for_city`]: GeoIndex::zip_codes_for_city
#[derive(Debug, Default)]
pub struct GeoIndex {
    /// State code → full state name.
    states: HashMap<String, String>,
    /// State code → city names in source order.
    cities: HashMap<String, Vec<String>>,
    /// State code → lowercased city name → city info.
    city_info: HashMap<String, HashMap<String, CityInfo>>,
    /// Lowercased city name → zip codes.
    zip_codes: HashMap<String, Vec<String>>,
    /// Keys of `zip_codes` in insertion order.
    zip_keys: Vec<String>,
    /// Number of records the index was built from.
    record_count: usize,
}

impl GeoIndex {
    /// Build the index from source records.
    ///
    /// The first record of a state registers its name; the first record of a
    /// (state, city) pair provides its [`CityInfo`]. Every record extends the
    /// zip list of its city.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = GeoRecord>,
    {
        let mut index = Self::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    fn insert(&mut self, record: GeoRecord) {
        let state = record.state_code.to_lowercase();
        let city_key = record.city_name.to_lowercase();

        self.states
            .entry(state.clone())
            .or_insert(record.state_name);

        self.cities
            .entry(state.clone())
            .or_default()
            .push(record.city_name.clone());

        self.city_info
            .entry(state)
            .or_default()
            .entry(city_key.clone())
            .or_insert(CityInfo {
                city_name: record.city_name,
                main_zip_code: record.main_zip_code,
            });

        if !self.zip_codes.contains_key(&city_key) {
            self.zip_keys.push(city_key.clone());
        }
        self.zip_codes
            .entry(city_key)
            .or_default()
            .extend(record.zip_codes);

        self.record_count += 1;
    }

    /// Check whether a state code is known.
    #[must_use]
    pub fn state_exists(&self, code: &str) -> bool {
        self.states.contains_key(&code.to_lowercase())
    }

    /// Full name of a state.
    #[must_use]
    pub fn state_full_name(&self, code: &str) -> Option<&str> {
        self.states.get(&code.to_lowercase()).map(String::as_str)
    }

    /// All known state codes (lowercase), sorted.
    #[must_use]
    pub fn states(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.states.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// City names of a state, sorted.
    ///
    /// Returns an empty list for unknown states.
    #[must_use]
    pub fn cities_in_state(&self, code: &str) -> Vec<String> {
        let mut cities = self
            .cities
            .get(&code.to_lowercase())
            .cloned()
            .unwrap_or_default();
        cities.sort();
        cities
    }

    /// City names of a state other than `current_city` (case-insensitive), sorted.
    #[must_use]
    pub fn other_cities_in_state(&self, code: &str, current_city: &str) -> Vec<String> {
        let current = current_city.to_lowercase();
        self.cities_in_state(code)
            .into_iter()
            .filter(|city| city.to_lowercase() != current)
            .collect()
    }

    /// Zip codes of a city.
    ///
    /// Looks up the lowercased name first. When that yields nothing, the first
    /// key (in insertion order) that contains the name, or is contained in it,
    /// and has a non-empty zip list wins. Returns an empty list otherwise.
    #[must_use]
    pub fn zip_codes_for_city(&self, name: &str) -> Vec<String> {
        let key = name.to_lowercase();

        if let Some(zips) = self.zip_codes.get(&key)
            && !zips.is_empty()
        {
            return zips.clone();
        }

        self.zip_keys
            .iter()
            .filter(|candidate| candidate.contains(&key) || key.contains(candidate.as_str()))
            .filter_map(|candidate| self.zip_codes.get(candidate))
            .find(|zips| !zips.is_empty())
            .cloned()
            .unwrap_or_default()
    }

    /// Look up a city from its subdomain slug.
    ///
    /// Hyphens in the slug become spaces and the match is exact and
    /// case-insensitive. There is no fuzzy fallback.
    #[must_use]
    pub fn city_info(&self, city_slug: &str, state_code: &str) -> Option<&CityInfo> {
        let city = city_slug.to_lowercase().replace('-', " ");
        self.city_info
            .get(&state_code.to_lowercase())?
            .get(&city)
    }

    /// Number of known states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of distinct (state, city) pairs.
    #[must_use]
    pub fn city_count(&self) -> usize {
        self.city_info.values().map(HashMap::len).sum()
    }

    /// Number of records the index was built from.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Whether the index holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

//! Geographic source rows.

/// One row of the geographic source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeoRecord {
    /// City name as stored in the source.
    pub city_name: String,
    /// Two-letter state code (any case).
    pub state_code: String,
    /// Full state name.
    pub state_name: String,
    /// Main zip code of the city (may be empty).
    pub main_zip_code: String,
    /// All zip codes of the city, in source order.
    pub zip_codes: Vec<String>,
}

impl GeoRecord {
    /// Create a record, splitting `zip_codes` on commas.
    #[must_use]
    pub fn new(
        city_name: impl Into<String>,
        state_code: impl Into<String>,
        state_name: impl Into<String>,
        main_zip_code: impl Into<String>,
        zip_codes: &str,
    ) -> Self {
        Self {
            city_name: city_name.into(),
            state_code: state_code.into(),
            state_name: state_name.into(),
            main_zip_code: main_zip_code.into(),
            zip_codes: split_zip_codes(zip_codes),
        }
    }
}

/// Split a comma-separated zip list, trimming entries and dropping empties.
pub(crate) fn split_zip_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|zip| !zip.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_zip_codes_trims_and_skips_empty() {
        assert_eq!(
            split_zip_codes(" 10001,10002 ,, 10003,"),
            vec!["10001", "10002", "10003"]
        );
    }

    #[test]
    fn test_split_zip_codes_empty_input() {
        assert!(split_zip_codes("").is_empty());
        assert!(split_zip_codes(" , ").is_empty());
    }

    #[test]
    fn test_new_record() {
        let record = GeoRecord::new("Boise", "ID", "Idaho", "83701", "83701,83702");

        assert_eq!(record.city_name, "Boise");
        assert_eq!(record.state_code, "ID");
        assert_eq!(record.zip_codes, vec!["83701", "83702"]);
    }
}

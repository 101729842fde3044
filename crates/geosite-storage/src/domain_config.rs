//! Flat per-domain configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form key/value configuration of a domain.
///
/// Keys are human-readable labels such as `"main-service"`, `"Business Name"`
/// or `"Phone"`. Values are kept as JSON so the whole object can be handed to
/// the template evaluator unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainConfig {
    values: Map<String, Value>,
}

impl DomainConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON text.
    ///
    /// The document must be a JSON object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Set a value (builder style).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Raw JSON value of a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Text form of a scalar value.
    ///
    /// Strings are returned as-is; numbers and booleans are formatted.
    /// Missing keys, nulls, arrays and objects yield `None`.
    #[must_use]
    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Text of the first key in `keys` that has a scalar value.
    #[must_use]
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get_text(key))
    }

    /// All values, in file order.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the configuration has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

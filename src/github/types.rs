// GitHub Enterprise API response types.
// Repository records are kept as decoded JSON so every field round-trips through the cache.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A repository as returned by the `/repositories` endpoint.
///
/// The record is passed through unchanged; accessors only read the fields
/// the launcher displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryRecord(Map<String, Value>);

/// Repositories in API page order.
pub type RepositoryList = Vec<RepositoryRecord>;

impl RepositoryRecord {
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn full_name(&self) -> Option<&str> {
        self.str_field("full_name")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    pub fn html_url(&self) -> Option<&str> {
        self.str_field("html_url")
    }

    /// Raw access to any field of the record.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub remaining: Option<u64>,
    pub reset: Option<u64>,
}

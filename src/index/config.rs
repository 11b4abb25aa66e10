//! Search index client configuration

use serde::{Deserialize, Serialize};

use super::errors::{IndexError, IndexResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndexConfig {
    /// Base URL of the search backend
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Create the index at startup when it does not exist
    #[serde(default)]
    pub setup: bool,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_endpoint() -> String {
    "http://localhost:9200".to_string()
}

fn default_index_name() -> String {
    "contentlets".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            index_name: default_index_name(),
            setup: false,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SearchIndexConfig {
    pub fn validate(&self) -> IndexResult<()> {
        if reqwest::Url::parse(&self.endpoint).is_err() {
            return Err(IndexError::InvalidConfig(format!(
                "endpoint '{}' is not a valid URL",
                self.endpoint
            )));
        }
        if self.index_name.is_empty() {
            return Err(IndexError::InvalidConfig("index_name must not be empty".into()));
        }
        if self.index_name.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(IndexError::InvalidConfig(format!(
                "index_name '{}' must be lowercase",
                self.index_name
            )));
        }
        if self.timeout_ms == 0 {
            return Err(IndexError::InvalidConfig("timeout_ms must be greater than 0".into()));
        }
        Ok(())
    }
}

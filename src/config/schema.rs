//! Configuration schema for membrane.toml.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Production endpoint used when no override is configured.
pub const DEFAULT_API_URL: &str = "https://api.getmembrane.com";

/// Credential plus optional endpoint override. Immutable once a client is built from it.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MembraneConfig {
    /// Membrane API token, sent as a bearer credential.
    pub api_key: String,

    /// Base URL override; the production endpoint when absent or empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl MembraneConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: None,
        }
    }

    /// Point the config at a different API endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Effective base URL with any trailing slash removed.
    pub fn resolved_api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// The token never reaches logs.
impl fmt::Debug for MembraneConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MembraneConfig")
            .field("api_key", &if self.has_api_key() { "<redacted>" } else { "<unset>" })
            .field("api_url", &self.api_url)
            .finish()
    }
}

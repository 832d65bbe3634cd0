//! Client configuration.
//!
//! Passed into `PostsClient` / `PostsService` at construction. `from_env`
//! covers the common deployment case; the struct also deserializes from any
//! serde format for callers that keep settings in a file.

use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

pub const BASE_URL_VAR: &str = "POSTS_BASE_URL";
pub const FALLBACK_TOKEN_VAR: &str = "JWT_TOKEN";
pub const MAX_APPEND_ATTEMPTS_VAR: &str = "POSTS_MAX_APPEND_ATTEMPTS";

const DEFAULT_MAX_APPEND_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root of the posts API; `/posts` is appended to it.
    #[serde(deserialize_with = "deserialize_base_url")]
    pub base_url: String,
    /// Bearer token used when the credential store has none.
    #[serde(default)]
    pub fallback_token: String,
    /// How many read-append-write rounds `add_weblink` makes before giving
    /// up on a post that keeps changing underneath it.
    #[serde(default = "default_max_append_attempts")]
    pub max_append_attempts: u32,
}

fn default_max_append_attempts() -> u32 {
    DEFAULT_MAX_APPEND_ATTEMPTS
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn deserialize_base_url<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let url = String::deserialize(deserializer)?;
    Ok(trim_base_url(&url))
}

impl ClientConfig {
    pub fn new(base_url: &str, fallback_token: &str) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            fallback_token: fallback_token.to_string(),
            max_append_attempts: DEFAULT_MAX_APPEND_ATTEMPTS,
        }
    }

    pub fn with_max_append_attempts(mut self, attempts: u32) -> Self {
        self.max_append_attempts = attempts;
        self
    }

    /// Read `POSTS_BASE_URL`, `JWT_TOKEN` and `POSTS_MAX_APPEND_ATTEMPTS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{BASE_URL_VAR} is not set")))?;
        let fallback_token = lookup(FALLBACK_TOKEN_VAR).unwrap_or_default();
        let mut config = Self::new(&base_url, &fallback_token);
        if let Some(raw) = lookup(MAX_APPEND_ATTEMPTS_VAR) {
            config.max_append_attempts = raw.trim().parse().map_err(|_| {
                ApiError::Config(format!("{MAX_APPEND_ATTEMPTS_VAR} must be a number, got {raw:?}"))
            })?;
        }
        Ok(config)
    }
}

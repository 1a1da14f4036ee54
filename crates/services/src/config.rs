use std::env;
use std::fmt;

use url::Url;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "TUTOR_AI_API_KEY";
pub const BASE_URL_VAR: &str = "TUTOR_AI_BASE_URL";
pub const MODEL_VAR: &str = "TUTOR_AI_MODEL";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl AiConfig {
    /// Validate and normalize raw settings. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiKey` without a key and
    /// `ConfigError::InvalidBaseUrl` when the base URL does not parse.
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = normalize_optional(api_key).ok_or(ConfigError::MissingApiKey(API_KEY_VAR))?;
        let base_url = normalize_optional(base_url).unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let model = normalize_optional(model).unwrap_or_else(|| DEFAULT_MODEL.into());

        if Url::parse(&base_url).is_err() {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }

        Ok(Self {
            base_url,
            api_key,
            model,
        })
    }

    /// Read `TUTOR_AI_API_KEY`, `TUTOR_AI_BASE_URL` and `TUTOR_AI_MODEL`.
    ///
    /// # Errors
    ///
    /// See [`AiConfig::new`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(
            env::var(API_KEY_VAR).ok(),
            env::var(BASE_URL_VAR).ok(),
            env::var(MODEL_VAR).ok(),
        )
    }

    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

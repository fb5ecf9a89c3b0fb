//! Configuration from the environment.

use runtime::AnthropicBackend;

const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Anthropic API key, passed through as-is.
    pub api_key: String,

    /// Alternate API host, for proxies.
    pub base_url: Option<String>,
}

impl Config {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;
        let base_url = non_empty(BASE_URL_VAR);

        Ok(Self { api_key, base_url })
    }

    /// Build the model backend with the fixed model and token budget.
    pub fn backend(&self) -> AnthropicBackend {
        let builder = AnthropicBackend::builder(&self.api_key);
        match &self.base_url {
            Some(url) => builder.base_url(url).build(),
            None => builder.build(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("authentication not configured: set ANTHROPIC_API_KEY")]
    MissingApiKey,
}

//! Configuration for remote LLM providers.

use crate::error::{LlmError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for remote LLM providers (OpenAI, Deepseek).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API.
    ///
    /// Examples:
    /// - OpenAI: "https://api.openai.com/v1"
    /// - Deepseek: "https://api.deepseek.com"
    pub base_url: String,

    /// Model name/identifier.
    pub model: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Organization ID (optional, OpenAI only).
    pub organization: Option<String>,
}

impl RemoteLlmConfig {
    /// Create a new remote LLM configuration.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: default_timeout(),
            organization: None,
        }
    }

    /// Create configuration from environment variable.
    pub fn from_env(
        env_var: &str,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = std::env::var(env_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::ApiKeyNotFound(format!("Environment variable: {}", env_var)))?;

        Ok(Self::new(api_key, base_url, model))
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the organization ID.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_config_builder() {
        let config = RemoteLlmConfig::new("test-key", "https://api.openai.com/v1/", "gpt-4o-mini")
            .with_timeout(Duration::from_secs(5))
            .with_organization("org-123");

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.organization, Some("org-123".to_string()));
    }

    #[test]
    fn test_from_env_missing_key() {
        let err = RemoteLlmConfig::from_env(
            "LLM_CONFIG_TEST_MISSING_KEY",
            "https://api.deepseek.com",
            "deepseek-chat",
        )
        .unwrap_err();
        assert!(err.is_auth_error());
    }
}

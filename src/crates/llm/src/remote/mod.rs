//! Remote LLM provider implementations.
//!
//! Both providers speak the OpenAI chat-completions protocol; the shared
//! request/response handling lives in `compat`.
//!
//! # Providers
//!
//! - **OpenAI** - `https://api.openai.com/v1`
//! - **Deepseek** - `https://api.deepseek.com`

mod compat;
pub mod deepseek;
pub mod openai;

pub use deepseek::DeepseekClient;
pub use openai::OpenAiClient;

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use crate::traits::ChatModel;
use std::str::FromStr;
use std::sync::Arc;

/// Supported remote providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Deepseek,
}

impl Provider {
    /// Default API base URL
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Deepseek => "https://api.deepseek.com",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Deepseek => "deepseek-chat",
        }
    }

    /// Environment variable the API key is usually read from
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Deepseek => "DEEPSEEK_API_KEY",
        }
    }
}

impl FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "deepseek" => Ok(Provider::Deepseek),
            other => Err(LlmError::ConfigError(format!(
                "Unknown LLM provider '{}', expected 'openai' or 'deepseek'",
                other
            ))),
        }
    }
}

/// Build a shared client for `provider`.
pub fn remote_client(provider: Provider, config: RemoteLlmConfig) -> Result<Arc<dyn ChatModel>> {
    Ok(match provider {
        Provider::OpenAi => Arc::new(OpenAiClient::new(config)?),
        Provider::Deepseek => Arc::new(DeepseekClient::new(config)?),
    })
}

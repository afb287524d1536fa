//! Deepseek client implementation (OpenAI-compatible).
//!
//! ```rust,ignore
//! use llm::remote::DeepseekClient;
//! use llm::RemoteLlmConfig;
//!
//! let config = RemoteLlmConfig::from_env("DEEPSEEK_API_KEY", "https://api.deepseek.com", "deepseek-chat")?;
//! let client = DeepseekClient::new(config)?;
//! ```

use super::compat;
use crate::config::RemoteLlmConfig;
use crate::error::Result;
use crate::traits::ChatModel;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::Client;

/// Deepseek API client.
#[derive(Clone)]
pub struct DeepseekClient {
    config: RemoteLlmConfig,
    client: Client,
}

impl DeepseekClient {
    /// Create a new Deepseek client with the given configuration.
    pub fn new(config: RemoteLlmConfig) -> Result<Self> {
        let client = compat::build_http_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ChatModel for DeepseekClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = compat::request_body(&self.config.model, &request);

        let req = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body);

        compat::send(self.provider_name(), req).await
    }

    fn provider_name(&self) -> &str {
        "Deepseek"
    }

    fn clone_box(&self) -> Box<dyn ChatModel> {
        Box::new(self.clone())
    }
}

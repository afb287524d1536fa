//! OpenAI client implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::OpenAiClient;
//! use llm::{ChatModel, ChatRequest, Message, RemoteLlmConfig};
//!
//! let config = RemoteLlmConfig::from_env("OPENAI_API_KEY", "https://api.openai.com/v1", "gpt-4o-mini")?;
//! let client = OpenAiClient::new(config)?;
//!
//! let response = client.chat(ChatRequest::new(vec![Message::human("Hello!")])).await?;
//! ```

use super::compat;
use crate::config::RemoteLlmConfig;
use crate::error::Result;
use crate::traits::ChatModel;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use reqwest::Client;

/// OpenAI API client.
#[derive(Clone)]
pub struct OpenAiClient {
    config: RemoteLlmConfig,
    client: Client,
}

impl OpenAiClient {
    /// Create a new OpenAI client with the given configuration.
    pub fn new(config: RemoteLlmConfig) -> Result<Self> {
        let client = compat::build_http_client(config.timeout)?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = compat::request_body(&self.config.model, &request);

        let mut req = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body);

        if let Some(org) = &self.config.organization {
            req = req.header("OpenAI-Organization", org);
        }

        compat::send(self.provider_name(), req).await
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }

    fn clone_box(&self) -> Box<dyn ChatModel> {
        Box::new(self.clone())
    }
}

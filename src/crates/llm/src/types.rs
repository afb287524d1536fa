//! Message, request and response types shared by every provider.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    Human,
    Assistant,
}

impl MessageRole {
    /// Role name on the OpenAI-compatible wire format
    pub fn as_wire(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::Human => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A single text message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Human,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.content
    }
}

/// A request to a chat model containing messages and configuration.
///
/// # Example
///
/// ```rust
/// use llm::{ChatRequest, Message};
///
/// let request = ChatRequest::new(vec![
///     Message::system("Extract intents as JSON"),
///     Message::human("news about rust"),
/// ])
/// .with_temperature(0.0)
/// .with_max_tokens(150);
/// assert_eq!(request.config.max_tokens, Some(150));
/// ```
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The conversation messages to send to the model.
    pub messages: Vec<Message>,

    /// Generation settings.
    pub config: ChatConfig,
}

impl ChatRequest {
    /// Create a new chat request with the given messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            config: ChatConfig::default(),
        }
    }

    /// Set the temperature for generation.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = Some(max_tokens);
        self
    }

    /// Ask the provider to constrain output to a JSON object.
    pub fn with_json_response(mut self) -> Self {
        self.config.json_response = true;
        self
    }
}

/// Configuration parameters for chat generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub json_response: bool,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

impl UsageMetadata {
    pub fn new(input_tokens: usize, output_tokens: usize) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// A complete reply from a chat model.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub message: Message,
    pub usage: Option<UsageMetadata>,
    /// Provider-specific extras such as `model` and `finish_reason`.
    pub metadata: HashMap<String, serde_json::Value>,
}

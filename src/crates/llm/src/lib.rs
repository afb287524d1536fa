//! Chat model abstraction and remote providers.
//!
//! The intent parser only needs one capability from a language model: send a
//! short conversation and read back a single text reply. This crate defines
//! that seam as the [`ChatModel`] trait and ships two OpenAI-compatible
//! implementations.
//!
//! # Remote Providers
//!
//! - **OpenAI** - `gpt-4o-mini` and friends
//! - **Deepseek** - `deepseek-chat`
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use llm::remote::OpenAiClient;
//! use llm::{ChatModel, ChatRequest, Message, RemoteLlmConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RemoteLlmConfig::from_env(
//!         "OPENAI_API_KEY",
//!         "https://api.openai.com/v1",
//!         "gpt-4o-mini",
//!     )?;
//!     let client = OpenAiClient::new(config)?;
//!
//!     let request = ChatRequest::new(vec![
//!         Message::system("Reply with JSON only"),
//!         Message::human("weather in Paris"),
//!     ])
//!     .with_temperature(0.0)
//!     .with_json_response();
//!
//!     let response = client.chat(request).await?;
//!     println!("{}", response.message.text());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

#[cfg(feature = "remote")]
pub mod remote;

// Re-export commonly used types
pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};
pub use traits::ChatModel;
pub use types::{ChatConfig, ChatRequest, ChatResponse, Message, MessageRole, UsageMetadata};

#[cfg(feature = "remote")]
pub use remote::{remote_client, Provider};

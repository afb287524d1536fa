//! The chat model seam.

use crate::error::Result;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;

/// Core trait for chat-based language models.
///
/// Implementations convert the request into the provider's wire format,
/// make the call and convert the reply back. They must be `Send + Sync`;
/// share them as `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a complete chat response from messages.
    ///
    /// # Errors
    ///
    /// Network failures, authentication errors, rate limiting and
    /// malformed provider replies all surface as [`crate::LlmError`].
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Check if the provider is reachable.
    ///
    /// Default implementation returns `Ok(true)`.
    async fn is_available(&self) -> Result<bool> {
        Ok(true)
    }

    /// Provider name used in logs.
    fn provider_name(&self) -> &str;

    /// Clone this model into a boxed trait object.
    fn clone_box(&self) -> Box<dyn ChatModel>;
}

impl Clone for Box<dyn ChatModel> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Clone)]
    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(ChatResponse {
                message: Message::ai(last),
                usage: None,
                metadata: HashMap::new(),
            })
        }

        fn provider_name(&self) -> &str {
            "echo"
        }

        fn clone_box(&self) -> Box<dyn ChatModel> {
            Box::new(self.clone())
        }
    }

    #[tokio::test]
    async fn test_trait_object() {
        let model: Arc<dyn ChatModel> = Arc::new(EchoModel);
        let response = model
            .chat(ChatRequest::new(vec![Message::human("ping")]))
            .await
            .unwrap();

        assert_eq!(response.message.text(), "ping");
        assert!(model.is_available().await.unwrap());
    }

    #[test]
    fn test_clone_box() {
        let boxed: Box<dyn ChatModel> = Box::new(EchoModel);
        let cloned = boxed.clone();
        assert_eq!(cloned.provider_name(), "echo");
    }
}

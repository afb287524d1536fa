//! OpenAI-compatible chat-completions wire format.

use crate::error::{LlmError, Result};
use crate::types::{ChatRequest, ChatResponse, Message, UsageMetadata};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

pub(crate) fn build_http_client(timeout: std::time::Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

pub(crate) fn request_body(model: &str, request: &ChatRequest) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        messages: request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_wire().to_string(),
                content: m.content.clone(),
            })
            .collect(),
        temperature: request.config.temperature,
        max_tokens: request.config.max_tokens,
        response_format: request
            .config
            .json_response
            .then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
        stream: false,
    }
}

/// Send a prepared request and convert the reply.
pub(crate) async fn send(provider: &str, req: RequestBuilder) -> Result<ChatResponse> {
    let response = req.send().await.map_err(|e| {
        if e.is_timeout() {
            LlmError::Timeout(e.to_string())
        } else {
            LlmError::HttpError(e)
        }
    })?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let error_text = response.text().await.unwrap_or_default();
        return Err(LlmError::from_status(provider, status, error_text));
    }

    let completion: CompletionResponse = response
        .json()
        .await
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    convert_response(provider, completion)
}

fn convert_response(provider: &str, completion: CompletionResponse) -> Result<ChatResponse> {
    let choice = completion.choices.into_iter().next().ok_or_else(|| {
        LlmError::InvalidResponse(format!("{} returned no choices", provider))
    })?;

    let usage = completion
        .usage
        .map(|u| UsageMetadata::new(u.prompt_tokens, u.completion_tokens));

    let mut metadata = HashMap::new();
    metadata.insert(
        "model".to_string(),
        serde_json::Value::String(completion.model),
    );
    metadata.insert(
        "finish_reason".to_string(),
        serde_json::Value::String(choice.finish_reason.unwrap_or_default()),
    );

    debug!(provider, ?usage, "chat completion received");

    Ok(ChatResponse {
        message: Message::ai(choice.message.content.unwrap_or_default()),
        usage,
        metadata,
    })
}

#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: String,
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_json_mode() {
        let request = ChatRequest::new(vec![Message::system("s"), Message::human("h")])
            .with_temperature(0.0)
            .with_json_response();
        let body = serde_json::to_value(request_body("gpt-4o-mini", &request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_convert_response_without_choices() {
        let completion = CompletionResponse {
            model: "m".into(),
            choices: vec![],
            usage: None,
        };
        let err = convert_response("OpenAI", completion).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}

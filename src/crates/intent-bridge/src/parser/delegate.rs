//! Language-model intent parsing

use super::ParsedIntent;
use crate::{BridgeError, Result};
use llm::{ChatModel, ChatRequest, Message};
use tracing::debug;

const SYSTEM_PROMPT: &str = r#"You are an intent parser for API calls. Parse the user's intent into a structured format.

Return a JSON object with:
- action: GET, POST, CREATE, UPDATE, DELETE, SEND, FETCH, SEARCH
- service: twitter, slack, github, weather, news, currency, joke, email, calendar, etc.
- resource: message, post, repo, forecast, headlines, etc.
- parameters: key-value pairs of data

Examples:
"post hello world to twitter" -> {"action":"CREATE","service":"twitter","resource":"post","parameters":{"text":"hello world"}}
"get weather in New York" -> {"action":"GET","service":"weather","resource":"forecast","parameters":{"location":"New York"}}
"send message saying hi to slack channel general" -> {"action":"SEND","service":"slack","resource":"message","parameters":{"text":"hi","channel":"general"}}"#;

/// Ask `model` to parse `text`
pub(crate) async fn parse_with_model(model: &dyn ChatModel, text: &str) -> Result<ParsedIntent> {
    let request = ChatRequest::new(vec![Message::system(SYSTEM_PROMPT), Message::human(text)])
        .with_temperature(0.0)
        .with_max_tokens(150)
        .with_json_response();

    let response = model.chat(request).await?;
    debug!(
        provider = model.provider_name(),
        "Delegate replied with {} chars",
        response.message.text().len()
    );
    intent_from_reply(response.message.text())
}

/// Validate a delegate reply and turn it into an intent
///
/// Accepts bare JSON as well as JSON wrapped in prose or code fences.
pub(crate) fn intent_from_reply(reply: &str) -> Result<ParsedIntent> {
    let json = extract_json_object(reply)
        .ok_or_else(|| BridgeError::ParseFailure("reply contains no JSON object".into()))?;

    let intent: ParsedIntent = serde_json::from_str(json)
        .map_err(|e| BridgeError::ParseFailure(format!("malformed intent JSON: {}", e)))?;

    let intent = ParsedIntent {
        action: intent.action.trim().to_uppercase(),
        service: intent.service.trim().to_lowercase(),
        resource: intent.resource.trim().to_lowercase(),
        parameters: intent.parameters,
    };

    if intent.action.is_empty() || intent.service.is_empty() || intent.resource.is_empty() {
        return Err(BridgeError::ParseFailure(
            "intent is missing action, service or resource".into(),
        ));
    }

    Ok(intent)
}

fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

//! Deterministic intent rules
//!
//! Rules are tried in table order and the first match wins. Patterns run
//! case-insensitively against the trimmed input so extracted values keep the
//! caller's casing.

use super::ParsedIntent;
use crate::{BridgeError, Result};
use regex::{Captures, Regex};
use serde_json::{Map, Value};

type Extractor = fn(&Captures) -> Map<String, Value>;

pub(crate) struct Rule {
    pub name: &'static str,
    regex: Regex,
    action: &'static str,
    service: &'static str,
    resource: &'static str,
    extract: Extractor,
}

impl Rule {
    fn new(
        name: &'static str,
        pattern: &str,
        (action, service, resource): (&'static str, &'static str, &'static str),
        extract: Extractor,
    ) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| BridgeError::Config(format!("Invalid rule '{}': {}", name, e)))?;
        Ok(Self {
            name,
            regex,
            action,
            service,
            resource,
            extract,
        })
    }

    pub fn apply(&self, text: &str) -> Option<ParsedIntent> {
        let caps = self.regex.captures(text)?;
        Some(ParsedIntent {
            action: self.action.to_string(),
            service: self.service.to_string(),
            resource: self.resource.to_string(),
            parameters: (self.extract)(&caps),
        })
    }
}

/// Compile the rule table in priority order
pub(crate) fn rule_table() -> Result<Vec<Rule>> {
    Ok(vec![
        Rule::new(
            "twitter_post",
            r#"(?i)(?:post|tweet|share)\s+(?:["'](.+?)["']|(.+?))\s+(?:to|on)\s+twitter"#,
            ("CREATE", "twitter", "post"),
            extract_text,
        )?,
        Rule::new(
            "slack_message",
            r#"(?i)(?:send|message)\s+(?:["'](.+?)["']|(.+?))\s+to\s+slack(?:\s+channel\s+)?(?:#)?(\w+)?"#,
            ("SEND", "slack", "message"),
            extract_text_and_channel,
        )?,
        Rule::new(
            "weather_forecast",
            r"(?i)(?:get|check|what's|what\s+is|fetch|show)\s+(?:me\s+)?(?:the\s+)?weather\s+(?:forecast\s+)?(?:like\s+)?(?:in|for|at)\s+(.+)",
            ("GET", "weather", "forecast"),
            |caps| single("location", caps, 1),
        )?,
        Rule::new(
            "github_create_repo",
            r"(?i)create\s+(?:a\s+)?(?:new\s+)?(?:github\s+)?repo(?:sitory)?\s+(?:called\s+|named\s+)?(.+)",
            ("CREATE", "github", "repository"),
            |caps| single("name", caps, 1),
        )?,
        Rule::new(
            "news_search",
            r"(?i)\bnews\s+(?:about|on|regarding)\s+(.+)",
            ("SEARCH", "news", "news"),
            |caps| single("query", caps, 1),
        )?,
        Rule::new(
            "news_headlines",
            r"(?i)\b(?:headlines|news)\b(?:\s+(?:in|from|for)\s+(?:the\s+)?([a-z]{2})\b)?",
            ("GET", "news", "headlines"),
            extract_country,
        )?,
        Rule::new(
            "currency_rate",
            r"(?i)\b(?:exchange|currency|conversion)\s+rates?\b(?:\s+(?:for|of|from)\s+([a-z]{3})\b)?",
            ("GET", "currency", "rate"),
            extract_currency,
        )?,
        Rule::new(
            "joke",
            r"(?i)\bjoke\b(?:\s+about\s+(\w+))?",
            ("GET", "joke", "joke"),
            |caps| optional("category", caps, 1),
        )?,
        Rule::new(
            "github_repos",
            r"(?i)\brepos(?:itories)?\s+(?:of|for|by|from)\s+(?:github\s+user\s+)?@?([a-z0-9][a-z0-9-]*)",
            ("GET", "github", "repos"),
            |caps| single("username", caps, 1),
        )?,
        Rule::new(
            "github_user",
            r"(?i)\bgithub\s+(?:user|profile|account)\s+(?:for\s+|of\s+)?@?([a-z0-9][a-z0-9-]*)|\b(?:who\s+is|look\s*up)\s+@?([a-z0-9][a-z0-9-]*)\s+on\s+github",
            ("GET", "github", "user"),
            |caps| first_of("username", caps, &[1, 2]),
        )?,
        Rule::new(
            "random_fact",
            r"(?i)\bfacts?\b",
            ("GET", "facts", "fact"),
            |_| Map::new(),
        )?,
        Rule::new(
            "word_definition",
            r#"(?i)\b(?:define|definition\s+of|meaning\s+of|what\s+does)\s+(?:the\s+word\s+)?["']?([a-z][a-z-]*)"#,
            ("GET", "dictionary", "definition"),
            |caps| single("word", caps, 1),
        )?,
        Rule::new(
            "ip_location",
            r"(?i)\b(?:ip|locate|geolocate|where\s+is)\b\D*?(\d{1,3}(?:\.\d{1,3}){3})",
            ("GET", "ip", "location"),
            |caps| single("ip", caps, 1),
        )?,
    ])
}

/// Intent used when no rule matches
pub(crate) fn fallback(text: &str) -> ParsedIntent {
    let mut parameters = Map::new();
    parameters.insert("query".into(), Value::String(text.to_string()));
    ParsedIntent {
        action: "GET".into(),
        service: "unknown".into(),
        resource: "data".into(),
        parameters,
    }
}

fn clean(value: &str) -> String {
    value
        .trim()
        .trim_end_matches(|c: char| matches!(c, '?' | '!' | '.'))
        .trim()
        .to_string()
}

fn capture(caps: &Captures, idx: usize) -> Option<String> {
    caps.get(idx)
        .map(|m| clean(m.as_str()))
        .filter(|s| !s.is_empty())
}

fn single(name: &str, caps: &Captures, idx: usize) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some(value) = capture(caps, idx) {
        params.insert(name.to_string(), Value::String(value));
    }
    params
}

fn optional(name: &str, caps: &Captures, idx: usize) -> Map<String, Value> {
    single(name, caps, idx)
}

fn first_of(name: &str, caps: &Captures, groups: &[usize]) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some(value) = groups.iter().find_map(|&idx| capture(caps, idx)) {
        params.insert(name.to_string(), Value::String(value));
    }
    params
}

fn extract_text(caps: &Captures) -> Map<String, Value> {
    let text = capture(caps, 1)
        .or_else(|| capture(caps, 2))
        .unwrap_or_else(|| "Hello from IntentBridge!".to_string());
    let mut params = Map::new();
    params.insert("text".into(), Value::String(text));
    params
}

fn extract_text_and_channel(caps: &Captures) -> Map<String, Value> {
    let mut params = extract_text(caps);
    if let Some(channel) = capture(caps, 3) {
        params.insert("channel".into(), Value::String(channel));
    }
    params
}

fn extract_country(caps: &Captures) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some(country) = capture(caps, 1) {
        params.insert("country".into(), Value::String(country.to_lowercase()));
    }
    params
}

fn extract_currency(caps: &Captures) -> Map<String, Value> {
    let mut params = Map::new();
    if let Some(code) = capture(caps, 1) {
        params.insert("currency".into(), Value::String(code.to_uppercase()));
    }
    params
}

//! Intent parser
//!
//! Turns free text into a [`ParsedIntent`]. Stages, in order:
//!
//! 1. LRU cache keyed by the lowercased, trimmed text
//! 2. Language-model delegate, only for integration-style wording and only
//!    when a model is configured; bounded by a timeout
//! 3. Deterministic rules, first match wins
//! 4. Fallback intent `GET unknown data` carrying the raw text
//!
//! Parsing never fails. Each downgrade is logged and reported through
//! [`ParseStage`].

mod delegate;
mod rules;

use crate::Result;
use llm::ChatModel;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tooling::async_utils::timeout::with_timeout;
use tracing::{debug, info, warn};

/// Structured form of an intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIntent {
    pub action: String,
    pub service: String,
    pub resource: String,
    /// Surface parameter name to value
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Which stage produced a parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStage {
    Cache,
    Delegate,
    /// Named deterministic rule
    Rule(String),
    Fallback,
}

#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub intent: ParsedIntent,
    pub stage: ParseStage,
}

/// Parser settings
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub cache_capacity: usize,
    pub delegate_timeout: Duration,
    /// Words that mark text as an integration request worth sending to the
    /// delegate
    pub delegate_triggers: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
            delegate_timeout: Duration::from_secs(5),
            delegate_triggers: ["api", "integrate", "endpoint", "webhook", "connect"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

pub struct IntentParser {
    rules: Vec<rules::Rule>,
    cache: Mutex<LruCache<String, ParsedIntent>>,
    delegate: Option<Arc<dyn ChatModel>>,
    config: ParserConfig,
}

impl IntentParser {
    /// Create a rules-only parser
    pub fn new(config: ParserConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            rules: rules::rule_table()?,
            cache: Mutex::new(LruCache::new(capacity)),
            delegate: None,
            config,
        })
    }

    /// Attach a language-model delegate
    pub fn with_delegate(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.delegate = Some(model);
        self
    }

    pub fn has_delegate(&self) -> bool {
        self.delegate.is_some()
    }

    /// Parse `text`, discarding which stage answered
    pub async fn parse(&self, text: &str) -> ParsedIntent {
        self.parse_detailed(text).await.intent
    }

    /// Parse `text` and report the stage that produced the intent
    pub async fn parse_detailed(&self, text: &str) -> ParseOutcome {
        let key = cache_key(text);

        if let Some(cached) = self.cache.lock().get(&key).cloned() {
            debug!("Using cached parse result for '{}'", key);
            return ParseOutcome {
                intent: cached,
                stage: ParseStage::Cache,
            };
        }

        let outcome = match self.try_delegate(text).await {
            Some(intent) => ParseOutcome {
                intent,
                stage: ParseStage::Delegate,
            },
            None => self.parse_with_rules(text),
        };

        self.cache.lock().put(key, outcome.intent.clone());
        outcome
    }

    /// Number of cached parses
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    async fn try_delegate(&self, text: &str) -> Option<ParsedIntent> {
        let model = self.delegate.as_ref()?;
        if !self.is_integration_intent(text) {
            return None;
        }

        match with_timeout(
            self.config.delegate_timeout,
            delegate::parse_with_model(model.as_ref(), text),
        )
        .await
        {
            Ok(intent) => {
                info!(
                    "Delegate parsed intent: {} {}/{}",
                    intent.action, intent.service, intent.resource
                );
                Some(intent)
            }
            Err(e) => {
                warn!("Delegate parse failed: {}, falling back to rules", e);
                None
            }
        }
    }

    fn parse_with_rules(&self, text: &str) -> ParseOutcome {
        let trimmed = text.trim();
        for rule in &self.rules {
            if let Some(intent) = rule.apply(trimmed) {
                debug!("Rule '{}' matched", rule.name);
                return ParseOutcome {
                    intent,
                    stage: ParseStage::Rule(rule.name.to_string()),
                };
            }
        }

        debug!("No rule matched, using fallback intent");
        ParseOutcome {
            intent: rules::fallback(trimmed),
            stage: ParseStage::Fallback,
        }
    }

    fn is_integration_intent(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| self.config.delegate_triggers.iter().any(|t| t == word))
    }
}

fn cache_key(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use llm::{ChatRequest, ChatResponse, LlmError, Message};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock delegate returning a fixed reply or error, counting calls
    #[derive(Clone)]
    struct MockModel {
        reply: std::result::Result<String, String>,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl MockModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err("connection refused".to_string()),
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl ChatModel for MockModel {
        async fn chat(&self, _request: ChatRequest) -> llm::Result<ChatResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match &self.reply {
                Ok(text) => Ok(ChatResponse {
                    message: Message::ai(text.clone()),
                    usage: None,
                    metadata: HashMap::new(),
                }),
                Err(e) => Err(LlmError::ServiceUnavailable(e.clone())),
            }
        }

        fn provider_name(&self) -> &str {
            "mock"
        }

        fn clone_box(&self) -> Box<dyn ChatModel> {
            Box::new(self.clone())
        }
    }

    fn parser() -> IntentParser {
        IntentParser::new(ParserConfig::default()).unwrap()
    }

    // ========================================================================
    // Rules and fallback
    // ========================================================================

    #[tokio::test]
    async fn test_weather_intent() {
        let outcome = parser().parse_detailed("get weather in Paris").await;

        assert_eq!(outcome.stage, ParseStage::Rule("weather_forecast".into()));
        assert_eq!(outcome.intent.action, "GET");
        assert_eq!(outcome.intent.service, "weather");
        assert_eq!(outcome.intent.resource, "forecast");
        assert_eq!(outcome.intent.parameters["location"], "Paris");
    }

    #[tokio::test]
    async fn test_fallback_intent() {
        let outcome = parser().parse_detailed("do something nobody registered").await;

        assert_eq!(outcome.stage, ParseStage::Fallback);
        assert_eq!(outcome.intent.service, "unknown");
        assert_eq!(outcome.intent.resource, "data");
        assert_eq!(
            outcome.intent.parameters["query"],
            "do something nobody registered"
        );
    }

    // ========================================================================
    // Cache
    // ========================================================================

    #[tokio::test]
    async fn test_cache_hit_ignores_case_and_padding() {
        let parser = parser();
        let first = parser.parse_detailed("Get Weather in Paris").await;
        let second = parser.parse_detailed("  get weather in paris ").await;

        assert!(matches!(first.stage, ParseStage::Rule(_)));
        assert_eq!(second.stage, ParseStage::Cache);
        assert_eq!(first.intent, second.intent);
        assert_eq!(parser.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_cache_is_bounded() {
        let parser = IntentParser::new(ParserConfig {
            cache_capacity: 2,
            ..ParserConfig::default()
        })
        .unwrap();

        parser.parse("tell me a joke").await;
        parser.parse("random fact").await;
        parser.parse("define rust").await;

        assert_eq!(parser.cached_len(), 2);
        let again = parser.parse_detailed("tell me a joke").await;
        assert!(matches!(again.stage, ParseStage::Rule(_)));
    }

    // ========================================================================
    // Delegate
    // ========================================================================

    #[tokio::test]
    async fn test_delegate_used_for_integration_wording() {
        let model = MockModel::replying(
            r#"{"action":"GET","service":"github","resource":"user","parameters":{"username":"rust-lang"}}"#,
        );
        let calls = model.calls.clone();
        let parser = parser().with_delegate(Arc::new(model));

        let outcome = parser
            .parse_detailed("call the github api for user rust-lang")
            .await;

        assert_eq!(outcome.stage, ParseStage::Delegate);
        assert_eq!(outcome.intent.parameters["username"], "rust-lang");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delegate_skipped_without_trigger_word() {
        let model = MockModel::replying("{}");
        let calls = model.calls.clone();
        let parser = parser().with_delegate(Arc::new(model));

        let outcome = parser.parse_detailed("get weather in Rapid City").await;

        assert!(matches!(outcome.stage, ParseStage::Rule(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delegate_error_falls_back_to_rules() {
        let parser = parser().with_delegate(Arc::new(MockModel::failing()));
        let outcome = parser.parse_detailed("connect weather api for Paris").await;

        assert_eq!(outcome.stage, ParseStage::Fallback);
        assert_eq!(outcome.intent.service, "unknown");
    }

    #[tokio::test]
    async fn test_delegate_malformed_reply_falls_back() {
        let parser = parser().with_delegate(Arc::new(MockModel::replying("sorry, I can't")));
        let outcome = parser.parse_detailed("get weather in Paris via the api").await;

        assert_eq!(outcome.stage, ParseStage::Rule("weather_forecast".into()));
        assert_eq!(outcome.intent.parameters["location"], "Paris via the api");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delegate_timeout_falls_back() {
        let mut model = MockModel::replying(
            r#"{"action":"GET","service":"joke","resource":"joke"}"#,
        );
        model.delay = Duration::from_secs(30);
        let parser = IntentParser::new(ParserConfig {
            delegate_timeout: Duration::from_millis(100),
            ..ParserConfig::default()
        })
        .unwrap()
        .with_delegate(Arc::new(model));

        let outcome = parser.parse_detailed("joke api please").await;

        assert_eq!(outcome.stage, ParseStage::Rule("joke".into()));
    }
}

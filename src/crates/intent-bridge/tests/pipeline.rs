//! End-to-end runs of the intent pipeline

use async_trait::async_trait;
use intent_bridge::{
    ApiExecutor, ApiRegistry, BridgeParts, BridgeResponse, CatalogLearner, Credentials,
    EndpointSpec, ExecutorConfig, IntentBridge, IntentParser, LearningConfig, LearningEngine,
    ParserConfig, ResolvedVia, ResponseNormalizer, ServiceConfig,
};
use llm::{ChatModel, ChatRequest, ChatResponse, Message};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone)]
struct ScriptedModel {
    reply: String,
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, _request: ChatRequest) -> llm::Result<ChatResponse> {
        Ok(ChatResponse {
            message: Message::ai(self.reply.clone()),
            usage: None,
            metadata: HashMap::new(),
        })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn clone_box(&self) -> Box<dyn ChatModel> {
        Box::new(self.clone())
    }
}

fn parts(registry: ApiRegistry, executor: ExecutorConfig) -> BridgeParts {
    BridgeParts {
        parser: IntentParser::new(ParserConfig::default()).unwrap(),
        executor: ApiExecutor::new(executor, Credentials::new()).unwrap(),
        normalizer: ResponseNormalizer::new(),
        learning: LearningEngine::in_memory(),
        learner: Arc::new(CatalogLearner::new(registry.clone())),
        registry,
    }
}

fn mock_only() -> ExecutorConfig {
    ExecutorConfig {
        force_mock: true,
        ..Default::default()
    }
}

fn offline_bridge() -> IntentBridge {
    IntentBridge::new(parts(ApiRegistry::with_builtin_catalog(), mock_only()))
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

// ============================================================================
// Resolution
// ============================================================================

#[tokio::test]
async fn test_weather_intent_end_to_end() {
    let bridge = offline_bridge();

    let response = bridge.execute("get weather in Paris").await;
    let value = to_json(&response);

    assert_eq!(value["success"], json!(true));
    assert_eq!(value["mock"], json!(true));
    assert_eq!(value["service"], json!("OpenWeatherMap"));
    assert_eq!(value["resolvedVia"], json!("parsed"));
    assert_eq!(value["data"]["type"], json!("weather"));
    assert_eq!(value["data"]["location"], json!("Paris"));
    assert!(value["data"]["summary"].as_str().unwrap().contains("Paris"));
    assert!(value["message"].as_str().unwrap().starts_with("🌤️ Weather in Paris"));
    assert!(value["executionTime"].as_str().unwrap().ends_with("ms"));
    assert_eq!(value["raw"]["name"], json!("Paris"));
}

#[tokio::test]
async fn test_repeat_intent_takes_fast_path() {
    let bridge = offline_bridge();

    bridge.execute("get weather in Paris").await;
    let response = bridge.execute("  Get Weather in Paris ").await;

    match response {
        BridgeResponse::Executed { resolved_via, .. } => {
            assert_eq!(resolved_via, ResolvedVia::FastPath)
        }
        other => panic!("unexpected response: {:?}", other),
    }

    let stats = to_json(&bridge.get_stats());
    assert_eq!(stats["totalExecutions"], json!(2));
    assert_eq!(stats["uniquePatterns"], json!(1));
    assert_eq!(stats["topPatterns"][0]["count"], json!(2));
}

#[tokio::test]
async fn test_stale_pattern_is_forgotten() {
    let bridge = offline_bridge();
    bridge.execute("get weather in Paris").await;
    assert_eq!(bridge.get_stats().top_patterns.len(), 1);

    bridge.registry().register(
        "weather",
        ServiceConfig::new("OpenWeatherMap", "https://api.openweathermap.org/data/2.5"),
    );
    let response = bridge.execute("get weather in Paris").await;

    assert!(matches!(response, BridgeResponse::NotFound { .. }));
    assert!(bridge.get_stats().top_patterns.is_empty());
}

#[tokio::test]
async fn test_unknown_intent_lists_services() {
    let bridge = offline_bridge();

    let response = bridge.execute("reticulate the splines").await;
    let value = to_json(&response);

    assert!(!response.is_success());
    assert_eq!(value["error"], json!("API not found: unknown"));
    assert_eq!(value["available_apis"], json!(bridge.list_apis()));
    assert!(value["suggestion"].as_str().unwrap().starts_with("Try one of: weather"));
    assert_eq!(bridge.get_stats().stats.total_executions, 0);
}

#[tokio::test]
async fn test_delegate_resolves_integration_style_phrasing() {
    let registry = ApiRegistry::with_builtin_catalog();
    let mut parts = parts(registry, mock_only());
    parts.parser = IntentParser::new(ParserConfig::default())
        .unwrap()
        .with_delegate(Arc::new(ScriptedModel {
            reply: r#"{"action": "get", "service": "Currency", "resource": "rate", "parameters": {"from": "EUR"}}"#
                .to_string(),
        }));
    let bridge = IntentBridge::new(parts);

    let value = to_json(&bridge.execute("connect me to exchange data").await);

    assert_eq!(value["success"], json!(true));
    assert_eq!(value["data"]["type"], json!("currency"));
    assert_eq!(value["service"], json!("ExchangeRate"));
}

// ============================================================================
// Execution
// ============================================================================

#[tokio::test]
async fn test_live_call_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/joke/Any"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "twopart",
            "setup": "Why did the function return early?",
            "delivery": "It had a break."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registry = ApiRegistry::new();
    registry.register(
        "joke",
        ServiceConfig::new("JokeAPI", server.uri())
            .endpoint("GET_joke", EndpointSpec::new("GET", "/joke/Any")),
    );
    let bridge = IntentBridge::new(parts(registry, ExecutorConfig::default()));

    let value = to_json(&bridge.execute("tell me a joke").await);

    assert_eq!(value["mock"], json!(false));
    assert_eq!(value["data"]["type"], json!("entertainment"));
    assert!(value["message"].as_str().unwrap().starts_with("😄"));
}

#[tokio::test]
async fn test_strict_mode_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let registry = ApiRegistry::new();
    registry.register(
        "joke",
        ServiceConfig::new("JokeAPI", server.uri())
            .endpoint("GET_joke", EndpointSpec::new("GET", "/joke/Any")),
    );
    let strict = ExecutorConfig {
        mock_fallback: false,
        ..Default::default()
    };
    let bridge = IntentBridge::new(parts(registry, strict));

    let response = bridge.execute("tell me a joke").await;
    let value = to_json(&response);

    assert!(!response.is_success());
    assert_eq!(value["service"], json!("JokeAPI"));
    assert_eq!(value["mock"], json!(false));
    assert!(value["error"].as_str().unwrap().contains("503"));

    let stats = bridge.get_stats();
    assert_eq!(stats.stats.failed_executions, 1);
    assert!(stats.top_patterns.is_empty());
}

// ============================================================================
// Integration requests
// ============================================================================

#[tokio::test]
async fn test_integration_registers_service() {
    let bridge = offline_bridge();
    assert!(bridge.registry().get("stripe").is_none());

    let value = to_json(&bridge.execute("integrate Stripe API with key sk_test_123").await);

    assert_eq!(value["success"], json!(true));
    assert_eq!(value["ready"], json!(true));
    assert_eq!(value["message"], json!("Successfully learned Stripe API!"));
    assert!(value["example"].as_str().unwrap().contains("using Stripe"));
    assert!(bridge.list_apis().contains(&"stripe".to_string()));
    assert!(bridge
        .registry()
        .find_api("stripe", "CREATE", "charge")
        .is_some());
}

#[tokio::test]
async fn test_integration_without_target_asks_for_one() {
    let bridge = offline_bridge();

    let value = to_json(&bridge.execute("please integrate").await);

    assert_eq!(value["success"], json!(false));
    assert_eq!(value["message"], json!("Please specify which API to integrate"));
    assert!(value["example"].as_str().unwrap().starts_with("Try:"));
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_learned_patterns_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = LearningConfig {
        store_path: Some(dir.path().join("learning.json")),
        ..Default::default()
    };

    {
        let mut first = parts(ApiRegistry::with_builtin_catalog(), mock_only());
        first.learning = LearningEngine::open(config.clone()).await;
        IntentBridge::new(first).execute("get weather in Oslo").await;
    }

    let mut second = parts(ApiRegistry::with_builtin_catalog(), mock_only());
    second.learning = LearningEngine::open(config).await;
    let bridge = IntentBridge::new(second);

    match bridge.execute("get weather in Oslo").await {
        BridgeResponse::Executed { resolved_via, .. } => {
            assert_eq!(resolved_via, ResolvedVia::FastPath)
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

#[tokio::test]
async fn test_forgotten_pattern_stays_forgotten_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = LearningConfig {
        store_path: Some(dir.path().join("learning.json")),
        ..Default::default()
    };

    {
        let mut first = parts(ApiRegistry::with_builtin_catalog(), mock_only());
        first.learning = LearningEngine::open(config.clone()).await;
        let bridge = IntentBridge::new(first);
        bridge.execute("get weather in Paris").await;

        bridge.registry().register(
            "weather",
            ServiceConfig::new("OpenWeatherMap", "https://api.openweathermap.org/data/2.5"),
        );
        let response = bridge.execute("get weather in Paris").await;
        assert!(matches!(response, BridgeResponse::NotFound { .. }));
    }

    let reopened = LearningEngine::open(config).await;
    assert!(reopened.check_pattern("get weather in Paris").is_none());
    assert_eq!(reopened.stats().total_executions, 1);
}

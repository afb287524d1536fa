//! Intent bridge
//!
//! Sequences one intent through the pipeline:
//!
//! 1. integration requests go to the [`ApiLearner`] and return early
//! 2. a learned pattern reuses its stored parse (fast path)
//! 3. otherwise parse, look up, execute
//! 4. record the execution, normalize, format
//!
//! [`IntentBridge::execute`] never returns an error. Lookup misses and
//! failed executions come back as [`BridgeResponse`] variants.

use crate::config::{BridgeConfig, LlmSection};
use crate::executor::{ApiExecutor, Credentials, ExecutionResult};
use crate::learner::{ApiLearner, CatalogLearner, IntegrationRequest};
use crate::learning::{LearningEngine, StatsReport};
use crate::normalizer::{NormalizedEnvelope, ResponseNormalizer};
use crate::parser::{IntentParser, ParsedIntent};
use crate::registry::{ApiRegistry, ResolvedApi};
use crate::{BridgeError, Result};
use llm::{remote_client, ChatModel, Provider, RemoteLlmConfig};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tooling::logging::{format_duration, sanitize_for_logging};
use tracing::{debug, info, warn};

/// How the executed endpoint was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedVia {
    /// Stored parse of a learned pattern
    FastPath,
    /// Fresh parse
    Parsed,
}

/// Caller-facing result of [`IntentBridge::execute`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BridgeResponse {
    Executed {
        success: bool,
        message: String,
        data: NormalizedEnvelope,
        raw: Value,
        mock: bool,
        #[serde(rename = "executionTime")]
        execution_time: String,
        service: String,
        #[serde(rename = "resolvedVia")]
        resolved_via: ResolvedVia,
    },
    NotFound {
        success: bool,
        error: String,
        suggestion: String,
        available_apis: Vec<String>,
    },
    Integration {
        success: bool,
        message: String,
        endpoints: Vec<String>,
        ready: bool,
        example: String,
    },
    Failed {
        success: bool,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        service: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mock: Option<bool>,
        suggestion: String,
    },
}

impl BridgeResponse {
    pub fn is_success(&self) -> bool {
        match self {
            BridgeResponse::Executed { success, .. }
            | BridgeResponse::NotFound { success, .. }
            | BridgeResponse::Integration { success, .. }
            | BridgeResponse::Failed { success, .. } => *success,
        }
    }
}

/// Explicitly wired components
pub struct BridgeParts {
    pub registry: ApiRegistry,
    pub parser: IntentParser,
    pub executor: ApiExecutor,
    pub normalizer: ResponseNormalizer,
    pub learning: LearningEngine,
    /// Should share `registry` so learned services are visible to lookup
    pub learner: Arc<dyn ApiLearner>,
}

pub struct IntentBridge {
    registry: ApiRegistry,
    parser: IntentParser,
    executor: ApiExecutor,
    normalizer: ResponseNormalizer,
    learning: LearningEngine,
    learner: Arc<dyn ApiLearner>,
}

impl IntentBridge {
    pub fn new(parts: BridgeParts) -> Self {
        Self {
            registry: parts.registry,
            parser: parts.parser,
            executor: parts.executor,
            normalizer: parts.normalizer,
            learning: parts.learning,
            learner: parts.learner,
        }
    }

    /// Wire a bridge from configuration
    ///
    /// The language-model delegate is attached only when a provider is
    /// configured and its key is present in the environment. Unreadable
    /// catalogue files are an error; an unreadable learning store is not.
    pub async fn from_config(config: BridgeConfig) -> Result<Self> {
        let registry = ApiRegistry::with_builtin_catalog();
        for path in &config.registry.catalog_files {
            let count = registry.load_from_file(path)?;
            info!("Loaded {} APIs from {}", count, path.display());
        }

        let mut parser = IntentParser::new(config.parser_config())?;
        if let Some(model) = delegate_model(&config.llm)? {
            parser = parser.with_delegate(model);
        }

        let credentials = Credentials::from_env(&config.credentials.names);
        debug!("Credentials available: {:?}", credentials);
        let executor = ApiExecutor::new(config.executor_config(), credentials)?;
        let learning = LearningEngine::open(config.learning_config()).await;
        let learner = Arc::new(CatalogLearner::new(registry.clone()));

        info!("Intent bridge ready with {} APIs", registry.len());
        Ok(Self::new(BridgeParts {
            registry,
            parser,
            executor,
            normalizer: ResponseNormalizer::new(),
            learning,
            learner,
        }))
    }

    /// Resolve and run one intent
    pub async fn execute(&self, intent: &str) -> BridgeResponse {
        let started = Instant::now();
        info!("Intent: \"{}\"", sanitize_for_logging(intent));

        if is_integration_request(intent) {
            return self.integrate(intent).await;
        }

        if let Some(pattern) = self.learning.check_pattern(intent) {
            let parsed = &pattern.parsed;
            match self
                .registry
                .find_api(&parsed.service, &parsed.action, &parsed.resource)
            {
                Some(api) => {
                    debug!("Using learned pattern for {}", pattern.api_config.endpoint_key);
                    return self
                        .run(intent, parsed, &api, started, ResolvedVia::FastPath)
                        .await;
                }
                None => {
                    debug!(
                        "Learned endpoint {} of {} is gone, parsing again",
                        pattern.api_config.endpoint_key, pattern.api_config.name
                    );
                    self.learning.forget(intent).await;
                }
            }
        }

        let parsed = self.parser.parse(intent).await;
        debug!(
            "Parsed {} {}/{} with {} parameters",
            parsed.action,
            parsed.service,
            parsed.resource,
            parsed.parameters.len()
        );

        let Some(api) = self
            .registry
            .find_api(&parsed.service, &parsed.action, &parsed.resource)
        else {
            return self.not_found(&parsed.service);
        };

        info!("Found API: {}", api.name());
        self.run(intent, &parsed, &api, started, ResolvedVia::Parsed)
            .await
    }

    async fn run(
        &self,
        intent: &str,
        parsed: &ParsedIntent,
        api: &ResolvedApi,
        started: Instant,
        resolved_via: ResolvedVia,
    ) -> BridgeResponse {
        let result = self.executor.execute(api, &parsed.parameters).await;
        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        self.learning
            .record_execution(intent, parsed, api, &result, elapsed_ms)
            .await;

        info!("{} answered in {}", api.name(), format_duration(elapsed));
        self.format(api, result, elapsed_ms, resolved_via)
    }

    fn format(
        &self,
        api: &ResolvedApi,
        result: ExecutionResult,
        elapsed_ms: f64,
        resolved_via: ResolvedVia,
    ) -> BridgeResponse {
        let mock = result.is_mock();
        if !result.success {
            return BridgeResponse::Failed {
                success: false,
                error: result
                    .error
                    .unwrap_or_else(|| format!("{} call failed", api.name())),
                service: Some(result.service),
                mock: Some(mock),
                suggestion: "Check the service credentials or enable mock fallback".to_string(),
            };
        }

        let raw = result.data.unwrap_or(Value::Null);
        let data = self.normalizer.normalize(api.name(), &raw);

        BridgeResponse::Executed {
            success: true,
            message: readable_message(&data),
            data,
            raw,
            mock,
            execution_time: format!("{:.0}ms", elapsed_ms),
            service: result.service,
            resolved_via,
        }
    }

    fn not_found(&self, service: &str) -> BridgeResponse {
        let available = self.registry.list();
        let err = BridgeError::LookupMiss(service.to_string());
        warn!("{}", err);
        BridgeResponse::NotFound {
            success: false,
            error: err.to_string(),
            suggestion: format!("Try one of: {}", available.join(", ")),
            available_apis: available,
        }
    }

    async fn integrate(&self, intent: &str) -> BridgeResponse {
        let request = IntegrationRequest::from_intent(intent);
        if request.is_empty() {
            return BridgeResponse::Integration {
                success: false,
                message: "Please specify which API to integrate".to_string(),
                endpoints: Vec::new(),
                ready: false,
                example: "Try: \"integrate Stripe API with key sk_test_...\"".to_string(),
            };
        }

        match self.learner.learn(&request).await {
            Ok(learned) => BridgeResponse::Integration {
                success: true,
                message: format!("Successfully learned {} API!", learned.name),
                endpoints: learned.endpoints,
                ready: true,
                example: format!(
                    "Now you can use commands like: \"charge $50 using {}\"",
                    learned.name
                ),
            },
            Err(e) => {
                warn!("Integration failed: {}", e);
                BridgeResponse::Failed {
                    success: false,
                    error: e.to_string(),
                    service: request.name,
                    mock: None,
                    suggestion: "Try providing a direct documentation URL".to_string(),
                }
            }
        }
    }

    /// Registered service keys
    pub fn list_apis(&self) -> Vec<String> {
        self.registry.list()
    }

    pub fn get_stats(&self) -> StatsReport {
        self.learning.get_stats()
    }

    pub fn registry(&self) -> &ApiRegistry {
        &self.registry
    }
}

fn is_integration_request(intent: &str) -> bool {
    let lower = intent.to_lowercase();
    lower.contains("integrate") || (lower.contains("add") && lower.contains("api"))
}

fn delegate_model(llm: &LlmSection) -> Result<Option<Arc<dyn ChatModel>>> {
    let Some(provider) = llm.provider.as_deref() else {
        return Ok(None);
    };
    let provider: Provider = provider.parse()?;

    let key_env = llm
        .api_key_env
        .clone()
        .unwrap_or_else(|| provider.default_api_key_env().to_string());
    let base_url = llm
        .base_url
        .clone()
        .unwrap_or_else(|| provider.default_base_url().to_string());
    let model = llm
        .model
        .clone()
        .unwrap_or_else(|| provider.default_model().to_string());

    match RemoteLlmConfig::from_env(&key_env, base_url, model) {
        Ok(config) => {
            info!("Intent delegate enabled ({:?}, {})", provider, config.model);
            Ok(Some(remote_client(provider, config)?))
        }
        Err(e) => {
            warn!("{}, parsing with rules only", e);
            Ok(None)
        }
    }
}

fn field<'a>(envelope: &'a NormalizedEnvelope, name: &str) -> &'a str {
    envelope
        .fields
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}

fn readable_message(envelope: &NormalizedEnvelope) -> String {
    let summary = &envelope.summary;
    match envelope.kind.as_str() {
        "weather" => format!("🌤️ Weather in {}: {}", field(envelope, "location"), summary),
        "news" => format!("📰 {}", summary),
        "currency" => format!("💱 {}", summary),
        "entertainment" => format!("😄 {}", summary),
        "repositories" | "github_resource" => format!("🐙 {}", summary),
        "payment" => format!("💳 {}", summary),
        "communication" => format!("📱 {}", summary),
        "email" => format!("📧 {}", summary),
        _ => "✅ Operation completed successfully".to_string(),
    }
}

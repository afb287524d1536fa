//! Intent-to-API bridge
//!
//! Resolves a free-text intent such as `"get weather in Paris"` to one of the
//! registered HTTP services, calls it (or a mocked stand-in), normalizes the
//! reply into a common envelope and remembers the resolution so the same
//! intent skips parsing next time.
//!
//! The pipeline, leaf first:
//!
//! - [`registry::ApiRegistry`]: services and their endpoints
//! - [`parser::IntentParser`]: text to [`parser::ParsedIntent`], rules first
//!   or a language-model delegate for integration-style requests
//! - [`executor::ApiExecutor`]: builds and sends the request, falling back to
//!   mock payloads
//! - [`normalizer::ResponseNormalizer`]: per-service shape converters
//! - [`learning::LearningEngine`]: learned patterns and execution statistics
//! - [`bridge::IntentBridge`]: sequences the above
//!
//! # Example
//!
//! ```rust,ignore
//! use intent_bridge::{BridgeConfig, IntentBridge};
//!
//! let bridge = IntentBridge::from_config(BridgeConfig::default()).await?;
//! let response = bridge.execute("get weather in Paris").await;
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod executor;
pub mod learner;
pub mod learning;
pub mod normalizer;
pub mod parser;
pub mod registry;

pub use bridge::{BridgeParts, BridgeResponse, IntentBridge, ResolvedVia};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use executor::{ApiExecutor, Credentials, ExecutionResult, ExecutorConfig, Provenance};
pub use learner::{ApiLearner, CatalogLearner, IntegrationRequest, LearnedApi};
pub use learning::{LearnedPattern, LearningConfig, LearningEngine, Stats, StatsReport};
pub use normalizer::{NormalizedEnvelope, ResponseNormalizer};
pub use parser::{IntentParser, ParseOutcome, ParseStage, ParsedIntent, ParserConfig};
pub use registry::{ApiRegistry, AuthKind, AuthSpec, EndpointSpec, ResolvedApi, ServiceConfig};

//! Learning engine
//!
//! Remembers which endpoint each successful intent resolved to, keyed by a
//! canonical form of the intent text, and keeps aggregate execution
//! statistics. Every recorded execution is written through to the JSON
//! store when one is configured.
//!
//! The pattern table is bounded and keeps insertion order. When it is full
//! the pattern with the oldest `last_used` is evicted.

mod store;

use crate::executor::ExecutionResult;
use crate::parser::ParsedIntent;
use crate::registry::ResolvedApi;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use store::StoreDocument;
use tracing::{debug, error, info, warn};

/// Learning engine settings
#[derive(Debug, Clone)]
pub struct LearningConfig {
    /// JSON store; `None` keeps everything in memory
    pub store_path: Option<PathBuf>,
    /// Maximum number of learned patterns
    pub max_patterns: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            max_patterns: 10_000,
        }
    }
}

/// Endpoint a pattern resolved to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRef {
    /// Service display name
    pub name: String,
    pub endpoint_key: String,
}

/// Last successful resolution of an intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedPattern {
    /// Intent text as first seen
    pub intent: String,
    pub parsed: ParsedIntent,
    pub api_config: ApiRef,
    pub execution_count: u64,
    /// Milliseconds
    pub average_response_time: f64,
    pub last_used: DateTime<Utc>,
}

/// Aggregate execution statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    pub total_executions: u64,
    pub successful_executions: u64,
    pub failed_executions: u64,
    /// Number of patterns ever created
    pub unique_patterns: u64,
    /// Milliseconds, over all executions
    pub average_response_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPattern {
    pub intent: String,
    pub count: u64,
}

/// Stats plus the most used patterns and the success rate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    #[serde(flatten)]
    pub stats: Stats,
    pub top_patterns: Vec<TopPattern>,
    /// `"66.7%"`, or `"N/A"` before any execution
    pub success_rate: String,
}

#[derive(Default)]
struct State {
    patterns: IndexMap<String, LearnedPattern>,
    stats: Stats,
}

pub struct LearningEngine {
    state: Mutex<State>,
    /// Serializes store writes so the file always ends up with the newest
    /// snapshot
    write_lock: tokio::sync::Mutex<()>,
    config: LearningConfig,
}

/// Canonical lookup key for an intent
///
/// Lowercased, trimmed, quotes removed and whitespace runs replaced by `_`.
pub fn canonical_key(intent: &str) -> String {
    intent
        .trim()
        .to_lowercase()
        .replace(|c: char| c == '\'' || c == '"', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn running_mean(average: f64, count: u64, sample: f64) -> f64 {
    (average * (count - 1) as f64 + sample) / count as f64
}

impl LearningEngine {
    /// Engine without persistence
    pub fn in_memory() -> Self {
        Self::with_state(LearningConfig::default(), State::default())
    }

    /// Open the engine, loading the store if present
    ///
    /// A store that cannot be read is logged and the engine starts empty.
    pub async fn open(config: LearningConfig) -> Self {
        let mut state = State::default();

        if let Some(path) = &config.store_path {
            match store::load(path).await {
                Ok(Some(document)) => {
                    info!("Loaded {} learned patterns", document.patterns.len());
                    state.patterns = document.patterns;
                    state.stats = document.stats;
                }
                Ok(None) => info!("Starting with fresh learning data"),
                Err(e) => error!("{}, starting with fresh learning data", e),
            }
        }

        Self::with_state(config, state)
    }

    fn with_state(config: LearningConfig, state: State) -> Self {
        Self {
            state: Mutex::new(state),
            write_lock: tokio::sync::Mutex::new(()),
            config,
        }
    }

    /// Learned pattern for `intent`, if any
    pub fn check_pattern(&self, intent: &str) -> Option<LearnedPattern> {
        self.state.lock().patterns.get(&canonical_key(intent)).cloned()
    }

    /// Record one execution and write the store through
    ///
    /// Only successful executions create or update patterns. Store errors are
    /// logged; the in-memory state is kept either way.
    pub async fn record_execution(
        &self,
        intent: &str,
        parsed: &ParsedIntent,
        api: &ResolvedApi,
        result: &ExecutionResult,
        elapsed_ms: f64,
    ) {
        self.apply(intent, parsed, api, result.success, elapsed_ms);
        self.persist().await;
    }

    fn apply(
        &self,
        intent: &str,
        parsed: &ParsedIntent,
        api: &ResolvedApi,
        success: bool,
        elapsed_ms: f64,
    ) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let now = Utc::now();

        state.stats.total_executions += 1;
        let total = state.stats.total_executions;
        state.stats.average_response_time =
            running_mean(state.stats.average_response_time, total, elapsed_ms);

        if !success {
            state.stats.failed_executions += 1;
            return;
        }
        state.stats.successful_executions += 1;

        let key = canonical_key(intent);
        if let Some(pattern) = state.patterns.get_mut(&key) {
            pattern.execution_count += 1;
            pattern.average_response_time = running_mean(
                pattern.average_response_time,
                pattern.execution_count,
                elapsed_ms,
            );
            pattern.last_used = now;
            return;
        }

        if self.config.max_patterns > 0 && state.patterns.len() >= self.config.max_patterns {
            let oldest = state
                .patterns
                .iter()
                .enumerate()
                .min_by_key(|(_, (_, p))| p.last_used)
                .map(|(index, _)| index);
            if let Some((evicted, _)) = oldest.and_then(|i| state.patterns.shift_remove_index(i)) {
                debug!("Evicted least recently used pattern '{}'", evicted);
            }
        }

        info!("Learned new pattern '{}' -> {} {}", key, api.name(), api.endpoint_key);
        state.patterns.insert(
            key,
            LearnedPattern {
                intent: intent.to_string(),
                parsed: parsed.clone(),
                api_config: ApiRef {
                    name: api.name().to_string(),
                    endpoint_key: api.endpoint_key.clone(),
                },
                execution_count: 1,
                average_response_time: elapsed_ms,
                last_used: now,
            },
        );
        state.stats.unique_patterns += 1;
    }

    async fn persist(&self) {
        let Some(path) = &self.config.store_path else {
            return;
        };

        let _guard = self.write_lock.lock().await;
        let document = {
            let state = self.state.lock();
            StoreDocument {
                patterns: state.patterns.clone(),
                stats: state.stats.clone(),
                last_updated: Some(Utc::now()),
            }
        };

        if let Err(e) = store::save(path, &document).await {
            error!("Could not save learning data: {}", e);
        }
    }

    /// Stats snapshot
    pub fn stats(&self) -> Stats {
        self.state.lock().stats.clone()
    }

    /// Stats with the top five patterns by execution count and the success
    /// rate
    ///
    /// Patterns with equal counts keep the order they were first learned in.
    pub fn get_stats(&self) -> StatsReport {
        let state = self.state.lock();

        let mut ranked: Vec<&LearnedPattern> = state.patterns.values().collect();
        ranked.sort_by(|a, b| b.execution_count.cmp(&a.execution_count));
        let top_patterns = ranked
            .into_iter()
            .take(5)
            .map(|p| TopPattern {
                intent: p.intent.clone(),
                count: p.execution_count,
            })
            .collect();

        let stats = state.stats.clone();
        let success_rate = if stats.total_executions > 0 {
            format!(
                "{:.1}%",
                stats.successful_executions as f64 / stats.total_executions as f64 * 100.0
            )
        } else {
            "N/A".to_string()
        };

        StatsReport {
            stats,
            top_patterns,
            success_rate,
        }
    }

    /// Number of learned patterns
    pub fn len(&self) -> usize {
        self.state.lock().patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().patterns.is_empty()
    }

    /// Forget a pattern, e.g. when its endpoint is no longer registered,
    /// and write the store through
    pub async fn forget(&self, intent: &str) -> Option<LearnedPattern> {
        let removed = self.state.lock().patterns.shift_remove(&canonical_key(intent));
        if removed.is_some() {
            warn!("Forgot learned pattern for '{}'", intent);
            self.persist().await;
        }
        removed
    }
}

//! Bridge configuration
//!
//! Loaded from a TOML file and overlaid with environment variables. Every
//! section is optional.
//!
//! ```toml
//! [learning]
//! store_path = "learning.json"
//!
//! [executor]
//! force_mock = true
//!
//! [llm]
//! provider = "deepseek"
//! ```

use crate::executor::ExecutorConfig;
use crate::learning::LearningConfig;
use crate::parser::ParserConfig;
use crate::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tooling::config::{get_env, get_env_bool, get_env_list, get_env_parse};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub learning: LearningSection,
    pub parser: ParserSection,
    pub executor: ExecutorSection,
    pub llm: LlmSection,
    pub credentials: CredentialsSection,
    pub registry: RegistrySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningSection {
    /// `None` keeps learned patterns in memory only
    pub store_path: Option<PathBuf>,
    pub max_patterns: usize,
}

impl Default for LearningSection {
    fn default() -> Self {
        Self {
            store_path: Some(PathBuf::from("learning.json")),
            max_patterns: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSection {
    pub cache_capacity: usize,
    pub delegate_timeout_ms: u64,
    pub delegate_triggers: Vec<String>,
}

impl Default for ParserSection {
    fn default() -> Self {
        let defaults = ParserConfig::default();
        Self {
            cache_capacity: defaults.cache_capacity,
            delegate_timeout_ms: defaults.delegate_timeout.as_millis() as u64,
            delegate_triggers: defaults.delegate_triggers,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSection {
    /// Never touch the network
    pub force_mock: bool,
    /// Serve sample payloads when a live call cannot be made
    pub mock_fallback: bool,
    pub timeout_secs: u64,
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self {
            force_mock: false,
            mock_fallback: true,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// `openai` or `deepseek`; no delegate when unset
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    /// Overrides the provider's default key variable
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsSection {
    /// Environment variables read into the credential map at startup
    pub names: Vec<String>,
}

impl Default for CredentialsSection {
    fn default() -> Self {
        Self {
            names: [
                "OPENWEATHER_API_KEY",
                "NEWS_API_KEY",
                "GITHUB_TOKEN",
                "SLACK_TOKEN",
                "TWITTER_TOKEN",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    /// Extra JSON or YAML service catalogues
    pub catalog_files: Vec<PathBuf>,
}

impl BridgeConfig {
    /// Load from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        utils::load_toml_config(path.as_ref()).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Overlay `INTENT_BRIDGE_*` environment variables
    ///
    /// - `INTENT_BRIDGE_STORE`: learning store path
    /// - `INTENT_BRIDGE_MOCK`: force mock execution
    /// - `INTENT_BRIDGE_LLM_PROVIDER`: delegate provider
    /// - `INTENT_BRIDGE_TIMEOUT_SECS`: live call timeout
    /// - `INTENT_BRIDGE_CATALOGS`: comma-separated catalogue files, appended
    /// - `INTENT_BRIDGE_CREDENTIALS`: comma-separated credential names, appended
    pub fn apply_env(mut self) -> Result<Self> {
        if let Some(path) = get_env("INTENT_BRIDGE_STORE")? {
            self.learning.store_path = Some(PathBuf::from(path));
        }
        if let Some(force_mock) = get_env_bool("INTENT_BRIDGE_MOCK")? {
            self.executor.force_mock = force_mock;
        }
        if let Some(provider) = get_env("INTENT_BRIDGE_LLM_PROVIDER")? {
            self.llm.provider = Some(provider);
        }
        if let Some(secs) = get_env_parse::<u64>("INTENT_BRIDGE_TIMEOUT_SECS")? {
            self.executor.timeout_secs = secs;
        }
        if let Some(files) = get_env_list("INTENT_BRIDGE_CATALOGS")? {
            self.registry
                .catalog_files
                .extend(files.into_iter().map(PathBuf::from));
        }
        if let Some(names) = get_env_list("INTENT_BRIDGE_CREDENTIALS")? {
            for name in names {
                if !self.credentials.names.contains(&name) {
                    self.credentials.names.push(name);
                }
            }
        }
        Ok(self)
    }

    pub fn learning_config(&self) -> LearningConfig {
        LearningConfig {
            store_path: self.learning.store_path.clone(),
            max_patterns: self.learning.max_patterns,
        }
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            cache_capacity: self.parser.cache_capacity,
            delegate_timeout: Duration::from_millis(self.parser.delegate_timeout_ms),
            delegate_triggers: self.parser.delegate_triggers.clone(),
        }
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            force_mock: self.executor.force_mock,
            mock_fallback: self.executor.mock_fallback,
            timeout: Duration::from_secs(self.executor.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();

        assert_eq!(
            config.learning.store_path.as_deref(),
            Some(Path::new("learning.json"))
        );
        assert_eq!(config.parser.cache_capacity, 1024);
        assert_eq!(config.parser.delegate_timeout_ms, 5000);
        assert!(config.executor.mock_fallback);
        assert!(!config.executor.force_mock);
        assert!(config.llm.provider.is_none());
        assert!(config.credentials.names.contains(&"GITHUB_TOKEN".to_string()));
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[executor]
force_mock = true
timeout_secs = 5

[llm]
provider = "deepseek"

[registry]
catalog_files = ["extra.yaml"]
"#
        )
        .unwrap();

        let config = BridgeConfig::load(file.path()).unwrap();

        assert!(config.executor.force_mock);
        assert!(config.executor.mock_fallback);
        assert_eq!(config.executor_config().timeout, Duration::from_secs(5));
        assert_eq!(config.llm.provider.as_deref(), Some("deepseek"));
        assert_eq!(config.registry.catalog_files, vec![PathBuf::from("extra.yaml")]);
        assert_eq!(config.learning.max_patterns, 10_000);
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "[executor\nforce_mock = ").unwrap();

        let err = BridgeConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn test_apply_env_overlay() {
        std::env::set_var("INTENT_BRIDGE_TIMEOUT_SECS", "7");
        std::env::set_var("INTENT_BRIDGE_CATALOGS", "a.yaml, b.json");
        std::env::set_var("INTENT_BRIDGE_CREDENTIALS", "GITHUB_TOKEN,STRIPE_API_KEY");

        let config = BridgeConfig::default().apply_env().unwrap();

        std::env::remove_var("INTENT_BRIDGE_TIMEOUT_SECS");
        std::env::remove_var("INTENT_BRIDGE_CATALOGS");
        std::env::remove_var("INTENT_BRIDGE_CREDENTIALS");

        assert_eq!(config.executor.timeout_secs, 7);
        assert_eq!(
            config.registry.catalog_files,
            vec![PathBuf::from("a.yaml"), PathBuf::from("b.json")]
        );
        let names = &config.credentials.names;
        assert_eq!(names.iter().filter(|n| *n == "GITHUB_TOKEN").count(), 1);
        assert!(names.contains(&"STRIPE_API_KEY".to_string()));
    }

    #[test]
    fn test_section_conversions() {
        let mut config = BridgeConfig::default();
        config.parser.delegate_timeout_ms = 250;
        config.learning.store_path = None;

        assert_eq!(
            config.parser_config().delegate_timeout,
            Duration::from_millis(250)
        );
        assert!(config.learning_config().store_path.is_none());
    }
}

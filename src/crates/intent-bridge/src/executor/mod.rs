//! API executor
//!
//! Sends the request for a resolved endpoint, or serves a mock payload when
//! a live call is not possible. [`ApiExecutor::execute`] always returns an
//! [`ExecutionResult`]; every fallback is logged with its reason and recorded
//! on the result.

mod credentials;
mod mock;
mod request;

pub use credentials::Credentials;
pub use request::{build_request, PreparedRequest};

use crate::registry::ResolvedApi;
use crate::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::time::Duration;
use tooling::logging::redact_headers;
use tracing::{debug, info, warn};
use utils::{ClientConfig, HttpClient};

/// Executor settings
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Serve mock payloads without touching the network
    pub force_mock: bool,
    /// When false, a failed live call is reported as a failure instead of
    /// being replaced by a mock payload
    pub mock_fallback: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            force_mock: false,
            mock_fallback: true,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Where a result's data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Live,
    Mock,
}

/// Outcome of one execution attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Display name of the service
    pub service: String,
    pub provenance: Provenance,
    /// Why the live call was skipped or replaced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl ExecutionResult {
    fn live(service: String, data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            service,
            provenance: Provenance::Live,
            fallback_reason: None,
        }
    }

    fn mock(service: String, data: Value, reason: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            service,
            provenance: Provenance::Mock,
            fallback_reason: Some(reason),
        }
    }

    fn failed(service: String, error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            service,
            provenance: Provenance::Live,
            fallback_reason: None,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.provenance == Provenance::Mock
    }
}

pub struct ApiExecutor {
    client: HttpClient,
    credentials: Credentials,
    config: ExecutorConfig,
}

impl ApiExecutor {
    pub fn new(config: ExecutorConfig, credentials: Credentials) -> Result<Self> {
        let client = HttpClient::new(
            ClientConfig::new()
                .with_timeout(config.timeout)
                .with_user_agent(concat!("intent-bridge/", env!("CARGO_PKG_VERSION"))),
        )?;

        Ok(Self {
            client,
            credentials,
            config,
        })
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Execute `api` with the caller's surface-named parameters
    pub async fn execute(&self, api: &ResolvedApi, params: &Map<String, Value>) -> ExecutionResult {
        if self.config.force_mock {
            debug!("Mock mode enabled, skipping {}", api.name());
            return ExecutionResult::mock(
                api.name().to_string(),
                mock::mock_payload(api, params),
                "mock mode enabled".to_string(),
            );
        }

        match self.execute_live(api, params).await {
            Ok(data) => {
                info!("{} {} completed live", api.name(), api.endpoint_key);
                ExecutionResult::live(api.name().to_string(), data)
            }
            Err(e) => self.fallback(api, params, e),
        }
    }

    async fn execute_live(&self, api: &ResolvedApi, params: &Map<String, Value>) -> Result<Value> {
        let credential = self.credential_for(api)?;
        let prepared = build_request(api, params, credential.as_deref())?;
        let request = &prepared.request;

        debug!(
            method = %request.method,
            url = %request.url,
            headers = %redact_headers(request.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
            "Calling {}",
            api.name()
        );

        let response = self.client.send(request).await?;
        if !response.is_success() {
            return Err(BridgeError::ExecutionFailure(format!(
                "HTTP {} from {}",
                response.status,
                api.name()
            )));
        }
        Ok(response.body)
    }

    fn credential_for(&self, api: &ResolvedApi) -> Result<Option<Cow<'_, str>>> {
        let Some(auth) = api.effective_auth() else {
            return Ok(None);
        };

        match self.credentials.get(&auth.credential) {
            Some(value) => Ok(Some(value)),
            None if auth.required => Err(BridgeError::ExecutionFailure(format!(
                "credential {} is not configured",
                auth.credential
            ))),
            None => Ok(None),
        }
    }

    fn fallback(
        &self,
        api: &ResolvedApi,
        params: &Map<String, Value>,
        err: BridgeError,
    ) -> ExecutionResult {
        let reason = err.to_string();

        if !self.config.mock_fallback {
            warn!("{} call failed: {}", api.name(), reason);
            return ExecutionResult::failed(api.name().to_string(), reason);
        }

        warn!("{} call failed: {}, using mock response", api.name(), reason);
        ExecutionResult::mock(
            api.name().to_string(),
            mock::mock_payload(api, params),
            reason,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AuthKind, AuthSpec, EndpointSpec, ServiceConfig};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn weather_api(base_url: &str) -> ResolvedApi {
        let endpoint = EndpointSpec::new("GET", "/forecast")
            .map("location", "q")
            .require("q")
            .default_param("units", "metric")
            .mock(json!({"name": "{location|New York}", "main": {"temp": 22}}));
        let config = ServiceConfig::new("OpenWeatherMap", base_url)
            .auth(AuthSpec::new(AuthKind::ApiKey, "OPENWEATHER_API_KEY").in_query("appid"))
            .endpoint("GET_forecast", endpoint.clone());
        ResolvedApi {
            key: "weather".into(),
            config,
            endpoint_key: "GET_forecast".into(),
            selected_endpoint: endpoint,
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn executor(config: ExecutorConfig, credentials: Credentials) -> ApiExecutor {
        ApiExecutor::new(config, credentials).unwrap()
    }

    fn with_key() -> Credentials {
        Credentials::new().with("OPENWEATHER_API_KEY", "k3y")
    }

    // ========================================================================
    // Live path
    // ========================================================================

    #[tokio::test]
    async fn test_live_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("q", "Paris"))
            .and(query_param("units", "imperial"))
            .and(query_param("appid", "k3y"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Paris"})))
            .expect(1)
            .mount(&server)
            .await;

        let result = executor(ExecutorConfig::default(), with_key())
            .execute(
                &weather_api(&server.uri()),
                &params(json!({"location": "Paris", "units": "imperial"})),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.provenance, Provenance::Live);
        assert_eq!(result.data, Some(json!({"name": "Paris"})));
        assert!(result.fallback_reason.is_none());
        assert_eq!(result.service, "OpenWeatherMap");
    }

    #[tokio::test]
    async fn test_live_post_body_and_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/charges"))
            .and(header("Authorization", "Bearer sk_test"))
            .and(body_json(json!({"amount": 1000, "currency": "usd"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ch_1"})))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = EndpointSpec::new("POST", "/charges")
            .map("price", "amount")
            .default_param("currency", "usd");
        let config = ServiceConfig::new("Stripe", format!("{}/v1", server.uri()))
            .auth(AuthSpec::new(AuthKind::Bearer, "STRIPE_SECRET_KEY"))
            .endpoint("CREATE_charge", endpoint.clone());
        let api = ResolvedApi {
            key: "stripe".into(),
            config,
            endpoint_key: "CREATE_charge".into(),
            selected_endpoint: endpoint,
        };

        let result = executor(
            ExecutorConfig::default(),
            Credentials::new().with("STRIPE_SECRET_KEY", "sk_test"),
        )
        .execute(&api, &params(json!({"price": 1000})))
        .await;

        assert_eq!(result.provenance, Provenance::Live);
        assert_eq!(result.data.unwrap()["id"], "ch_1");
    }

    // ========================================================================
    // Fallbacks
    // ========================================================================

    #[tokio::test]
    async fn test_error_status_falls_back_to_mock() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad key"})))
            .expect(1)
            .mount(&server)
            .await;

        let result = executor(ExecutorConfig::default(), with_key())
            .execute(&weather_api(&server.uri()), &params(json!({"location": "Paris"})))
            .await;

        assert!(result.success);
        assert!(result.is_mock());
        assert_eq!(result.data.unwrap()["name"], "Paris");
        assert!(result.fallback_reason.unwrap().contains("401"));
    }

    #[tokio::test]
    async fn test_missing_credential_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = executor(ExecutorConfig::default(), Credentials::new())
            .execute(&weather_api(&server.uri()), &params(json!({"location": "Lima"})))
            .await;

        assert!(result.is_mock());
        assert_eq!(result.data.unwrap()["name"], "Lima");
        assert!(result
            .fallback_reason
            .unwrap()
            .contains("OPENWEATHER_API_KEY"));
    }

    #[tokio::test]
    async fn test_optional_credential_allows_live_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "octocat"})))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = EndpointSpec::new("GET", "/users/{username}");
        let config = ServiceConfig::new("GitHub", server.uri())
            .auth(AuthSpec::new(AuthKind::Token, "GITHUB_TOKEN").optional())
            .endpoint("GET_user", endpoint.clone());
        let api = ResolvedApi {
            key: "github".into(),
            config,
            endpoint_key: "GET_user".into(),
            selected_endpoint: endpoint,
        };

        let result = executor(ExecutorConfig::default(), Credentials::new())
            .execute(&api, &params(json!({"username": "octocat"})))
            .await;

        assert_eq!(result.provenance, Provenance::Live);
    }

    #[tokio::test]
    async fn test_undeclared_credential_read_from_env() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/balance"))
            .and(header("Authorization", "Bearer sk_env_acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"available": 5})))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = EndpointSpec::new("GET", "/balance");
        let config = ServiceConfig::new("Acme", format!("{}/v1", server.uri()))
            .auth(AuthSpec::new(AuthKind::Bearer, "INTENT_BRIDGE_TEST_ACME_API_KEY"))
            .endpoint("GET_balance", endpoint.clone());
        let api = ResolvedApi {
            key: "acme".into(),
            config,
            endpoint_key: "GET_balance".into(),
            selected_endpoint: endpoint,
        };
        std::env::set_var("INTENT_BRIDGE_TEST_ACME_API_KEY", "sk_env_acme");

        let result = executor(ExecutorConfig::default(), Credentials::from_env(["GITHUB_TOKEN"]))
            .execute(&api, &Map::new())
            .await;

        assert_eq!(result.provenance, Provenance::Live);
        assert_eq!(result.data.unwrap()["available"], 5);
    }

    #[tokio::test]
    async fn test_missing_required_param_falls_back() {
        let result = executor(ExecutorConfig::default(), with_key())
            .execute(&weather_api("http://127.0.0.1:9"), &Map::new())
            .await;

        assert!(result.is_mock());
        assert_eq!(result.data.unwrap()["name"], "New York");
    }

    #[tokio::test]
    async fn test_strict_mode_reports_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = ExecutorConfig {
            mock_fallback: false,
            ..ExecutorConfig::default()
        };
        let result = executor(config, with_key())
            .execute(&weather_api(&server.uri()), &params(json!({"location": "Paris"})))
            .await;

        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.error.unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_force_mock_never_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = ExecutorConfig {
            force_mock: true,
            ..ExecutorConfig::default()
        };
        let result = executor(config, with_key())
            .execute(&weather_api(&server.uri()), &params(json!({"location": "Rome"})))
            .await;

        assert!(result.is_mock());
        assert_eq!(result.fallback_reason.as_deref(), Some("mock mode enabled"));
        let serialized = serde_json::to_value(&result).unwrap();
        assert_eq!(serialized["provenance"], "mock");
        assert!(serialized.get("error").is_none());
    }
}

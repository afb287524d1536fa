//! Service and endpoint descriptions
//!
//! These are the shapes accepted by dynamic registration and catalogue
//! files, so field names follow the camelCase JSON form (`baseUrl`,
//! `paramMapping`, `defaultParams`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a service expects its credential to be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// `Authorization: Bearer <credential>`
    Bearer,
    /// `Authorization: token <credential>`
    Token,
    /// `Authorization: Basic base64(user:pass)`
    Basic,
    /// Query parameter named by `param`, else `X-API-Key` header
    #[serde(alias = "api_key")]
    ApiKey,
    /// Sent as a bearer token
    #[serde(alias = "oauth")]
    Oauth2,
}

/// Auth declaration for a service or a single endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSpec {
    #[serde(rename = "type")]
    pub kind: AuthKind,

    /// When false a missing credential still allows a live call
    #[serde(default = "default_required")]
    pub required: bool,

    /// Name of the credential to look up, e.g. `GITHUB_TOKEN`
    pub credential: String,

    /// Query parameter name for `apikey` auth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

fn default_required() -> bool {
    true
}

impl AuthSpec {
    pub fn new(kind: AuthKind, credential: impl Into<String>) -> Self {
        Self {
            kind,
            required: true,
            credential: credential.into(),
            param: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn in_query(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }
}

/// A single operation of a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSpec {
    /// HTTP method, upper case
    pub method: String,

    /// Path template appended to the service base URL; may contain `{name}`
    pub path: String,

    /// Surface parameter name to wire name
    #[serde(default)]
    pub param_mapping: IndexMap<String, String>,

    /// Wire names that must be present after mapping and defaults
    #[serde(default)]
    pub required: Vec<String>,

    #[serde(default)]
    pub default_params: Map<String, Value>,

    #[serde(default)]
    pub headers: IndexMap<String, String>,

    /// Overrides the service-level auth declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthSpec>,

    /// Sample payload served in mock mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_response: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EndpointSpec {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into().to_uppercase(),
            path: path.into(),
            param_mapping: IndexMap::new(),
            required: Vec::new(),
            default_params: Map::new(),
            headers: IndexMap::new(),
            auth: None,
            mock_response: None,
            description: None,
        }
    }

    /// Map the surface name `from` to the wire name `to`
    pub fn map(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.param_mapping.insert(from.into(), to.into());
        self
    }

    pub fn require(mut self, wire_name: impl Into<String>) -> Self {
        self.required.push(wire_name.into());
        self
    }

    pub fn default_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_params.insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn auth(mut self, auth: AuthSpec) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn mock(mut self, payload: Value) -> Self {
        self.mock_response = Some(payload);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A registered service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Display name, e.g. `OpenWeatherMap`
    pub name: String,

    pub base_url: String,

    /// Endpoint key (`"{ACTION}_{RESOURCE}"`) to endpoint
    #[serde(default)]
    pub endpoints: IndexMap<String, EndpointSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthSpec>,
}

impl ServiceConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            endpoints: IndexMap::new(),
            auth: None,
        }
    }

    pub fn endpoint(mut self, key: impl Into<String>, spec: EndpointSpec) -> Self {
        self.endpoints.insert(key.into(), spec);
        self
    }

    pub fn auth(mut self, auth: AuthSpec) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// Result of a successful registry lookup
///
/// Carries a copy of the service so later registry changes don't affect an
/// execution already in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedApi {
    /// Registry key, e.g. `weather`
    pub key: String,
    pub config: ServiceConfig,
    pub endpoint_key: String,
    pub selected_endpoint: EndpointSpec,
}

impl ResolvedApi {
    /// Display name of the service
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Endpoint auth if declared, else the service's
    pub fn effective_auth(&self) -> Option<&AuthSpec> {
        self.selected_endpoint
            .auth
            .as_ref()
            .or(self.config.auth.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_config_from_registration_json() {
        let raw = json!({
            "name": "Stripe",
            "baseUrl": "https://api.stripe.com/v1",
            "endpoints": {
                "CREATE_charge": {
                    "method": "POST",
                    "path": "/charges",
                    "paramMapping": {"price": "amount"},
                    "required": ["amount", "currency"],
                    "defaultParams": {"currency": "usd"},
                    "headers": {"Authorization": "Bearer sk_test_1"}
                }
            },
            "auth": {"type": "bearer", "credential": "STRIPE_KEY"}
        });

        let config: ServiceConfig = serde_json::from_value(raw).unwrap();
        let endpoint = &config.endpoints["CREATE_charge"];

        assert_eq!(config.base_url, "https://api.stripe.com/v1");
        assert_eq!(endpoint.param_mapping["price"], "amount");
        assert_eq!(endpoint.default_params["currency"], "usd");
        assert!(endpoint.mock_response.is_none());
        let auth = config.auth.unwrap();
        assert_eq!(auth.kind, AuthKind::Bearer);
        assert!(auth.required);
    }

    #[test]
    fn test_auth_kind_names() {
        let spec: AuthSpec =
            serde_json::from_value(json!({"type": "apikey", "credential": "K", "param": "appid"}))
                .unwrap();
        assert_eq!(spec.kind, AuthKind::ApiKey);
        assert_eq!(spec.param.as_deref(), Some("appid"));

        let oauth: AuthSpec =
            serde_json::from_value(json!({"type": "oauth2", "credential": "T", "required": false}))
                .unwrap();
        assert_eq!(oauth.kind, AuthKind::Oauth2);
        assert!(!oauth.required);
    }

    #[test]
    fn test_endpoint_auth_overrides_service() {
        let endpoint = EndpointSpec::new("get", "/users/{username}")
            .auth(AuthSpec::new(AuthKind::Token, "GITHUB_TOKEN").optional());
        let config = ServiceConfig::new("GitHub", "https://api.github.com")
            .auth(AuthSpec::new(AuthKind::Bearer, "OTHER"))
            .endpoint("GET_user", endpoint.clone());

        let resolved = ResolvedApi {
            key: "github".into(),
            config,
            endpoint_key: "GET_user".into(),
            selected_endpoint: endpoint,
        };

        assert_eq!(resolved.selected_endpoint.method, "GET");
        assert_eq!(resolved.effective_auth().unwrap().kind, AuthKind::Token);
        assert_eq!(resolved.name(), "GitHub");
    }
}

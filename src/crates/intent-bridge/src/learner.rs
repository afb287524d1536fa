//! API learner
//!
//! Handles "integrate Stripe with key sk_test_..." style requests by
//! registering a service description into the shared registry. The
//! [`ApiLearner`] trait is the seam; [`CatalogLearner`] knows a handful of
//! popular APIs and falls back to a generic payments-style layout for
//! anything else. It never fetches documentation.

use crate::registry::{ApiRegistry, AuthKind, AuthSpec, EndpointSpec, ServiceConfig};
use crate::{BridgeError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::info;
use utils::AuthHelper;

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:integrate|add)\s+(?:(?:a|an|the|new)\s+)*(\w+)").expect("valid regex")
});
static KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)key[:=\s]+(\S+)").expect("valid regex"));
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid regex"));
static HOST_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|api\.)?([^/.]+)").expect("valid regex")
});
static ORIGIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://[^/]+)").expect("valid regex"));

/// What the caller asked to integrate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrationRequest {
    pub name: Option<String>,
    pub api_key: Option<String>,
    pub url: Option<String>,
}

impl IntegrationRequest {
    /// Pull the API name, key and URL out of free text
    ///
    /// ```rust
    /// use intent_bridge::IntegrationRequest;
    ///
    /// let request = IntegrationRequest::from_intent("integrate Stripe API with key sk_test_42");
    /// assert_eq!(request.name.as_deref(), Some("Stripe"));
    /// assert_eq!(request.api_key.as_deref(), Some("sk_test_42"));
    /// ```
    pub fn from_intent(text: &str) -> Self {
        let name = first_capture(&NAME_RE, text)
            .filter(|n| !n.eq_ignore_ascii_case("http") && !n.eq_ignore_ascii_case("https"));
        let api_key = first_capture(&KEY_RE, text);
        let url = URL_RE.find(text).map(|m| m.as_str().to_string());

        Self { name, api_key, url }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none()
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// A service registered by a learner
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedApi {
    /// Display name
    pub name: String,
    /// Registry key
    pub key: String,
    pub base_url: String,
    /// Endpoint keys
    pub endpoints: Vec<String>,
}

#[async_trait]
pub trait ApiLearner: Send + Sync {
    /// Register the requested API and describe what was registered
    async fn learn(&self, request: &IntegrationRequest) -> Result<LearnedApi>;
}

/// Learner backed by a fixed table of known APIs
pub struct CatalogLearner {
    registry: ApiRegistry,
}

#[derive(Clone, Copy)]
enum Layout {
    Stripe,
    Twilio,
    SendGrid,
    OpenAi,
    Payments,
}

struct KnownApi {
    needle: &'static str,
    name: &'static str,
    base_url: &'static str,
    /// `None` sends the key as a raw `Authorization` value
    auth: Option<AuthKind>,
    layout: Layout,
}

const KNOWN_APIS: &[KnownApi] = &[
    KnownApi {
        needle: "stripe",
        name: "Stripe",
        base_url: "https://api.stripe.com/v1",
        auth: Some(AuthKind::Bearer),
        layout: Layout::Stripe,
    },
    KnownApi {
        needle: "twilio",
        name: "Twilio",
        base_url: "https://api.twilio.com/2010-04-01",
        auth: Some(AuthKind::Basic),
        layout: Layout::Twilio,
    },
    KnownApi {
        needle: "sendgrid",
        name: "SendGrid",
        base_url: "https://api.sendgrid.com/v3",
        auth: Some(AuthKind::Bearer),
        layout: Layout::SendGrid,
    },
    KnownApi {
        needle: "openai",
        name: "OpenAI",
        base_url: "https://api.openai.com/v1",
        auth: Some(AuthKind::Bearer),
        layout: Layout::OpenAi,
    },
    KnownApi {
        needle: "easypaisa",
        name: "EasyPaisa",
        base_url: "https://api.easypaisa.com.pk",
        auth: None,
        layout: Layout::Payments,
    },
    KnownApi {
        needle: "jazzcash",
        name: "JazzCash",
        base_url: "https://api.jazzcash.com.pk",
        auth: None,
        layout: Layout::Payments,
    },
];

impl CatalogLearner {
    /// Learner registering into `registry`
    pub fn new(registry: ApiRegistry) -> Self {
        Self { registry }
    }

    fn identify(request: &IntegrationRequest) -> Result<(String, String, Option<AuthKind>, Layout)> {
        let search = request
            .name
            .as_deref()
            .or(request.url.as_deref())
            .unwrap_or_default()
            .to_lowercase();

        if let Some(known) = KNOWN_APIS.iter().find(|k| search.contains(k.needle)) {
            return Ok((
                known.name.to_string(),
                known.base_url.to_string(),
                known.auth,
                known.layout,
            ));
        }

        match (&request.url, &request.name) {
            (Some(url), _) => Ok((
                name_from_url(url),
                base_url_from(url),
                Some(AuthKind::Bearer),
                Layout::Payments,
            )),
            (None, Some(name)) => Ok((
                capitalize(name),
                format!("https://api.{}.com/v1", name.to_lowercase()),
                Some(AuthKind::Bearer),
                Layout::Payments,
            )),
            (None, None) => Err(BridgeError::Config(
                "integration request names neither an API nor a URL".into(),
            )),
        }
    }
}

#[async_trait]
impl ApiLearner for CatalogLearner {
    async fn learn(&self, request: &IntegrationRequest) -> Result<LearnedApi> {
        let (name, base_url, auth, layout) = Self::identify(request)?;
        let key = name.to_lowercase();

        let mut config = ServiceConfig::new(name.clone(), base_url.clone());
        for (endpoint_key, endpoint) in endpoints_for(layout) {
            let endpoint = match &request.api_key {
                Some(api_key) => with_auth_header(endpoint, auth, api_key),
                None => endpoint,
            };
            config = config.endpoint(endpoint_key, endpoint);
        }
        if request.api_key.is_none() {
            let credential = format!("{}_API_KEY", name.to_uppercase());
            config = config.auth(AuthSpec::new(auth.unwrap_or(AuthKind::Bearer), credential));
        }

        let endpoints: Vec<String> = config.endpoints.keys().cloned().collect();
        self.registry.register(key.clone(), config);
        info!("Learned {} API with {} endpoints", name, endpoints.len());

        Ok(LearnedApi {
            name,
            key,
            base_url,
            endpoints,
        })
    }
}

fn with_auth_header(endpoint: EndpointSpec, auth: Option<AuthKind>, api_key: &str) -> EndpointSpec {
    match auth {
        Some(AuthKind::Bearer) | Some(AuthKind::Oauth2) => {
            endpoint.header("Authorization", AuthHelper::bearer_token(api_key))
        }
        Some(AuthKind::Token) => endpoint.header("Authorization", AuthHelper::token(api_key)),
        Some(AuthKind::Basic) => {
            let value = match api_key.split_once(':') {
                Some((user, pass)) => AuthHelper::basic_auth(user, pass),
                None => format!("Basic {}", api_key),
            };
            endpoint.header("Authorization", value)
        }
        Some(AuthKind::ApiKey) => endpoint.header("X-API-Key", AuthHelper::api_key(api_key)),
        None => endpoint.header("Authorization", api_key),
    }
}

fn endpoints_for(layout: Layout) -> Vec<(&'static str, EndpointSpec)> {
    match layout {
        Layout::Stripe => vec![
            (
                "CREATE_charge",
                EndpointSpec::new("POST", "/charges")
                    .map("price", "amount")
                    .require("amount")
                    .default_param("currency", "usd")
                    .describe("Create a charge"),
            ),
            (
                "CREATE_customer",
                EndpointSpec::new("POST", "/customers").describe("Create a customer"),
            ),
            (
                "GET_customer",
                EndpointSpec::new("GET", "/customers/{id}")
                    .map("customer", "id")
                    .describe("Retrieve a customer"),
            ),
            (
                "CREATE_payment_intent",
                EndpointSpec::new("POST", "/payment_intents")
                    .require("amount")
                    .default_param("currency", "usd")
                    .describe("Create a payment intent"),
            ),
            (
                "CREATE_refund",
                EndpointSpec::new("POST", "/refunds").describe("Create a refund"),
            ),
        ],
        Layout::Twilio => vec![
            (
                "SEND_sms",
                EndpointSpec::new("POST", "/Accounts/{account_sid}/Messages.json")
                    .map("text", "Body")
                    .map("message", "Body")
                    .map("to", "To")
                    .map("from", "From")
                    .require("Body")
                    .require("To")
                    .describe("Send an SMS"),
            ),
            (
                "GET_messages",
                EndpointSpec::new("GET", "/Accounts/{account_sid}/Messages.json")
                    .describe("List sent messages"),
            ),
        ],
        Layout::SendGrid => vec![(
            "SEND_email",
            EndpointSpec::new("POST", "/mail/send").describe("Send an email"),
        )],
        Layout::OpenAi => vec![
            (
                "CREATE_completion",
                EndpointSpec::new("POST", "/chat/completions")
                    .default_param("model", "gpt-4o-mini")
                    .describe("Create a chat completion"),
            ),
            (
                "GET_models",
                EndpointSpec::new("GET", "/models").describe("List models"),
            ),
        ],
        Layout::Payments => vec![
            (
                "CREATE_payment",
                EndpointSpec::new("POST", "/payments")
                    .require("amount")
                    .describe("Create a new payment"),
            ),
            (
                "GET_payment",
                EndpointSpec::new("GET", "/payments/{id}").describe("Retrieve a payment"),
            ),
            (
                "CREATE_refund",
                EndpointSpec::new("POST", "/refunds")
                    .require("payment_id")
                    .describe("Create a refund"),
            ),
            (
                "GET_customers",
                EndpointSpec::new("GET", "/customers").describe("List all customers"),
            ),
        ],
    }
}

fn name_from_url(url: &str) -> String {
    first_capture(&HOST_NAME_RE, url)
        .map(|n| capitalize(&n))
        .unwrap_or_else(|| "Unknown".to_string())
}

fn base_url_from(url: &str) -> String {
    first_capture(&ORIGIN_RE, url).unwrap_or_else(|| url.to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Request extraction
    // ========================================================================

    #[test]
    fn test_from_intent() {
        let request = IntegrationRequest::from_intent("integrate stripe api with key: sk_test_1");
        assert_eq!(request.name.as_deref(), Some("stripe"));
        assert_eq!(request.api_key.as_deref(), Some("sk_test_1"));
        assert!(request.url.is_none());

        let request = IntegrationRequest::from_intent("add the Acme API https://docs.acme.io/v2");
        assert_eq!(request.name.as_deref(), Some("Acme"));
        assert_eq!(request.url.as_deref(), Some("https://docs.acme.io/v2"));
    }

    #[test]
    fn test_from_intent_url_only() {
        let request = IntegrationRequest::from_intent("integrate https://www.paynow.dev/docs");
        assert!(request.name.is_none());
        assert_eq!(request.url.as_deref(), Some("https://www.paynow.dev/docs"));
        assert!(!request.is_empty());

        assert!(IntegrationRequest::from_intent("integrate").is_empty());
    }

    #[test]
    fn test_url_helpers() {
        assert_eq!(name_from_url("https://www.paynow.dev/docs"), "Paynow");
        assert_eq!(name_from_url("https://api.acme.io"), "Acme");
        assert_eq!(base_url_from("https://www.paynow.dev/docs"), "https://www.paynow.dev");
    }

    // ========================================================================
    // Learning
    // ========================================================================

    #[tokio::test]
    async fn test_known_api_with_key() {
        let registry = ApiRegistry::new();
        let learner = CatalogLearner::new(registry.clone());

        let learned = learner
            .learn(&IntegrationRequest::from_intent("integrate Stripe with key sk_test_9"))
            .await
            .unwrap();

        assert_eq!(learned.name, "Stripe");
        assert_eq!(learned.key, "stripe");
        assert!(learned.endpoints.contains(&"CREATE_charge".to_string()));

        let resolved = registry.find_api("stripe", "CREATE", "charge").unwrap();
        assert_eq!(
            resolved.selected_endpoint.headers["Authorization"],
            "Bearer sk_test_9"
        );
        assert!(resolved.effective_auth().is_none());
    }

    #[tokio::test]
    async fn test_known_api_without_key_declares_credential() {
        let registry = ApiRegistry::new();
        let learner = CatalogLearner::new(registry.clone());

        learner
            .learn(&IntegrationRequest {
                name: Some("twilio".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let resolved = registry.find_api("twilio", "SEND", "sms").unwrap();
        let auth = resolved.effective_auth().unwrap();
        assert_eq!(auth.kind, AuthKind::Basic);
        assert_eq!(auth.credential, "TWILIO_API_KEY");
    }

    #[tokio::test]
    async fn test_unknown_url_gets_payments_layout() {
        let registry = ApiRegistry::new();
        let learner = CatalogLearner::new(registry.clone());

        let learned = learner
            .learn(&IntegrationRequest::from_intent(
                "integrate https://www.paynow.dev/docs key pk_1",
            ))
            .await
            .unwrap();

        assert_eq!(learned.key, "paynow");
        assert_eq!(learned.base_url, "https://www.paynow.dev");
        assert_eq!(
            learned.endpoints,
            vec!["CREATE_payment", "GET_payment", "CREATE_refund", "GET_customers"]
        );
        assert!(registry.get("paynow").is_some());
    }

    #[tokio::test]
    async fn test_custom_auth_sends_raw_key() {
        let registry = ApiRegistry::new();
        let learner = CatalogLearner::new(registry.clone());

        learner
            .learn(&IntegrationRequest {
                name: Some("JazzCash".into()),
                api_key: Some("merchant-1".into()),
                url: None,
            })
            .await
            .unwrap();

        let resolved = registry.find_api("jazzcash", "CREATE", "payment").unwrap();
        assert_eq!(resolved.selected_endpoint.headers["Authorization"], "merchant-1");
    }

    #[tokio::test]
    async fn test_empty_request_is_rejected() {
        let learner = CatalogLearner::new(ApiRegistry::new());
        assert!(learner.learn(&IntegrationRequest::default()).await.is_err());
    }
}

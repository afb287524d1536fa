//! HTTP client utilities and helpers.
//!
//! This module provides:
//! - Client configuration builders
//! - A request description (`HttpRequest`) that can be built and inspected
//!   without touching the network
//! - Authentication header helpers
//!
//! Requests are sent once; callers decide what a failure means.
//!
//! # Example
//!
//! ```rust,ignore
//! use utils::client::{ClientConfig, HttpClient, HttpRequest};
//!
//! let client = HttpClient::new(ClientConfig::new())?;
//! let response = client
//!     .send(&HttpRequest::get("https://api.github.com/users/octocat"))
//!     .await?;
//! assert!(response.is_success());
//! ```

use crate::error::{Result, UtilsError};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Configuration for HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout duration.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Create a new client configuration with defaults.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: None,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully-described outbound request.
///
/// Headers and query pairs keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// JSON body, sent only when present
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header value, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter value
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and decoded body of a completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Decoded JSON body. An empty body is `Null`, a non-JSON body is kept
    /// as a string.
    pub body: Value,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client built from a [`ClientConfig`].
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|e| UtilsError::ClientError(e.to_string()))?;

        Ok(Self { client })
    }

    /// Send a request and decode the response body.
    ///
    /// Non-success statuses are returned as responses, not errors; only
    /// transport failures surface as `Err`.
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut req = self.client.request(request.method.clone(), &request.url);

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = decode_body(&text);

        debug!(status, url = %request.url, "HTTP request completed");
        Ok(HttpResponse { status, body })
    }
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Helper for building authenticated requests.
pub struct AuthHelper;

impl AuthHelper {
    /// Create a bearer token authorization header value.
    pub fn bearer_token(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Create a `token` authorization header value, as GitHub expects.
    pub fn token(token: &str) -> String {
        format!("token {}", token)
    }

    /// Create a basic auth authorization header value.
    pub fn basic_auth(username: &str, password: &str) -> String {
        use base64::Engine;
        let credentials = format!("{}:{}", username, password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {}", encoded)
    }

    /// Create an API key header value.
    pub fn api_key(key: &str) -> String {
        key.to_string()
    }
}

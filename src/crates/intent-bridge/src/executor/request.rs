//! Request construction
//!
//! Pure translation of a resolved endpoint plus caller parameters into an
//! [`HttpRequest`]. Nothing here touches the network.

use crate::registry::{AuthKind, AuthSpec, ResolvedApi};
use crate::{BridgeError, Result};
use reqwest::Method;
use serde_json::{Map, Value};
use std::collections::HashSet;
use utils::{AuthHelper, HttpRequest};

/// A request ready to send, with the wire parameters it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub request: HttpRequest,
    /// Parameters after name mapping and defaults, minus consumed path
    /// placeholders
    pub params: Map<String, Value>,
}

/// Build the outbound request for `api`
///
/// 1. Surface names are renamed through `paramMapping`; unmapped names pass
///    through.
/// 2. `defaultParams` fill in names the caller did not supply.
/// 3. `{name}` placeholders in the path are substituted and removed from the
///    parameters.
/// 4. `required` names are checked.
/// 5. Parameters go to the query string for `GET`/`HEAD`, else to a JSON
///    body.
///
/// `credential` is attached according to the endpoint's effective auth.
pub fn build_request(
    api: &ResolvedApi,
    params: &Map<String, Value>,
    credential: Option<&str>,
) -> Result<PreparedRequest> {
    let endpoint = &api.selected_endpoint;

    let mut wire = Map::new();
    for (name, value) in params {
        let wire_name = endpoint
            .param_mapping
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.clone());
        wire.insert(wire_name, value.clone());
    }
    for (name, value) in &endpoint.default_params {
        wire.entry(name.clone()).or_insert_with(|| value.clone());
    }

    let (path, consumed) = substitute_path(&endpoint.path, &mut wire)?;

    if let Some(missing) = endpoint
        .required
        .iter()
        .find(|name| !wire.contains_key(*name) && !consumed.contains(*name))
    {
        return Err(BridgeError::ExecutionFailure(format!(
            "missing required parameter '{}' for {}",
            missing, api.endpoint_key
        )));
    }

    let method = Method::from_bytes(endpoint.method.as_bytes()).map_err(|_| {
        BridgeError::ExecutionFailure(format!("invalid HTTP method '{}'", endpoint.method))
    })?;
    let url = format!("{}{}", api.config.base_url.trim_end_matches('/'), path);

    let mut request = HttpRequest::new(method.clone(), url);
    for (name, value) in &endpoint.headers {
        request = request.with_header(name.clone(), value.clone());
    }

    if method == Method::GET || method == Method::HEAD {
        for (name, value) in &wire {
            request = request.with_query(name.clone(), param_string(value));
        }
    } else if !wire.is_empty() {
        request = request.with_json(Value::Object(wire.clone()));
    }

    if let (Some(auth), Some(credential)) = (api.effective_auth(), credential) {
        request = apply_auth(request, auth, credential);
    }

    Ok(PreparedRequest {
        request,
        params: wire,
    })
}

/// Render a parameter value for a URL
pub(crate) fn param_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn substitute_path(
    template: &str,
    wire: &mut Map<String, Value>,
) -> Result<(String, HashSet<String>)> {
    let mut path = String::with_capacity(template.len());
    let mut consumed = HashSet::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        path.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('}').ok_or_else(|| {
            BridgeError::ExecutionFailure(format!("unterminated placeholder in '{}'", template))
        })?;
        let name = &after[..end];
        let value = wire.remove(name).ok_or_else(|| {
            BridgeError::ExecutionFailure(format!("unresolved path parameter '{}'", name))
        })?;
        path.push_str(&param_string(&value));
        consumed.insert(name.to_string());
        rest = &after[end + 1..];
    }
    path.push_str(rest);

    Ok((path, consumed))
}

fn apply_auth(request: HttpRequest, auth: &AuthSpec, credential: &str) -> HttpRequest {
    match auth.kind {
        AuthKind::Bearer | AuthKind::Oauth2 => {
            request.with_header("Authorization", AuthHelper::bearer_token(credential))
        }
        AuthKind::Token => request.with_header("Authorization", AuthHelper::token(credential)),
        AuthKind::Basic => {
            let value = match credential.split_once(':') {
                Some((user, pass)) => AuthHelper::basic_auth(user, pass),
                None => format!("Basic {}", credential),
            };
            request.with_header("Authorization", value)
        }
        AuthKind::ApiKey => match &auth.param {
            Some(param) => request.with_query(param.clone(), credential),
            None => request.with_header("X-API-Key", AuthHelper::api_key(credential)),
        },
    }
}

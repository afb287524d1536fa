//! Deterministic stand-in payloads
//!
//! Endpoint samples may contain `{name}` or `{name|default}` placeholders in
//! string values. A string that is exactly one placeholder takes the
//! parameter's JSON value; embedded placeholders are replaced textually.
//! Unknown names without a default are left as written.

use super::request::param_string;
use crate::registry::ResolvedApi;
use serde_json::{json, Map, Value};

/// Payload served instead of a live call
///
/// Uses the endpoint's sample when it declares one, else a generic
/// acknowledgement echoing the caller's parameters.
pub(crate) fn mock_payload(api: &ResolvedApi, params: &Map<String, Value>) -> Value {
    let endpoint = &api.selected_endpoint;

    let mut lookup = params.clone();
    for (name, value) in &endpoint.default_params {
        lookup.entry(name.clone()).or_insert_with(|| value.clone());
    }

    match &endpoint.mock_response {
        Some(sample) => render(sample, &lookup),
        None => json!({
            "success": true,
            "message": format!("Mock {} response", api.name()),
            "parameters": params,
        }),
    }
}

fn render(template: &Value, params: &Map<String, Value>) -> Value {
    match template {
        Value::String(s) => render_str(s, params),
        Value::Array(items) => Value::Array(items.iter().map(|v| render(v, params)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render(v, params)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn render_str(template: &str, params: &Map<String, Value>) -> Value {
    if let Some(inner) = template
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|inner| is_placeholder(inner))
    {
        let (name, default) = split_placeholder(inner);
        return match (params.get(name), default) {
            (Some(value), _) => value.clone(),
            (None, Some(default)) => Value::String(default.to_string()),
            (None, None) => Value::String(template.to_string()),
        };
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) if is_placeholder(&after[..end]) => {
                let (name, default) = split_placeholder(&after[..end]);
                match (params.get(name), default) {
                    (Some(value), _) => out.push_str(&param_string(value)),
                    (None, Some(default)) => out.push_str(default),
                    (None, None) => out.push_str(&rest[start..start + end + 2]),
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Value::String(out)
}

fn is_placeholder(inner: &str) -> bool {
    let (name, default) = split_placeholder(inner);
    !name.is_empty()
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && default.map_or(true, |d| !d.contains('{'))
}

fn split_placeholder(inner: &str) -> (&str, Option<&str>) {
    match inner.split_once('|') {
        Some((name, default)) => (name, Some(default)),
        None => (inner, None),
    }
}

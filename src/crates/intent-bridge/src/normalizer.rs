//! Response normalizer
//!
//! Maps each service's payload onto a common envelope: `type`, `platform`,
//! `summary`, service-specific fields, `timestamp` and `service`. Converters
//! are looked up by lowercased service key or display name. A converter
//! rejects payloads missing its defining field and the generic converter
//! takes over.

use crate::{BridgeError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Uniform response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub platform: String,
    pub summary: String,
    /// Service-specific fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    /// RFC 3339
    pub timestamp: String,
    pub service: String,
}

struct Converted {
    kind: &'static str,
    platform: &'static str,
    summary: String,
    fields: Map<String, Value>,
}

type Converter = fn(&Value) -> Result<Converted>;

pub struct ResponseNormalizer {
    converters: HashMap<&'static str, Converter>,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseNormalizer {
    pub fn new() -> Self {
        let table: [(&'static str, Converter); 15] = [
            ("weather", weather),
            ("openweathermap", weather),
            ("news", news),
            ("newsapi", news),
            ("currency", currency),
            ("exchangerate", currency),
            ("joke", joke),
            ("jokeapi", joke),
            ("github", github),
            ("stripe", stripe),
            ("twilio", twilio),
            ("sendgrid", sendgrid),
            ("razorpay", razorpay),
            ("easypaisa", easypaisa),
            ("jazzcash", jazzcash),
        ];
        Self {
            converters: table.into_iter().collect(),
        }
    }

    /// Whether `service` has a dedicated converter
    pub fn supports(&self, service: &str) -> bool {
        self.converters.contains_key(service.to_lowercase().as_str())
    }

    /// Normalize `data` returned by `service`
    ///
    /// Never fails: a null payload yields an `empty` envelope and a converter
    /// error yields the generic envelope.
    pub fn normalize(&self, service: &str, data: &Value) -> NormalizedEnvelope {
        if data.is_null() {
            let mut fields = Map::new();
            fields.insert("message".into(), json!("No data returned"));
            return envelope(
                service,
                Converted {
                    kind: "empty",
                    platform: "External API",
                    summary: "No data returned".into(),
                    fields,
                },
            );
        }

        let converted = match self.converters.get(service.to_lowercase().as_str()) {
            Some(convert) => convert(data).unwrap_or_else(|e| {
                warn!("{}, using generic summary for {}", e, service);
                generic(data)
            }),
            None => {
                debug!("No converter for '{}', using generic summary", service);
                generic(data)
            }
        };

        envelope(service, converted)
    }
}

fn envelope(service: &str, converted: Converted) -> NormalizedEnvelope {
    NormalizedEnvelope {
        kind: converted.kind.to_string(),
        platform: converted.platform.to_string(),
        summary: converted.summary,
        fields: converted.fields,
        timestamp: Utc::now().to_rfc3339(),
        service: service.to_string(),
    }
}

fn reject(what: &str) -> BridgeError {
    BridgeError::NormalizationFailure(what.to_string())
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

/// Text form of a scalar, `None` for null or missing
fn text_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn opt(value: &Value, pointer: &str) -> Value {
    value.pointer(pointer).cloned().unwrap_or(Value::Null)
}

/// Integral floats print without a fractional part
fn plain_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn cents(value: &Value, pointer: &str) -> Option<f64> {
    value
        .pointer(pointer)
        .and_then(Value::as_f64)
        .filter(|n| *n != 0.0)
        .map(|n| n / 100.0)
}

fn fields(pairs: Vec<(&str, Value)>) -> Map<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

// ============================================================================
// Converters
// ============================================================================

fn weather(data: &Value) -> Result<Converted> {
    let main = data
        .get("main")
        .filter(|m| m.is_object())
        .ok_or_else(|| reject("weather payload has no 'main' section"))?;

    let temp = main.get("temp").and_then(Value::as_f64).unwrap_or(0.0).round() as i64;
    let location = str_at(data, "/name").unwrap_or("Unknown");
    let description = str_at(data, "/weather/0/description").unwrap_or("Unknown");
    let humidity = text_at(main, "/humidity").unwrap_or_else(|| "0".into());
    let wind = text_at(data, "/wind/speed").unwrap_or_else(|| "0".into());

    Ok(Converted {
        kind: "weather",
        platform: "OpenWeatherMap",
        summary: format!("{}°C and {} in {}", temp, description, location),
        fields: fields(vec![
            ("location", json!(location)),
            ("temperature", json!(format!("{}°C", temp))),
            ("description", json!(description)),
            ("humidity", json!(format!("{}%", humidity))),
            ("wind", json!(format!("{} m/s", wind))),
        ]),
    })
}

fn news(data: &Value) -> Result<Converted> {
    let articles = data
        .get("articles")
        .and_then(Value::as_array)
        .ok_or_else(|| reject("news payload has no 'articles' list"))?;

    let total = data
        .get("totalResults")
        .and_then(Value::as_u64)
        .unwrap_or(articles.len() as u64);
    let top: Vec<Value> = articles
        .iter()
        .take(5)
        .map(|article| {
            json!({
                "title": opt(article, "/title"),
                "description": opt(article, "/description"),
                "source": opt(article, "/source/name"),
                "url": opt(article, "/url"),
                "publishedAt": opt(article, "/publishedAt"),
            })
        })
        .collect();

    Ok(Converted {
        kind: "news",
        platform: "NewsAPI",
        summary: format!("Found {} news articles", articles.len()),
        fields: fields(vec![("totalResults", json!(total)), ("articles", Value::Array(top))]),
    })
}

fn currency(data: &Value) -> Result<Converted> {
    let rates = data
        .get("rates")
        .and_then(Value::as_object)
        .ok_or_else(|| reject("currency payload has no 'rates' table"))?;

    let base = str_at(data, "/base").unwrap_or("USD");
    let top_rates = rates
        .iter()
        .take(5)
        .map(|(code, rate)| format!("{}: {}", code, rate))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(Converted {
        kind: "currency",
        platform: "ExchangeRate",
        summary: format!("Exchange rates for {}", base),
        fields: fields(vec![
            ("base", json!(base)),
            ("rates", Value::Object(rates.clone())),
            ("topRates", json!(top_rates)),
        ]),
    })
}

fn joke(data: &Value) -> Result<Converted> {
    let content = match (str_at(data, "/joke"), str_at(data, "/setup")) {
        (Some(joke), _) => joke.to_string(),
        (None, Some(setup)) => format!("{} - {}", setup, str_at(data, "/delivery").unwrap_or("")),
        (None, None) => return Err(reject("joke payload has neither 'joke' nor 'setup'")),
    };

    Ok(Converted {
        kind: "entertainment",
        platform: "JokeAPI",
        summary: content.clone(),
        fields: fields(vec![
            ("content", json!(content)),
            ("category", json!(str_at(data, "/category").unwrap_or("general"))),
        ]),
    })
}

fn github(data: &Value) -> Result<Converted> {
    match data {
        Value::Array(repos) => {
            let top: Vec<Value> = repos
                .iter()
                .take(5)
                .map(|repo| {
                    json!({
                        "name": opt(repo, "/name"),
                        "description": opt(repo, "/description"),
                        "stars": opt(repo, "/stargazers_count"),
                        "url": opt(repo, "/html_url"),
                    })
                })
                .collect();

            Ok(Converted {
                kind: "repositories",
                platform: "GitHub",
                summary: format!("Found {} repositories", repos.len()),
                fields: fields(vec![("count", json!(repos.len())), ("repos", Value::Array(top))]),
            })
        }
        Value::Object(_) => {
            let name = str_at(data, "/name")
                .or_else(|| str_at(data, "/login"))
                .ok_or_else(|| reject("github payload has neither 'name' nor 'login'"))?;
            let description = data
                .get("description")
                .filter(|v| !v.is_null())
                .or_else(|| data.get("bio"))
                .cloned()
                .unwrap_or(Value::Null);

            Ok(Converted {
                kind: "github_resource",
                platform: "GitHub",
                summary: format!(
                    "GitHub {}: {}",
                    str_at(data, "/type").unwrap_or("resource"),
                    name
                ),
                fields: fields(vec![
                    ("name", json!(name)),
                    ("description", description),
                    ("url", opt(data, "/html_url")),
                    ("public_repos", opt(data, "/public_repos")),
                    ("followers", opt(data, "/followers")),
                ]),
            })
        }
        _ => Err(reject("github payload is neither a list nor an object")),
    }
}

fn stripe(data: &Value) -> Result<Converted> {
    let id = text_at(data, "/id").ok_or_else(|| reject("stripe payload has no 'id'"))?;
    let amount = cents(data, "/amount")
        .map(|n| format!("${:.2}", n))
        .unwrap_or_else(|| "N/A".into());
    let status = text_at(data, "/status").unwrap_or_else(|| "unknown".into());

    Ok(Converted {
        kind: "payment",
        platform: "Stripe",
        summary: format!("Payment {} - {}", id, status),
        fields: fields(vec![
            ("id", json!(id)),
            ("amount", json!(amount)),
            (
                "currency",
                str_at(data, "/currency").map_or(Value::Null, |c| json!(c.to_uppercase())),
            ),
            ("status", json!(status)),
            ("description", opt(data, "/description")),
        ]),
    })
}

fn twilio(data: &Value) -> Result<Converted> {
    let sid = text_at(data, "/sid").ok_or_else(|| reject("twilio payload has no 'sid'"))?;
    let to = text_at(data, "/to").unwrap_or_default();
    let status = text_at(data, "/status").unwrap_or_else(|| "unknown".into());

    Ok(Converted {
        kind: "communication",
        platform: "Twilio",
        summary: format!("SMS to {}: {}", to, status),
        fields: fields(vec![
            ("sid", json!(sid)),
            ("to", json!(to)),
            ("from", opt(data, "/from")),
            ("body", opt(data, "/body")),
            ("status", json!(status)),
        ]),
    })
}

fn sendgrid(data: &Value) -> Result<Converted> {
    let to = text_at(data, "/to").ok_or_else(|| reject("sendgrid payload has no 'to'"))?;

    Ok(Converted {
        kind: "email",
        platform: "SendGrid",
        summary: format!("Email sent to {}", to),
        fields: fields(vec![
            ("messageId", opt(data, "/message_id")),
            ("to", json!(to)),
            ("from", opt(data, "/from")),
            ("subject", opt(data, "/subject")),
            ("status", json!("sent")),
        ]),
    })
}

fn razorpay(data: &Value) -> Result<Converted> {
    let id = text_at(data, "/id").ok_or_else(|| reject("razorpay payload has no 'id'"))?;
    let amount = cents(data, "/amount")
        .map(|n| format!("₹{:.2}", n))
        .unwrap_or_else(|| "N/A".into());

    Ok(Converted {
        kind: "payment",
        platform: "Razorpay",
        summary: format!("Razorpay payment {}", id),
        fields: fields(vec![
            ("id", json!(id)),
            ("amount", json!(amount)),
            ("currency", opt(data, "/currency")),
            ("status", opt(data, "/status")),
        ]),
    })
}

fn easypaisa(data: &Value) -> Result<Converted> {
    let transaction_id = text_at(data, "/transactionId")
        .or_else(|| text_at(data, "/orderId"))
        .ok_or_else(|| reject("easypaisa payload has no transaction or order id"))?;
    let amount = text_at(data, "/amount")
        .map(|a| format!("PKR {}", a))
        .unwrap_or_else(|| "N/A".into());
    let msisdn = text_at(data, "/msisdn").unwrap_or_default();

    Ok(Converted {
        kind: "payment",
        platform: "EasyPaisa",
        summary: format!("EasyPaisa payment to {}", msisdn),
        fields: fields(vec![
            ("transactionId", json!(transaction_id)),
            ("amount", json!(amount)),
            ("msisdn", json!(msisdn)),
            (
                "status",
                json!(text_at(data, "/status").unwrap_or_else(|| "initiated".into())),
            ),
        ]),
    })
}

fn jazzcash(data: &Value) -> Result<Converted> {
    let reference = text_at(data, "/pp_TxnRefNo")
        .or_else(|| text_at(data, "/transactionId"))
        .ok_or_else(|| reject("jazzcash payload has no transaction reference"))?;
    let amount = cents(data, "/pp_Amount")
        .map(|n| format!("PKR {}", plain_number(n)))
        .unwrap_or_else(|| "N/A".into());

    Ok(Converted {
        kind: "payment",
        platform: "JazzCash",
        summary: format!("JazzCash transaction {}", reference),
        fields: fields(vec![
            ("referenceNo", json!(reference)),
            ("amount", json!(amount)),
            ("responseCode", opt(data, "/pp_ResponseCode")),
            ("message", opt(data, "/pp_ResponseMessage")),
        ]),
    })
}

fn generic(data: &Value) -> Converted {
    let success = data.get("success").and_then(Value::as_bool).unwrap_or(true);
    Converted {
        kind: "api_response",
        platform: "External API",
        summary: extract_summary(data),
        fields: fields(vec![("success", json!(success)), ("data", data.clone())]),
    }
}

/// Best-effort one-line description of an arbitrary payload
fn extract_summary(data: &Value) -> String {
    if let Value::String(s) = data {
        return s.chars().take(100).collect();
    }

    match data.get("message") {
        Some(Value::String(s)) if !s.is_empty() => return s.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => {}
        Some(other) => return other.to_string(),
    }
    if let Some(status) = text_at(data, "/status") {
        return format!("Status: {}", status);
    }
    if let Some(result) = data.get("result").filter(|v| !v.is_null()) {
        let text: String = result.to_string().chars().take(100).collect();
        return format!("Result: {}", text);
    }
    "API call completed".to_string()
}

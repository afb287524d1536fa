//! Logging utilities
//!
//! Helpers for keeping `tracing` output readable and free of credentials.

use std::time::Duration;

/// Format duration in human-readable form
///
/// # Example
///
/// ```rust
/// use tooling::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
/// assert_eq!(format_duration(Duration::from_micros(500)), "500μs");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{}ms", micros / 1000)
    } else if micros < 60_000_000 {
        format!("{:.2}s", micros as f64 / 1_000_000.0)
    } else {
        let seconds = micros / 1_000_000;
        format!("{}m{}s", seconds / 60, seconds % 60)
    }
}

/// Sanitize string for logging
///
/// Replaces credentials (API keys, tokens, passwords, `Authorization`
/// header values and `appid`/`apikey` query parameters) with `[REDACTED]`.
///
/// # Example
///
/// ```rust
/// use tooling::logging::sanitize_for_logging;
///
/// let sanitized = sanitize_for_logging("Authorization: Bearer sk-abc123");
/// assert!(sanitized.contains("[REDACTED]"));
/// assert!(!sanitized.contains("sk-abc123"));
/// ```
pub fn sanitize_for_logging(input: &str) -> String {
    let mut result = input.to_string();

    let patterns = [
        (
            r"(?i)(authorization)\s*:\s*(bearer|token|basic)\s+\S+",
            "$1: $2 [REDACTED]",
        ),
        (r"(?i)\b(api[\s_-]?key|apikey|appid)\s*[:=]\s*[^\s&]+", "$1=[REDACTED]"),
        (r"(?i)\b(password|passwd|pwd)\s*[:=]\s*\S+", "$1: [REDACTED]"),
        (r"(?i)\b(token)\s*[:=]\s*\S+", "$1: [REDACTED]"),
        (r"(?i)\b(secret)\s*[:=]\s*\S+", "$1: [REDACTED]"),
    ];

    for (pattern, replacement) in &patterns {
        if let Ok(re) = regex::Regex::new(pattern) {
            result = re.replace_all(&result, *replacement).to_string();
        }
    }

    result
}

/// Render a header list for logs with every value sanitized
///
/// `Authorization` and any header whose name mentions a key, token or
/// secret is fully masked.
pub fn redact_headers<'a, I>(headers: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    headers
        .into_iter()
        .map(|(name, value)| {
            let lower = name.to_lowercase();
            let sensitive = lower == "authorization"
                || lower.contains("key")
                || lower.contains("token")
                || lower.contains("secret");
            if sensitive {
                format!("{}: [REDACTED]", name)
            } else {
                format!("{}: {}", name, sanitize_for_logging(value))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

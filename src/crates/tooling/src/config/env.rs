//! Environment variable loading utilities

use crate::{Result, ToolingError};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Load an environment variable as a string
///
/// Empty values are treated as unset, which is what a blank line in a `.env`
/// file usually means.
///
/// # Returns
///
/// * `Ok(Some(value))` if variable exists and is non-empty
/// * `Ok(None)` if variable doesn't exist or is empty
/// * `Err` if variable exists but has invalid UTF-8
pub fn get_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ToolingError::General(format!(
            "Environment variable {} contains invalid UTF-8",
            key
        ))),
    }
}

/// Load and parse an environment variable
///
/// # Example
///
/// ```rust,ignore
/// let timeout: Option<u64> = get_env_parse("INTENT_BRIDGE_TIMEOUT_SECS")?;
/// ```
pub fn get_env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_env(key)? {
        Some(val) => {
            let parsed = val.trim().parse::<T>().map_err(|e| {
                ToolingError::General(format!(
                    "Failed to parse environment variable {}: {}",
                    key, e
                ))
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Load a boolean environment variable
///
/// Recognizes "true", "1", "yes", "on" and "false", "0", "no", "off"
/// (case-insensitive).
pub fn get_env_bool(key: &str) -> Result<Option<bool>> {
    match get_env(key)? {
        Some(val) => {
            let result = match val.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                _ => {
                    return Err(ToolingError::General(format!(
                        "Invalid boolean value for {}: {}",
                        key, val
                    )))
                }
            };
            Ok(Some(result))
        }
        None => Ok(None),
    }
}

/// Load a comma-separated list
///
/// Items are trimmed and empty items dropped, so `"a, b,,c"` yields
/// `["a", "b", "c"]`.
pub fn get_env_list(key: &str) -> Result<Option<Vec<String>>> {
    Ok(get_env(key)?.map(|val| {
        val.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }))
}

/// Read every variable in `keys` that is currently set
///
/// Missing and non-UTF-8 variables are skipped; the values are returned
/// untouched.
pub fn read_present<I, S>(keys: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .filter_map(|key| {
            let key = key.as_ref();
            get_env(key).ok().flatten().map(|val| (key.to_string(), val))
        })
        .collect()
}

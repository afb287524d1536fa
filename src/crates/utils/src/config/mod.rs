//! Configuration file loading.
//!
//! Files are deserialized straight into the caller's type. The format is
//! picked from the extension by [`load_config_file`].
//!
//! ```rust,ignore
//! use utils::config::load_config_file;
//!
//! let settings: BridgeConfig = load_config_file("intent-bridge.toml")?;
//! ```

use crate::error::{Result, UtilsError};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load configuration from a YAML file.
pub fn load_yaml_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_yaml::from_str(&content).map_err(|e| {
        UtilsError::ConfigError(format!(
            "Failed to parse YAML config from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load configuration from a JSON file.
pub fn load_json_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_json::from_str(&content).map_err(|e| {
        UtilsError::ConfigError(format!(
            "Failed to parse JSON config from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load configuration from a TOML file.
pub fn load_toml_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    toml::from_str(&content).map_err(|e| {
        UtilsError::ConfigError(format!(
            "Failed to parse TOML config from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load configuration from a file (auto-detect format from extension).
pub fn load_config_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| {
            UtilsError::ConfigError(format!("Unable to determine file extension for {:?}", path))
        })?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => load_yaml_config(path),
        "json" => load_json_config(path),
        "toml" => load_toml_config(path),
        _ => Err(UtilsError::ConfigError(format!(
            "Unsupported config file extension: {}",
            extension
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        retries: u32,
    }

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_by_extension() {
        let expected = Sample {
            name: "weather".to_string(),
            retries: 2,
        };

        let json = write_temp(".json", r#"{"name": "weather", "retries": 2}"#);
        let yaml = write_temp(".yml", "name: weather\nretries: 2\n");
        let toml = write_temp(".toml", "name = \"weather\"\nretries = 2\n");

        assert_eq!(load_config_file::<Sample>(json.path()).unwrap(), expected);
        assert_eq!(load_config_file::<Sample>(yaml.path()).unwrap(), expected);
        assert_eq!(load_config_file::<Sample>(toml.path()).unwrap(), expected);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".ini", "name=weather");
        let err = load_config_file::<Sample>(file.path()).unwrap_err();
        assert!(matches!(err, UtilsError::ConfigError(_)));
    }

    #[test]
    fn test_malformed_content() {
        let file = write_temp(".json", "{ not json");
        let err = load_json_config::<Sample>(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_toml_config::<Sample>("/nonexistent/intent-bridge.toml").unwrap_err();
        assert!(matches!(err, UtilsError::IoError(_)));
    }
}

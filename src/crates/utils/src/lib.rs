//! HTTP client and configuration helpers for intent-bridge.
//!
//! # Modules
//!
//! ## Client (`client`)
//!
//! A thin wrapper over `reqwest` that sends fully-described requests and
//! hands back the status and decoded JSON body:
//!
//! ```rust,ignore
//! use utils::client::{ClientConfig, HttpClient, HttpRequest};
//! use std::time::Duration;
//!
//! let client = HttpClient::new(ClientConfig::new().with_timeout(Duration::from_secs(30)))?;
//!
//! let request = HttpRequest::get("https://api.openweathermap.org/data/2.5/weather")
//!     .with_query("q", "Paris");
//! let response = client.send(&request).await?;
//! ```
//!
//! ## Config (`config`)
//!
//! Typed loading of JSON, YAML and TOML files:
//!
//! ```rust,ignore
//! use utils::config::load_config_file;
//!
//! let catalog: Vec<ServiceConfig> = load_config_file("services.yaml")?;
//! ```
//!
//! # Features
//!
//! - `client` - Client utilities (enabled by default)
//! - `config` - Configuration utilities (enabled by default)

pub mod error;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "config")]
pub mod config;

// Re-export commonly used types
pub use error::{Result, UtilsError};

#[cfg(feature = "client")]
pub use client::{AuthHelper, ClientConfig, HttpClient, HttpRequest, HttpResponse};

#[cfg(feature = "config")]
pub use config::{load_config_file, load_json_config, load_toml_config, load_yaml_config};

//! API registry
//!
//! Thread-safe catalogue of services keyed by short names (`weather`,
//! `github`). The handle is cheap to clone and every clone sees the same
//! services, so a service registered by the API learner is immediately
//! visible to the bridge.

mod catalog;
mod types;

pub use catalog::builtin_services;
pub use types::{AuthKind, AuthSpec, EndpointSpec, ResolvedApi, ServiceConfig};

use crate::Result;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared registry handle
#[derive(Debug, Clone, Default)]
pub struct ApiRegistry {
    services: Arc<RwLock<IndexMap<String, ServiceConfig>>>,
}

impl ApiRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in free services
    pub fn with_builtin_catalog() -> Self {
        let registry = Self::new();
        for (key, config) in builtin_services() {
            registry.register(key, config);
        }
        info!("Registered {} built-in APIs", registry.len());
        registry
    }

    /// Register or overwrite a service
    ///
    /// Overwriting keeps the key's original position in [`list`](Self::list).
    pub fn register(&self, key: impl Into<String>, config: ServiceConfig) {
        let key = key.into();
        debug!(
            "Registering API '{}' ({}, {} endpoints)",
            key,
            config.name,
            config.endpoints.len()
        );
        self.services.write().insert(key, config);
    }

    /// Service keys in registration order
    pub fn list(&self) -> Vec<String> {
        self.services.read().keys().cloned().collect()
    }

    /// `(key, display name)` pairs in registration order
    pub fn entries(&self) -> Vec<(String, String)> {
        self.services
            .read()
            .iter()
            .map(|(key, config)| (key.clone(), config.name.clone()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<ServiceConfig> {
        self.services.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }

    /// Resolve an intent triple to a service endpoint
    ///
    /// The endpoint key is `"{action}_{resource}"`. Both the service key and
    /// the endpoint key must match exactly; anything else is `None`.
    pub fn find_api(&self, service: &str, action: &str, resource: &str) -> Option<ResolvedApi> {
        let endpoint_key = format!("{}_{}", action, resource);
        let services = self.services.read();
        let config = services.get(service)?;
        let selected_endpoint = config.endpoints.get(&endpoint_key)?.clone();

        Some(ResolvedApi {
            key: service.to_string(),
            config: config.clone(),
            endpoint_key,
            selected_endpoint,
        })
    }

    /// Register every service of a JSON or YAML catalogue file
    ///
    /// The file is a mapping of service key to service description. Returns
    /// the number of services registered.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let catalog: IndexMap<String, ServiceConfig> = utils::load_config_file(path.as_ref())?;
        let count = catalog.len();
        for (key, config) in catalog {
            self.register(key, config);
        }
        info!("Loaded {} APIs from {}", count, path.as_ref().display());
        Ok(count)
    }
}

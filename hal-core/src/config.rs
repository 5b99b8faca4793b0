//! Configuration for HAL clients
//!
//! An endpoint manifest is a JSON file describing the client settings and
//! the endpoint table:
//!
//! ```json
//! {
//!   "client": { "base_url": "https://api.example.com" },
//!   "endpoints": [
//!     { "id": "users", "kind": "index", "url": "/users" },
//!     { "id": "users_page", "kind": "index", "url": "/users",
//!       "query": { "page": "{page}" } },
//!     { "id": "user", "kind": "resource", "url": "/users/{id}", "target": "user" }
//!   ]
//! }
//! ```
//!
//! Target names are resolved through a [`TargetCatalog`] the caller builds
//! from concrete types. Entries without a target realize [`Document`].

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::endpoint::{EndpointKind, QueryTemplate};
use crate::error::{HalError, Result};
use crate::resource::{Document, Resource, Target};

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL; relative paths are joined onto it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Headers sent with every request
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,
}

fn default_timeout() -> u64 { 30000 }

fn default_user_agent() -> String {
    format!("hal-client/{}", env!("CARGO_PKG_VERSION"))
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Accept".to_string(), "application/hal+json".to_string())])
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout(),
            user_agent: default_user_agent(),
            headers: default_headers(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// One endpoint in a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub id: String,

    pub kind: EndpointKind,

    /// URL template
    pub url: String,

    /// Target name in the [`TargetCatalog`]; absent means [`Document`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Declared query parameters, in declaration order
    #[serde(default, skip_serializing_if = "QueryTemplate::is_empty")]
    pub query: QueryTemplate,
}

/// Endpoint manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Shorthand for `client.base_url`; the client's own setting wins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl RegistryConfig {
    /// Parse a manifest from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json).map_err(|e| HalError::Config {
            reason: format!("invalid endpoint manifest: {e}"),
        })?;
        if config.client.base_url.is_none() {
            config.client.base_url = config.base_url.clone();
        }
        Ok(config)
    }

    /// Load a manifest from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| HalError::Config {
            reason: format!("failed to read '{}': {e}", path.display()),
        })?;
        Self::from_json(&content)
    }
}

/// Maps manifest target names to model types
#[derive(Debug, Clone, Default)]
pub struct TargetCatalog {
    targets: HashMap<String, Target>,
}

impl TargetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make model `T` available under `name`
    pub fn with<T: Resource>(mut self, name: impl Into<String>) -> Self {
        self.targets.insert(name.into(), Target::of::<T>());
        self
    }

    pub fn get(&self, name: &str) -> Option<Target> {
        self.targets.get(name).copied()
    }

    /// Resolve a manifest target name; `None` means [`Document`]
    pub fn resolve(&self, name: Option<&str>) -> Result<Target> {
        match name {
            None => Ok(Target::of::<Document>()),
            Some(name) => self.get(name).ok_or_else(|| HalError::Config {
                reason: format!("unknown target '{name}'"),
            }),
        }
    }
}

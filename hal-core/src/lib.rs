//! # HAL Core - endpoint registry for HAL hypermedia clients
//!
//! HAL Core lets a client:
//!
//! - **Register** URL templates (`/users/{id}`), optionally with query
//!   templates, against the model each endpoint returns
//! - **Fetch** an endpoint by id, building the URL from parameters
//! - **Resolve** an href found in a response back to its endpoint, picking the
//!   most specific template when several match, and realize it as that model
//! - **Walk** paginated collections through their `next` links
//!
//! HTTP is delegated to a pluggable [`HttpClient`]; the `hal-http` crate
//! provides a blocking implementation.
//!
//! ## Example
//!
//! ```rust
//! use hal_core::{EndpointRegistry, EndpointKind, MockClient, Params, Target};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     name: String,
//!     #[serde(default)]
//!     href: Option<String>,
//! }
//!
//! let client = MockClient::new()
//!     .with_response("/users/42", json!({ "name": "Ada" }));
//!
//! let mut registry = EndpointRegistry::new().with_client(client);
//! registry.register("user", EndpointKind::Resource, "/users/{id}", Target::of::<User>()).unwrap();
//!
//! let user: User = registry.fetch("user", &Params::new().with("id", 42)).unwrap();
//! assert_eq!(user.name, "Ada");
//!
//! let user: User = registry.resolve_href("/users/42").unwrap();
//! assert_eq!(user.href.as_deref(), Some("/users/42"));
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod resource;

// Re-export main types
pub use client::{HttpClient, HttpResponse, MockClient};
pub use config::{ClientConfig, EndpointConfig, RegistryConfig, TargetCatalog};
pub use endpoint::{
    EndpointEntry, EndpointKind, EndpointRegistry, Pages, Params, PathPattern, QueryTemplate,
    QueryValue, Realized,
};
pub use error::{ErrorCategory, HalError, Result, TransportError};
pub use resource::{Document, Link, LinkSet, Resource, Target};

//! Endpoint Registry - maps URL templates to models
//!
//! Callers register endpoints at startup. At runtime an endpoint is either
//! fetched by id (template + params → URL) or recovered from an href found in
//! a previous response (href → most specific matching endpoint).
//!
//! ## Architecture
//!
//! ```text
//!   fetch(id, params)                  resolve_href(href)
//!         │                                   │
//!         ▼                                   ▼
//!    ┌────────────────────────────────────────────────┐
//!    │               Endpoint Registry                │
//!    │                                                │
//!    │  by id ──► URL builder (interpolate + query)   │
//!    │  by href ─► path pattern + query template      │
//!    │             filter, longest template wins      │
//!    └────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//!                HTTP client (GET) ──► target model
//! ```

mod entry;
mod pattern;
mod query;
mod registry;
mod url;

pub use entry::{EndpointEntry, EndpointKind};
pub use pattern::{matches as path_matches, matches_with_base, split_href, PathPattern};
pub use query::{matches as query_matches, parse_query, QueryTemplate, QueryValue};
pub use registry::{EndpointRegistry, Pages, Realized};
pub use url::{build, build_query, interpolate, Params};

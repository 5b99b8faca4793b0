//! Endpoint Registry implementation

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde_json::Value;
use tracing::{debug, trace, warn};

use super::entry::{EndpointEntry, EndpointKind};
use super::pattern::split_href;
use super::query::QueryTemplate;
use super::url::Params;
use crate::client::{strip_base, HttpClient};
use crate::config::{RegistryConfig, TargetCatalog};
use crate::error::{HalError, Result};
use crate::resource::{from_body, with_href, Document, Resource, Target};

/// A document fetched through an href, with the endpoint it matched
#[derive(Debug, Clone, PartialEq)]
pub struct Realized {
    /// Id of the matched endpoint
    pub endpoint: String,
    /// The href as it was requested
    pub href: String,
    pub document: Document,
}

/// The Endpoint Registry - owns the endpoint table and the bound client
#[derive(Default)]
pub struct EndpointRegistry {
    /// Entries in registration order
    entries: Vec<EndpointEntry>,

    /// Index by id
    by_id: HashMap<String, usize>,

    /// HTTP collaborator, bound at construction or later
    client: Option<Box<dyn HttpClient>>,
}

impl fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRegistry")
            .field("entries", &self.entries)
            .field("client", &self.client.as_ref().map(|c| c.name()))
            .finish()
    }
}

impl EndpointRegistry {
    /// Create an empty registry with no client bound
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a manifest, registering entries in order
    pub fn from_config(config: &RegistryConfig, targets: &TargetCatalog) -> Result<Self> {
        let mut registry = Self::new();
        for endpoint in &config.endpoints {
            let target = targets.resolve(endpoint.target.as_deref())?;
            registry.register_with_query(
                endpoint.id.clone(),
                endpoint.kind.clone(),
                endpoint.url.clone(),
                target,
                endpoint.query.clone(),
            )?;
        }
        Ok(registry)
    }

    /// Builder-style client binding
    pub fn with_client(mut self, client: impl HttpClient + 'static) -> Self {
        self.bind_client(client);
        self
    }

    /// Bind (or replace) the HTTP client
    pub fn bind_client(&mut self, client: impl HttpClient + 'static) {
        debug!(client = client.name(), "binding HTTP client");
        self.client = Some(Box::new(client));
    }

    pub fn client(&self) -> Option<&dyn HttpClient> {
        self.client.as_deref()
    }

    /// Base URL of the bound client
    pub fn base_url(&self) -> Option<&str> {
        self.client.as_ref().and_then(|c| c.base_url())
    }

    /// Register an endpoint without query constraints
    pub fn register(
        &mut self,
        id: impl Into<String>,
        kind: impl Into<EndpointKind>,
        url_template: impl Into<String>,
        target: Target,
    ) -> Result<&EndpointEntry> {
        self.register_with_query(id, kind, url_template, target, QueryTemplate::new())
    }

    /// Register an endpoint.
    ///
    /// Fails on a repeated id, or on a (template, kind, query template)
    /// combination that is already registered under another id. The same
    /// template may be registered again with a different query template.
    pub fn register_with_query(
        &mut self,
        id: impl Into<String>,
        kind: impl Into<EndpointKind>,
        url_template: impl Into<String>,
        target: Target,
        query: QueryTemplate,
    ) -> Result<&EndpointEntry> {
        let id = id.into();
        let kind = kind.into();
        let url_template = url_template.into();

        if self.by_id.contains_key(&id) {
            return Err(HalError::DuplicateId { id });
        }

        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| e.same_endpoint(&url_template, &kind, &query))
        {
            return Err(HalError::DuplicateEndpoint {
                url: url_template,
                kind: kind.to_string(),
                existing: existing.id().to_string(),
            });
        }

        let entry = EndpointEntry::new(id.clone(), kind, url_template, target, query)?;
        debug!(
            id = %entry.id(),
            kind = %entry.kind(),
            url = %entry.url_template(),
            target = entry.target().type_name(),
            "registered endpoint"
        );

        let idx = self.entries.len();
        self.by_id.insert(id, idx);
        self.entries.push(entry);
        Ok(&self.entries[idx])
    }

    /// Get an entry by id
    pub fn get(&self, id: &str) -> Option<&EndpointEntry> {
        self.by_id.get(id).map(|idx| &self.entries[*idx])
    }

    /// All entries in registration order
    pub fn entries(&self) -> &[EndpointEntry] {
        &self.entries
    }

    /// Number of registered endpoints
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concrete request path for endpoint `id`
    pub fn url_for(&self, id: &str, params: &Params) -> Result<String> {
        let entry = self.entry(id)?;
        let url = entry.url(params);
        debug!(id, %url, "built endpoint url");
        Ok(url)
    }

    /// Build the URL for endpoint `id`, GET it, and read the body as `T`.
    ///
    /// `T` must be the endpoint's target, or [`Document`].
    pub fn fetch<T: Resource>(&self, id: &str, params: &Params) -> Result<T> {
        let entry = self.entry(id)?;
        let client = self.bound_client()?;
        check_target::<T>(entry)?;

        let url = entry.url(params);
        debug!(id, %url, client = client.name(), "fetching endpoint");
        let response = client.get(&url)?;
        from_body(response.body)
    }

    /// Fetch an href and read it as `T`, the target of the endpoint it matches.
    ///
    /// The href is added to the body as `href` before deserializing.
    pub fn resolve_href<T: Resource>(&self, href: &str) -> Result<T> {
        let (entry, body) = self.resolve_entry(href)?;
        check_target::<T>(entry)?;
        from_body(with_href(body, href))
    }

    /// Fetch an href as a generic document
    pub fn resolve_document(&self, href: &str) -> Result<Realized> {
        let (entry, body) = self.resolve_entry(href)?;
        let document: Document = from_body(with_href(body, href))?;
        Ok(Realized {
            endpoint: entry.id().to_string(),
            href: href.to_string(),
            document,
        })
    }

    /// Walk a paginated collection by following `next` links from `href`
    pub fn pages(&self, href: impl Into<String>) -> Pages<'_> {
        Pages {
            registry: self,
            next: Some(href.into()),
            seen: HashSet::new(),
        }
    }

    /// The most specific entry matching `href`.
    ///
    /// Candidates must match on path and on declared query parameters. Among
    /// candidates the longest template wins; on a tie the earliest registered
    /// entry is kept.
    pub fn find_match(&self, href: &str) -> Option<&EndpointEntry> {
        let base = self.base_url();
        let stripped = strip_base(base, href);
        let (path, query) = split_href(&stripped);

        let mut candidates = 0usize;
        let best = self
            .entries
            .iter()
            .filter(|entry| entry.matches(path, query, base))
            .inspect(|entry| {
                candidates += 1;
                trace!(href, candidate = %entry.id(), "endpoint candidate");
            })
            .fold(None, |best: Option<&EndpointEntry>, entry| match best {
                Some(current) if current.specificity() >= entry.specificity() => Some(current),
                _ => Some(entry),
            });

        debug!(
            href,
            candidates,
            matched = best.map(EndpointEntry::id),
            "endpoint lookup"
        );
        best
    }

    fn entry(&self, id: &str) -> Result<&EndpointEntry> {
        self.get(id).ok_or_else(|| HalError::UnknownEndpoint { id: id.to_string() })
    }

    fn bound_client(&self) -> Result<&dyn HttpClient> {
        self.client().ok_or(HalError::ClientNotConfigured)
    }

    fn resolve_entry(&self, href: &str) -> Result<(&EndpointEntry, Value)> {
        let client = self.bound_client()?;

        debug!(href, client = client.name(), "resolving href");
        let response = client.get(href)?;

        match self.find_match(href) {
            Some(entry) => Ok((entry, response.body)),
            None => {
                warn!(href, "no endpoint matches href");
                Err(HalError::LinkResolution { href: href.to_string() })
            }
        }
    }
}

fn check_target<T: Resource>(entry: &EndpointEntry) -> Result<()> {
    let target = entry.target();
    if target.accepts::<T>() {
        Ok(())
    } else {
        Err(HalError::TargetMismatch {
            id: entry.id().to_string(),
            expected: target.type_name(),
            requested: std::any::type_name::<T>(),
        })
    }
}

/// Iterator over the pages of a collection.
///
/// Stops after a page without a `next` link, after the first error, or when
/// a `next` href repeats one already visited.
pub struct Pages<'a> {
    registry: &'a EndpointRegistry,
    next: Option<String>,
    seen: HashSet<String>,
}

impl Iterator for Pages<'_> {
    type Item = Result<Realized>;

    fn next(&mut self) -> Option<Self::Item> {
        let href = self.next.take()?;
        if !self.seen.insert(href.clone()) {
            warn!(%href, "pagination cycle detected");
            return None;
        }

        match self.registry.resolve_document(&href) {
            Ok(page) => {
                self.next = page.document.link("next").map(|link| link.href.clone());
                Some(Ok(page))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

impl std::iter::FusedIterator for Pages<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockClient;
    use serde_json::json;

    fn users_registry() -> EndpointRegistry {
        let mut registry = EndpointRegistry::new();
        registry
            .register("users", EndpointKind::Index, "/users", Target::document())
            .unwrap();
        registry
            .register("admin", EndpointKind::Resource, "/users/admin", Target::document())
            .unwrap();
        registry
            .register("user", EndpointKind::Resource, "/users/{id}", Target::document())
            .unwrap();
        registry
    }

    #[test]
    fn test_register_and_get() {
        let registry = users_registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get("user").unwrap().url_template(), "/users/{id}");
        assert!(registry.get("missing").is_none());

        let ids: Vec<_> = registry.entries().iter().map(EndpointEntry::id).collect();
        assert_eq!(ids, vec!["users", "admin", "user"]);
    }

    #[test]
    fn test_duplicate_id() {
        let mut registry = users_registry();
        let err = registry
            .register("users", EndpointKind::Index, "/people", Target::document())
            .unwrap_err();
        assert!(matches!(err, HalError::DuplicateId { ref id } if id == "users"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_endpoint() {
        let mut registry = users_registry();
        let err = registry
            .register("people", EndpointKind::Index, "/users", Target::document())
            .unwrap_err();
        match err {
            HalError::DuplicateEndpoint { existing, .. } => assert_eq!(existing, "users"),
            other => panic!("unexpected error: {other:?}"),
        }

        // Same url with another kind or query template is a distinct endpoint
        registry
            .register("users_resource", EndpointKind::Resource, "/users", Target::document())
            .unwrap();
        registry
            .register_with_query(
                "users_paged",
                EndpointKind::Index,
                "/users",
                Target::document(),
                QueryTemplate::new().with("page", "{page}"),
            )
            .unwrap();
    }

    #[test]
    fn test_find_match_prefers_longest_template() {
        let registry = users_registry();
        assert_eq!(registry.find_match("/users").unwrap().id(), "users");
        assert_eq!(registry.find_match("/users/admin").unwrap().id(), "admin");
        assert_eq!(registry.find_match("/users/42").unwrap().id(), "user");
        assert!(registry.find_match("/users/42/posts").is_none());
        assert!(registry.find_match("/accounts").is_none());
    }

    #[test]
    fn test_find_match_tie_keeps_first_registered() {
        let mut registry = EndpointRegistry::new();
        registry
            .register("by_id", EndpointKind::Resource, "/items/{id}", Target::document())
            .unwrap();
        registry
            .register("by_sk", EndpointKind::Resource, "/items/{sk}", Target::document())
            .unwrap();
        assert_eq!(registry.find_match("/items/1").unwrap().id(), "by_id");
    }

    #[test]
    fn test_find_match_with_query_templates() {
        let mut registry = EndpointRegistry::new();
        registry
            .register_with_query(
                "active_users",
                EndpointKind::Index,
                "/users",
                Target::document(),
                QueryTemplate::new().with("status", "active").with("page", "{page}"),
            )
            .unwrap();

        assert_eq!(
            registry.find_match("/users?status=active&page=2").unwrap().id(),
            "active_users"
        );
        assert!(registry.find_match("/users?status=inactive").is_none());
        assert!(registry.find_match("/users").is_none());
    }

    #[test]
    fn test_find_match_strips_client_base_url() {
        let registry = users_registry().with_client(MockClient::new().with_base_url("https://api.test"));
        assert_eq!(registry.find_match("https://api.test/users/7").unwrap().id(), "user");
        assert_eq!(registry.find_match("/users/7").unwrap().id(), "user");
    }

    #[test]
    fn test_find_match_root_and_relative_hrefs() {
        let mut registry = users_registry().with_client(MockClient::new().with_base_url("https://api.test"));
        registry
            .register("root", EndpointKind::Index, "/", Target::document())
            .unwrap();

        for href in ["/?page=2", "https://api.test", "https://api.test?page=2", "https://api.test/"] {
            assert_eq!(registry.find_match(href).map(EndpointEntry::id), Some("root"), "{href}");
        }
        assert_eq!(registry.find_match("users/7").unwrap().id(), "user");
        assert_eq!(registry.find_match("users?page=2").unwrap().id(), "users");
    }

    #[test]
    fn test_url_for() {
        let registry = users_registry();
        assert_eq!(
            registry.url_for("user", &Params::new().with("id", 42)).unwrap(),
            "/users/42"
        );
        assert!(matches!(
            registry.url_for("nope", &Params::new()),
            Err(HalError::UnknownEndpoint { .. })
        ));
    }

    #[test]
    fn test_fetch_checks_id_before_client() {
        let registry = users_registry();
        assert!(matches!(
            registry.fetch::<Document>("nope", &Params::new()),
            Err(HalError::UnknownEndpoint { .. })
        ));
        assert!(matches!(
            registry.fetch::<Document>("user", &Params::new().with("id", 1)),
            Err(HalError::ClientNotConfigured)
        ));
    }

    #[test]
    fn test_resolve_requires_client() {
        let registry = users_registry();
        assert!(matches!(
            registry.resolve_document("/users/1"),
            Err(HalError::ClientNotConfigured)
        ));
    }

    #[test]
    fn test_pages_stop_on_cycle() {
        let client = MockClient::new()
            .with_response("/users", json!({ "_links": { "next": { "href": "/users/admin" } } }))
            .with_response("/users/admin", json!({ "_links": { "next": { "href": "/users" } } }));
        let registry = users_registry().with_client(client);

        let pages: Vec<_> = registry.pages("/users").collect::<Result<_>>().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].endpoint, "users");
        assert_eq!(pages[1].endpoint, "admin");
    }
}

//! Integration tests for the endpoint registry: building requests by id,
//! resolving hrefs back to models, and walking paginated collections.

use std::sync::Arc;

use hal_core::{
    Document, EndpointKind, EndpointRegistry, HalError, Link, MockClient, Params,
    QueryTemplate, RegistryConfig, Target, TargetCatalog, TransportError,
};
use serde::Deserialize;
use serde_json::json;

const BASE: &str = "https://api.example.com";

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    id: u64,
    name: String,
    #[serde(default)]
    href: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    #[serde(rename = "_links")]
    links: std::collections::BTreeMap<String, Link>,
}

fn api_client() -> MockClient {
    MockClient::new()
        .with_base_url(BASE)
        .with_response("/users/42", json!({
            "id": 42,
            "name": "Ada",
            "_links": { "self": { "href": "/users/42" } }
        }))
        .with_response("/users/42/posts/7", json!({
            "title": "Notes on the Analytical Engine",
            "_links": {
                "self": { "href": "/users/42/posts/7" },
                "author": { "href": "https://api.example.com/users/42" }
            }
        }))
        .with_response("/users?page=1", json!({
            "count": 2,
            "_links": {
                "self": { "href": "/users?page=1" },
                "next": { "href": "/users?page=2" }
            }
        }))
        .with_response("/users?page=2", json!({
            "count": 1,
            "_links": { "self": { "href": "/users?page=2" } }
        }))
}

fn registry_with(client: impl hal_core::HttpClient + 'static) -> EndpointRegistry {
    let mut registry = EndpointRegistry::new().with_client(client);
    registry
        .register("users", EndpointKind::Index, "/users", Target::document())
        .unwrap();
    registry
        .register_with_query(
            "users_page",
            EndpointKind::Index,
            "/users",
            Target::document(),
            QueryTemplate::new().with("page", "{page}"),
        )
        .unwrap();
    registry
        .register("user", EndpointKind::Resource, "/users/{id}", Target::of::<User>())
        .unwrap();
    registry
        .register(
            "post",
            EndpointKind::Resource,
            "/users/{user_id}/posts/{post_id}",
            Target::of::<Post>(),
        )
        .unwrap();
    registry
}

#[test]
fn test_fetch_builds_url_and_deserializes_target() {
    let client = Arc::new(api_client());
    let registry = registry_with(Arc::clone(&client));

    let user: User = registry
        .fetch("user", &Params::new().with("id", "42"))
        .unwrap();

    assert_eq!(user.id, 42);
    assert_eq!(user.name, "Ada");
    assert_eq!(client.requests(), vec!["/users/42"]);
}

#[test]
fn test_fetch_with_multiple_params() {
    let registry = registry_with(api_client());
    let post: Post = registry
        .fetch("post", &Params::new().with("user_id", 42).with("post_id", 7))
        .unwrap();
    assert_eq!(post.title, "Notes on the Analytical Engine");
}

#[test]
fn test_fetch_rejects_wrong_model() {
    let registry = registry_with(api_client());
    let err = registry
        .fetch::<Post>("user", &Params::new().with("id", 42))
        .unwrap_err();
    assert!(matches!(err, HalError::TargetMismatch { ref id, .. } if id == "user"));

    // The generic document view is always available
    let doc: Document = registry
        .fetch("user", &Params::new().with("id", 42))
        .unwrap();
    assert_eq!(doc.self_href(), Some("/users/42"));
}

#[test]
fn test_resolve_href_retains_href() {
    let registry = registry_with(api_client());

    let user: User = registry.resolve_href("/users/42").unwrap();
    assert_eq!(
        user,
        User {
            id: 42,
            name: "Ada".to_string(),
            href: Some("/users/42".to_string()),
        }
    );
}

#[test]
fn test_resolve_absolute_href() {
    let registry = registry_with(api_client());
    let user: User = registry
        .resolve_href("https://api.example.com/users/42")
        .unwrap();
    assert_eq!(user.href.as_deref(), Some("https://api.example.com/users/42"));
}

#[test]
fn test_resolve_unregistered_href() {
    let client = api_client().with_response("/widgets/1", json!({ "id": 1 }));
    let registry = registry_with(client);

    let err = registry.resolve_document("/widgets/1").unwrap_err();
    assert!(matches!(err, HalError::LinkResolution { ref href } if href == "/widgets/1"));
    assert!(err.to_string().contains("Unregistered URL pattern"));
}

#[test]
fn test_link_realize_follows_nested_links() {
    let registry = registry_with(api_client());

    let post: Post = registry
        .fetch("post", &Params::new().with("user_id", 42).with("post_id", 7))
        .unwrap();
    let author: User = post.links["author"].realize(&registry).unwrap();
    assert_eq!(author.name, "Ada");

    let realized = post.links["self"].realize_document(&registry).unwrap();
    assert_eq!(realized.endpoint, "post");
}

#[test]
fn test_templated_link_must_be_expanded_first() {
    let client = Arc::new(api_client());
    let registry = registry_with(Arc::clone(&client));
    let find = Link {
        templated: true,
        ..Link::new("/users/{id}")
    };

    let err = find.realize::<Document>(&registry).unwrap_err();
    assert!(matches!(err, HalError::TemplatedLink { ref href } if href == "/users/{id}"));
    assert_eq!(err.error_code(), "TEMPLATED_LINK");
    assert!(find.realize_document(&registry).is_err());
    assert!(client.requests().is_empty());

    let expanded = Link::new(find.expand(&Params::new().with("id", 42)));
    let user: User = expanded.realize(&registry).unwrap();
    assert_eq!(user.name, "Ada");
    assert_eq!(client.requests(), vec!["/users/42"]);
}

#[test]
fn test_resolve_relative_and_root_hrefs() {
    let client = api_client().with_response("/?page=2", json!({ "page": 2 }));
    let mut registry = registry_with(client);
    registry
        .register("root", EndpointKind::Index, "/", Target::document())
        .unwrap();

    let realized = registry.resolve_document("https://api.example.com?page=2").unwrap();
    assert_eq!(realized.endpoint, "root");
    assert_eq!(realized.document.attribute("page"), Some(&json!(2)));

    let user: User = registry.resolve_href("users/42").unwrap();
    assert_eq!(user.href.as_deref(), Some("users/42"));
}

#[test]
fn test_transport_errors_pass_through() {
    let client = api_client()
        .with_status("/users/500", 500, json!({ "error": "boom" }))
        .with_error("/users/9", TransportError::Timeout { url: format!("{BASE}/users/9") });
    let registry = registry_with(client);

    let err = registry
        .fetch::<User>("user", &Params::new().with("id", 500))
        .unwrap_err();
    assert!(matches!(
        err,
        HalError::Transport(TransportError::ServerError { status: 500, .. })
    ));
    assert!(err.is_recoverable());

    let err = registry.resolve_href::<User>("/users/9").unwrap_err();
    assert!(matches!(err, HalError::Transport(TransportError::Timeout { .. })));

    let err = registry.resolve_href::<User>("/users/404").unwrap_err();
    assert!(matches!(
        err,
        HalError::Transport(TransportError::ClientError { status: 404, .. })
    ));
    assert!(!err.is_recoverable());
}

#[test]
fn test_malformed_body_is_a_data_error() {
    let client = MockClient::new().with_response("/users/1", json!({ "name": 5 }));
    let registry = registry_with(client);

    let err = registry
        .fetch::<User>("user", &Params::new().with("id", 1))
        .unwrap_err();
    assert_eq!(err.error_code(), "DESERIALIZE_ERROR");
}

#[test]
fn test_pages_follow_next_links() {
    let registry = registry_with(api_client());

    let pages: Vec<_> = registry
        .pages("/users?page=1")
        .collect::<hal_core::Result<_>>()
        .unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].document.attribute("count"), Some(&json!(2)));
    assert_eq!(pages[1].href, "/users?page=2");
    // "users" and "users_page" tie on template length; registration order decides
    assert!(pages.iter().all(|p| p.endpoint == "users"));
}

#[test]
fn test_pages_stop_after_error() {
    let client = MockClient::new().with_response(
        "/users?page=1",
        json!({ "_links": { "next": { "href": "/users?page=2" } } }),
    );
    let registry = registry_with(client);

    let mut pages = registry.pages("/users?page=1");
    assert!(pages.next().unwrap().is_ok());
    assert!(pages.next().unwrap().is_err());
    assert!(pages.next().is_none());
}

#[test]
fn test_registry_from_manifest() {
    let config = RegistryConfig::from_json(
        r#"{
            "client": { "base_url": "https://api.example.com" },
            "endpoints": [
                { "id": "users", "kind": "index", "url": "/users" },
                { "id": "active", "kind": "index", "url": "/users",
                  "query": { "status": "active", "page": "{page}" } },
                { "id": "user", "kind": "resource", "url": "/users/{id}", "target": "user" }
            ]
        }"#,
    )
    .unwrap();
    let catalog = TargetCatalog::new().with::<User>("user");

    let registry = EndpointRegistry::from_config(&config, &catalog).unwrap();
    assert_eq!(registry.len(), 3);
    assert!(registry.get("user").unwrap().target().is::<User>());
    assert_eq!(
        registry.find_match("/users?status=active&page=2").unwrap().id(),
        "users"
    );
    assert_eq!(
        registry.url_for("active", &Params::new().with("page", 2)).unwrap(),
        "/users?status=active&page=2"
    );
}

#[test]
fn test_manifest_duplicates_fail_like_register() {
    let config = RegistryConfig::from_json(
        r#"{ "endpoints": [
            { "id": "a", "kind": "index", "url": "/users" },
            { "id": "b", "kind": "index", "url": "/users" }
        ] }"#,
    )
    .unwrap();

    let err = EndpointRegistry::from_config(&config, &TargetCatalog::new()).unwrap_err();
    assert!(matches!(err, HalError::DuplicateEndpoint { .. }));
}

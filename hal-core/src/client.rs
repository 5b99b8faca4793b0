//! HTTP collaborator interface
//!
//! The registry never performs I/O itself. It hands concrete paths to an
//! [`HttpClient`], which owns connection handling, timeouts and status
//! classification, and reports failures as [`TransportError`]s.
//!
//! [`MockClient`] serves canned bodies from memory and is what the tests and
//! offline tooling bind.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::TransportError;

/// A successful response: 2xx/3xx status and a parsed JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

/// Pluggable HTTP client
pub trait HttpClient: Send + Sync {
    /// Backend name (for logging)
    fn name(&self) -> &str;

    /// API base URL, used to turn absolute hrefs back into paths
    fn base_url(&self) -> Option<&str>;

    /// GET `path`, which is either rooted at the base URL or absolute.
    /// 4xx/5xx statuses come back as errors.
    fn get(&self, path: &str) -> Result<HttpResponse, TransportError>;
}

impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn base_url(&self) -> Option<&str> {
        (**self).base_url()
    }

    fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(path)
    }
}

/// Join a path onto a base URL.
///
/// Absolute `http://` / `https://` paths are used as they are.
pub fn join_url(base_url: Option<&str>, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    match base_url.map(|b| b.trim_end_matches('/')) {
        Some(base) if !base.is_empty() => {
            if path.starts_with('/') {
                format!("{base}{path}")
            } else {
                format!("{base}/{path}")
            }
        }
        _ => path.to_string(),
    }
}

/// Remove the base URL prefix from an href, leaving a rooted path.
///
/// The remainder is rooted the way [`join_url`] roots it: `?page=2` left
/// after stripping becomes `/?page=2`, and a relative `users/1` becomes
/// `/users/1`. Absolute hrefs on another host are returned unchanged.
pub fn strip_base<'a>(base_url: Option<&str>, href: &'a str) -> Cow<'a, str> {
    let rest = match base_url.map(|b| b.trim_end_matches('/')).filter(|b| !b.is_empty()) {
        Some(base) => match href.strip_prefix(base) {
            Some(rest) if rest.is_empty() || rest.starts_with(['/', '?', '#']) => rest,
            _ => href,
        },
        None => href,
    };

    if rest.starts_with('/') || rest.contains("://") {
        Cow::Borrowed(rest)
    } else {
        Cow::Owned(format!("/{rest}"))
    }
}

/// In-memory client serving canned responses
#[derive(Debug, Default)]
pub struct MockClient {
    base_url: Option<String>,

    /// Responses by path (base URL stripped)
    routes: HashMap<String, Result<HttpResponse, TransportError>>,

    /// Every path passed to `get`, in order
    requests: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Serve `body` with status 200 for `path`
    pub fn with_response(self, path: impl Into<String>, body: Value) -> Self {
        self.with_status(path, 200, body)
    }

    /// Serve `body` with `status`; 4xx/5xx statuses are reported as errors
    pub fn with_status(mut self, path: impl Into<String>, status: u16, body: Value) -> Self {
        let path = path.into();
        let response = match TransportError::from_status(status, path.clone(), Some(body.to_string())) {
            Some(err) => Err(err),
            None => Ok(HttpResponse { status, body }),
        };
        self.routes.insert(path, response);
        self
    }

    /// Fail requests for `path` with `error`
    pub fn with_error(mut self, path: impl Into<String>, error: TransportError) -> Self {
        self.routes.insert(path.into(), Err(error));
        self
    }

    /// Paths requested so far
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl HttpClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(path.to_string());
        }

        let key = strip_base(self.base_url(), path);
        match self.routes.get(key.as_ref()) {
            Some(response) => response.clone(),
            None => Err(TransportError::ClientError {
                status: 404,
                url: join_url(self.base_url(), path),
                body: None,
            }),
        }
    }
}

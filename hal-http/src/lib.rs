//! HAL HTTP - blocking HTTP client for HAL Core
//!
//! [`ReqwestClient`] implements [`hal_core::HttpClient`] on top of
//! `reqwest::blocking`. It joins paths onto the configured base URL, sends
//! the configured default headers, and reports failures as
//! [`TransportError`]s:
//!
//! | failure                         | error                |
//! |---------------------------------|----------------------|
//! | request exceeded `timeout_ms`   | `Timeout`            |
//! | server unreachable              | `Connection`         |
//! | body is not JSON                | `MalformedResponse`  |
//! | 4xx / 5xx status                | `ClientError` / `ServerError` |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hal_core::{ClientConfig, EndpointRegistry};
//! use hal_http::ReqwestClient;
//!
//! let client = ReqwestClient::new(ClientConfig::default().with_base_url("https://api.example.com"))?;
//! let registry = EndpointRegistry::new().with_client(client);
//! ```

use std::time::Duration;

use hal_core::client::join_url;
use hal_core::{ClientConfig, HalError, HttpClient, HttpResponse, TransportError};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

/// Blocking HTTP client backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    config: ClientConfig,
    http: Client,
}

impl ReqwestClient {
    /// Create a client from configuration
    pub fn new(config: ClientConfig) -> hal_core::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .default_headers(default_headers(&config)?)
            .build()
            .map_err(|e| HalError::Config {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl HttpClient for ReqwestClient {
    fn name(&self) -> &str {
        "reqwest"
    }

    fn base_url(&self) -> Option<&str> {
        self.config.base_url.as_deref()
    }

    fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        let url = join_url(self.base_url(), path);
        debug!(%url, "GET");

        let response = self.http.get(&url).send().map_err(|e| classify(&url, e))?;
        let status = response.status().as_u16();
        let text = response.text().map_err(|e| classify(&url, e))?;
        debug!(%url, status, bytes = text.len(), "response received");

        if let Some(err) = TransportError::from_status(status, url.as_str(), Some(text.clone())) {
            return Err(err);
        }

        Ok(HttpResponse {
            status,
            body: parse_body(&url, &text)?,
        })
    }
}

fn default_headers(config: &ClientConfig) -> hal_core::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| HalError::Config {
            reason: format!("invalid header name '{name}': {e}"),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| HalError::Config {
            reason: format!("invalid value for header '{name}': {e}"),
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Empty bodies (204 and friends) become `null`
fn parse_body(url: &str, text: &str) -> Result<Value, TransportError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| TransportError::MalformedResponse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn classify(url: &str, err: reqwest::Error) -> TransportError {
    let url = url.to_string();
    if err.is_timeout() {
        TransportError::Timeout { url }
    } else if err.is_builder() {
        TransportError::Request { url, reason: err.to_string() }
    } else if err.is_decode() {
        TransportError::MalformedResponse { url, reason: err.to_string() }
    } else {
        TransportError::Connection { url, reason: err.to_string() }
    }
}

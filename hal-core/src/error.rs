//! Error types for HAL client operations
//!
//! Registry and resolution failures are terminal: the core never retries and
//! never degrades a failure into an empty result. Each variant carries:
//! - A human-readable message naming the offending id, template or href
//! - A stable error code for programmatic handling
//! - A category so callers can tell configuration problems from transport ones
//!
//! Transport failures come from the HTTP collaborator already typed and are
//! passed through untouched inside [`HalError::Transport`].
//!
//! # Example
//!
//! ```rust
//! use hal_core::error::{HalError, ErrorCategory};
//!
//! fn handle_error(err: HalError) {
//!     match err.category() {
//!         ErrorCategory::Registration => println!("fix the endpoint table"),
//!         ErrorCategory::Configuration => println!("bind a client first"),
//!         ErrorCategory::Transport if err.is_recoverable() => println!("retry later"),
//!         _ => println!("{} ({})", err, err.error_code()),
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for HAL operations
pub type Result<T> = std::result::Result<T, HalError>;

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Client binding or manifest problems
    Configuration,
    /// Conflicting or malformed endpoint registrations
    Registration,
    /// An id or href that the registry cannot map to an endpoint
    Resolution,
    /// Failure reported by the HTTP collaborator
    Transport,
    /// Response body did not fit the target model
    Data,
}

/// Errors raised by the HTTP collaborator.
///
/// Status families are kept apart so callers can tell "fix the request" from
/// "try again later".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server could not be reached
    #[error("Connection failed for '{url}': {reason}")]
    Connection { url: String, reason: String },

    /// The request did not complete in time
    #[error("Request to '{url}' timed out")]
    Timeout { url: String },

    /// The body could not be parsed as JSON
    #[error("Malformed response from '{url}': {reason}")]
    MalformedResponse { url: String, reason: String },

    /// 4xx response
    #[error("Client error {status} from '{url}'")]
    ClientError { status: u16, url: String, body: Option<String> },

    /// 5xx response
    #[error("Server error {status} from '{url}'")]
    ServerError { status: u16, url: String, body: Option<String> },

    /// The request could not be built
    #[error("Invalid request for '{url}': {reason}")]
    Request { url: String, reason: String },
}

impl TransportError {
    /// Classify an HTTP status. Returns `None` for anything below 400.
    pub fn from_status(status: u16, url: impl Into<String>, body: Option<String>) -> Option<Self> {
        let url = url.into();
        match status {
            400..=499 => Some(TransportError::ClientError { status, url, body }),
            500..=599 => Some(TransportError::ServerError { status, url, body }),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::ClientError { status, .. }
            | TransportError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if repeating the request might succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TransportError::Connection { .. }
                | TransportError::Timeout { .. }
                | TransportError::ServerError { .. }
        )
    }
}

/// Errors that can occur in registry and resolution operations
#[derive(Error, Debug)]
pub enum HalError {
    // ═══════════════════════════════════════════════════════════════════════
    // Registration errors
    // ═══════════════════════════════════════════════════════════════════════

    /// An endpoint with this id is already registered
    #[error("Endpoint id already registered: '{id}'")]
    DuplicateId { id: String },

    /// Same template, kind and query template registered under another id
    #[error("Endpoint '{url}' ({kind}) is already registered as '{existing}'")]
    DuplicateEndpoint {
        url: String,
        kind: String,
        existing: String,
    },

    /// A template could not be compiled into a matcher
    #[error("Invalid URL template '{template}': {reason}")]
    InvalidPattern { template: String, reason: String },

    // ═══════════════════════════════════════════════════════════════════════
    // Resolution errors
    // ═══════════════════════════════════════════════════════════════════════

    /// No endpoint with this id
    #[error("Unknown endpoint: '{id}'. Register it before fetching.")]
    UnknownEndpoint { id: String },

    /// No registered pattern matches the href
    #[error("Unregistered URL pattern: '{href}'")]
    LinkResolution { href: String },

    /// A templated link was followed before its placeholders were expanded
    #[error("Link '{href}' is templated. Expand it before following.")]
    TemplatedLink { href: String },

    /// Caller asked for a model other than the endpoint's target
    #[error("Endpoint '{id}' realizes {expected}, not {requested}")]
    TargetMismatch {
        id: String,
        expected: &'static str,
        requested: &'static str,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Configuration errors
    // ═══════════════════════════════════════════════════════════════════════

    /// A fetch was attempted before an HTTP client was bound
    #[error("No HTTP client configured. Bind one with bind_client() before fetching.")]
    ClientNotConfigured,

    /// Manifest could not be loaded
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // ═══════════════════════════════════════════════════════════════════════
    // Pass-through and data errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Failure reported by the HTTP collaborator
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Response body does not deserialize into the target model
    #[error("Cannot deserialize response into {target}: {source}")]
    Deserialize {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl HalError {
    /// Returns true if this error might succeed on retry
    ///
    /// Only transport timeouts, connection failures and 5xx responses
    /// qualify; everything else needs different input or configuration.
    pub fn is_recoverable(&self) -> bool {
        match self {
            HalError::Transport(err) => err.is_recoverable(),
            _ => false,
        }
    }

    /// Returns the error category for grouping
    pub fn category(&self) -> ErrorCategory {
        match self {
            HalError::DuplicateId { .. }
            | HalError::DuplicateEndpoint { .. }
            | HalError::InvalidPattern { .. } => ErrorCategory::Registration,

            HalError::UnknownEndpoint { .. }
            | HalError::LinkResolution { .. }
            | HalError::TemplatedLink { .. }
            | HalError::TargetMismatch { .. } => ErrorCategory::Resolution,

            HalError::ClientNotConfigured | HalError::Config { .. } => {
                ErrorCategory::Configuration
            }

            HalError::Transport(_) => ErrorCategory::Transport,

            HalError::Deserialize { .. } => ErrorCategory::Data,
        }
    }

    /// Returns the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            HalError::DuplicateId { .. } => "DUPLICATE_ID",
            HalError::DuplicateEndpoint { .. } => "DUPLICATE_ENDPOINT",
            HalError::InvalidPattern { .. } => "INVALID_PATTERN",
            HalError::UnknownEndpoint { .. } => "UNKNOWN_ENDPOINT",
            HalError::LinkResolution { .. } => "LINK_RESOLUTION",
            HalError::TemplatedLink { .. } => "TEMPLATED_LINK",
            HalError::TargetMismatch { .. } => "TARGET_MISMATCH",
            HalError::ClientNotConfigured => "CLIENT_NOT_CONFIGURED",
            HalError::Config { .. } => "CONFIG_ERROR",
            HalError::Transport(TransportError::Connection { .. }) => "CONNECTION_FAILED",
            HalError::Transport(TransportError::Timeout { .. }) => "TIMEOUT",
            HalError::Transport(TransportError::MalformedResponse { .. }) => "MALFORMED_RESPONSE",
            HalError::Transport(TransportError::ClientError { .. }) => "HTTP_CLIENT_ERROR",
            HalError::Transport(TransportError::ServerError { .. }) => "HTTP_SERVER_ERROR",
            HalError::Transport(TransportError::Request { .. }) => "INVALID_REQUEST",
            HalError::Deserialize { .. } => "DESERIALIZE_ERROR",
        }
    }
}

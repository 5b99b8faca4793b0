//! Endpoint entries - one registered template-to-model mapping

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pattern::PathPattern;
use super::query::QueryTemplate;
use super::url::{build, Params};
use crate::error::Result;
use crate::resource::Target;

/// Descriptive tag for an endpoint. Not used by matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EndpointKind {
    /// Entry point or collection listing
    Index,
    /// A single resource
    Resource,
    /// Any caller-defined tag
    Custom(String),
}

impl EndpointKind {
    pub fn as_str(&self) -> &str {
        match self {
            EndpointKind::Index => "index",
            EndpointKind::Resource => "resource",
            EndpointKind::Custom(tag) => tag,
        }
    }
}

impl From<String> for EndpointKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "index" => EndpointKind::Index,
            "resource" => EndpointKind::Resource,
            _ => EndpointKind::Custom(tag),
        }
    }
}

impl From<&str> for EndpointKind {
    fn from(tag: &str) -> Self {
        EndpointKind::from(tag.to_string())
    }
}

impl From<EndpointKind> for String {
    fn from(kind: EndpointKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A registered endpoint. Immutable once registered.
#[derive(Debug, Clone)]
pub struct EndpointEntry {
    id: String,
    kind: EndpointKind,
    url_template: String,
    target: Target,
    query: QueryTemplate,
    pattern: PathPattern,
}

impl EndpointEntry {
    /// Build an entry, compiling its path pattern
    pub fn new(
        id: impl Into<String>,
        kind: EndpointKind,
        url_template: impl Into<String>,
        target: Target,
        query: QueryTemplate,
    ) -> Result<Self> {
        let url_template = url_template.into();
        let pattern = PathPattern::compile(&url_template)?;

        Ok(Self {
            id: id.into(),
            kind,
            url_template,
            target,
            query,
            pattern,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &EndpointKind {
        &self.kind
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn query(&self) -> &QueryTemplate {
        &self.query
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Same (template, kind, query template) combination?
    pub fn same_endpoint(&self, url_template: &str, kind: &EndpointKind, query: &QueryTemplate) -> bool {
        self.url_template == url_template && &self.kind == kind && &self.query == query
    }

    /// Concrete request path for `params`
    pub fn url(&self, params: &Params) -> String {
        build(&self.url_template, &self.query, params)
    }

    /// Does `path` + `query` address this endpoint?
    pub fn matches(&self, path: &str, query: Option<&str>, base_url: Option<&str>) -> bool {
        self.pattern.is_match_with_base(path, base_url) && self.query.matches(query)
    }

    /// Textual specificity: longer templates are taken to be more specific
    pub fn specificity(&self) -> usize {
        self.url_template.len()
    }
}

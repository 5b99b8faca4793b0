//! HAL resource model
//!
//! A HAL document is a JSON object whose `_links` member maps relation names
//! to one link or an array of links. Everything else is an attribute.
//! Attributes stay raw JSON in [`Document`]; typed models are plain serde
//! structs deserialized from the same body.
//!
//! Links are realized by handing them an [`EndpointRegistry`] explicitly.
//! Nothing in a document remembers which registry produced it.

use std::any::{type_name, TypeId};
use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::endpoint::{interpolate, EndpointRegistry, Params, Realized};
use crate::error::{HalError, Result};

/// Anything a response body can be deserialized into
pub trait Resource: DeserializeOwned + 'static {}

impl<T: DeserializeOwned + 'static> Resource for T {}

/// The model an endpoint realizes.
///
/// Bound at registration time from a concrete type, never looked up by name.
#[derive(Clone, Copy)]
pub struct Target {
    type_id: TypeId,
    type_name: &'static str,
}

impl Target {
    /// Descriptor for model type `T`
    pub fn of<T: Resource>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Descriptor for the generic [`Document`] model
    pub fn document() -> Self {
        Self::of::<Document>()
    }

    /// Fully qualified Rust type name of the model
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Is this the descriptor of `T`?
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// May a body matched to this target be read as `T`?
    /// The generic [`Document`] view is always allowed.
    pub fn accepts<T: 'static>(&self) -> bool {
        self.is::<T>() || TypeId::of::<T>() == TypeId::of::<Document>()
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Target {}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Target").field(&self.type_name).finish()
    }
}

/// A HAL link object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,

    /// Href is a URI template that must be expanded first
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub templated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Media type hint
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: false,
            title: None,
            name: None,
            media_type: None,
        }
    }

    /// Expand a templated href; returns the href unchanged otherwise
    pub fn expand(&self, params: &Params) -> String {
        if self.templated {
            interpolate(&self.href, params)
        } else {
            self.href.clone()
        }
    }

    /// Fetch the linked resource as `T`.
    ///
    /// Templated links must be expanded first; following one as-is fails
    /// with [`HalError::TemplatedLink`].
    pub fn realize<T: Resource>(&self, registry: &EndpointRegistry) -> Result<T> {
        registry.resolve_href(self.followable_href()?)
    }

    /// Fetch the linked resource as a generic document
    pub fn realize_document(&self, registry: &EndpointRegistry) -> Result<Realized> {
        registry.resolve_document(self.followable_href()?)
    }

    fn followable_href(&self) -> Result<&str> {
        if self.templated {
            return Err(HalError::TemplatedLink {
                href: self.href.clone(),
            });
        }
        Ok(&self.href)
    }
}

/// One link or several under the same relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkSet {
    One(Link),
    Many(Vec<Link>),
}

impl LinkSet {
    pub fn as_slice(&self) -> &[Link] {
        match self {
            LinkSet::One(link) => std::slice::from_ref(link),
            LinkSet::Many(links) => links,
        }
    }

    pub fn first(&self) -> Option<&Link> {
        self.as_slice().first()
    }
}

/// A generic HAL document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_links", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, LinkSet>,

    /// Every other top-level member, `_embedded` included
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Document {
    /// First link under `rel`
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.get(rel).and_then(LinkSet::first)
    }

    /// All links under `rel`
    pub fn links(&self, rel: &str) -> &[Link] {
        self.links.get(rel).map(LinkSet::as_slice).unwrap_or(&[])
    }

    /// The document's own address: `_links.self`, else a top-level `href`
    pub fn self_href(&self) -> Option<&str> {
        self.link("self")
            .map(|link| link.href.as_str())
            .or_else(|| self.attributes.get("href").and_then(Value::as_str))
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Read the same body as a typed model
    pub fn into_model<T: Resource>(self) -> Result<T> {
        let value = serde_json::to_value(self).map_err(|source| HalError::Deserialize {
            target: type_name::<T>(),
            source,
        })?;
        from_body(value)
    }
}

/// Deserialize a response body into `T`
pub(crate) fn from_body<T: Resource>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|source| HalError::Deserialize {
        target: type_name::<T>(),
        source,
    })
}

/// Add `href` to an object body so the model can keep its own address.
/// Non-object bodies are returned as they are.
pub(crate) fn with_href(body: Value, href: &str) -> Value {
    match body {
        Value::Object(mut map) => {
            map.insert("href".to_string(), Value::String(href.to_string()));
            Value::Object(map)
        }
        other => other,
    }
}

//! Query Template - declared query parameters of an endpoint
//!
//! Each declared parameter is either a literal (required at match time, and
//! always emitted when building a URL) or a `{name}` placeholder (optional at
//! match time, emitted only when the caller supplies `name`).
//!
//! Two endpoints can share a path and differ only in their query template;
//! that is how a plain collection and its paginated or filtered variant
//! coexist in one registry.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declared value of one query parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryValue {
    /// Must be present with exactly this value
    Literal(String),
    /// Optional; filled from the named caller parameter when building
    Placeholder(String),
}

impl QueryValue {
    /// Parse template syntax: `{name}` is a placeholder, anything else a literal
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
            Some(name) if !name.is_empty() && !name.contains(['{', '}']) => {
                QueryValue::Placeholder(name.to_string())
            }
            _ => QueryValue::Literal(raw.to_string()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, QueryValue::Placeholder(_))
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Literal(value) => f.write_str(value),
            QueryValue::Placeholder(name) => write!(f, "{{{name}}}"),
        }
    }
}

/// Ordered set of declared query parameters.
///
/// Declaration order drives URL building. Equality ignores order, since
/// matching does too.
#[derive(Debug, Clone, Default)]
pub struct QueryTemplate {
    params: Vec<(String, QueryValue)>,
}

impl QueryTemplate {
    /// Create an empty (unconstrained) template
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter using template syntax (`"{page}"` or `"active"`).
    /// Redeclaring a name replaces its value in place.
    pub fn with(mut self, name: impl Into<String>, value: &str) -> Self {
        self.insert(name, QueryValue::parse(value));
        self
    }

    /// Declare a required literal parameter
    pub fn literal(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, QueryValue::Literal(value.into()));
        self
    }

    /// Declare an optional placeholder parameter
    pub fn placeholder(mut self, name: impl Into<String>, param: impl Into<String>) -> Self {
        self.insert(name, QueryValue::Placeholder(param.into()));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: QueryValue) {
        let name = name.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Declared parameters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Check an actual query string against the declared constraints.
    ///
    /// An empty template accepts anything. Literals must be present with an
    /// exactly equal value; placeholders and undeclared names are ignored.
    pub fn matches(&self, query: Option<&str>) -> bool {
        if self.is_empty() {
            return true;
        }

        let actual = parse_query(query.unwrap_or(""));
        self.params.iter().all(|(name, declared)| match declared {
            QueryValue::Placeholder(_) => true,
            QueryValue::Literal(expected) => actual.get(name.as_str()) == Some(&expected.as_str()),
        })
    }
}

impl PartialEq for QueryTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .params
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl Eq for QueryTemplate {}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for QueryTemplate {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |template, (k, v)| template.with(k, v.as_ref()))
    }
}

impl fmt::Display for QueryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

impl Serialize for QueryTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for (name, value) in &self.params {
            map.serialize_entry(name, &value.to_string())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for QueryTemplate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TemplateVisitor;

        impl<'de> Visitor<'de> for TemplateVisitor {
            type Value = QueryTemplate;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of query parameter names to literal or {placeholder} values")
            }

            // Entries arrive in document order, which becomes declaration order
            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut template = QueryTemplate::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    template.insert(name, QueryValue::parse(&value));
                }
                Ok(template)
            }
        }

        deserializer.deserialize_map(TemplateVisitor)
    }
}

/// Parse a query string into name/value pairs.
///
/// Later duplicates win. Pairs without `=` are skipped. Values are compared
/// verbatim, with no percent-decoding.
pub fn parse_query(query: &str) -> HashMap<&str, &str> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Does `query` satisfy `declared`? See [`QueryTemplate::matches`].
pub fn matches(declared: &QueryTemplate, query: &str) -> bool {
    declared.matches(Some(query))
}

//! URL Builder - turns a template plus caller parameters into a request path

use std::collections::BTreeMap;
use std::fmt::Display;

use super::pattern::{tokenize, Piece};
use super::query::{QueryTemplate, QueryValue};

/// Caller-supplied parameter values, stringified on insert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.0.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |params, (k, v)| params.with(k, v))
    }
}

impl From<BTreeMap<String, String>> for Params {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Substitute every `{name}` in `template` with `params[name]`.
///
/// A placeholder with no supplied value is left as written.
pub fn interpolate(template: &str, params: &Params) -> String {
    let mut out = String::with_capacity(template.len());
    for piece in tokenize(template) {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Placeholder(name) => match params.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            },
        }
    }
    out
}

/// Append the declared query parameters to `path`.
///
/// Literals are always emitted; placeholders only when the caller supplied
/// their parameter. Pairs keep declaration order. Nothing is appended when
/// no pair was emitted. A path that already has a query is extended with `&`.
pub fn build_query(path: &str, query: &QueryTemplate, params: &Params) -> String {
    let pairs: Vec<String> = query
        .iter()
        .filter_map(|(name, value)| match value {
            QueryValue::Literal(literal) => Some(format!("{name}={literal}")),
            QueryValue::Placeholder(param) => params.get(param).map(|v| format!("{name}={v}")),
        })
        .collect();

    if pairs.is_empty() {
        return path.to_string();
    }

    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{}", pairs.join("&"))
}

/// Interpolate the template, then append the query
pub fn build(template: &str, query: &QueryTemplate, params: &Params) -> String {
    build_query(&interpolate(template, params), query, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate() {
        let params = Params::new().with("user_id", 123).with("post_id", 456);
        assert_eq!(
            interpolate("/users/{user_id}/posts/{post_id}", &params),
            "/users/123/posts/456"
        );
    }

    #[test]
    fn test_interpolate_leaves_missing_placeholders() {
        let params = Params::new().with("user_id", 1);
        assert_eq!(
            interpolate("/users/{user_id}/posts/{post_id}", &params),
            "/users/1/posts/{post_id}"
        );
        assert_eq!(interpolate("/static", &params), "/static");
    }

    #[test]
    fn test_build_query_omits_absent_placeholders() {
        let query = QueryTemplate::new().with("page", "{page}").with("limit", "{limit}");
        let params = Params::new().with("page", 2);
        assert_eq!(build_query("/users", &query, &params), "/users?page=2");
    }

    #[test]
    fn test_build_query_emits_literals_in_order() {
        let query = QueryTemplate::new()
            .with("status", "active")
            .with("page", "{page}")
            .with("sort", "name");
        assert_eq!(
            build_query("/users", &query, &Params::new()),
            "/users?status=active&sort=name"
        );
        assert_eq!(
            build_query("/users", &query, &Params::new().with("page", 3)),
            "/users?status=active&page=3&sort=name"
        );
    }

    #[test]
    fn test_build_query_without_pairs_returns_path() {
        let query = QueryTemplate::new().with("page", "{page}");
        assert_eq!(build_query("/users", &query, &Params::new()), "/users");
        assert_eq!(build_query("/users", &QueryTemplate::new(), &Params::new()), "/users");
    }

    #[test]
    fn test_placeholder_name_differs_from_query_name() {
        let query = QueryTemplate::new().with("p", "{page}");
        let params = Params::new().with("page", 4);
        assert_eq!(build_query("/items", &query, &params), "/items?p=4");
    }

    #[test]
    fn test_build_extends_existing_query() {
        let query = QueryTemplate::new().with("limit", "{limit}");
        let params = Params::new().with("q", "rust").with("limit", 10);
        assert_eq!(build("/search?q={q}", &query, &params), "/search?q=rust&limit=10");
    }
}

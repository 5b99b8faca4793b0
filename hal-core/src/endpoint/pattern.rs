//! Path Pattern - decides whether a concrete path fits a URL template
//!
//! A template such as `/users/{id}/posts` compiles into an anchored regex in
//! which every `{name}` placeholder matches one or more characters other than
//! `/`, so a placeholder never spans two path segments. Everything else in
//! the template matches literally.

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::{HalError, Result};

/// One piece of a tokenized template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Split a template into literal runs and `{name}` placeholders.
///
/// A brace that does not open a well-formed placeholder (empty name, nested
/// brace, or a `/` before the closing brace) stays literal.
pub(crate) fn tokenize(template: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(offset) = template[cursor..].find('{') {
        let open = cursor + offset;
        let rest = &template[open + 1..];
        let close = rest
            .find(|c| c == '}' || c == '{' || c == '/')
            .filter(|&i| i > 0 && rest.as_bytes()[i] == b'}');

        match close {
            Some(len) => {
                if open > literal_start {
                    pieces.push(Piece::Literal(&template[literal_start..open]));
                }
                pieces.push(Piece::Placeholder(&rest[..len]));
                cursor = open + len + 2;
                literal_start = cursor;
            }
            None => cursor = open + 1,
        }
    }

    if literal_start < template.len() {
        pieces.push(Piece::Literal(&template[literal_start..]));
    }
    pieces
}

/// Split an href into its path and query string, dropping any fragment.
pub fn split_href(href: &str) -> (&str, Option<&str>) {
    let href = href.split('#').next().unwrap_or(href);
    match href.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (href, None),
    }
}

/// A compiled path template
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// Path portion of the template (anything after `?` is not part of it)
    template: String,

    /// Placeholder names in order of appearance
    names: Vec<String>,

    /// `None` for an empty template, which matches nothing
    regex: Option<Regex>,
}

impl PathPattern {
    /// Compile the path portion of `template`
    pub fn compile(template: &str) -> Result<Self> {
        let (path, _) = split_href(template);

        if path.is_empty() {
            return Ok(Self {
                template: String::new(),
                names: Vec::new(),
                regex: None,
            });
        }

        let mut source = String::with_capacity(path.len() + 8);
        let mut names = Vec::new();
        source.push('^');
        for piece in tokenize(path) {
            match piece {
                Piece::Literal(text) => source.push_str(&regex::escape(text)),
                Piece::Placeholder(name) => {
                    source.push_str("([^/]+)");
                    names.push(name.to_string());
                }
            }
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| HalError::InvalidPattern {
            template: template.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            template: path.to_string(),
            names,
            regex: Some(regex),
        })
    }

    /// The path template this pattern was compiled from
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in order of appearance
    pub fn placeholders(&self) -> &[String] {
        &self.names
    }

    /// Full-path match. Empty paths never match.
    pub fn is_match(&self, path: &str) -> bool {
        match &self.regex {
            Some(regex) if !path.is_empty() => regex.is_match(path),
            _ => false,
        }
    }

    /// Match allowing for an API base URL on either side.
    ///
    /// Servers may return hrefs with or without scheme and host, and
    /// templates may be stored with or without the base prefix. Besides the
    /// raw path this tries `base + path` for a rooted path, and the path with
    /// the base stripped when it carries the prefix. A template stored with
    /// the base prefix therefore matches a bare `/path`, and a bare template
    /// matches a full URL.
    pub fn is_match_with_base(&self, path: &str, base_url: Option<&str>) -> bool {
        if self.is_match(path) {
            return true;
        }

        let Some(base) = base_url.map(|b| b.trim_end_matches('/')).filter(|b| !b.is_empty()) else {
            return false;
        };

        if path.starts_with('/') && self.is_match(&format!("{base}{path}")) {
            return true;
        }

        match path.strip_prefix(base) {
            Some(rest) if rest.starts_with('/') => self.is_match(rest),
            Some("") => self.is_match("/"),
            _ => false,
        }
    }

    /// Values bound to each placeholder when `path` matches
    pub fn captures(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let regex = self.regex.as_ref()?;
        let caps = regex.captures(path)?;

        Some(
            self.names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    caps.get(i + 1).map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }
}

/// Does `path` fit `template`? Empty inputs never match.
pub fn matches(template: &str, path: &str) -> bool {
    PathPattern::compile(template)
        .map(|pattern| pattern.is_match(path))
        .unwrap_or(false)
}

/// [`matches`] with base URL normalization, see [`PathPattern::is_match_with_base`]
pub fn matches_with_base(template: &str, path: &str, base_url: Option<&str>) -> bool {
    PathPattern::compile(template)
        .map(|pattern| pattern.is_match_with_base(path, base_url))
        .unwrap_or(false)
}

//! Route patterns and path parameters.

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::fmt;

/// Strips a leading `/` and a single trailing `/` from `path`.
///
/// The root path `/` and the empty path both normalise to `""`.
///
/// ```
/// use marsview_router::normalize;
///
/// assert_eq!(normalize("/photo/42/"), "photo/42");
/// assert_eq!(normalize("/"), "");
/// assert_eq!(normalize(""), "");
/// ```
#[must_use]
pub fn normalize(path: &str) -> &str {
    if path == "/" {
        return "";
    }
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// Splits a path into its non-empty segments after [`normalize`].
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    normalize(path).split('/').filter(|segment| !segment.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed route pattern such as `/photo/:id`.
///
/// Segments starting with `:` bind the path segment at the same position
/// under the name that follows the colon. Every other segment must match
/// literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parses `pattern`. Parsing never fails.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let segments = segments(pattern)
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => Segment::Param(name.into()),
                None => Segment::Literal(segment.into()),
            })
            .collect();
        Self {
            source: pattern.into(),
            segments,
        }
    }

    /// Returns the pattern as it was registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the parameters, in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches `path` and returns the captured parameters.
    ///
    /// ```
    /// use marsview_router::RoutePattern;
    ///
    /// let pattern = RoutePattern::parse("/photo/:id");
    /// let params = pattern.matches("/photo/42/").expect("matches");
    /// assert_eq!(params.get("id"), Some("42"));
    /// assert!(pattern.matches("/photo").is_none());
    /// ```
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Params> {
        let parts: Vec<&str> = segments(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => params.insert(name.clone(), part.into()),
            }
        }
        Some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl From<&str> for RoutePattern {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Parameters captured while matching a [`RoutePattern`].
///
/// Values are the path segments verbatim; no decoding is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the value captured for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Iterates over the captured parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of captured parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, name: String, value: String) {
        self.0.insert(name, value);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_one_slash_on_each_side() {
        assert_eq!(normalize("/a/b"), "a/b");
        assert_eq!(normalize("a/b/"), "a/b");
        assert_eq!(normalize("/a//"), "a/");
        assert_eq!(segments("/a//").collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn root_pattern_matches_empty_and_slash() {
        let root = RoutePattern::parse("/");
        assert!(root.matches("").is_some_and(|params| params.is_empty()));
        assert!(root.matches("/").is_some());
        assert!(root.matches("/photo").is_none());
    }

    #[test]
    fn param_captures_segment_verbatim() {
        let pattern = RoutePattern::parse("/rovers/:rover/photos/:id");
        let params = pattern.matches("rovers/Curiosity/photos/a%20b").expect("matches");
        assert_eq!(params.get("rover"), Some("Curiosity"));
        assert_eq!(params.get("id"), Some("a%20b"));
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), ["rover", "id"]);
    }

    #[test]
    fn literal_segments_must_be_equal() {
        let pattern = RoutePattern::parse("/photo/:id");
        assert!(pattern.matches("/photos/42").is_none());
        assert!(pattern.matches("/photo/42/extra").is_none());
    }

    #[test]
    fn trailing_slash_resolves_identically() {
        let pattern = RoutePattern::parse("/photo/:id");
        assert_eq!(pattern.matches("/photo/42"), pattern.matches("/photo/42/"));
    }
}

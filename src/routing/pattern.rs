//! Path template compilation and matching.
//!
//! # Template Syntax
//! - `literal` matches itself (case-sensitive)
//! - `{name}` captures one non-empty segment
//! - `{<regex>name}` captures one segment the regex accepts in full
//!
//! # Design Decisions
//! - Templates are compiled once; regexes are anchored at compile time
//! - Matching is positional: segment counts must agree, unless the pattern
//!   is a prefix pattern (static directories), which hands back the rest
//! - A constraint rejection is a plain mismatch, never an error
//! - Request paths are split on the raw `/` first, then each segment is
//!   percent-decoded, so `%2F` never adds a segment

use std::borrow::Cow;
use std::fmt;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while compiling a path template.
#[derive(Debug, Error)]
pub enum PatternError {
    /// Templates are absolute.
    #[error("path template must start with '/': {0}")]
    NotAbsolute(String),

    /// A `{...}` segment that is not `{name}` or `{<regex>name}`.
    #[error("malformed dynamic segment: {0}")]
    MalformedSegment(String),

    /// The same capture name appears twice.
    #[error("duplicate parameter name: {0}")]
    DuplicateName(String),

    /// The constraint does not compile.
    #[error("invalid constraint for parameter '{name}': {source}")]
    InvalidRegex {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// One compiled template segment.
#[derive(Debug, Clone)]
pub enum Segment {
    Literal(String),
    Capture(String),
    Constrained { name: String, regex: Regex },
}

impl Segment {
    /// Name of the parameter bound by this segment, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Capture(name) | Segment::Constrained { name, .. } => Some(name),
        }
    }

    fn accepts(&self, part: &str) -> bool {
        match self {
            Segment::Literal(text) => text == part,
            Segment::Capture(_) => !part.is_empty(),
            Segment::Constrained { regex, .. } => regex.is_match(part),
        }
    }
}

/// Parameters bound by a successful match, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
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

    fn push(&mut self, name: &str, value: &str) {
        self.0.push((name.to_string(), value.to_string()));
    }
}

/// Result of matching a request path against a [`PathPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    pub params: Params,
    /// Path left over after a prefix pattern, without a leading `/`.
    /// Always `None` for exact patterns.
    pub remainder: Option<String>,
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
    prefix: bool,
}

impl PathPattern {
    /// Compile a template such as `/service/{<[0-9]{3}>id}/cost`.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        if !template.starts_with('/') {
            return Err(PatternError::NotAbsolute(template.to_string()));
        }

        let mut segments = Vec::new();
        for raw in split_template(normalize(template)) {
            let segment = parse_segment(raw)?;
            if let Some(name) = segment.name() {
                if segments.iter().any(|s: &Segment| s.name() == Some(name)) {
                    return Err(PatternError::DuplicateName(name.to_string()));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            source: template.to_string(),
            segments,
            prefix: false,
        })
    }

    /// Turn this into a prefix pattern: deeper paths match and the
    /// unmatched tail is reported as the remainder.
    pub fn into_prefix(mut self) -> Self {
        self.prefix = true;
        self
    }

    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Match a concrete request path. `None` means no match.
    pub fn matches(&self, path: &str) -> Option<PathMatch> {
        let parts: Vec<Cow<'_, str>> = split_path(path).into_iter().map(decode).collect();
        if parts.len() < self.segments.len() || (!self.prefix && parts.len() != self.segments.len()) {
            return None;
        }

        let mut params = Params::default();
        for (segment, part) in self.segments.iter().zip(&parts) {
            if !segment.accepts(part) {
                return None;
            }
            if let Some(name) = segment.name() {
                params.push(name, part);
            }
        }

        let remainder = self
            .prefix
            .then(|| parts[self.segments.len()..].join("/"));

        Some(PathMatch { params, remainder })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Strip one trailing slash, keeping the root intact.
fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

fn decode(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}

fn split_path(path: &str) -> Vec<&str> {
    let path = normalize(path);
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

/// Split on `/` outside of braces, so constraints like `[0-9]{3}` or
/// `a/b` stay inside their segment.
fn split_template(template: &str) -> Vec<&str> {
    let body = &template[1..];
    if body.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

fn parse_segment(raw: &str) -> Result<Segment, PatternError> {
    let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
        if raw.contains('{') || raw.contains('}') {
            return Err(PatternError::MalformedSegment(raw.to_string()));
        }
        return Ok(Segment::Literal(raw.to_string()));
    };

    let Some(constrained) = inner.strip_prefix('<') else {
        let name = valid_name(inner, raw)?;
        return Ok(Segment::Capture(name));
    };

    // The constraint ends at the last '>'; everything after it is the name.
    let end = constrained
        .rfind('>')
        .ok_or_else(|| PatternError::MalformedSegment(raw.to_string()))?;
    let (expr, name) = (&constrained[..end], &constrained[end + 1..]);
    let name = valid_name(name, raw)?;
    if expr.is_empty() {
        return Err(PatternError::MalformedSegment(raw.to_string()));
    }

    let regex = Regex::new(&format!("^(?:{expr})$")).map_err(|source| PatternError::InvalidRegex {
        name: name.clone(),
        source,
    })?;

    Ok(Segment::Constrained { name, regex })
}

fn valid_name(name: &str, raw: &str) -> Result<String, PatternError> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(name.to_string())
    } else {
        Err(PatternError::MalformedSegment(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let pattern = PathPattern::parse("/somewhere/else").unwrap();
        assert!(pattern.matches("/somewhere/else").is_some());
        assert!(pattern.matches("/somewhere/else/").is_some());
        assert!(pattern.matches("/Somewhere/else").is_none());
        assert!(pattern.matches("/somewhere").is_none());
    }

    #[test]
    fn test_root_template() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.segments().is_empty());
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("/x").is_none());
    }

    #[test]
    fn test_capture_binds_segment() {
        let pattern = PathPattern::parse("/service/{id}/cost").unwrap();
        let m = pattern.matches("/service/abc/cost").unwrap();
        assert_eq!(m.params.get("id"), Some("abc"));
        assert_eq!(m.remainder, None);

        // Captures never match an empty segment.
        assert!(pattern.matches("/service//cost").is_none());
    }

    #[test]
    fn test_constrained_capture() {
        let pattern = PathPattern::parse("/service/{<[0-9]{3}>id}/cost").unwrap();
        assert_eq!(pattern.segments().len(), 3);

        let m = pattern.matches("/service/123/cost").unwrap();
        assert_eq!(m.params.get("id"), Some("123"));

        // Anchored: a partial match is a rejection.
        assert!(pattern.matches("/service/1234/cost").is_none());
        assert!(pattern.matches("/service/12a/cost").is_none());
    }

    #[test]
    fn test_multiple_params_keep_order() {
        let pattern = PathPattern::parse("/users/{user}/posts/{<\\d+>post}").unwrap();
        let m = pattern.matches("/users/ann/posts/42").unwrap();
        let bound: Vec<_> = m.params.iter().collect();
        assert_eq!(bound, vec![("user", "ann"), ("post", "42")]);
    }

    #[test]
    fn test_prefix_pattern_reports_remainder() {
        let pattern = PathPattern::parse("/public").unwrap().into_prefix();
        assert!(pattern.is_prefix());

        let m = pattern.matches("/public/css/site.css").unwrap();
        assert_eq!(m.remainder.as_deref(), Some("css/site.css"));

        let m = pattern.matches("/public").unwrap();
        assert_eq!(m.remainder.as_deref(), Some(""));

        assert!(pattern.matches("/private/file").is_none());
    }

    #[test]
    fn test_segments_are_percent_decoded() {
        let pattern = PathPattern::parse("/rooms/{key}/count").unwrap();
        let m = pattern.matches("/rooms/a%20b/count").unwrap();
        assert_eq!(m.params.get("key"), Some("a b"));

        // An escaped slash stays inside its segment.
        let m = pattern.matches("/rooms/a%2Fb/count").unwrap();
        assert_eq!(m.params.get("key"), Some("a/b"));

        let literal = PathPattern::parse("/caf\u{e9}").unwrap();
        assert!(literal.matches("/caf%C3%A9").is_some());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            PathPattern::parse("relative/path"),
            Err(PatternError::NotAbsolute(_))
        ));
        assert!(matches!(
            PathPattern::parse("/a/{id}/b/{id}"),
            Err(PatternError::DuplicateName(_))
        ));
        assert!(matches!(
            PathPattern::parse("/a/{}"),
            Err(PatternError::MalformedSegment(_))
        ));
        assert!(matches!(
            PathPattern::parse("/a/pre{id}"),
            Err(PatternError::MalformedSegment(_))
        ));
        assert!(matches!(
            PathPattern::parse("/a/{<[0-9>id}"),
            Err(PatternError::InvalidRegex { .. })
        ));
    }
}

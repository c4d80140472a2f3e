//! Request predicates.
//!
//! # Responsibilities
//! - Match the request path against a URI template, capturing variables
//! - Match the HTTP verb (exact equality)
//! - Match media types on `Content-Type` / `Accept`
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Literal path segments are case-sensitive
//! - Media type comparison uses the essence only (`type/subtype`), case-insensitive
//! - Empty condition = always matches (wildcard)
//! - No regex: templates are compiled to a segment list once

use std::collections::HashSet;
use std::fmt;

use axum::body::Body;
use axum::http::{header, HeaderName, Method, Request};
use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::routing::extract::PathParams;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Errors raised while compiling a URI template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template `{0}` must start with '/'")]
    MissingLeadingSlash(String),

    #[error("template `{template}` has a malformed variable in segment `{segment}`")]
    MalformedSegment { template: String, segment: String },

    #[error("template `{0}` declares a variable with an empty name")]
    EmptyVariable(String),

    #[error("template `{template}` declares variable `{name}` twice")]
    DuplicateVariable { template: String, name: String },

    #[error("template `{0}` has a catch-all variable that is not the last segment")]
    CatchAllNotLast(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Var(String),
    CatchAll(String),
}

/// A compiled URI template such as `/books/{id}` or `/files/{*rest}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl UriTemplate {
    /// Compile a template string.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if !template.starts_with('/') {
            return Err(TemplateError::MissingLeadingSlash(template.to_string()));
        }

        let mut segments = Vec::new();
        let mut seen = HashSet::new();

        for part in split_path(template) {
            if part.is_empty() {
                return Err(TemplateError::MalformedSegment {
                    template: template.to_string(),
                    segment: part.to_string(),
                });
            }

            let opens = part.matches('{').count();
            let closes = part.matches('}').count();

            if opens == 0 && closes == 0 {
                segments.push(Segment::Literal(part.to_string()));
                continue;
            }

            // Variables must occupy a whole segment.
            if opens != 1 || closes != 1 || !part.starts_with('{') || !part.ends_with('}') {
                return Err(TemplateError::MalformedSegment {
                    template: template.to_string(),
                    segment: part.to_string(),
                });
            }

            let inner = &part[1..part.len() - 1];
            let (name, catch_all) = match inner.strip_prefix('*') {
                Some(rest) => (rest, true),
                None => (inner, false),
            };

            if name.is_empty() {
                return Err(TemplateError::EmptyVariable(template.to_string()));
            }
            if !seen.insert(name.to_string()) {
                return Err(TemplateError::DuplicateVariable {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            segments.push(if catch_all {
                Segment::CatchAll(name.to_string())
            } else {
                Segment::Var(name.to_string())
            });
        }

        if segments
            .iter()
            .rev()
            .skip(1)
            .any(|s| matches!(s, Segment::CatchAll(_)))
        {
            return Err(TemplateError::CatchAllNotLast(template.to_string()));
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    /// Names of the variables declared by the template, in order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Var(name) | Segment::CatchAll(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a request path, returning the captured variables.
    pub fn capture(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = split_path(path).collect();
        let mut params = PathParams::default();

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(expected) => {
                    if parts.get(index) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Var(name) => {
                    let value = parts.get(index).filter(|v| !v.is_empty())?;
                    params.insert(name.clone(), decode(value));
                }
                Segment::CatchAll(name) => {
                    let rest = parts.get(index..).unwrap_or_default().join("/");
                    params.insert(name.clone(), decode(&rest));
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Matcher for UriTemplate {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.capture(req.uri().path()).is_some()
    }
}

/// Split a path into segments, ignoring the leading slash and a single trailing one.
///
/// Interior empty segments are kept, so `//` never lines up with a template.
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    // The root path has no segments at all.
    let segments = (!trimmed.is_empty()).then(|| {
        trimmed
            .strip_suffix('/')
            .unwrap_or(trimmed)
            .split('/')
    });
    segments.into_iter().flatten()
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Matches the HTTP verb.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.method() == self.method
    }
}

/// Which side of the exchange a media type constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTypeRole {
    /// The request body (`Content-Type`).
    Consumes,
    /// The response body the client accepts (`Accept`).
    Produces,
}

/// Matches a media type on the request's `Content-Type` or `Accept` header.
#[derive(Debug, Clone)]
pub struct MediaTypeMatcher {
    role: MediaTypeRole,
    essence: String,
}

impl MediaTypeMatcher {
    /// Request body must be of this media type.
    pub fn consumes(media_type: &str) -> Self {
        Self {
            role: MediaTypeRole::Consumes,
            essence: essence(media_type),
        }
    }

    /// Client must accept this media type.
    pub fn produces(media_type: &str) -> Self {
        Self {
            role: MediaTypeRole::Produces,
            essence: essence(media_type),
        }
    }

    fn header(&self) -> HeaderName {
        match self.role {
            MediaTypeRole::Consumes => header::CONTENT_TYPE,
            MediaTypeRole::Produces => header::ACCEPT,
        }
    }

    fn accepts(&self, candidate: &str) -> bool {
        if candidate == self.essence || candidate == "*/*" {
            return true;
        }
        match (candidate.strip_suffix("/*"), self.essence.split_once('/')) {
            (Some(family), Some((expected_family, _))) => family == expected_family,
            _ => false,
        }
    }
}

impl Matcher for MediaTypeMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let value = req
            .headers()
            .get(self.header())
            .and_then(|h| h.to_str().ok());

        match (self.role, value) {
            (MediaTypeRole::Consumes, Some(v)) => essence(v) == self.essence,
            (MediaTypeRole::Consumes, None) => false,
            (MediaTypeRole::Produces, Some(v)) => v
                .split(',')
                .filter(|entry| !refused(entry))
                .any(|entry| self.accepts(&essence(entry))),
            // No Accept header means the client takes anything.
            (MediaTypeRole::Produces, None) => true,
        }
    }
}

/// `type/subtype` without parameters, lowercased.
fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// An `Accept` entry with `q=0` explicitly refuses the media type.
fn refused(entry: &str) -> bool {
    entry
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("q"))
        .any(|(_, value)| value.trim().parse::<f32>().is_ok_and(|q| q <= 0.0))
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Default)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    pub fn push(&mut self, matcher: Box<dyn Matcher>) {
        self.matchers.push(matcher);
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::default())
            .unwrap()
    }

    #[test]
    fn test_template_literal() {
        let t = UriTemplate::parse("/hello").unwrap();
        assert!(t.capture("/hello").is_some());
        assert!(t.capture("/hello/").is_some());
        assert!(t.capture("/Hello").is_none());
        assert!(t.capture("/hello/world").is_none());
        assert!(t.capture("/").is_none());
    }

    #[test]
    fn test_template_root() {
        let t = UriTemplate::parse("/").unwrap();
        assert!(t.capture("/").is_some());
        assert!(t.capture("/x").is_none());
    }

    #[test]
    fn test_template_variable() {
        let t = UriTemplate::parse("/hello/{name}").unwrap();
        let params = t.capture("/hello/John%20Doe").unwrap();
        assert_eq!(params.get("name"), Some("John Doe"));
        assert!(t.capture("/hello").is_none());
        assert_eq!(t.variables().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_template_empty_segments() {
        let t = UriTemplate::parse("/books/{id}").unwrap();
        assert!(t.capture("/books/1/").is_some());
        assert!(t.capture("//books/1").is_none());
        assert!(t.capture("/books//1").is_none());
        assert!(t.capture("/books/1//").is_none());
        assert!(t.capture("/books//").is_none());

        let root = UriTemplate::parse("/").unwrap();
        assert!(root.capture("//").is_none());
    }

    #[test]
    fn test_template_catch_all() {
        let t = UriTemplate::parse("/files/{*rest}").unwrap();
        let params = t.capture("/files/a/b/c.txt").unwrap();
        assert_eq!(params.get("rest"), Some("a/b/c.txt"));

        let empty = t.capture("/files").unwrap();
        assert_eq!(empty.get("rest"), Some(""));
    }

    #[test]
    fn test_template_errors() {
        assert!(matches!(
            UriTemplate::parse("hello"),
            Err(TemplateError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            UriTemplate::parse("/hello/{name"),
            Err(TemplateError::MalformedSegment { .. })
        ));
        assert!(matches!(
            UriTemplate::parse("/hello/x{name}"),
            Err(TemplateError::MalformedSegment { .. })
        ));
        assert!(matches!(
            UriTemplate::parse("/hello//world"),
            Err(TemplateError::MalformedSegment { .. })
        ));
        assert!(matches!(
            UriTemplate::parse("/hello/{}"),
            Err(TemplateError::EmptyVariable(_))
        ));
        assert!(matches!(
            UriTemplate::parse("/{a}/{a}"),
            Err(TemplateError::DuplicateVariable { .. })
        ));
        assert!(matches!(
            UriTemplate::parse("/{*rest}/tail"),
            Err(TemplateError::CatchAllNotLast(_))
        ));
        assert!(matches!(
            UriTemplate::parse("/{*rest}/{id}"),
            Err(TemplateError::CatchAllNotLast(_))
        ));
    }

    #[test]
    fn test_method_matcher() {
        let matcher = MethodMatcher::new(Method::POST);
        assert!(matcher.matches(&request(Method::POST, "/books")));
        assert!(!matcher.matches(&request(Method::GET, "/books")));
    }

    #[test]
    fn test_consumes_matcher() {
        let matcher = MediaTypeMatcher::consumes("application/json");

        let req = Request::builder()
            .header("Content-Type", "Application/JSON; charset=utf-8")
            .body(Body::default())
            .unwrap();
        assert!(matcher.matches(&req));

        let req = Request::builder()
            .header("Content-Type", "text/plain")
            .body(Body::default())
            .unwrap();
        assert!(!matcher.matches(&req));

        assert!(!matcher.matches(&request(Method::POST, "/")));
    }

    #[test]
    fn test_produces_matcher() {
        let matcher = MediaTypeMatcher::produces("application/json");

        let req = Request::builder()
            .header("Accept", "text/html, application/json;q=0.9")
            .body(Body::default())
            .unwrap();
        assert!(matcher.matches(&req));

        let req = Request::builder()
            .header("Accept", "application/*")
            .body(Body::default())
            .unwrap();
        assert!(matcher.matches(&req));

        let req = Request::builder()
            .header("Accept", "text/html")
            .body(Body::default())
            .unwrap();
        assert!(!matcher.matches(&req));

        // Missing Accept header accepts anything
        assert!(matcher.matches(&request(Method::GET, "/")));
    }

    #[test]
    fn test_produces_matcher_refused() {
        let matcher = MediaTypeMatcher::produces("application/json");

        let req = Request::builder()
            .header("Accept", "application/json;q=0, text/html")
            .body(Body::default())
            .unwrap();
        assert!(!matcher.matches(&req));

        let req = Request::builder()
            .header("Accept", "application/json; Q=0.000")
            .body(Body::default())
            .unwrap();
        assert!(!matcher.matches(&req));

        let req = Request::builder()
            .header("Accept", "*/*;q=0, application/json;q=0.1")
            .body(Body::default())
            .unwrap();
        assert!(matcher.matches(&req));
    }

    #[test]
    fn test_and_matcher() {
        let empty = AndMatcher::default();
        assert!(empty.matches(&request(Method::GET, "/")));

        let matcher = AndMatcher::new(vec![
            Box::new(UriTemplate::parse("/books").unwrap()),
            Box::new(MethodMatcher::new(Method::GET)),
        ]);
        assert!(matcher.matches(&request(Method::GET, "/books")));
        assert!(!matcher.matches(&request(Method::DELETE, "/books")));
        assert!(!matcher.matches(&request(Method::GET, "/authors")));
    }
}

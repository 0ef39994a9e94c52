//! Route-pattern compilation.
//!
//! Patterns use `:name` for a required segment, `:name?` for an optional
//! trailing segment, and `*` for a greedy wildcard capturing the remainder
//! of the path. Literal segments are regex-escaped so they match exactly.

use regex::Regex;
use std::sync::Arc;

use crate::context::ParamVec;

/// A compiled route pattern: an anchored regex plus the ordered list of
/// named parameters.
///
/// Wildcards capture positionally but are excluded from the name list, so
/// their values are not addressable through the parameter mapping.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

impl CompiledPattern {
    /// Compile a pattern string.
    ///
    /// The literal root `/` matches only `/` (or an empty path); every
    /// other pattern additionally tolerates a single trailing slash.
    /// A `:` segment whose name is not `[A-Za-z0-9_]+` is kept as an
    /// escaped literal.
    #[must_use]
    pub fn compile(pattern: &str) -> Self {
        if pattern == "/" {
            return Self {
                regex: Regex::new(r"^/?$").expect("failed to compile route pattern"),
                param_names: Vec::new(),
            };
        }

        let mut source = String::with_capacity(pattern.len() + 8);
        source.push('^');
        let mut param_names = Vec::new();

        for segment in pattern.split('/') {
            if segment.is_empty() {
                continue;
            }
            if segment == "*" {
                source.push_str("/(.*)");
                continue;
            }
            if let Some(rest) = segment.strip_prefix(':') {
                let (name, optional) = match rest.strip_suffix('?') {
                    Some(name) => (name, true),
                    None => (rest, false),
                };
                if is_param_name(name) {
                    param_names.push(Arc::from(name));
                    if optional {
                        source.push_str("(?:/([^/]+?))?");
                    } else {
                        source.push_str("/([^/]+?)");
                    }
                    continue;
                }
            }
            source.push('/');
            source.push_str(&regex::escape(segment));
        }

        source.push_str("(?:/)?$");
        Self {
            regex: Regex::new(&source).expect("failed to compile route pattern"),
            param_names,
        }
    }

    /// Test the path and extract named parameters on a hit.
    ///
    /// Capture groups are paired with parameter names positionally (name
    /// *i* ↔ group *i*+1); an absent optional capture does not populate
    /// the mapping.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<ParamVec> {
        let captures = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(capture) = captures.get(i + 1) {
                params.push((Arc::clone(name), capture.as_str().to_string()));
            }
        }
        Some(params)
    }

    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Join a mount prefix and a route pattern into one pattern string.
pub(crate) fn join_pattern(prefix: &str, pattern: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if pattern == "/" || pattern.is_empty() {
        if prefix.is_empty() {
            return "/".to_string();
        }
        return prefix.to_string();
    }
    if pattern.starts_with('/') {
        format!("{prefix}{pattern}")
    } else {
        format!("{prefix}/{pattern}")
    }
}

/// Segment-boundary prefix test used by middleware bindings and mounts:
/// `/api` covers `/api` and `/api/...` but not `/apix`. A `/` (or empty)
/// prefix covers every path.
pub(crate) fn prefix_matches(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() || prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_matches_slash_and_empty_only() {
        let p = CompiledPattern::compile("/");
        assert!(p.is_match("/"));
        assert!(p.is_match(""));
        assert!(!p.is_match("/x"));
    }

    #[test]
    fn named_param_extraction() {
        let p = CompiledPattern::compile("/users/:id");
        let params = p.matches("/users/42").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].0.as_ref(), "id");
        assert_eq!(params[0].1, "42");
        assert!(p.matches("/users").is_none());
        assert!(p.matches("/users/42/posts").is_none());
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        let p = CompiledPattern::compile("/users/:id");
        assert!(p.is_match("/users/42/"));
    }

    #[test]
    fn optional_param_absent_is_not_empty_string() {
        let p = CompiledPattern::compile("/items/:id?");
        let absent = p.matches("/items").unwrap();
        assert!(absent.is_empty());
        let present = p.matches("/items/7").unwrap();
        assert_eq!(present[0].1, "7");
    }

    #[test]
    fn wildcard_captures_remainder_anonymously() {
        let p = CompiledPattern::compile("/files/*");
        assert!(p.is_match("/files/a/b/c"));
        assert!(p.param_names().is_empty());
        assert!(p.matches("/files/a/b/c").unwrap().is_empty());
    }

    #[test]
    fn literal_metacharacters_are_escaped() {
        let p = CompiledPattern::compile("/v1.0/items");
        assert!(p.is_match("/v1.0/items"));
        assert!(!p.is_match("/v1x0/items"));
    }

    #[test]
    fn malformed_param_name_stays_literal() {
        let p = CompiledPattern::compile("/x/:bad-name");
        assert!(p.is_match("/x/:bad-name"));
        assert!(!p.is_match("/x/anything"));
        assert!(p.param_names().is_empty());
    }

    #[test]
    fn join_pattern_handles_root_and_slashes() {
        assert_eq!(join_pattern("/api/users", "/:id"), "/api/users/:id");
        assert_eq!(join_pattern("/api", "/"), "/api");
        assert_eq!(join_pattern("/", "/health"), "/health");
    }

    #[test]
    fn prefix_matches_respects_segment_boundary() {
        assert!(prefix_matches("/api", "/api"));
        assert!(prefix_matches("/api", "/api/anything"));
        assert!(!prefix_matches("/api", "/apix"));
        assert!(prefix_matches("/", "/anything"));
    }
}

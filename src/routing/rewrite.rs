//! Path prefix matching and stripping.
//!
//! # Design Decisions
//! - Literal, case-sensitive prefix comparison
//! - The prefix is removed at most once
//! - No `..` normalization and no percent-decoding; the raw path is used

use thiserror::Error;

/// Why a path prefix was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrefixError {
    #[error("'{0}' must start and end with '/'")]
    Unanchored(String),

    #[error("'{0}' must be a literal path")]
    NotLiteral(String),
}

/// Strips a fixed prefix from request paths.
#[derive(Debug, Clone)]
pub struct PathRewriter {
    prefix: String,
}

impl PathRewriter {
    /// Create a rewriter for the given prefix (e.g. `/proxy/`).
    ///
    /// The prefix doubles as a route, so it must be `/`-delimited and free
    /// of route syntax (`{`, `}`, `*`, `:`).
    pub fn new(prefix: impl Into<String>) -> Result<Self, PrefixError> {
        let prefix = prefix.into();
        if !prefix.starts_with('/') || !prefix.ends_with('/') {
            return Err(PrefixError::Unanchored(prefix));
        }
        if prefix.contains(['{', '}', '*', ':']) {
            return Err(PrefixError::NotLiteral(prefix));
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` starts with the prefix.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Returns the suffix after the prefix, or `path` unchanged when the
    /// prefix is absent.
    pub fn rewrite<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix(self.prefix.as_str()).unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_prefix() {
        let rewriter = PathRewriter::new("/proxy/").unwrap();
        assert!(rewriter.matches("/proxy/foo/bar"));
        assert_eq!(rewriter.rewrite("/proxy/foo/bar"), "foo/bar");
        assert_eq!(rewriter.rewrite("/proxy/a"), "a");
    }

    #[test]
    fn test_empty_suffix() {
        let rewriter = PathRewriter::new("/proxy/").unwrap();
        assert_eq!(rewriter.rewrite("/proxy/"), "");
    }

    #[test]
    fn test_strips_only_once() {
        let rewriter = PathRewriter::new("/proxy/").unwrap();
        assert_eq!(rewriter.rewrite("/proxy/proxy/x"), "proxy/x");
    }

    #[test]
    fn test_non_matching_path_unchanged() {
        let rewriter = PathRewriter::new("/proxy/").unwrap();
        for path in ["/other", "/proxy", "/PROXY/x", "/a/proxy/b", ""] {
            assert!(!rewriter.matches(path));
            assert_eq!(rewriter.rewrite(path), path);
        }
    }

    #[test]
    fn test_no_normalization() {
        let rewriter = PathRewriter::new("/proxy/").unwrap();
        assert_eq!(rewriter.rewrite("/proxy/../etc"), "../etc");
        assert_eq!(rewriter.rewrite("/proxy/a%2Fb"), "a%2Fb");
        assert_eq!(rewriter.rewrite("/proxy//double"), "/double");
    }

    #[test]
    fn test_rejects_unusable_prefix() {
        for prefix in ["", "proxy", "/proxy", "proxy/"] {
            assert_eq!(
                PathRewriter::new(prefix).unwrap_err(),
                PrefixError::Unanchored(prefix.to_string())
            );
        }
        for prefix in ["/{id}/", "/a/*/", "/a:b/"] {
            assert!(matches!(
                PathRewriter::new(prefix),
                Err(PrefixError::NotLiteral(_))
            ));
        }
        assert_eq!(PathRewriter::new("/").unwrap().rewrite("/a"), "a");
    }
}

//! Upstream target URL construction.
//!
//! The upstream base is fixed at startup. Per request only the path suffix
//! (and the query, if any) changes.

use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::Uri;
use thiserror::Error;

use crate::http::error::ForwardError;

/// Why an upstream base URL was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("'{0}' is not a URL")]
    Malformed(String),

    #[error("scheme must be http")]
    UnsupportedScheme,

    #[error("missing host")]
    MissingHost,

    #[error("must contain only scheme, host and port")]
    UnexpectedPath,
}

/// The fixed upstream (scheme + authority) every request is forwarded to.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: Scheme,
    authority: Authority,
}

impl UpstreamTarget {
    /// Parse a base such as `http://localhost:5001`.
    pub fn from_base_url(raw: &str) -> Result<Self, TargetError> {
        let uri: Uri = raw
            .parse()
            .map_err(|_| TargetError::Malformed(raw.to_string()))?;

        if uri.scheme() != Some(&Scheme::HTTP) {
            return Err(TargetError::UnsupportedScheme);
        }
        let authority = uri.authority().cloned().ok_or(TargetError::MissingHost)?;
        if authority.host().is_empty() {
            return Err(TargetError::MissingHost);
        }
        if let Some(pq) = uri.path_and_query() {
            if pq.as_str() != "/" {
                return Err(TargetError::UnexpectedPath);
            }
        }

        Ok(Self {
            scheme: Scheme::HTTP,
            authority,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Build `<base>/<suffix>[?query]`. An empty suffix targets the root.
    pub fn resolve(&self, suffix: &str, query: Option<&str>) -> Result<Uri, ForwardError> {
        let raw = match query {
            Some(q) => format!("/{suffix}?{q}"),
            None => format!("/{suffix}"),
        };

        let path_and_query = PathAndQuery::try_from(raw.as_str()).map_err(|e| {
            ForwardError::InvalidTarget {
                target: format!("{}://{}{}", self.scheme, self.authority, raw),
                reason: e.to_string(),
            }
        })?;

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
            .map_err(|e| ForwardError::InvalidTarget {
                target: format!("{}://{}{}", self.scheme, self.authority, raw),
                reason: e.to_string(),
            })
    }
}

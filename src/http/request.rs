//! Outbound request construction.
//!
//! # Responsibilities
//! - Carry the inbound method and body stream over unchanged
//! - Copy every header value, keeping duplicates and their order
//! - Point the request at the resolved upstream URI
//!
//! # Design Decisions
//! - The body is passed through as a stream, never buffered here
//! - `Host` is left to the client, which derives it from the upstream authority
//! - Headers are appended, never inserted, so multi-value keys survive

use axum::body::Body;
use axum::http::{header, request::Parts, HeaderMap, Request, Uri};

use crate::http::error::ForwardError;

/// Append every (name, value) pair of `src` onto `dst`, except `Host`.
pub fn copy_headers(src: &HeaderMap, dst: &mut HeaderMap) {
    for (name, value) in src.iter() {
        if name == header::HOST {
            continue;
        }
        dst.append(name.clone(), value.clone());
    }
}

/// Build the request sent upstream from the inbound request parts.
pub fn build_upstream_request(
    parts: &Parts,
    body: Body,
    uri: Uri,
) -> Result<Request<Body>, ForwardError> {
    let mut builder = Request::builder().method(parts.method.clone()).uri(uri);

    if let Some(headers) = builder.headers_mut() {
        copy_headers(&parts.headers, headers);
    }

    Ok(builder.body(body)?)
}

//! Response relay.
//!
//! # Responsibilities
//! - Copy the upstream status code verbatim
//! - Force the configured Content-Type, discarding whatever upstream declared
//! - Copy the buffered upstream body verbatim
//!
//! # Design Decisions
//! - Upstream headers are not propagated; only status and body matter
//! - The body has been fully read before this point

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;

/// Build the client-facing response from a fully buffered upstream response.
pub fn relay(status: StatusCode, content_type: &HeaderValue, body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type.clone());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_relay_copies_status_and_body() {
        let json = HeaderValue::from_static("application/json");
        let response = relay(StatusCode::CREATED, &json, Bytes::from_static(b"{\"id\":1}"));

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"{\"id\":1}");
    }

    #[test]
    fn test_relay_sets_single_content_type() {
        let json = HeaderValue::from_static("application/json");
        let response = relay(StatusCode::NOT_FOUND, &json, Bytes::from_static(b"not json"));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get_all(header::CONTENT_TYPE).iter().count(), 1);
        assert_eq!(response.headers().len(), 1);
    }
}

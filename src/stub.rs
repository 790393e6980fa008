//! Upstream stub: a latency simulator to put behind the proxy.
//!
//! Answers every method on every path, after an optional fixed delay, with
//! HTTP 200 and a fixed JSON body.

use std::time::Duration;

use axum::{
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use humanize_rs::ParseError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

/// Body returned for every request.
pub const TASK_COMPLETED: &str = r#"{"message": "task completed"}"#;

#[derive(Debug, Error)]
pub enum DelayError {
    #[error("invalid delay '{value}': {reason}")]
    Invalid { value: String, reason: String },
}

/// Parse a delay such as `250ms`, `1.5s` or `1h2m`.
///
/// Empty means no delay. A bare number is rejected unless it is `0`. A
/// negative delay is accepted and means no delay.
pub fn parse_delay(raw: &str) -> Result<Duration, DelayError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(Duration::ZERO);
    }

    let (negative, magnitude) = match value.as_bytes()[0] {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };

    let parsed = match humanize_rs::duration::parse(magnitude) {
        _ if magnitude.is_empty() => Err("missing value".to_string()),
        Ok(d) => Ok(d),
        Err(ParseError::MissingUnit) if magnitude == "0" => Ok(Duration::ZERO),
        Err(ParseError::MissingUnit) => Err("missing unit".to_string()),
        Err(e) => parse_fractional(magnitude).ok_or_else(|| e.to_string()),
    };

    match parsed {
        Ok(_) if negative => Ok(Duration::ZERO),
        Ok(d) => Ok(d),
        Err(reason) => Err(DelayError::Invalid {
            value: value.to_string(),
            reason,
        }),
    }
}

/// Accepts unit segments with a decimal fraction, e.g. `1.5s` or `0.5h10m`.
fn parse_fractional(value: &str) -> Option<Duration> {
    if value.is_empty() {
        return None;
    }

    let mut total = Duration::ZERO;
    let mut rest = value;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_secs = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "\u{b5}s" | "\u{3bc}s" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        rest = &rest[unit_len..];

        total += Duration::try_from_secs_f64(number * unit_secs).ok()?;
    }

    Some(total)
}

/// The stub server.
#[derive(Debug, Clone)]
pub struct StubServer {
    delay: Duration,
    log_enabled: bool,
}

impl StubServer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            log_enabled: true,
        }
    }

    /// Turn per-request log lines on or off.
    pub fn log_enabled(mut self, enabled: bool) -> Self {
        self.log_enabled = enabled;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn router(&self) -> Router {
        let delay = self.delay;
        let log_enabled = self.log_enabled;

        Router::new()
            .fallback(move |uri: Uri| complete_task(uri, delay, log_enabled))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, delay = ?self.delay, "Upstream stub starting");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Upstream stub stopped");
        Ok(())
    }
}

async fn complete_task(uri: Uri, delay: Duration, log_enabled: bool) -> impl IntoResponse {
    if log_enabled {
        tracing::info!(path = %uri, "Incoming request at target server");
    }
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        TASK_COMPLETED,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use std::time::Instant;
    use tower::ServiceExt;

    #[test]
    fn test_parse_delay() {
        assert_eq!(parse_delay("").unwrap(), Duration::ZERO);
        assert_eq!(parse_delay("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_delay("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_delay("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_delay("1h2m").unwrap(), Duration::from_secs(3720));
    }

    #[test]
    fn test_parse_delay_fractional() {
        assert_eq!(parse_delay("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_delay(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_delay("1.5h30m").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_delay("+2s").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn test_negative_delay_is_zero() {
        assert_eq!(parse_delay("-1s").unwrap(), Duration::ZERO);
        assert_eq!(parse_delay("-2.5m").unwrap(), Duration::ZERO);
        assert_eq!(parse_delay("-0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_delay_rejects_garbage() {
        for raw in ["5", "-5", "abc", ".", "1.5", "1.5x", "10 parsecs", "s", "-"] {
            let err = parse_delay(raw).unwrap_err();
            assert!(err.to_string().contains("invalid delay"), "{raw}");
        }
    }

    #[tokio::test]
    async fn test_any_method_any_path() {
        let stub = StubServer::new(Duration::ZERO).log_enabled(false);
        for (method, path) in [
            (Method::GET, "/"),
            (Method::POST, "/foo/bar"),
            (Method::DELETE, "/x?y=z"),
        ] {
            let response = stub
                .router()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(path)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).unwrap(),
                "application/json"
            );
            let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
            assert_eq!(&body[..], TASK_COMPLETED.as_bytes());
        }
    }

    #[tokio::test]
    async fn test_delay_is_applied() {
        let stub = StubServer::new(Duration::from_millis(150)).log_enabled(false);
        let started = Instant::now();
        let response = stub
            .router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}

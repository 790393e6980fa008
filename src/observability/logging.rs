//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for a process
//! - Emit one completion line per forwarded request
//!
//! # Design Decisions
//! - Request logging goes through an injected [`RequestLogger`]
//! - Disabled logging means [`NoopLogger`], never a global switch checked in the handler
//! - Log level from `RUST_LOG`, falling back to the configured level

use std::time::Duration;

use axum::http::{Method, StatusCode, Uri};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::http::error::ForwardError;

/// How a request cycle ended.
#[derive(Debug)]
pub enum Outcome<'a> {
    /// Upstream response relayed with this status.
    Relayed(StatusCode),
    /// Request failed and an HTTP 500 was returned.
    Failed(&'a ForwardError),
}

/// Everything known about a request once it is done.
#[derive(Debug)]
pub struct Completion<'a> {
    pub request_id: &'a str,
    pub method: &'a Method,
    /// Resolved upstream URI; absent when it could not be built.
    pub target: Option<&'a Uri>,
    pub elapsed: Duration,
    pub outcome: Outcome<'a>,
}

/// Sink for per-request completion records.
pub trait RequestLogger: Send + Sync + std::fmt::Debug {
    fn completed(&self, completion: &Completion<'_>);
}

/// Writes completions as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn completed(&self, c: &Completion<'_>) {
        let target = c
            .target
            .map(|t| t.to_string())
            .unwrap_or_else(|| "<unresolved>".to_string());

        match c.outcome {
            Outcome::Relayed(status) => tracing::info!(
                request_id = %c.request_id,
                method = %c.method,
                target = %target,
                status = status.as_u16(),
                elapsed_ms = c.elapsed.as_millis() as u64,
                "Request to {} forwarded and completed in {:?}",
                target,
                c.elapsed
            ),
            Outcome::Failed(error) => tracing::warn!(
                request_id = %c.request_id,
                method = %c.method,
                target = %target,
                failure = error.class().as_str(),
                error = %error,
                elapsed_ms = c.elapsed.as_millis() as u64,
                "Request to {} failed after {:?}",
                target,
                c.elapsed
            ),
        }
    }
}

/// Discards every completion.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl RequestLogger for NoopLogger {
    fn completed(&self, _completion: &Completion<'_>) {}
}

/// Install the global subscriber: `RUST_LOG` if set, otherwise `level` for
/// this crate and tower_http.
pub fn init_tracing(level: &str) {
    let fallback = format!("forward_proxy={level},tower_http={level}");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

//! The forwarding handler.
//!
//! # Data Flow
//! ```text
//! Received
//!     → PathRewritten        (routing::PathRewriter)
//!     → UpstreamDispatched   (request.rs + shared client, bounded by a Deadline)
//!     → ResponseRelayed | ErrorReturned
//!     → Logged               (injected RequestLogger)
//! ```
//!
//! No state is kept between requests. The client is a cheap handle shared
//! read-only by every task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::header::InvalidHeaderValue;
use axum::http::{request::Parts, HeaderName, HeaderValue, Request, Uri};
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::error::ForwardError;
use crate::http::request::build_upstream_request;
use crate::http::response::relay;
use crate::observability::metrics;
use crate::observability::{Completion, Outcome, RequestLogger};
use crate::resilience::Deadline;
use crate::routing::{PathRewriter, PrefixError, TargetError, UpstreamTarget};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Shared upstream client. Default pooling, no timeout of its own.
pub type UpstreamClient = Client<HttpConnector, Body>;

pub type UpstreamResponse = hyper::Response<Incoming>;

/// Why a [`Forwarder`] could not be built from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("forwarding.path_prefix: {0}")]
    Prefix(#[from] PrefixError),

    #[error("upstream.base_url: {0}")]
    Target(#[from] TargetError),

    #[error("forwarding.content_type: {0}")]
    ContentType(#[from] InvalidHeaderValue),
}

/// Forwards requests under a prefix to one fixed upstream.
#[derive(Debug, Clone)]
pub struct Forwarder {
    rewriter: PathRewriter,
    target: UpstreamTarget,
    client: UpstreamClient,
    content_type: HeaderValue,
    timeout: Duration,
    logger: Arc<dyn RequestLogger>,
}

impl Forwarder {
    pub fn from_config(
        config: &ProxyConfig,
        logger: Arc<dyn RequestLogger>,
    ) -> Result<Self, SetupError> {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            rewriter: PathRewriter::new(config.forwarding.path_prefix.clone())?,
            target: UpstreamTarget::from_base_url(&config.upstream.base_url)?,
            client,
            content_type: HeaderValue::from_str(&config.forwarding.content_type)?,
            timeout: config.upstream.request_timeout(),
            logger,
        })
    }

    pub fn prefix(&self) -> &str {
        self.rewriter.prefix()
    }

    /// Run one full forwarding cycle. Never fails: errors become HTTP 500.
    pub async fn forward(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let (parts, body) = request.into_parts();

        tracing::debug!(
            request_id = %request_id,
            method = %parts.method,
            path = %parts.uri.path(),
            "Forwarding request"
        );

        let mut resolved = None;
        let result = self.exchange(&parts, body, &mut resolved).await;
        let elapsed = start.elapsed();

        match result {
            Ok(response) => {
                let status = response.status();
                self.logger.completed(&Completion {
                    request_id: &request_id,
                    method: &parts.method,
                    target: resolved.as_ref(),
                    elapsed,
                    outcome: Outcome::Relayed(status),
                });
                metrics::record_request(parts.method.as_str(), status.as_u16(), start);
                response
            }
            Err(error) => {
                self.logger.completed(&Completion {
                    request_id: &request_id,
                    method: &parts.method,
                    target: resolved.as_ref(),
                    elapsed,
                    outcome: Outcome::Failed(&error),
                });
                metrics::record_failure(error.class().as_str());
                metrics::record_request(parts.method.as_str(), error.status().as_u16(), start);
                error.into_response()
            }
        }
    }

    async fn exchange(
        &self,
        parts: &Parts,
        body: Body,
        resolved: &mut Option<Uri>,
    ) -> Result<Response, ForwardError> {
        let suffix = self.rewriter.rewrite(parts.uri.path());
        let uri = self.target.resolve(suffix, parts.uri.query())?;
        *resolved = Some(uri.clone());

        let outbound = build_upstream_request(parts, body, uri)?;

        let deadline = Deadline::after(self.timeout);
        let upstream = self.dispatch(outbound, &deadline).await?;
        let status = upstream.status();
        let bytes = read_body(upstream, &deadline).await?;

        Ok(relay(status, &self.content_type, bytes))
    }

    async fn dispatch(
        &self,
        outbound: Request<Body>,
        deadline: &Deadline,
    ) -> Result<UpstreamResponse, ForwardError> {
        let response = deadline
            .run(self.client.request(outbound))
            .await
            .map_err(|_| ForwardError::DispatchTimeout(deadline.budget()))??;
        Ok(response)
    }
}

/// Buffer the whole upstream body, within what is left of the deadline.
async fn read_body(upstream: UpstreamResponse, deadline: &Deadline) -> Result<Bytes, ForwardError> {
    deadline
        .run(axum::body::to_bytes(Body::new(upstream.into_body()), usize::MAX))
        .await
        .map_err(|_| ForwardError::RelayTimeout(deadline.budget()))?
        .map_err(ForwardError::Relay)
}

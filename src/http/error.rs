//! Request-scoped forwarding errors.
//!
//! Every variant is handled inside the handler and turned into an HTTP 500
//! with a short plain-text reason. The `Display` text carries the detail and
//! is only logged.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Where in the forwarding cycle a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The outbound request could not be built; upstream was not contacted.
    Construction,
    /// The upstream could not be reached or did not answer in time.
    Dispatch,
    /// The upstream answered but its body could not be read.
    Relay,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::Construction => "construction",
            FailureClass::Dispatch => "dispatch",
            FailureClass::Relay => "relay",
        }
    }

    /// Fixed reason sent to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            FailureClass::Construction => "Failed to create request",
            FailureClass::Dispatch => "Failed to forward request",
            FailureClass::Relay => "Failed to read response",
        }
    }
}

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream target {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("failed to build upstream request: {0}")]
    Construction(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Dispatch(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    DispatchTimeout(Duration),

    #[error("failed to read upstream response body: {0}")]
    Relay(#[source] axum::Error),

    #[error("upstream response body not received within {0:?}")]
    RelayTimeout(Duration),
}

impl ForwardError {
    pub fn class(&self) -> FailureClass {
        match self {
            ForwardError::InvalidTarget { .. } | ForwardError::Construction(_) => {
                FailureClass::Construction
            }
            ForwardError::Dispatch(_) | ForwardError::DispatchTimeout(_) => FailureClass::Dispatch,
            ForwardError::Relay(_) | ForwardError::RelayTimeout(_) => FailureClass::Relay,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (self.status(), self.class().public_message()).into_response()
    }
}

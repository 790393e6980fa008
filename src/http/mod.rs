//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, route on the prefix)
//!     → forward.rs (one forwarding cycle per request)
//!         → request.rs (outbound request: method, body stream, headers)
//!         → response.rs (status + forced content-type + buffered body)
//!         → error.rs (failures mapped to HTTP 500)
//!     → Send to client
//! ```

pub mod error;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use error::{FailureClass, ForwardError};
pub use forward::{Forwarder, SetupError, X_REQUEST_ID};
pub use server::HttpServer;

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarding handler produces:
//!     → logging.rs (one completion record per request, via RequestLogger)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr/stdout through the tracing subscriber
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every log event
//! - Request ID flows from the inbound header into logs and upstream
//! - Logging and metrics never influence the response

pub mod logging;
pub mod metrics;

pub use logging::{Completion, NoopLogger, Outcome, RequestLogger, TracingLogger};

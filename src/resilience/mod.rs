//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (one deadline for connect, send, head and body)
//!     → On expiry: surfaced as a request-scoped failure (HTTP 500)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No retries and no circuit breaking: one inbound request, one upstream call

pub mod timeouts;

pub use timeouts::Deadline;

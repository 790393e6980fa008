//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path (+ query)
//!     → rewrite.rs (strip the fixed prefix)
//!     → target.rs (join suffix onto the fixed upstream base)
//!     → Return: absolute upstream URI
//! ```
//!
//! # Design Decisions
//! - A single fixed upstream; no dynamic routing or host matching
//! - Built once at startup, immutable at runtime (thread-safe without locks)
//! - Deterministic: the same inbound path always yields the same target

pub mod rewrite;
pub mod target;

pub use rewrite::{PathRewriter, PrefixError};
pub use target::{TargetError, UpstreamTarget};

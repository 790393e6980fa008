//! Single-hop HTTP forwarding proxy and its upstream stub.

pub mod config;
pub mod http;
pub mod routing;
pub mod observability;
pub mod resilience;
pub mod lifecycle;
pub mod stub;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use stub::StubServer;

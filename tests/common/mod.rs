//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode, Uri};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use forward_proxy::observability::{Completion, Outcome, RequestLogger};
use forward_proxy::{HttpServer, ProxyConfig, Shutdown, StubServer};

/// A request as seen by a capture backend.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Captured {
    pub fn values(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }
}

pub type Seen = Arc<Mutex<Vec<Captured>>>;

/// A loopback address nothing is listening on.
pub fn free_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start the upstream stub with the given delay.
pub async fn start_stub(delay: Duration) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = StubServer::new(delay).log_enabled(false).run(listener, rx).await;
    });
    (addr, shutdown)
}

/// Start a backend that records every request and answers with a fixed
/// status, content type and body.
pub async fn start_capture_backend(
    status: StatusCode,
    content_type: &'static str,
    body: &'static str,
) -> (SocketAddr, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let record = seen.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let record = record.clone();
        async move {
            let (parts, inbound) = request.into_parts();
            let bytes = axum::body::to_bytes(inbound, usize::MAX)
                .await
                .unwrap_or_default();
            record.lock().unwrap().push(Captured {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body: bytes,
            });
            (status, [(header::CONTENT_TYPE, content_type)], body)
        }
    });

    (serve(app).await, seen)
}

/// Start a raw TCP backend that reads the request, writes `response`
/// verbatim, then holds the connection open for `hold` before closing it.
pub async fn start_raw_backend(response: &'static str, hold: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket.write_all(response.as_bytes()).await;
                        tokio::time::sleep(hold).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Config pointing at `upstream` with the given timeout.
pub fn proxy_config(upstream: SocketAddr, timeout_secs: u64) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = format!("http://{upstream}");
    config.upstream.request_timeout_secs = timeout_secs;
    config.observability.log_enabled = false;
    config
}

/// Start the proxy and return its address.
pub async fn start_proxy(config: ProxyConfig, logger: Option<Arc<dyn RequestLogger>>) -> (SocketAddr, Shutdown) {
    let server = match logger {
        Some(logger) => HttpServer::with_logger(config, logger).unwrap(),
        None => HttpServer::new(config).unwrap(),
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

/// One entry per completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub target: Option<String>,
    pub status: Option<u16>,
    pub failure: Option<&'static str>,
}

/// Logger that keeps every completion in memory.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    pub records: Mutex<Vec<Record>>,
}

impl RequestLogger for RecordingLogger {
    fn completed(&self, c: &Completion<'_>) {
        let (status, failure) = match c.outcome {
            Outcome::Relayed(status) => (Some(status.as_u16()), None),
            Outcome::Failed(error) => (None, Some(error.class().as_str())),
        };
        self.records.lock().unwrap().push(Record {
            target: c.target.map(|t| t.to_string()),
            status,
            failure,
        });
    }
}

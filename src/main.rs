//! Forwarding proxy binary.
//!
//! ```text
//! client ──▶ forward-proxy (:5000, /proxy/*) ──▶ upstream (:5001) ──┐
//!   ▲                                                               │
//!   └──────────── status + body, Content-Type: application/json ◀───┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::Parser;
use tokio::net::TcpListener;

use forward_proxy::config::validation::validate_config;
use forward_proxy::config::{load_config, ConfigError, ProxyConfig};
use forward_proxy::lifecycle::{shutdown_signal, Shutdown};
use forward_proxy::observability::{logging, metrics};
use forward_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "forward-proxy")]
#[command(about = "Forward requests under a path prefix to a fixed upstream", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when absent.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:5000.
    #[arg(long, env = "PROXY_BIND")]
    bind: Option<String>,

    /// Upstream base URL, e.g. http://localhost:5001.
    #[arg(long, env = "PROXY_UPSTREAM")]
    upstream: Option<String>,

    /// Overall upstream timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Disable all logging. Any value other than a falsey one (`0`, `false`,
    /// `no`, `off`, empty) counts as set.
    #[arg(long, env = "NO_LOG", value_parser = FalseyValueParser::new())]
    no_log: bool,
}

impl Cli {
    fn apply(&self, config: &mut ProxyConfig) {
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(upstream) = &self.upstream {
            config.upstream.base_url = upstream.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.upstream.request_timeout_secs = secs;
        }
        if self.no_log {
            config.observability.log_enabled = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    // Without a subscriber every event is dropped.
    if config.observability.log_enabled {
        logging::init_tracing(&config.observability.log_level);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.upstream.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on(shutdown_signal());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

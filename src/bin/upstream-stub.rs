//! Upstream stub binary: sleeps for `DELAY`, then answers
//! `{"message": "task completed"}`.

use std::time::Duration;

use clap::builder::FalseyValueParser;
use clap::Parser;
use tokio::net::TcpListener;

use forward_proxy::lifecycle::{shutdown_signal, Shutdown};
use forward_proxy::observability::logging;
use forward_proxy::stub::{parse_delay, StubServer};

#[derive(Parser)]
#[command(name = "upstream-stub")]
#[command(about = "Fixed-response upstream with simulated latency", long_about = None)]
struct Cli {
    /// Listen address.
    #[arg(long, env = "STUB_BIND", default_value = "0.0.0.0:5001")]
    bind: String,

    /// Delay before every response, e.g. 250ms, 2s, 1h2m.
    #[arg(long, env = "DELAY", value_parser = parse_delay_arg)]
    delay: Option<Duration>,

    /// Disable all logging. Any value other than a falsey one (`0`, `false`,
    /// `no`, `off`, empty) counts as set.
    #[arg(long, env = "NO_LOG", value_parser = FalseyValueParser::new())]
    no_log: bool,

    /// Log level when logging is enabled.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_delay_arg(raw: &str) -> Result<Duration, String> {
    parse_delay(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // An invalid DELAY is rejected here, before anything is bound.
    let cli = Cli::parse();

    if !cli.no_log {
        logging::init_tracing(&cli.log_level);
    }

    let listener = TcpListener::bind(&cli.bind).await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on(shutdown_signal());

    StubServer::new(cli.delay.unwrap_or(Duration::ZERO))
        .log_enabled(!cli.no_log)
        .run(listener, shutdown.subscribe())
        .await?;

    Ok(())
}

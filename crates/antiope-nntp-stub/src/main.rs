use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use antiope_nntp_stub::{StubConfig, StubServer, load_fixtures};

#[derive(Parser, Debug)]
#[command(
    name = "antiope-nntp-stub",
    about = "Minimal NNTP-over-websocket stub server for integration tests"
)]
struct Args {
    #[arg(long, default_value = "127.0.0.1:8119")]
    bind: std::net::SocketAddr,

    #[arg(long, default_value = "fixtures/nntp/groups-basic.json")]
    fixtures: PathBuf,

    #[arg(long, default_value_t = 0)]
    chunk_size: usize,

    #[arg(long, default_value_t = 0)]
    disconnect_after: usize,

    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let fixtures = load_fixtures(&args.fixtures)?;
    let config = StubConfig {
        bind: args.bind,
        chunk_size: args.chunk_size,
        disconnect_after: args.disconnect_after,
        delay_ms: args.delay_ms,
    };
    let server = StubServer::new(config, fixtures);
    tracing::info!(bind = %args.bind, "NNTP stub listening");
    server.serve().await?;
    Ok(())
}

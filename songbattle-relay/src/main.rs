use std::net::SocketAddr;

use anyhow::Context as _;
use clap::Parser;
use songbattle_catalog::Client;
use songbattle_relay::{RelayState, build_router};

/// Relays playlist lookups to the catalog for browser clients.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "SONGBATTLE_RELAY_PORT", default_value_t = 5000)]
    port: u16,

    /// Address to bind.
    #[arg(long, env = "SONGBATTLE_RELAY_HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,

    /// Base URL of the upstream catalog API.
    #[arg(long, env = "SONGBATTLE_UPSTREAM", default_value = Client::DEFAULT_API_BASE_URL)]
    upstream: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    tracing::info!(
        "Starting songbattle-relay v{} (upstream {})",
        env!("CARGO_PKG_VERSION"),
        args.upstream
    );

    let app = build_router(RelayState::new(args.upstream));

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

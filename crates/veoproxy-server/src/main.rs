//! Server binary: bind the proxy router and serve it.

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use veoproxy_core::{VeoClient, VeoConfig};
use veoproxy_server::{build_router, ApiState};

#[derive(Debug, Parser)]
#[command(name = "veoproxy-server")]
#[command(about = "Thin proxy in front of the Veo video generation API")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine; the environment may be set directly
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("veoproxy=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = VeoConfig::from_env();

    let state = Arc::new(ApiState {
        client: VeoClient::new(config),
    });
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("invalid bind address")?;
    info!(%addr, "video proxy listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

//! qr-mcp-server: MCP streaming gateway for the Qricambi REST API
//!
//! Exposes the Qricambi tools over SSE:
//!   qr-mcp-server                     # bind from PORT (default 8080)
//!   qr-mcp-server --bind 0.0.0.0:9000
//!
//! Configuration comes from the environment:
//!   QRICAMBI_BEARER   bearer token for the upstream API (required per call)
//!   QRICAMBI_API_URL  upstream base URL (default https://api.qricambi.com)
//!   PORT              listening port when --bind is not given

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use qr_api::QricambiClient;
use qr_core::GatewayConfig;
use qr_mcp::http::{create_router, AppState};
use qr_mcp::ToolRouter;

#[derive(Parser, Debug)]
#[command(name = "qr-mcp-server")]
#[command(about = "MCP streaming gateway for the Qricambi REST API")]
struct Args {
    /// Bind address (host:port); falls back to 0.0.0.0:$PORT
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qr_mcp=info".parse()?)
                .add_directive("qr_api=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let args = Args::parse();

    // Read the environment exactly once; everything downstream gets a handle.
    let config = Arc::new(GatewayConfig::from_env());
    let bind = args
        .bind
        .unwrap_or_else(|| format!("0.0.0.0:{}", config.port));

    let api = Arc::new(QricambiClient::new(config));
    let router = Arc::new(ToolRouter::new(api));
    let app = create_router(AppState::new(router));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!(
        addr = %bind,
        server = qr_mcp::SERVER_NAME,
        version = qr_mcp::SERVER_VERSION,
        "Qricambi MCP gateway listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

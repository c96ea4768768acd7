
use std::net::SocketAddr;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const RUNNING: &str = "Bot is running!";

async fn liveness() -> &'static str {
    RUNNING
}

/// Liveness endpoint for uptime monitors; exposes no business data.
pub fn router() -> Router {
    Router::new()
        .route("/", get(liveness))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(address: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Could not listen on {address}"))?;

    info!("Liveness endpoint listening on {address}");

    axum::serve(listener, router()).await?;

    Ok(())
}

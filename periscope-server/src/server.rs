use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::hub::Hub;
use crate::signaling::ws_handler;

/// Build the router around a hub.
pub fn app(hub: Hub) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(hub)
}

/// Bind the configured port and serve until ctrl-c.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    if config.tls_cert.is_some() || config.tls_key.is_some() {
        warn!("TLS cert/key configured; terminate TLS at a fronting proxy, this process serves plain ws");
    }

    let hub = Hub::new(&config);
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Signaling server listening on {}", listener.local_addr()?);

    axum::serve(listener, app(hub))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Serve on an already-bound listener. Tests use this with port 0.
pub async fn serve(listener: TcpListener, hub: Hub) -> std::io::Result<()> {
    axum::serve(listener, app(hub)).await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down");
}

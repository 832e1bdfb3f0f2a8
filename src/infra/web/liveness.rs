// Liveness endpoint - one route so the hosting platform can see the process
// is alive.

use axum::routing::any;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Build the liveness router: any method on `/` answers 200.
pub fn router() -> Router {
    Router::new().route("/", any(home))
}

async fn home() -> &'static str {
    "Bot is running!"
}

/// Bind all interfaces on `port` and serve until the process exits.
pub async fn serve(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Liveness endpoint listening on {}", addr);
    axum::serve(listener, router()).await
}

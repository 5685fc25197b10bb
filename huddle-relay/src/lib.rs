mod room;
mod ws;

pub use room::{JoinError, RoomRegistry};

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;

/// The relay's single route: a WebSocket endpoint at `/`.
pub fn router(registry: RoomRegistry) -> Router {
    Router::new()
        .route("/", get(ws::ws_handler))
        .with_state(registry)
}

/// Serves a fresh relay on an already-bound listener. Used by the binary
/// and by integration tests, which bind port 0.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    axum::serve(listener, router(RoomRegistry::new())).await
}

//! Server lifecycle: bind, serve, drain on shutdown.

use std::future::Future;
use std::net::SocketAddr;

use tracing::{info, warn};

use crate::{error::ServiceError, routes, state::AppState};

/// Bind `addr` and serve until `shutdown` resolves.
///
/// In-flight requests are drained before the future completes. The caller
/// owns the shutdown condition; the daemon passes a signal listener.
pub async fn serve_with_shutdown(
    addr: SocketAddr,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServiceError> {
    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServiceError::Bind(addr, e))?;
    info!(%addr, "digest service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("digest service stopped");
    Ok(())
}

/// Serve until ctrl-c.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), ServiceError> {
    serve_with_shutdown(addr, state, async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutdown signal received"),
            Err(e) => warn!(error = %e, "failed to listen for shutdown signal"),
        }
    })
    .await
}

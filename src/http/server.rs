//! Router construction and the serve loop.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::exec::CommandRunner;
use crate::http::handlers;
use crate::state::ConfigState;
use crate::store::Store;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Application state injected into handlers.
pub struct AppState<S, R> {
    pub config: Arc<ConfigState<S, R>>,
}

impl<S, R> Clone for AppState<S, R> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
        }
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router<S: Store, R: CommandRunner>(state: AppState<S, R>) -> Router {
    Router::new()
        .route("/v1/status", get(handlers::get_status::<S, R>))
        .route(
            "/v1/render",
            get(handlers::get_render::<S, R>).post(handlers::post_render::<S, R>),
        )
        .route(
            "/v1/config",
            get(handlers::get_config::<S, R>)
                .post(handlers::post_config::<S, R>)
                .put(handlers::put_config::<S, R>)
                .delete(handlers::delete_config::<S, R>),
        )
        .route(
            "/v1/config/{*path}",
            get(handlers::get_config::<S, R>)
                .post(handlers::post_config::<S, R>)
                .put(handlers::put_config::<S, R>)
                .delete(handlers::delete_config::<S, R>),
        )
        .with_state(state)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
}

/// Run the server, accepting connections on the given listener.
pub async fn serve<S: Store, R: CommandRunner>(
    listener: TcpListener,
    state: AppState<S, R>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}

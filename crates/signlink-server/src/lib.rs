pub mod error;
pub mod extract;
pub mod housekeeping;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use signlink_core::config::Config;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Request bodies carry base64 (4/3 expansion) plus JSON framing.
fn body_limit(max_image_bytes: usize) -> usize {
    max_image_bytes / 3 * 4 + 64 * 1024
}

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf, config: Config) -> Router {
    let limit = body_limit(config.max_image_bytes);
    let app_state = state::AppState::new(root, config);

    // The coordinator runs inside a third-party page, so any origin may call.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/signatures", post(routes::signatures::store_signature))
        .route(
            "/api/signatures/finalize",
            post(routes::signatures::finalize_signature),
        )
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the signature server.
pub async fn serve(root: PathBuf, config: Config, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, config, listener).await
}

/// Start the signature server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    config: Config,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    if let Err(e) = config.require_remote() {
        tracing::warn!("{e}; finalize requests will be refused");
    }
    let app = build_router(root, config);

    tracing::info!("signlink server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}

//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression, the ask
//! rate limit, and all endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use agro_core::error::AgroError;

use crate::handlers;
use crate::rate_limit::limit_asks;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The page is served from the same origin; also allow the localhost alias.
    let port = state.config.general.port;
    let origins: Vec<HeaderValue> = ["127.0.0.1", "localhost"]
        .iter()
        .filter_map(|host| format!("http://{}:{}", host, port).parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let ask_routes = Router::new()
        .route("/api/sessions/{id}/ask", post(handlers::ask))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), limit_asks));

    Router::new()
        .route("/", get(handlers::page))
        .route("/health", get(handlers::health))
        .route("/api/crops", get(handlers::crops))
        .route("/api/sessions", post(handlers::create_session))
        .route(
            "/api/sessions/{id}",
            get(handlers::get_session).delete(handlers::end_session),
        )
        .route("/api/sessions/{id}/crop", put(handlers::select_crop))
        .merge(ask_routes)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
///
/// Binds to 127.0.0.1 (localhost only) on `port`.
pub async fn start_server(port: u16, state: AppState) -> Result<(), AgroError> {
    let addr = format!("127.0.0.1:{}", port);
    let router = create_router(state);

    tracing::info!("Starting crop advisor on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AgroError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .await
        .map_err(AgroError::Io)?;

    Ok(())
}

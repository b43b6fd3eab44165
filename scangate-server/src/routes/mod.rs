use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderName,
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{health_handler, scan_handler},
    infra::app_state::AppState,
    mcp::transport::{SESSION_HEADER, delete_handler, post_handler, sse_handler},
    middleware::enforce_body_limit,
};

/// Full application router: REST scan surface plus the MCP endpoint.
pub fn create_app(state: AppState) -> Router {
    let session_header = HeaderName::from_static(SESSION_HEADER);
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([session_header]);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/scan", post(scan_handler))
        .route(
            "/mcp",
            post(post_handler).get(sse_handler).delete(delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_body_limit,
        ))
        // The limit is configured, so axum's fixed 2 MiB default is off.
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

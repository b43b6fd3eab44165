use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::infra::{app_state::AppState, errors::AppError};

/// Reject request bodies above `limits.max_body_bytes` before any handler
/// parses them.
///
/// A declared `Content-Length` over the limit is refused without reading;
/// otherwise the body is buffered up to the limit and handed on.
pub async fn enforce_body_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limit = state.config.limits.max_body_bytes;

    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.trim().parse::<u64>().ok());
    if let Some(length) = declared
        && length > limit as u64
    {
        debug!(length, limit, path = %request.uri().path(), "declared body too large");
        return Err(AppError::payload_too_large(limit));
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, limit).await.map_err(|err| {
        debug!(error = %err, limit, "request body rejected while buffering");
        AppError::payload_too_large(limit)
    })?;

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

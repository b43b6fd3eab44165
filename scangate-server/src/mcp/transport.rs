//! Streamable-HTTP transport: `POST /mcp` for JSON-RPC messages, `GET /mcp`
//! for the server-to-client event stream, `DELETE /mcp` to end a session.

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
};
use serde_json::Value;
use tokio_stream::{
    StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};
use tracing::{debug, warn};
use scangate_core::ProfileManager;
use uuid::Uuid;

use super::{
    SessionCloseGuard,
    dispatch::{dispatch, handle_notification},
    protocol::{JsonRpcMessage, JsonRpcResponse, RpcError},
    session::McpSession,
};
use crate::infra::app_state::AppState;

pub const SESSION_HEADER: &str = "mcp-session-id";

const SSE_KEEP_ALIVE: Duration = Duration::from_secs(30);

enum SessionLookup {
    Missing,
    Unknown,
    Found(Arc<McpSession>),
}

fn lookup_session(state: &AppState, headers: &HeaderMap) -> SessionLookup {
    let Some(raw) = headers.get(SESSION_HEADER) else {
        return SessionLookup::Missing;
    };
    raw.to_str()
        .ok()
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .and_then(|id| state.sessions.get(&id))
        .map_or(SessionLookup::Unknown, SessionLookup::Found)
}

fn rpc_error(status: StatusCode, id: Value, error: RpcError) -> Response {
    (status, Json(JsonRpcResponse::failure(id, error))).into_response()
}

fn missing_header(id: Value) -> Response {
    rpc_error(
        StatusCode::BAD_REQUEST,
        id,
        RpcError::invalid_request("missing Mcp-Session-Id header"),
    )
}

/// POST /mcp
pub async fn post_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            return rpc_error(
                StatusCode::BAD_REQUEST,
                Value::Null,
                RpcError::parse_error(e.to_string()),
            );
        }
    };
    let message = match JsonRpcMessage::parse(value) {
        Ok(message) => message,
        Err(error) => return rpc_error(StatusCode::BAD_REQUEST, Value::Null, error),
    };
    if message.method.is_none() && message.id.is_none() {
        return rpc_error(
            StatusCode::BAD_REQUEST,
            Value::Null,
            RpcError::invalid_request("message has neither method nor id"),
        );
    }

    let reply_id = message.id.clone().unwrap_or(Value::Null);
    let (session, created) = match lookup_session(&state, &headers) {
        SessionLookup::Found(session) => (session, false),
        SessionLookup::Missing if message.is_initialize() => {
            let profiles = ProfileManager::clone(&state.profiles);
            (state.sessions.open(profiles), true)
        }
        SessionLookup::Missing => return missing_header(reply_id),
        SessionLookup::Unknown => {
            return rpc_error(StatusCode::NOT_FOUND, reply_id, RpcError::session_not_found());
        }
    };

    let JsonRpcMessage {
        id, method, params, ..
    } = message;

    // Notifications and client responses get no body.
    let (Some(id), Some(method)) = (id, method.as_deref()) else {
        if let Some(method) = method.as_deref() {
            handle_notification(&session, method);
        }
        return StatusCode::ACCEPTED.into_response();
    };

    debug!(session_id = %session.id(), method, "mcp request");
    let result = dispatch(&state, &session, method, params.unwrap_or(Value::Null)).await;
    let mut response = Json(JsonRpcResponse::from_result(id, result)).into_response();

    if created && let Ok(value) = HeaderValue::from_str(&session.id().to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(SESSION_HEADER), value);
    }
    response
}

/// GET /mcp
///
/// The stream owns a close guard, so a client hanging up ends its session.
pub async fn sse_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = match lookup_session(&state, &headers) {
        SessionLookup::Found(session) => session,
        SessionLookup::Missing => return missing_header(Value::Null),
        SessionLookup::Unknown => {
            return rpc_error(StatusCode::NOT_FOUND, Value::Null, RpcError::session_not_found());
        }
    };

    let session_id = session.id();
    let receiver = session.subscribe();
    let guard = SessionCloseGuard::new(Arc::clone(&state.sessions), session_id);
    drop(session);

    let stream = async_stream::stream! {
        let _guard = guard;
        let mut live = BroadcastStream::new(receiver);
        while let Some(item) = live.next().await {
            match item {
                Ok(message) => match Event::default().event("message").json_data(&message) {
                    Ok(event) => {
                        yield Ok::<Event, Infallible>(event);
                    }
                    Err(err) => {
                        warn!(%session_id, "failed to encode notification: {err}");
                    }
                },
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(%session_id, skipped, "notification stream lagged");
                }
            }
        }
    };

    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(SSE_KEEP_ALIVE).text("keepalive"))
        .into_response()
}

/// DELETE /mcp
pub async fn delete_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match lookup_session(&state, &headers) {
        SessionLookup::Found(session) => {
            state.sessions.close(&session.id());
            StatusCode::NO_CONTENT.into_response()
        }
        SessionLookup::Missing => missing_header(Value::Null),
        SessionLookup::Unknown => {
            rpc_error(StatusCode::NOT_FOUND, Value::Null, RpcError::session_not_found())
        }
    }
}

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::infra::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub scanners: BTreeMap<String, bool>,
}

/// Probe every enabled backend. Always 200; a down backend only flips the
/// overall status to `degraded`.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let scanners = state.scanners.health_check().await;
    let status = if scanners.values().all(|healthy| *healthy) {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse { status, scanners })
}

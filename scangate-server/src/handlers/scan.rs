use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use axum::{Json, body::Bytes, extract::State};
use serde::Deserialize;
use tracing::{info, warn};

use scangate_core::LicenseCheck;
use scangate_model::{FileTarget, ProjectContext, ScanRequest, ScanResult};

use crate::{
    files::{collect_files, read_target, to_caller_view},
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
    },
};

/// Usage-report label for scans that went through the REST fan-out.
pub const GATEWAY_USAGE_LABEL: &str = "gateway";

#[derive(Debug, Default, Deserialize)]
pub struct ScanBody {
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub scanners: Option<Vec<String>>,
    #[serde(default)]
    pub target_url: Option<String>,
}

pub async fn scan_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ScanResult>> {
    let body: ScanBody = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;

    check_requested_scanners(&state, body.scanners.as_deref())?;
    authorize(&state).await?;

    let profile = state.profiles.active().snapshot();
    let (files, context) = resolve_targets(&state, &body).await?;
    let request = ScanRequest {
        files,
        profile,
        context,
    };

    let started = Instant::now();
    let result = state
        .scanners
        .scan_all(&request, body.scanners.as_deref())
        .await;
    let duration_ms = started.elapsed().as_millis() as u64;

    info!(
        profile = %request.profile.name,
        files = request.files.len(),
        findings = result.findings.len(),
        duration_ms,
        "REST scan completed"
    );

    let _ = state.license.spawn_report_usage(
        state.license_key(),
        GATEWAY_USAGE_LABEL,
        &result.findings,
        duration_ms,
    );

    Ok(Json(to_caller_view(result, state.paths())))
}

/// A scanner list naming only backends that are not enabled would dispatch
/// nothing, so it is refused. Partially unknown lists scan with a warning.
fn check_requested_scanners(state: &AppState, requested: Option<&[String]>) -> AppResult<()> {
    let Some(requested) = requested.filter(|names| !names.is_empty()) else {
        return Ok(());
    };
    let unknown = state.scanners.unknown_names(requested);
    if unknown.len() < requested.len() {
        return Ok(());
    }
    Err(AppError::bad_request(format!(
        "No enabled scanner among: {}. Enabled scanners: {}",
        unknown.join(", "),
        state.scanners.scanner_names().join(", ")
    )))
}

/// License gate. Skipped entirely without a configured key; an unreachable
/// authority lets the scan through.
async fn authorize(state: &AppState) -> AppResult<()> {
    let Some(key) = state.license_key() else {
        return Ok(());
    };

    match state.license.check(key).await {
        LicenseCheck::Valid(_) => Ok(()),
        LicenseCheck::Invalid(_) => Err(AppError::forbidden(
            "License key is invalid or expired",
        )),
        LicenseCheck::Unreachable(reason) => {
            warn!(%reason, "license authority unreachable, scanning in offline mode");
            Ok(())
        }
    }
}

async fn resolve_targets(
    state: &AppState,
    body: &ScanBody,
) -> AppResult<(Vec<FileTarget>, ProjectContext)> {
    let paths = state.paths();
    let limits = &state.config.limits;
    let directory = body.directory.as_deref().map(|dir| paths.to_gateway(dir));

    let context = ProjectContext {
        root_dir: directory.clone(),
        target_url: body.target_url.clone(),
        ..ProjectContext::default()
    };

    if let Some(files) = body.files.as_ref().filter(|files| !files.is_empty()) {
        let targets = files
            .iter()
            .map(|path| {
                let local = paths.to_gateway(path);
                match read_target(Path::new(&local), limits.max_file_bytes) {
                    Some(content) => FileTarget::with_content(local, content),
                    None => FileTarget::path_only(local),
                }
            })
            .collect();
        return Ok((targets, context));
    }

    if let Some(dir) = directory {
        let root = PathBuf::from(&dir);
        let limits = limits.clone();
        let collected = tokio::task::spawn_blocking(move || collect_files(&root, &limits))
            .await
            .map_err(|e| AppError::internal(format!("file collection failed: {}", e)))?;

        let targets = if collected.is_empty() {
            vec![FileTarget::path_only(dir)]
        } else {
            collected
        };
        return Ok((targets, context));
    }

    if let Some(url) = body.target_url.as_deref() {
        return Ok((vec![FileTarget::path_only(url)], context));
    }

    Err(AppError::bad_request(
        "Request must include 'files', 'directory' or 'target_url'",
    ))
}

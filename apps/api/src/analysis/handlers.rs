//! Axum route handlers for the Analysis API.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::storage::UploadedResume;
use crate::analysis::upload::accept_upload;
use crate::analysis::verdict::normalize;
use crate::errors::AppError;
use crate::state::AppState;

/// POST /analyze
///
/// Multipart upload (`cv`, PDF) → provider upload + JSON analysis → verdict.
/// The stored upload is released before the response leaves this handler.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("analyze", %request_id);

    match analyze(&state, multipart).instrument(span).await {
        Ok(verdict) => Json(verdict).into_response(),
        Err(e) => e.into_client_response(state.config.expose_error_details),
    }
}

async fn analyze(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Value, AppError> {
    // A body that is not multipart carries no file.
    let multipart = multipart.map_err(|rejection| {
        info!(reason = %rejection.body_text(), "Request is not multipart");
        AppError::NoFile
    })?;

    let upload = accept_upload(multipart, &state.store).await?;
    info!(
        filename = %upload.original_filename,
        size = upload.size,
        "Resume accepted"
    );

    let outcome = run_analysis(state, &upload).await;

    release(upload);

    if outcome.is_ok() {
        info!("Resume analyzed");
    }
    outcome
}

async fn run_analysis(state: &AppState, upload: &UploadedResume) -> Result<Value, AppError> {
    let timeout = state.config.request_timeout;

    let raw = tokio::time::timeout(timeout, state.analyzer.analyze(upload))
        .await
        .map_err(|_| AppError::Timeout(timeout.as_secs()))??;

    Ok(normalize(
        &raw,
        state.config.verdict_validation,
        &state.policy,
    )?)
}

fn release(upload: UploadedResume) {
    let path = upload.path().display().to_string();
    if let Err(e) = upload.discard() {
        warn!(path = %path, error = %e, "Failed to remove upload");
    }
}

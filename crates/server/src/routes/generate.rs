//! Streaming note generation

use axum::{
    Extension, Json,
    body::Body,
    extract::rejection::JsonRejection,
    http::header,
    response::{IntoResponse, Response},
};
use futures_util::TryStreamExt;
use scribe_core::{CoreError, NoteType};
use serde::Deserialize;

use crate::ai::ClaudeClient;
use crate::error::AppError;
use crate::middleware::metrics::record_generation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub note_type: String,
    #[serde(default)]
    pub patient_data: String,
}

/// POST /api/generate - Stream a note for the pasted patient data as plain text
pub async fn generate(
    Extension(claude): Extension<Option<ClaudeClient>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;

    if request.note_type.trim().is_empty() {
        return Err(CoreError::missing("noteType").into());
    }
    if request.patient_data.trim().is_empty() {
        return Err(CoreError::missing("patientData").into());
    }
    let note_type: NoteType = request.note_type.trim().parse()?;

    let client = claude.ok_or_else(|| {
        AppError::Internal("Note generation is not configured (ANTHROPIC_API_KEY)".to_string())
    })?;

    let prompt = note_type.build_prompt(&request.patient_data);
    let stream = client
        .stream_message(&prompt)
        .await?
        .inspect_err(|e| tracing::warn!(error = %e, "Generated note stream aborted"));

    record_generation(note_type);
    tracing::info!(note_type = %note_type, model = client.model(), "Streaming generated note");

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response())
}

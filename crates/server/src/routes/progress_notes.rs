//! Structured progress notes and their signing workflow

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use scribe_core::{
    Listing, RecordKind,
    records::{Patient, ProgressNote, ProgressNotePatch, SignRequest},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::{Document, Repository, Store};
use crate::error::AppError;
use crate::middleware::AuthUser;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub patient_id: Option<Uuid>,
}

type NoteResponse = Json<Document<ProgressNote>>;

/// GET /api/progress-notes[?patientId=]
pub async fn list(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<Listing<Document<ProgressNote>>>, AppError> {
    let docs = Repository::<ProgressNote>::new(store).list(&user.0).await?;
    Ok(Json(
        docs.into_iter()
            .filter(|d| params.patient_id.is_none_or(|p| d.data.patient_id == p))
            .collect(),
    ))
}

/// POST /api/progress-notes
pub async fn create(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ProgressNote>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(mut note) = payload?;

    // The patient must exist and belong to the caller
    Repository::<Patient>::new(store.clone())
        .get(&user.0, note.patient_id)
        .await
        .map_err(|e| match e {
            AppError::NotAuthorized => AppError::from(RecordKind::Patient.not_found()),
            other => other,
        })?;

    note.prepare_new();
    let doc = Repository::new(store).create(&user.0, note).await?;
    tracing::info!(note_id = %doc.id, patient_id = %doc.data.patient_id, "Progress note created");

    let location = format!("/api/progress-notes/{}", doc.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(doc)))
}

/// GET /api/progress-notes/{id}
pub async fn read(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<NoteResponse, AppError> {
    Ok(Json(Repository::new(store).get(&user.0, id).await?))
}

/// PATCH /api/progress-notes/{id} - edit sections of a draft
pub async fn update(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ProgressNotePatch>, JsonRejection>,
) -> Result<NoteResponse, AppError> {
    let Json(patch) = payload?;
    let doc = Repository::new(store)
        .update(&user.0, id, |note: &mut ProgressNote| patch.apply(note))
        .await?;
    Ok(Json(doc))
}

/// POST /api/progress-notes/{id}/sign
pub async fn sign(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SignRequest>, JsonRejection>,
) -> Result<NoteResponse, AppError> {
    let Json(request) = payload?;
    let doc = Repository::new(store)
        .update(&user.0, id, |note: &mut ProgressNote| {
            note.sign(request, Utc::now())
        })
        .await?;
    tracing::info!(note_id = %id, "Progress note signed");
    Ok(Json(doc))
}

/// POST /api/progress-notes/{id}/cosign
pub async fn cosign(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SignRequest>, JsonRejection>,
) -> Result<NoteResponse, AppError> {
    let Json(request) = payload?;
    let doc = Repository::new(store)
        .update(&user.0, id, |note: &mut ProgressNote| {
            note.cosign(request, Utc::now())
        })
        .await?;
    tracing::info!(note_id = %id, "Progress note cosigned");
    Ok(Json(doc))
}

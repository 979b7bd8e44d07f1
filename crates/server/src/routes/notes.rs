//! Saved generated notes. Append-only: no update route.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use scribe_core::{Listing, records::Note};
use uuid::Uuid;

use crate::db::{Document, Repository, Store};
use crate::error::AppError;
use crate::middleware::AuthUser;

/// GET /api/notes
pub async fn list(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Listing<Document<Note>>>, AppError> {
    let docs = Repository::<Note>::new(store).list(&user.0).await?;
    Ok(Json(Listing::new(docs)))
}

/// POST /api/notes
pub async fn create(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<Note>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(note) = payload?;
    let doc = Repository::new(store).create(&user.0, note).await?;
    tracing::info!(note_id = %doc.id, note_type = %doc.data.note_type, "Note saved");
    Ok((StatusCode::CREATED, Json(doc)))
}

/// GET /api/notes/{id}
pub async fn read(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Document<Note>>, AppError> {
    Ok(Json(Repository::new(store).get(&user.0, id).await?))
}

/// DELETE /api/notes/{id}
pub async fn delete(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    Repository::<Note>::new(store).delete(&user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Census tracker rows

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use scribe_core::{
    Listing,
    records::{TrackerPatch, TrackerPatient},
};
use uuid::Uuid;

use crate::db::{Document, Repository, Store};
use crate::error::AppError;
use crate::middleware::AuthUser;

/// GET /api/tracker
pub async fn list(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Listing<Document<TrackerPatient>>>, AppError> {
    let rows = Repository::<TrackerPatient>::new(store).list(&user.0).await?;
    Ok(Json(Listing::new(rows)))
}

/// POST /api/tracker
pub async fn create(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<TrackerPatient>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(row) = payload?;
    let doc = Repository::new(store).create(&user.0, row).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// PATCH /api/tracker/{id}
pub async fn update(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<TrackerPatch>, JsonRejection>,
) -> Result<Json<Document<TrackerPatient>>, AppError> {
    let Json(patch) = payload?;
    let doc = Repository::new(store)
        .update(&user.0, id, |row: &mut TrackerPatient| {
            patch.apply(row);
            Ok(())
        })
        .await?;
    Ok(Json(doc))
}

/// DELETE /api/tracker/{id}
pub async fn delete(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    Repository::<TrackerPatient>::new(store)
        .delete(&user.0, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

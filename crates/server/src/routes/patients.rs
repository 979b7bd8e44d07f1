//! Patient record handlers. Patients are never deleted.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use scribe_core::{
    Listing, dates,
    records::{Patient, PatientPatch},
};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{Document, Repository, Store};
use crate::error::AppError;
use crate::middleware::AuthUser;

/// Patient as returned to clients, with the age computed for today
#[derive(Serialize)]
pub struct PatientView {
    #[serde(flatten)]
    doc: Document<Patient>,
    age: u32,
}

impl From<Document<Patient>> for PatientView {
    fn from(doc: Document<Patient>) -> Self {
        let age = dates::age_today(doc.data.date_of_birth);
        Self { doc, age }
    }
}

/// GET /api/patients
pub async fn list(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Listing<PatientView>>, AppError> {
    let docs = Repository::<Patient>::new(store).list(&user.0).await?;
    Ok(Json(docs.into_iter().map(PatientView::from).collect()))
}

/// POST /api/patients
pub async fn create(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<Patient>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let doc = Repository::new(store).create(&user.0, body).await?;
    tracing::info!(patient_id = %doc.id, "Patient created");

    let location = format!("/api/patients/{}", doc.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PatientView::from(doc)),
    ))
}

/// GET /api/patients/{id}
pub async fn read(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientView>, AppError> {
    let doc = Repository::<Patient>::new(store).get(&user.0, id).await?;
    Ok(Json(doc.into()))
}

/// PATCH /api/patients/{id}
pub async fn update(
    State(store): State<Store>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    payload: Result<Json<PatientPatch>, JsonRejection>,
) -> Result<Json<PatientView>, AppError> {
    let Json(patch) = payload?;
    let doc = Repository::<Patient>::new(store)
        .update(&user.0, id, |patient| {
            patch.apply(patient);
            Ok(())
        })
        .await?;
    Ok(Json(doc.into()))
}

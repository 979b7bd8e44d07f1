pub mod extract;
pub mod generate;
pub mod health;
pub mod metadata;
pub mod metrics;
mod notes;
mod patients;
mod progress_notes;
mod tracker;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::db::Store;

/// Build the authenticated `/api` routes
pub fn api_routes() -> Router<Store> {
    Router::new()
        .route("/generate", post(generate::generate))
        .route("/note-types", get(metadata::note_types))
        .route("/patients", get(patients::list).post(patients::create))
        .route("/patients/{id}", get(patients::read).patch(patients::update))
        .route(
            "/progress-notes",
            get(progress_notes::list).post(progress_notes::create),
        )
        .route(
            "/progress-notes/{id}",
            get(progress_notes::read).patch(progress_notes::update),
        )
        .route("/progress-notes/{id}/sign", post(progress_notes::sign))
        .route("/progress-notes/{id}/cosign", post(progress_notes::cosign))
        .route("/notes", get(notes::list).post(notes::create))
        .route("/notes/{id}", get(notes::read).delete(notes::delete))
        .route("/tracker", get(tracker::list).post(tracker::create))
        .route(
            "/tracker/{id}",
            patch(tracker::update).delete(tracker::delete),
        )
        .route("/extract/labs", post(extract::labs))
        .route("/extract/imaging", post(extract::imaging))
}

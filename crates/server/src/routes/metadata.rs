//! Capability and catalog endpoints

use axum::{Extension, Json};
use scribe_core::{Capabilities, NoteTypeInfo, note_type_catalog};

/// GET /metadata - Return the service capability statement
pub async fn get(Extension(capabilities): Extension<Capabilities>) -> Json<Capabilities> {
    Json(capabilities)
}

/// GET /api/note-types - Note types offered by the generator
pub async fn note_types() -> Json<Vec<NoteTypeInfo>> {
    Json(note_type_catalog())
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, RecordKind, require};
use crate::error::CoreError;
use crate::note_type::NoteType;

/// A generated note saved by its author. Notes are never edited after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub note_type: NoteType,
    pub content: String,
    /// Informal reference; not checked against the patients collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Record for Note {
    const KIND: RecordKind = RecordKind::Note;

    fn validate(&self) -> Result<(), CoreError> {
        require("content", &self.content)
    }
}

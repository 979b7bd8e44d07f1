use serde::{Deserialize, Serialize};

use crate::note_type::NoteType;

/// Catalog entry for a note type offered by the generator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteTypeInfo {
    pub key: String,
    pub label: String,
}

impl From<NoteType> for NoteTypeInfo {
    fn from(note_type: NoteType) -> Self {
        Self {
            key: note_type.key().to_string(),
            label: note_type.label().to_string(),
        }
    }
}

/// Service capability statement served at `/metadata`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub service: String,
    pub version: String,
    pub note_types: Vec<NoteTypeInfo>,
    pub extraction: Vec<String>,
    pub generation_enabled: bool,
}

impl Capabilities {
    pub fn new(version: &str, extraction: Vec<String>, generation_enabled: bool) -> Self {
        Self {
            service: "scribe".to_string(),
            version: version.to_string(),
            note_types: note_type_catalog(),
            extraction,
            generation_enabled,
        }
    }
}

/// Every note type, in display order
pub fn note_type_catalog() -> Vec<NoteTypeInfo> {
    NoteType::ALL.into_iter().map(NoteTypeInfo::from).collect()
}

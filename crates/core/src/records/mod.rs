//! Persisted record bodies.
//!
//! Each record is stored as a JSON document inside an envelope that carries
//! the id, the owning user and the creation time. The bodies here never hold
//! those envelope fields.

mod note;
mod patient;
mod progress_note;
mod tracker;

pub use note::Note;
pub use patient::{Gender, Patient, PatientPatch};
pub use progress_note::{
    Assessment, Attestation, AttestationRole, Attestations, Diagnostics, Encounter, Exam,
    ExamFinding, History, Plan, Problem, ProgressNote, ProgressNotePatch, SignRequest, Vitals,
};
pub use tracker::{TrackerAction, TrackerPatch, TrackerPatient};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::CoreError;

/// Collection a record is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Patient,
    ProgressNote,
    Note,
    TrackerPatient,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Patient,
        RecordKind::ProgressNote,
        RecordKind::Note,
        RecordKind::TrackerPatient,
    ];

    /// Storage collection (table) name
    pub fn collection(self) -> &'static str {
        match self {
            RecordKind::Patient => "patients",
            RecordKind::ProgressNote => "progress_notes",
            RecordKind::Note => "notes",
            RecordKind::TrackerPatient => "tracker_patients",
        }
    }

    /// Label used in user-facing messages ("Patient not found")
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Patient => "Patient",
            RecordKind::ProgressNote => "Progress note",
            RecordKind::Note => "Note",
            RecordKind::TrackerPatient => "Tracker patient",
        }
    }

    pub fn not_found(self) -> CoreError {
        CoreError::NotFound(self.label())
    }
}

/// A record body that can be stored in a document collection
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: RecordKind;

    /// Required-field checks run before every write
    fn validate(&self) -> Result<(), CoreError>;
}

/// Reject a blank required string field
pub(crate) fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::missing(field))
    } else {
        Ok(())
    }
}

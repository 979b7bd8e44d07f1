use thiserror::Error;

use crate::status::NoteStatus;

/// Domain error types shared by the server and its storage layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Not authorized")]
    NotAuthorized,

    /// Carries the record label, e.g. `Patient` renders "Patient not found"
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("Cannot move note from {from} to {to}")]
    InvalidTransition { from: NoteStatus, to: NoteStatus },

    #[error("Note is {0} and can no longer be edited")]
    NotEditable(NoteStatus),
}

impl CoreError {
    /// Shorthand for a missing required field
    pub fn missing(field: &str) -> Self {
        CoreError::Invalid(format!("Missing required field: {}", field))
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Signing state of a structured progress note
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    #[default]
    Draft,
    Signed,
    Cosigned,
}

impl NoteStatus {
    /// Only `draft -> signed` and `signed -> cosigned` are allowed
    pub fn can_transition_to(self, next: NoteStatus) -> bool {
        matches!(
            (self, next),
            (NoteStatus::Draft, NoteStatus::Signed) | (NoteStatus::Signed, NoteStatus::Cosigned)
        )
    }

    pub fn transition(self, next: NoteStatus) -> Result<NoteStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Sections may only change before the first signature
    pub fn is_editable(self) -> bool {
        self == NoteStatus::Draft
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteStatus::Draft => "draft",
            NoteStatus::Signed => "signed",
            NoteStatus::Cosigned => "cosigned",
        }
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

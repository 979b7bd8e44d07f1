use serde::{Deserialize, Serialize};

use super::{Record, RecordKind, require};
use crate::error::CoreError;

/// Next action flagged for a patient on the census tracker
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TrackerAction {
    #[default]
    None,
    Discharge,
    Transfer,
    Consult,
    Procedure,
    FollowUp,
}

/// Operational census row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackerPatient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mrn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disposition_notes: Option<String>,
    #[serde(default)]
    pub action: TrackerAction,
}

impl Record for TrackerPatient {
    const KIND: RecordKind = RecordKind::TrackerPatient;

    fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerPatch {
    pub name: Option<String>,
    pub mrn: Option<String>,
    pub room: Option<String>,
    pub service: Option<String>,
    pub diagnosis: Option<String>,
    pub clinical_status: Option<String>,
    pub disposition_notes: Option<String>,
    pub action: Option<TrackerAction>,
}

impl TrackerPatch {
    pub fn apply(self, row: &mut TrackerPatient) {
        if let Some(name) = self.name {
            row.name = name;
        }
        if let Some(action) = self.action {
            row.action = action;
        }
        for (slot, value) in [
            (&mut row.mrn, self.mrn),
            (&mut row.room, self.room),
            (&mut row.service, self.service),
            (&mut row.diagnosis, self.diagnosis),
            (&mut row.clinical_status, self.clinical_status),
            (&mut row.disposition_notes, self.disposition_notes),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
    }
}

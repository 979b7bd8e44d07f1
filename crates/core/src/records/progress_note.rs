//! Structured progress note and its signing workflow.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Record, RecordKind, require};
use crate::dates::format_timestamp;
use crate::error::CoreError;
use crate::status::NoteStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub date_of_service: NaiveDate,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct History {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hpi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_history: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub review_of_systems: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExamFinding {
    pub system: String,
    pub finding: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Exam {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<Vitals>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<ExamFinding>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Diagnostics {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imaging: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Problem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plan: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Assessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<Problem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttestationRole {
    Scribe,
    Provider,
    Cosigner,
}

/// Signed statement of authorship or review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub name: String,
    pub role: AttestationRole,
    pub statement: String,
    pub signed_at: DateTime<Utc>,
}

impl Attestation {
    pub fn new(
        name: String,
        role: AttestationRole,
        statement: Option<String>,
        signed_at: DateTime<Utc>,
    ) -> Self {
        let statement = statement
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| {
                format!(
                    "Electronically signed by {} on {}",
                    name,
                    format_timestamp(signed_at)
                )
            });
        Self {
            name,
            role,
            statement,
            signed_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Attestations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scribe: Option<Attestation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Attestation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cosigner: Option<Attestation>,
}

/// Structured progress note for one patient encounter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNote {
    pub patient_id: Uuid,
    pub encounter: Encounter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<History>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam: Option<Exam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub attestation: Attestations,
    #[serde(default)]
    pub status: NoteStatus,
}

impl Record for ProgressNote {
    const KIND: RecordKind = RecordKind::ProgressNote;

    fn validate(&self) -> Result<(), CoreError> {
        require("encounter.author", &self.encounter.author)?;
        if let Some(assessment) = &self.assessment {
            for problem in &assessment.problems {
                require("assessment.problems.name", &problem.name)?;
            }
        }
        Ok(())
    }
}

/// Body of a sign or cosign request
#[derive(Debug, Clone, Deserialize)]
pub struct SignRequest {
    pub name: String,
    #[serde(default)]
    pub statement: Option<String>,
}

impl ProgressNote {
    /// Reset client-supplied workflow state on a freshly created note.
    ///
    /// New notes always start as drafts. Only a scribe attestation may be
    /// supplied up front; provider and cosigner entries come from signing.
    pub fn prepare_new(&mut self) {
        self.status = NoteStatus::Draft;
        self.attestation.provider = None;
        self.attestation.cosigner = None;
    }

    /// `draft -> signed`, recording the provider attestation
    pub fn sign(&mut self, request: SignRequest, at: DateTime<Utc>) -> Result<(), CoreError> {
        require("name", &request.name)?;
        self.status = self.status.transition(NoteStatus::Signed)?;
        self.attestation.provider = Some(Attestation::new(
            request.name,
            AttestationRole::Provider,
            request.statement,
            at,
        ));
        Ok(())
    }

    /// `signed -> cosigned`, recording the cosigner attestation
    pub fn cosign(&mut self, request: SignRequest, at: DateTime<Utc>) -> Result<(), CoreError> {
        require("name", &request.name)?;
        self.status = self.status.transition(NoteStatus::Cosigned)?;
        self.attestation.cosigner = Some(Attestation::new(
            request.name,
            AttestationRole::Cosigner,
            request.statement,
            at,
        ));
        Ok(())
    }
}

/// Section edits; a present section replaces the stored one wholesale
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNotePatch {
    pub encounter: Option<Encounter>,
    pub history: Option<History>,
    pub exam: Option<Exam>,
    pub diagnostics: Option<Diagnostics>,
    pub assessment: Option<Assessment>,
    pub plan: Option<Plan>,
    pub scribe_attestation: Option<Attestation>,
}

impl ProgressNotePatch {
    pub fn apply(self, note: &mut ProgressNote) -> Result<(), CoreError> {
        if !note.status.is_editable() {
            return Err(CoreError::NotEditable(note.status));
        }
        if let Some(encounter) = self.encounter {
            note.encounter = encounter;
        }
        if self.history.is_some() {
            note.history = self.history;
        }
        if self.exam.is_some() {
            note.exam = self.exam;
        }
        if self.diagnostics.is_some() {
            note.diagnostics = self.diagnostics;
        }
        if self.assessment.is_some() {
            note.assessment = self.assessment;
        }
        if self.plan.is_some() {
            note.plan = self.plan;
        }
        if self.scribe_attestation.is_some() {
            note.attestation.scribe = self.scribe_attestation;
        }
        Ok(())
    }
}

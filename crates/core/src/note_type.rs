//! Note types and the static prompt template each one selects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Category of clinical note the model is asked to write
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NoteType {
    #[serde(rename = "progress")]
    Progress,
    #[serde(rename = "hp")]
    HistoryAndPhysical,
    #[serde(rename = "consult")]
    Consult,
    #[serde(rename = "discharge")]
    Discharge,
    #[serde(rename = "icu-tracker")]
    IcuTracker,
}

const PROGRESS_TEMPLATE: &str = r#"You are an experienced hospitalist writing a daily inpatient progress note.
Using only the patient data provided, write a progress note in SOAP format with these sections:

SUBJECTIVE: overnight events, patient-reported symptoms, interval history.
OBJECTIVE: vital signs, physical exam, pertinent labs and imaging with values.
ASSESSMENT AND PLAN: a one-line summary, then a numbered problem list. For each problem give the assessment followed by the plan.
DISPOSITION: expected discharge date and barriers to discharge.

Do not invent findings, values or history that are not in the data. Write "not documented" where information is missing."#;

const HP_TEMPLATE: &str = r#"You are an admitting physician writing a History and Physical.
Using only the patient data provided, write an H&P with these sections:

CHIEF COMPLAINT
HISTORY OF PRESENT ILLNESS
PAST MEDICAL HISTORY
PAST SURGICAL HISTORY
MEDICATIONS
ALLERGIES
SOCIAL HISTORY
FAMILY HISTORY
REVIEW OF SYSTEMS
PHYSICAL EXAM
LABS AND IMAGING
ASSESSMENT AND PLAN: a summary statement and a numbered problem list with plans.

Do not invent findings, values or history that are not in the data. Write "not documented" where information is missing."#;

const CONSULT_TEMPLATE: &str = r#"You are a consulting physician answering a consult request.
Using only the patient data provided, write a consult note with these sections:

REASON FOR CONSULTATION
HISTORY OF PRESENT ILLNESS
PERTINENT HISTORY, MEDICATIONS AND ALLERGIES
PHYSICAL EXAM
DATA REVIEWED: labs, imaging and studies with values.
IMPRESSION
RECOMMENDATIONS: numbered, specific and actionable.

Do not invent findings, values or history that are not in the data. Write "not documented" where information is missing."#;

const DISCHARGE_TEMPLATE: &str = r#"You are the discharging physician writing a discharge summary.
Using only the patient data provided, write a discharge summary with these sections:

ADMISSION DATE AND DISCHARGE DATE
ADMITTING DIAGNOSIS
DISCHARGE DIAGNOSES: principal and secondary.
HOSPITAL COURSE: by problem.
PROCEDURES
CONDITION AT DISCHARGE
DISCHARGE MEDICATIONS: new, changed and stopped.
FOLLOW-UP: appointments and pending results.
PATIENT INSTRUCTIONS

Do not invent findings, values or history that are not in the data. Write "not documented" where information is missing."#;

const ICU_TRACKER_TEMPLATE: &str = r#"You are an intensivist updating the ICU patient tracker.
Using only the patient data provided, write a concise organ-system tracker entry:

ONE-LINER
NEURO
CARDIOVASCULAR: pressors, rhythm, hemodynamics.
RESPIRATORY: ventilator settings or oxygen, last ABG.
RENAL: urine output, creatinine, electrolytes, RRT.
GI/NUTRITION
ID: cultures, antibiotics with day number.
HEME: hemoglobin, platelets, anticoagulation.
ENDO
LINES/TUBES/DRAINS
PROPHYLAXIS: DVT, GI.
DISPOSITION AND CODE STATUS
TO DO: checklist for the next 24 hours.

Use short bullet points. Do not invent values that are not in the data."#;

impl NoteType {
    pub const ALL: [NoteType; 5] = [
        NoteType::Progress,
        NoteType::HistoryAndPhysical,
        NoteType::Consult,
        NoteType::Discharge,
        NoteType::IcuTracker,
    ];

    /// Wire key used in requests and stored notes
    pub fn key(self) -> &'static str {
        match self {
            NoteType::Progress => "progress",
            NoteType::HistoryAndPhysical => "hp",
            NoteType::Consult => "consult",
            NoteType::Discharge => "discharge",
            NoteType::IcuTracker => "icu-tracker",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NoteType::Progress => "Progress Note",
            NoteType::HistoryAndPhysical => "History & Physical",
            NoteType::Consult => "Consult Note",
            NoteType::Discharge => "Discharge Summary",
            NoteType::IcuTracker => "ICU Tracker",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    pub fn prompt_template(self) -> &'static str {
        match self {
            NoteType::Progress => PROGRESS_TEMPLATE,
            NoteType::HistoryAndPhysical => HP_TEMPLATE,
            NoteType::Consult => CONSULT_TEMPLATE,
            NoteType::Discharge => DISCHARGE_TEMPLATE,
            NoteType::IcuTracker => ICU_TRACKER_TEMPLATE,
        }
    }

    /// Full prompt sent to the model. The patient text is appended verbatim.
    pub fn build_prompt(self, patient_data: &str) -> String {
        format!(
            "{}\n\nPATIENT DATA:\n{}",
            self.prompt_template(),
            patient_data
        )
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for NoteType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| CoreError::Invalid(format!("Unknown note type: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for note_type in NoteType::ALL {
            assert_eq!(NoteType::from_key(note_type.key()), Some(note_type));
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert_eq!(NoteType::from_key("soap"), None);
        assert_eq!(NoteType::from_key("Progress"), None);
        assert!(matches!(
            "radiology".parse::<NoteType>(),
            Err(CoreError::Invalid(_))
        ));
    }

    #[test]
    fn prompt_appends_patient_data_verbatim() {
        let data = "72M with CHF, Cr 1.8\n  BNP 900";
        let prompt = NoteType::Discharge.build_prompt(data);
        assert!(prompt.starts_with(DISCHARGE_TEMPLATE));
        assert!(prompt.ends_with("PATIENT DATA:\n72M with CHF, Cr 1.8\n  BNP 900"));
    }

    #[test]
    fn serde_uses_wire_keys() {
        let json = serde_json::to_string(&NoteType::IcuTracker).unwrap();
        assert_eq!(json, "\"icu-tracker\"");
        let parsed: NoteType = serde_json::from_str("\"hp\"").unwrap();
        assert_eq!(parsed, NoteType::HistoryAndPhysical);
    }
}

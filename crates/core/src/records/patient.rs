use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordKind, require};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

/// Patient demographics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub mrn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Record for Patient {
    const KIND: RecordKind = RecordKind::Patient;

    fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)?;
        require("mrn", &self.mrn)
    }
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPatch {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub mrn: Option<String>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl PatientPatch {
    pub fn apply(self, patient: &mut Patient) {
        if let Some(name) = self.name {
            patient.name = name;
        }
        if let Some(dob) = self.date_of_birth {
            patient.date_of_birth = dob;
        }
        if let Some(mrn) = self.mrn {
            patient.mrn = mrn;
        }
        if self.gender.is_some() {
            patient.gender = self.gender;
        }
        if self.phone.is_some() {
            patient.phone = self.phone;
        }
        if self.email.is_some() {
            patient.email = self.email;
        }
        if self.address.is_some() {
            patient.address = self.address;
        }
    }
}

use thiserror::Error;

use crate::imaging::Modality;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Unknown modality: {0}. Available: ECHO, CT, MRI, XRAY, ULTRASOUND")]
    UnknownModality(String),

    #[error("Modality {0} is not enabled")]
    ModalityDisabled(Modality),
}

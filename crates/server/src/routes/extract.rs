//! Lab value and imaging finding extraction

use std::collections::BTreeMap;

use axum::{Extension, Json, extract::rejection::JsonRejection};
use scribe_extract::{
    CombinedStudy, Extraction, ImagingOrchestrator, LabExtractor, LabGroup, Modality, Study,
    imaging::combine_by_date,
};
use serde::{Deserialize, Serialize};

use crate::ai::ImagingService;
use crate::error::AppError;

const NO_IMAGING: &str = "No imaging data found";

#[derive(Debug, Deserialize)]
pub struct LabRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagingRequest {
    pub text: String,
    /// Restrict extraction to these modalities; all are enabled when absent
    #[serde(default)]
    pub modalities: Option<Vec<String>>,
    #[serde(default)]
    pub combine_by_date: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum ImagingResponse {
    Empty { status: &'static str },
    ByModality(BTreeMap<Modality, Vec<Study>>),
    Combined(Extraction<CombinedStudy>),
}

/// POST /api/extract/labs
pub async fn labs(
    payload: Result<Json<LabRequest>, JsonRejection>,
) -> Result<Json<Extraction<LabGroup>>, AppError> {
    let Json(request) = payload?;
    Ok(Json(LabExtractor::new().extract(&request.text)))
}

/// POST /api/extract/imaging
pub async fn imaging(
    Extension(service): Extension<ImagingService>,
    payload: Result<Json<ImagingRequest>, JsonRejection>,
) -> Result<Json<ImagingResponse>, AppError> {
    let Json(request) = payload?;

    let orchestrator = match &request.modalities {
        Some(names) => {
            let enabled = names
                .iter()
                .map(|name| name.parse::<Modality>())
                .collect::<Result<Vec<_>, _>>()?;
            ImagingOrchestrator::with_modalities(&enabled)
        }
        None => ImagingOrchestrator::new(),
    };

    let results = service.extract_all(&orchestrator, &request.text).await;
    tracing::debug!(
        modalities = ?results.keys().collect::<Vec<_>>(),
        llm = service.uses_llm(),
        "Imaging extraction finished"
    );

    let response = if results.is_empty() {
        ImagingResponse::Empty { status: NO_IMAGING }
    } else if request.combine_by_date {
        ImagingResponse::Combined(combine_by_date(results))
    } else {
        ImagingResponse::ByModality(results)
    };
    Ok(Json(response))
}

//! Imaging extraction with an optional language-model pass

use std::collections::BTreeMap;

use scribe_extract::{Extraction, ImagingExtractor, ImagingOrchestrator, Modality, Study};

use super::ClaudeClient;

/// Chooses between rule-based and model-backed imaging extraction
#[derive(Clone, Default)]
pub struct ImagingService {
    llm: Option<ClaudeClient>,
}

impl ImagingService {
    /// `llm` is only used when model-backed extraction is switched on
    pub fn new(llm: Option<ClaudeClient>, enabled: bool) -> Self {
        Self {
            llm: llm.filter(|_| enabled),
        }
    }

    pub fn uses_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Studies per detected modality; modalities with nothing found are omitted
    pub async fn extract_all(
        &self,
        orchestrator: &ImagingOrchestrator,
        text: &str,
    ) -> BTreeMap<Modality, Vec<Study>> {
        let Some(client) = &self.llm else {
            return orchestrator.extract_all(text);
        };

        let mut results = BTreeMap::new();
        for modality in orchestrator.detect_modalities(text) {
            let Ok(extractor) = orchestrator.extractor(modality) else {
                continue;
            };
            let studies = match llm_studies(client, extractor, text).await {
                Some(studies) => studies,
                None => extractor.extract(text).into_vec(),
            };
            if !studies.is_empty() {
                results.insert(modality, studies);
            }
        }
        results
    }
}

/// `None` when the model call fails or yields nothing usable
async fn llm_studies(
    client: &ClaudeClient,
    extractor: &dyn ImagingExtractor,
    text: &str,
) -> Option<Vec<Study>> {
    let modality = extractor.modality();
    let reply = match client.message(Some(&extractor.system_prompt()), text).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(%modality, error = %e, "Model extraction failed, using rules");
            return None;
        }
    };

    match extractor.parse_llm_response(&reply) {
        Extraction::Found(studies) => Some(studies),
        Extraction::NoData => {
            tracing::debug!(%modality, "Model reported no data, using rules");
            None
        }
    }
}

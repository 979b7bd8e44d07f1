use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::{
    CtExtractor, EchoExtractor, ImagingExtractor, Modality, MriExtractor, Study,
    UltrasoundExtractor, XrayExtractor, mark_latest,
};
use crate::error::ExtractError;
use crate::extraction::{self, Extraction};

/// Findings from every modality sharing a study date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedStudy {
    #[serde(serialize_with = "extraction::serialize_date")]
    pub date: Option<NaiveDate>,
    pub source_text: String,
    pub modalities: Vec<Modality>,
    pub is_latest: bool,
    pub findings: Vec<CombinedFinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedFinding {
    pub modality: Modality,
    pub finding_name: String,
    pub finding_value: String,
}

/// Runs a set of modality extractors over the same text
pub struct ImagingOrchestrator {
    extractors: Vec<Box<dyn ImagingExtractor>>,
}

impl Default for ImagingOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl ImagingOrchestrator {
    /// Every modality enabled
    pub fn new() -> Self {
        Self::with_modalities(&Modality::ALL)
    }

    /// Only the listed modalities enabled, in canonical order
    pub fn with_modalities(enabled: &[Modality]) -> Self {
        let extractors = Modality::ALL
            .into_iter()
            .filter(|m| enabled.contains(m))
            .map(extractor_for)
            .collect();
        Self { extractors }
    }

    pub fn available_modalities(&self) -> Vec<Modality> {
        self.extractors.iter().map(|x| x.modality()).collect()
    }

    pub fn extractor(&self, modality: Modality) -> Result<&dyn ImagingExtractor, ExtractError> {
        self.extractors
            .iter()
            .find(|x| x.modality() == modality)
            .map(|x| x.as_ref())
            .ok_or(ExtractError::ModalityDisabled(modality))
    }

    pub fn detect_modalities(&self, text: &str) -> Vec<Modality> {
        self.extractors
            .iter()
            .filter(|x| x.detect(text))
            .map(|x| x.modality())
            .collect()
    }

    /// Rule-based studies per modality; modalities without findings are absent
    pub fn extract_all(&self, text: &str) -> BTreeMap<Modality, Vec<Study>> {
        self.extractors
            .iter()
            .filter_map(|x| match x.extract(text) {
                Extraction::Found(studies) => Some((x.modality(), studies)),
                Extraction::NoData => None,
            })
            .collect()
    }

    pub fn extract_modality(
        &self,
        text: &str,
        modality: Modality,
    ) -> Result<Extraction<Study>, ExtractError> {
        Ok(self.extractor(modality)?.extract(text))
    }

    /// All studies in one list, newest first
    pub fn extract_flat(&self, text: &str) -> Extraction<Study> {
        flatten(self.extract_all(text))
    }

    /// All findings grouped by study date, newest first
    pub fn extract_combined(&self, text: &str) -> Extraction<CombinedStudy> {
        combine_by_date(self.extract_all(text))
    }
}

fn extractor_for(modality: Modality) -> Box<dyn ImagingExtractor> {
    match modality {
        Modality::Echo => Box::new(EchoExtractor),
        Modality::Ct => Box::new(CtExtractor),
        Modality::Mri => Box::new(MriExtractor),
        Modality::Xray => Box::new(XrayExtractor),
        Modality::Ultrasound => Box::new(UltrasoundExtractor),
    }
}

/// Merge per-modality studies into one list, newest first
pub fn flatten(results: BTreeMap<Modality, Vec<Study>>) -> Extraction<Study> {
    let mut studies: Vec<Study> = results.into_values().flatten().collect();
    mark_latest(&mut studies);
    Extraction::from_vec(studies)
}

/// Group studies from every modality by date
pub fn combine_by_date(results: BTreeMap<Modality, Vec<Study>>) -> Extraction<CombinedStudy> {
    let mut groups: Vec<(CombinedStudy, Vec<String>)> = Vec::new();

    for study in results.into_values().flatten() {
        let idx = match groups.iter().position(|(g, _)| g.date == study.date) {
            Some(idx) => idx,
            None => {
                groups.push((
                    CombinedStudy {
                        date: study.date,
                        source_text: String::new(),
                        modalities: Vec::new(),
                        is_latest: false,
                        findings: Vec::new(),
                    },
                    Vec::new(),
                ));
                groups.len() - 1
            }
        };
        let (group, sources) = &mut groups[idx];

        if !group.modalities.contains(&study.modality) {
            group.modalities.push(study.modality);
        }
        if !study.source_text.is_empty() && !sources.contains(&study.source_text) {
            sources.push(study.source_text.clone());
        }
        group
            .findings
            .extend(study.findings.into_iter().map(|f| CombinedFinding {
                modality: study.modality,
                finding_name: f.finding_name,
                finding_value: f.finding_value,
            }));
    }

    let mut combined: Vec<CombinedStudy> = groups
        .into_iter()
        .map(|(mut group, sources)| {
            group.source_text = sources.join(", ");
            group
        })
        .collect();
    extraction::sort_newest_first(&mut combined, |g| g.date);
    for (i, group) in combined.iter_mut().enumerate() {
        group.is_latest = i == 0;
    }
    Extraction::from_vec(combined)
}

use std::sync::LazyLock;

use regex::Regex;

use super::{
    Finding, ImagingExtractor, KeywordSet, Modality, ParameterCatalog, compile, first_lower,
    pleural_effusion,
};

static KEYWORDS: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "x-ray",
        "xray",
        "x ray",
        "radiograph",
        "chest x-ray",
        "cxr",
        "chest film",
        "portable chest",
        "pa and lateral",
        "ap chest",
        "kub",
        "abdominal x-ray",
        "abdominal film",
        "plain film",
        "plain radiograph",
        "skeletal survey",
        "bone x-ray",
        "spine x-ray",
        "extremity x-ray",
    ])
});

const PARAMETERS: ParameterCatalog = &[
    (
        "chest",
        &[
            "cardiomegaly", "cardiac silhouette", "heart size", "pulmonary edema",
            "vascular congestion", "CHF", "consolidation", "infiltrate", "opacity", "effusion",
            "pleural effusion", "pneumothorax", "PTX", "atelectasis", "nodule", "mass",
            "mediastinal widening", "mediastinum", "rib fracture", "fracture",
        ],
    ),
    (
        "lines_tubes",
        &[
            "ET tube", "endotracheal tube", "ETT", "NG tube", "nasogastric", "central line",
            "PICC", "port", "chest tube", "pacemaker", "ICD",
        ],
    ),
    (
        "abdominal",
        &[
            "bowel gas", "gas pattern", "obstruction", "SBO", "ileus", "free air",
            "pneumoperitoneum", "calcification", "stone",
        ],
    ),
    (
        "skeletal",
        &[
            "fracture", "dislocation", "alignment", "displacement", "arthritis",
            "degenerative", "hardware", "fixation",
        ],
    ),
];

const PROMPT: &str = r#"You are an AI medical data extraction agent.
Your task is to identify, extract, and structure X-ray findings from clinical text.
Return clean, grouped JSON data for each X-ray study.

Extract X-ray-specific findings including:
- Chest X-ray: cardiomegaly, edema, consolidation, effusion, pneumothorax
- Lines/tubes: ET tube position, NG tube, central lines
- Abdominal X-ray: bowel gas pattern, obstruction, free air
- Skeletal: fractures, dislocations, arthritis

Rules:
- Extract only X-ray/radiograph findings
- Be case-insensitive and synonym-aware
- Normalize dates to YYYY-MM-DD format
- Note comparisons to prior studies
- If no X-ray data found, return "No Data"

Return JSON with format:
{"studies": [{"date": "YYYY-MM-DD", "source_text": "brief description", "is_latest": true/false, "findings": [{"finding_name": "name", "finding_value": "value"}]}]}
"#;

static CARDIOMEGALY: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"cardiomegaly[:\s]*(present|enlarged|stable|mild|moderate|severe|none|no|absent|normal)\b",
    )
});
static ENLARGED_HEART: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(?:enlarged|large)\s+(?:cardiac|heart)"));
static NORMAL_HEART: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?:cardiac|heart)\s+(?:size|silhouette)\s+(?:is\s+)?normal"));

static EDEMA: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:pulmonary\s+)?(?:edema|vascular\s+congestion)[:\s]*(mild|moderate|severe|interstitial|alveolar|present|none|no)\b",
    )
});

static CONSOLIDATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:consolidation|infiltrate|opacity)[:\s]*(?:in\s+)?(?:the\s+)?((?:right|left|bilateral)\s+(?:upper|lower|middle)?\s*(?:lobe)?|(?:right|left|bilateral))",
    )
});

static PNEUMOTHORAX: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:pneumothorax|\bPTX)[:\s]*(small|moderate|large|tension|present|none|no|absent)\b")
});
static NO_PNEUMOTHORAX: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\bno\s+(?:evidence\s+of\s+)?pneumothorax"));

static ET_TUBE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:\bET\s+tube|\bETT\b|endotracheal\s+tube)[^.\n]*(\d+\.?\d*\s*cm\s+(?:above|from)\s+(?:the\s+)?carina|appropriately?\s+positioned|in\s+good\s+position|\bhigh\b|\blow\b)",
    )
});

static FRACTURE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"fractures?[:\s]*(?:of\s+)?(?:the\s+)?(\w+(?:\s+\w+)?(?:\s+rib)?)")
});

/// Plain radiograph findings
#[derive(Debug, Default, Clone, Copy)]
pub struct XrayExtractor;

impl ImagingExtractor for XrayExtractor {
    fn modality(&self) -> Modality {
        Modality::Xray
    }

    fn keywords(&self) -> &'static KeywordSet {
        &KEYWORDS
    }

    fn parameters(&self) -> ParameterCatalog {
        PARAMETERS
    }

    fn default_prompt(&self) -> &'static str {
        PROMPT
    }

    fn rule_findings(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        let cardiomegaly = first_lower(&CARDIOMEGALY, text, 1).or_else(|| {
            if ENLARGED_HEART.is_match(text) {
                Some("present".to_string())
            } else if NORMAL_HEART.is_match(text) {
                Some("none".to_string())
            } else {
                None
            }
        });
        if let Some(value) = cardiomegaly {
            findings.push(Finding::new("Cardiomegaly", value));
        }

        if let Some(value) = first_lower(&EDEMA, text, 1) {
            findings.push(Finding::new("Pulmonary Edema", value));
        }

        if let Some(value) = first_lower(&CONSOLIDATION, text, 1) {
            findings.push(Finding::new("Consolidation", value.trim()));
        }

        findings.extend(pleural_effusion(text));

        let pneumothorax = first_lower(&PNEUMOTHORAX, text, 1)
            .or_else(|| NO_PNEUMOTHORAX.is_match(text).then(|| "none".to_string()));
        if let Some(value) = pneumothorax {
            findings.push(Finding::new("Pneumothorax", value));
        }

        if let Some(value) = first_lower(&ET_TUBE, text, 1) {
            findings.push(Finding::new("ET Tube Position", value));
        }

        if let Some(caps) = FRACTURE.captures(text) {
            findings.push(Finding::new("Fracture", &caps[1]));
        }

        findings
    }
}

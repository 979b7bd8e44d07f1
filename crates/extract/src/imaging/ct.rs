use std::sync::LazyLock;

use regex::Regex;

use super::{
    Finding, ImagingExtractor, KeywordSet, Modality, ParameterCatalog, compile, first_lower,
    pleural_effusion,
};
use crate::text::title_case;

static KEYWORDS: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "ct scan",
        "ct",
        "computed tomography",
        "cat scan",
        "ct head",
        "ct chest",
        "ct abdomen",
        "ct pelvis",
        "ct spine",
        "ct cervical",
        "ct lumbar",
        "ct thoracic",
        "cta",
        "ct angiography",
        "ct angiogram",
        "ctpa",
        "ct pulmonary",
        "pe protocol",
        "ct with contrast",
        "ct without contrast",
        "non-contrast ct",
        "contrast-enhanced ct",
        "hounsfield",
        "hu",
    ])
});

const PARAMETERS: ParameterCatalog = &[
    (
        "head",
        &[
            "hemorrhage", "intracranial hemorrhage", "ICH", "subdural", "epidural",
            "subarachnoid", "SAH", "infarct", "stroke", "ischemia", "mass", "lesion", "tumor",
            "midline shift", "herniation", "ventricle", "ventriculomegaly", "hydrocephalus",
            "edema", "vasogenic edema", "atrophy", "volume loss",
        ],
    ),
    (
        "chest",
        &[
            "nodule", "pulmonary nodule", "lung nodule", "mass", "lung mass", "consolidation",
            "infiltrate", "ground glass", "GGO", "ground glass opacity", "effusion",
            "pleural effusion", "pneumothorax", "PTX", "lymphadenopathy", "lymph node",
            "pulmonary embolism", "PE", "embolus", "aorta", "aortic aneurysm",
            "aortic dissection",
        ],
    ),
    (
        "abdomen",
        &[
            "liver lesion", "hepatic lesion", "kidney stone", "renal stone", "nephrolithiasis",
            "hydronephrosis", "appendicitis", "appendix", "bowel obstruction", "SBO", "ileus",
            "free fluid", "ascites", "gallstones", "cholelithiasis", "pancreatitis",
            "pancreatic", "splenomegaly", "hepatomegaly",
        ],
    ),
    (
        "spine",
        &[
            "fracture", "compression fracture", "disc herniation", "disc bulge", "stenosis",
            "spinal stenosis", "foraminal stenosis", "alignment", "listhesis",
            "spondylolisthesis",
        ],
    ),
    (
        "vascular",
        &["stenosis", "occlusion", "aneurysm", "dissection", "thrombus", "thrombosis"],
    ),
    (
        "measurements",
        &["size", "diameter", "dimensions", "hounsfield", "HU", "enhancement"],
    ),
];

const PROMPT: &str = r#"You are an AI medical data extraction agent.
Your task is to identify, extract, and structure CT scan findings from clinical text.
Return clean, grouped JSON data for each CT study.

Extract CT-specific findings including:
- Head CT: hemorrhage, infarct, mass, midline shift
- Chest CT: nodules, consolidation, effusion, PE, lymphadenopathy
- Abdominal CT: liver/kidney lesions, stones, obstruction
- Spine CT: fractures, disc herniation, stenosis
- CTA: stenosis, aneurysm, dissection

Rules:
- Extract only CT-related findings
- Be case-insensitive and synonym-aware
- Normalize dates to YYYY-MM-DD format
- Preserve units and measurements exactly
- If no CT data found, return "No Data"

Return JSON with format:
{"studies": [{"date": "YYYY-MM-DD", "source_text": "brief description", "is_latest": true/false, "findings": [{"finding_name": "name", "finding_value": "value"}]}]}
"#;

static NODULE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:pulmonary\s+)?nodules?[:\s]*(\d+\.?\d*)\s*(mm|cm)(?:\s+(?:in|at|within)\s+(?:the\s+)?(\w+\s+\w+\s+lobe|\w+\s+lobe))?",
    )
});

static EMBOLISM_FOUND: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:pulmonary\s+embol(?:ism|us)|\bPE\b)[:\s]*(present|positive|identified|seen|acute|chronic|bilateral|right|left|segmental|subsegmental)\b",
    )
});

static EMBOLISM_ABSENT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(no|negative|absent|without)\s+(?:evidence\s+of\s+)?(?:pulmonary\s+embol|PE\b)")
});

static HEMORRHAGE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(intracranial|subdural|epidural|subarachnoid|intraparenchymal)\s+(?:hemorrhage|hematoma)[:\s]*(present|seen|identified|acute|chronic|none|no)?\b",
    )
});

static FRACTURE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:acute\s+)?fractures?[:\s]+(?:of\s+)?(?:the\s+)?(\w+(?:\s+\w+)?)")
});

/// CT scan findings
#[derive(Debug, Default, Clone, Copy)]
pub struct CtExtractor;

impl ImagingExtractor for CtExtractor {
    fn modality(&self) -> Modality {
        Modality::Ct
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

        for caps in NODULE.captures_iter(text) {
            let location = caps.get(3).map_or("", |m| m.as_str());
            let value = format!("{} {} {location}", &caps[1], &caps[2]);
            findings.push(Finding::new("Pulmonary Nodule", value.trim()));
        }

        let embolism = first_lower(&EMBOLISM_FOUND, text, 1)
            .or_else(|| EMBOLISM_ABSENT.is_match(text).then(|| "negative".to_string()));
        if let Some(value) = embolism {
            findings.push(Finding::new("Pulmonary Embolism", value));
        }

        findings.extend(pleural_effusion(text));

        if let Some(caps) = HEMORRHAGE.captures(text) {
            let value = caps
                .get(2)
                .map_or_else(|| "present".to_string(), |m| m.as_str().to_lowercase());
            findings.push(Finding::new(
                format!("{} Hemorrhage", title_case(&caps[1])),
                value,
            ));
        }

        if let Some(caps) = FRACTURE.captures(text) {
            findings.push(Finding::new("Fracture", &caps[1]));
        }

        findings
    }
}

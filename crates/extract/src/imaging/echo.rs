use std::sync::LazyLock;

use regex::Regex;

use super::{
    Finding, ImagingExtractor, KeywordSet, Modality, ParameterCatalog, compile, first_lower,
};

static KEYWORDS: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "echocardiogram",
        "echo",
        "echocardiography",
        "tte",
        "tee",
        "transthoracic",
        "transesophageal",
        "cardiac ultrasound",
        "2d echo",
        "doppler echo",
        "ejection fraction",
        "lvef",
        "ef",
        "e/f",
        "left ventricle",
        "lv function",
        "lv systolic",
    ])
});

const PARAMETERS: ParameterCatalog = &[
    (
        "functional",
        &[
            "EF", "LVEF", "Ejection Fraction", "LV function", "LV systolic function",
            "RV function", "RVEF", "global longitudinal strain", "GLS",
        ],
    ),
    (
        "dimensional",
        &[
            "LVEDD", "LVESD", "LVIDd", "LVIDs", "IVSd", "IVSs", "LVPWd", "LVPWs",
            "LA diameter", "LA volume", "LAVi", "LA size", "RA size", "RV size", "RVEDD",
            "LV mass", "LV mass index", "LVMi", "aortic root", "ascending aorta",
        ],
    ),
    (
        "hemodynamic",
        &[
            "LVOT gradient", "LVOT VTI", "LVOT diameter", "PASP", "RVSP", "PA pressure",
            "pulmonary pressure", "TAPSE", "RV S'", "E velocity", "A velocity", "E/A ratio",
            "e'", "e prime", "E/e'", "E/e' ratio", "deceleration time", "DT", "IVRT",
            "cardiac output", "CO", "cardiac index", "CI", "stroke volume", "SV",
        ],
    ),
    (
        "valvular",
        &[
            "MR", "mitral regurgitation", "TR", "tricuspid regurgitation", "AR",
            "aortic regurgitation", "PR", "pulmonic regurgitation", "MS", "mitral stenosis",
            "MVA", "AS", "aortic stenosis", "AVA", "aortic valve area", "valve gradient",
            "mean gradient", "peak gradient",
        ],
    ),
    (
        "qualitative",
        &[
            "LVH", "left ventricular hypertrophy", "RVH", "right ventricular hypertrophy",
            "dilation", "dilated", "enlarged", "wall motion", "WMA",
            "wall motion abnormality", "hypokinesis", "akinesis", "dyskinesis",
            "pericardial effusion", "pericarditis", "diastolic dysfunction",
            "diastolic function",
        ],
    ),
];

const PROMPT: &str = r#"You are an AI medical data extraction agent.
Your task is to identify, extract, and structure echocardiogram (ECHO) findings from clinical text.
Return clean, grouped JSON data for each ECHO study.

Extract ECHO-specific findings including:
- Functional: EF, LVEF, LV function
- Dimensional: LVEDD, LVESD, IVSd, LVPWd, LA diameter/volume, LV mass
- Hemodynamic: LVOT gradient, PASP, TAPSE, E/e'
- Valvular: MR, TR, AR, AS, MS grades
- Qualitative: LVH, dilation, wall motion abnormalities

Rules:
- Extract only ECHO-related metrics
- Be case-insensitive and synonym-aware
- Normalize dates to YYYY-MM-DD format
- Preserve units exactly
- If no ECHO data found, return "No Data"

Return JSON with format:
{"studies": [{"date": "YYYY-MM-DD", "source_text": "brief description", "is_latest": true/false, "findings": [{"finding_name": "name", "finding_value": "value"}]}]}
"#;

const EF_NAMES: &str = r"(?:\bEF|LVEF|ejection\s*fraction)";

static EJECTION_FRACTION: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        compile(&format!(r"{EF_NAMES}[:\s]*(\d{{1,2}}(?:\.\d+)?)\s*%")),
        compile(&format!(r"{EF_NAMES}[:\s]*(\d{{1,2}}(?:\.\d+)?)\s*(?:percent|to)\b")),
        compile(&format!(r"(\d{{1,2}}(?:\.\d+)?)\s*%\s*{EF_NAMES}")),
    ]
});

static LVH: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        compile(r"(mild|moderate|severe|concentric|eccentric)?\s*(?:\bLVH\b|left\s*ventricular\s*hypertrophy)"),
        compile(r"(?:\bLVH\b|left\s*ventricular\s*hypertrophy)[:\s]*(mild|moderate|severe|concentric|eccentric)?"),
    ]
});

const DIMENSIONS: [&str; 5] = ["LVEDD", "LVESD", "IVSd", "LVPWd", "LA diameter"];

static DIMENSION: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    DIMENSIONS
        .iter()
        .map(|name| {
            let re = compile(&format!(r"\b{}[:\s]*(\d+\.?\d*)\s*(cm|mm)\b", regex::escape(name)));
            (*name, re)
        })
        .collect()
});

static PASP: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:\bPASP|PA\s*systolic\s*pressure|\bRVSP)[:\s]*(\d+\.?\d*)\s*(?:mmHg|mm\s*Hg)?")
});

const REGURGITATION: [(&str, &str); 3] = [
    ("MR", "Mitral Regurgitation"),
    ("TR", "Tricuspid Regurgitation"),
    ("AR", "Aortic Regurgitation"),
];

static VALVES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    REGURGITATION
        .iter()
        .map(|(abbrev, full)| {
            let re = compile(&format!(
                r"(?:\b{abbrev}\b|{full})[:\s]*(trace|trivial|mild-moderate|moderate-severe|mild|moderate|severe)\b"
            ));
            (*full, re)
        })
        .collect()
});

/// Echocardiogram findings
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoExtractor;

impl ImagingExtractor for EchoExtractor {
    fn modality(&self) -> Modality {
        Modality::Echo
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

        if let Some(ef) = EJECTION_FRACTION
            .iter()
            .find_map(|re| re.captures(text)?.get(1))
        {
            findings.push(Finding::new("Ejection Fraction", format!("{}%", ef.as_str())));
        }

        if let Some(caps) = LVH.iter().find_map(|re| re.captures(text)) {
            let qualifier = caps
                .get(1)
                .map_or_else(|| "present".to_string(), |m| m.as_str().to_lowercase());
            findings.push(Finding::new("LVH", qualifier));
        }

        for (name, re) in DIMENSION.iter() {
            if let Some(caps) = re.captures(text) {
                findings.push(Finding::new(*name, format!("{} {}", &caps[1], &caps[2])));
            }
        }

        if let Some(caps) = PASP.captures(text) {
            findings.push(Finding::new("PASP", format!("{} mmHg", &caps[1])));
        }

        for (name, re) in VALVES.iter() {
            if let Some(grade) = first_lower(re, text, 1) {
                findings.push(Finding::new(*name, grade));
            }
        }

        findings
    }
}

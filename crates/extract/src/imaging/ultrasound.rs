use std::sync::LazyLock;

use regex::Regex;

use super::{
    Finding, ImagingExtractor, KeywordSet, Modality, ParameterCatalog, compile, first_lower,
};

static KEYWORDS: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "ultrasound",
        "sonogram",
        "sonography",
        "us",
        "ruq ultrasound",
        "ruq us",
        "right upper quadrant",
        "abdominal ultrasound",
        "abdominal us",
        "renal ultrasound",
        "renal us",
        "kidney ultrasound",
        "pelvic ultrasound",
        "pelvic us",
        "transvaginal",
        "thyroid ultrasound",
        "thyroid us",
        "doppler",
        "duplex",
        "venous doppler",
        "carotid doppler",
        "carotid ultrasound",
        "lower extremity venous",
        "dvt study",
        "obstetric ultrasound",
        "ob ultrasound",
        "gallbladder",
        "hepatobiliary",
    ])
});

/// Signals of an echocardiogram rather than a general ultrasound
static ECHO_SIGNALS: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "echocardiogram",
        "echocardiography",
        "tte",
        "tee",
        "transthoracic echo",
        "transesophageal echo",
        "ejection fraction",
        "lvef",
        "cardiac echo",
    ])
});

static BODY_SITES: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "abdominal",
        "renal",
        "kidney",
        "liver",
        "gallbladder",
        "thyroid",
        "pelvic",
        "carotid",
        "dvt",
        "venous",
    ])
});

const PARAMETERS: ParameterCatalog = &[
    (
        "abdominal",
        &[
            "liver size", "liver echogenicity", "hepatomegaly", "steatosis", "fatty liver",
            "gallstones", "cholelithiasis", "sludge", "CBD", "common bile duct",
            "biliary dilation", "gallbladder wall", "cholecystitis", "spleen size",
            "splenomegaly", "pancreas", "ascites", "free fluid",
        ],
    ),
    (
        "renal",
        &[
            "kidney size", "kidney length", "cortical thickness", "cortical echogenicity",
            "hydronephrosis", "hydroureter", "renal stone", "nephrolithiasis", "renal cyst",
            "renal mass", "resistive index", "RI",
        ],
    ),
    (
        "pelvic",
        &[
            "uterus size", "uterine size", "endometrial thickness", "endometrium",
            "ovary size", "ovarian cyst", "ovarian mass", "fibroid", "leiomyoma",
            "free fluid", "adnexal",
        ],
    ),
    (
        "thyroid",
        &[
            "nodule", "thyroid nodule", "TI-RADS", "TIRADS", "lymph node", "cervical lymph",
            "thyroid size", "goiter",
        ],
    ),
    (
        "vascular",
        &[
            "DVT", "deep vein thrombosis", "thrombus", "compressible", "non-compressible",
            "carotid stenosis", "ICA stenosis", "plaque", "velocity", "AAA",
            "aortic aneurysm", "aorta diameter", "ABI", "ankle-brachial",
        ],
    ),
    (
        "obstetric",
        &[
            "gestational age", "GA", "fetal heart rate", "FHR", "amniotic fluid", "AFI",
            "placenta", "placental position", "BPD", "HC", "AC", "FL",
        ],
    ),
];

const PROMPT: &str = r#"You are an AI medical data extraction agent.
Your task is to identify, extract, and structure ultrasound findings from clinical text.
Return clean, grouped JSON data for each ultrasound study.
NOTE: This is for NON-CARDIAC ultrasound. Echocardiograms are handled separately.

Extract ultrasound-specific findings including:
- Abdominal: liver, gallbladder, CBD, spleen, pancreas
- Renal: kidney size, hydronephrosis, stones, cysts
- Pelvic: uterus, ovaries, endometrium
- Thyroid: nodules, TI-RADS
- Vascular: DVT, carotid stenosis, AAA
- OB: gestational age, fetal heart rate, AFI

Rules:
- Extract only ultrasound findings (not cardiac echo)
- Be case-insensitive and synonym-aware
- Normalize dates to YYYY-MM-DD format
- Preserve measurements exactly
- If no ultrasound data found, return "No Data"

Return JSON with format:
{"studies": [{"date": "YYYY-MM-DD", "source_text": "brief description", "is_latest": true/false, "findings": [{"finding_name": "name", "finding_value": "value"}]}]}
"#;

static GALLSTONES: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:gallstone|cholelithiasis)s?[:\s]*(present|multiple|single|none|no|absent|\d+\.?\d*\s*(?:cm|mm))\b",
    )
});
static STONES_IN_GALLBLADDER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"stones?\s+(?:in|within)\s+(?:the\s+)?gallbladder"));

static CBD: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:\bCBD|common\s+bile\s+duct)[^.\n]*?(\d+\.?\d*)\s*(mm|cm)\b")
});

static HYDRONEPHROSIS: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"hydronephrosis[:\s]*(mild|moderate|severe|grade\s*\d|none|no|absent|right|left|bilateral)\b",
    )
});

static KIDNEY: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(right|left)\s+kidney[^.\n]*?(\d+\.?\d*)\s*(cm|mm)\b")
});

static DVT: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        compile(
            r"(?:\bDVT|deep\s+vein\s+thrombosis)[:\s]*(present|positive|identified|acute|chronic|none|no|negative|absent)\b",
        ),
        compile(r"\b(no|negative)\s+(?:evidence\s+of\s+)?(?:DVT|deep\s+vein\s+thrombosis)"),
        compile(r"\bveins?\s+(?:are\s+)?(non-compressible|compressible|patent)"),
    ]
});

static THYROID_NODULE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"thyroid\s+nodule[^.\n]*?(\d+\.?\d*)\s*(cm|mm)\b")
});

static TIRADS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?:TI-?RADS)[:\s]*(TR\d|\d)\b"));

static LIVER: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:liver|hepatic)[^.\n]*(increased\s+echogenicity|steatosis|fatty\s+(?:liver|infiltration)|normal\s+echogenicity)",
    )
});

static ASCITES: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:ascites|free\s+fluid)[:\s]*(present|small|moderate|large|trace|none|no|absent)\b")
});

/// Non-cardiac ultrasound findings
#[derive(Debug, Default, Clone, Copy)]
pub struct UltrasoundExtractor;

impl ImagingExtractor for UltrasoundExtractor {
    fn modality(&self) -> Modality {
        Modality::Ultrasound
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

    /// Echocardiogram-only text is left to the echo extractor
    fn detect(&self, text: &str) -> bool {
        if !KEYWORDS.matches(text) {
            return false;
        }
        !(ECHO_SIGNALS.matches(text) && !BODY_SITES.matches(text))
    }

    fn rule_findings(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        let gallstones = first_lower(&GALLSTONES, text, 1).or_else(|| {
            STONES_IN_GALLBLADDER
                .is_match(text)
                .then(|| "present".to_string())
        });
        if let Some(value) = gallstones {
            findings.push(Finding::new("Gallstones", value));
        }

        if let Some(caps) = CBD.captures(text) {
            findings.push(Finding::new("CBD Diameter", format!("{} {}", &caps[1], &caps[2])));
        }

        if let Some(value) = first_lower(&HYDRONEPHROSIS, text, 1) {
            findings.push(Finding::new("Hydronephrosis", value));
        }

        for caps in KIDNEY.captures_iter(text) {
            let side = if caps[1].eq_ignore_ascii_case("right") { "Right" } else { "Left" };
            findings.push(Finding::new(
                format!("{side} Kidney Size"),
                format!("{} {}", &caps[2], &caps[3]),
            ));
        }

        if let Some(raw) = DVT.iter().find_map(|re| first_lower(re, text, 1)) {
            let value = match raw.as_str() {
                "no" | "negative" | "compressible" | "patent" => "negative".to_string(),
                "non-compressible" => "positive (non-compressible)".to_string(),
                _ => raw,
            };
            findings.push(Finding::new("DVT", value));
        }

        if let Some(caps) = THYROID_NODULE.captures(text) {
            findings.push(Finding::new("Thyroid Nodule", format!("{} {}", &caps[1], &caps[2])));
        }

        if let Some(caps) = TIRADS.captures(text) {
            findings.push(Finding::new("TI-RADS", &caps[1]));
        }

        if let Some(value) = first_lower(&LIVER, text, 1) {
            findings.push(Finding::new("Liver Echogenicity", value));
        }

        if let Some(value) = first_lower(&ASCITES, text, 1) {
            findings.push(Finding::new("Ascites", value));
        }

        findings
    }
}

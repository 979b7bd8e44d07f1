use std::sync::LazyLock;

use regex::Regex;

use super::{
    Finding, ImagingExtractor, KeywordSet, Modality, ParameterCatalog, compile, first_lower,
};
use crate::text::title_case;

static KEYWORDS: LazyLock<KeywordSet> = LazyLock::new(|| {
    KeywordSet::new(&[
        "mri",
        "magnetic resonance",
        "mr imaging",
        "mri brain",
        "mri spine",
        "mri lumbar",
        "mri cervical",
        "mri knee",
        "mri shoulder",
        "mri hip",
        "mra",
        "mr angiography",
        "mr angiogram",
        "mrcp",
        "cardiac mri",
        "cardiac mr",
        "flair",
        "t1 weighted",
        "t2 weighted",
        "t1w",
        "t2w",
        "dwi",
        "diffusion weighted",
        "diffusion restriction",
        "adc",
        "apparent diffusion",
        "gadolinium",
        "gad",
        "stir",
        "gre",
        "swi",
    ])
});

const PARAMETERS: ParameterCatalog = &[
    (
        "brain",
        &[
            "white matter lesion", "T2 hyperintensity", "FLAIR hyperintensity",
            "diffusion restriction", "DWI positive", "acute infarct", "enhancement",
            "enhancing lesion", "mass effect", "midline shift", "herniation", "volume loss",
            "atrophy", "encephalomalacia", "demyelination", "MS", "multiple sclerosis",
        ],
    ),
    (
        "spine",
        &[
            "disc herniation", "disc bulge", "disc protrusion", "cord compression",
            "cord signal", "foraminal stenosis", "central stenosis", "nerve root",
            "impingement", "Modic changes", "degenerative",
        ],
    ),
    (
        "cardiac",
        &[
            "EF", "LVEF", "ejection fraction", "LV volume", "LVEDV", "LVESV",
            "late gadolinium enhancement", "LGE", "scar", "fibrosis", "T2 edema",
            "myocardial edema", "perfusion defect", "ischemia", "wall motion",
        ],
    ),
    (
        "msk",
        &[
            "ACL", "anterior cruciate", "tear", "meniscus", "meniscal tear", "rotator cuff",
            "supraspinatus", "infraspinatus", "tendon", "tendinopathy", "tendinosis",
            "bone marrow edema", "bone bruise", "cartilage", "chondral", "labrum", "labral",
        ],
    ),
    (
        "body",
        &[
            "lesion", "mass", "nodule", "PI-RADS", "prostate", "BI-RADS", "breast",
            "enhancement pattern", "washout",
        ],
    ),
    (
        "sequences",
        &["T1", "T2", "FLAIR", "DWI", "ADC", "STIR", "GRE", "SWI", "post-contrast"],
    ),
];

const PROMPT: &str = r#"You are an AI medical data extraction agent.
Your task is to identify, extract, and structure MRI findings from clinical text.
Return clean, grouped JSON data for each MRI study.

Extract MRI-specific findings including:
- Brain MRI: white matter lesions, infarcts, enhancement, mass effect
- Spine MRI: disc herniation, cord compression, stenosis
- Cardiac MRI: EF, LGE, edema, perfusion defects
- MSK MRI: ligament tears, meniscal injury, tendon pathology
- Body MRI: lesion characterization, PI-RADS, BI-RADS

Rules:
- Extract only MRI-related findings
- Note which sequences show findings (T1, T2, FLAIR, DWI)
- Normalize dates to YYYY-MM-DD format
- Preserve measurements exactly
- If no MRI data found, return "No Data"

Return JSON with format:
{"studies": [{"date": "YYYY-MM-DD", "source_text": "brief description", "is_latest": true/false, "findings": [{"finding_name": "name", "finding_value": "value"}]}]}
"#;

static WHITE_MATTER: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:white\s+matter\s+(?:lesion|hyperintensit|change)|T2\s+hyperintens|FLAIR\s+hyperintens)[^.\n]*(multiple|few|several|scattered|periventricular|subcortical)",
    )
});

static INFARCT: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        compile(r"(?:acute\s+infarct|diffusion\s+restriction)[^.\n]*((?:left|right)\s+\w+(?:\s+\w+)?)"),
        compile(r"(?:\bDWI|diffusion)\s+(?:positive|restricted|hyperintense)[^.\n]*((?:left|right)\s+\w+)?"),
    ]
});

static DISC: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:disc|disk)\s+(?:herniation|bulge|protrusion)[^.\n]*(?:at\s+)?(L\d[-/](?:L|S)\d|C\d[-/]C?\d|T\d+[-/]T?\d+)",
    )
});

static STENOSIS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(foraminal|central|spinal\s+canal)\s+stenosis[:\s]*(mild|moderate|severe)?")
});

static LIGAMENT: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\b(ACL|PCL|MCL|LCL|anterior\s+cruciate|posterior\s+cruciate)\s+(?:ligament\s+)?(tear|rupture|injury|intact)",
    )
});

static MENISCUS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(medial|lateral)\s+meniscus[^.\n]*(tear|intact|degenerative)")
});

/// MRI findings
#[derive(Debug, Default, Clone, Copy)]
pub struct MriExtractor;

impl ImagingExtractor for MriExtractor {
    fn modality(&self) -> Modality {
        Modality::Mri
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

        if let Some(extent) = first_lower(&WHITE_MATTER, text, 1) {
            findings.push(Finding::new("White Matter Lesions", extent));
        }

        if let Some(caps) = INFARCT.iter().find_map(|re| re.captures(text)) {
            let location = caps.get(1).map_or("present", |m| m.as_str());
            findings.push(Finding::new("Acute Infarct", location));
        }

        for caps in DISC.captures_iter(text) {
            findings.push(Finding::new("Disc Herniation", &caps[1]));
        }

        if let Some(caps) = STENOSIS.captures(text) {
            let severity = caps
                .get(2)
                .map_or_else(|| "present".to_string(), |m| m.as_str().to_lowercase());
            findings.push(Finding::new(
                format!("{} Stenosis", title_case(&caps[1])),
                severity,
            ));
        }

        if let Some(caps) = LIGAMENT.captures(text) {
            findings.push(Finding::new(
                format!("{} Status", caps[1].to_uppercase()),
                caps[2].to_lowercase(),
            ));
        }

        if let Some(caps) = MENISCUS.captures(text) {
            findings.push(Finding::new(
                format!("{} Meniscus", title_case(&caps[1])),
                caps[2].to_lowercase(),
            ));
        }

        findings
    }
}

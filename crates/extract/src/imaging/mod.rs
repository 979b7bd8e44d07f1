//! Imaging study extraction.
//!
//! Each modality implements [`ImagingExtractor`]: a keyword set used to
//! detect the modality in free text, a parameter catalog and default prompt
//! for LLM-backed extraction, and a set of rules producing findings without
//! an LLM. [`ImagingOrchestrator`] runs the enabled extractors together.

mod ct;
mod echo;
mod llm;
mod mri;
mod orchestrator;
mod ultrasound;
mod xray;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::dates;
use crate::error::ExtractError;
use crate::extraction::{self, Extraction};
use crate::text;

pub use ct::CtExtractor;
pub use echo::EchoExtractor;
pub use mri::MriExtractor;
pub use orchestrator::{
    CombinedFinding, CombinedStudy, ImagingOrchestrator, combine_by_date, flatten,
};
pub use ultrasound::UltrasoundExtractor;
pub use xray::XrayExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Echo,
    Ct,
    Mri,
    Xray,
    Ultrasound,
}

impl Modality {
    pub const ALL: [Modality; 5] = [
        Modality::Echo,
        Modality::Ct,
        Modality::Mri,
        Modality::Xray,
        Modality::Ultrasound,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Echo => "ECHO",
            Modality::Ct => "CT",
            Modality::Mri => "MRI",
            Modality::Xray => "XRAY",
            Modality::Ultrasound => "ULTRASOUND",
        }
    }

    /// Default `source_text` of a study
    pub fn report_label(self) -> &'static str {
        match self {
            Modality::Echo => "ECHO report",
            Modality::Ct => "CT report",
            Modality::Mri => "MRI report",
            Modality::Xray => "X-ray report",
            Modality::Ultrasound => "Ultrasound report",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Modality::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or(ExtractError::UnknownModality(wanted))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub finding_name: String,
    pub finding_value: String,
}

impl Finding {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            finding_name: name.into(),
            finding_value: value.into(),
        }
    }

    /// Numeric reading and unit of the value, when it has a number
    pub fn measurement(&self) -> Option<(f64, Option<&str>)> {
        let value = text::numeric_value(&self.finding_value)?;
        Some((value, text::unit(&self.finding_value)))
    }
}

/// One dated imaging examination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Study {
    #[serde(serialize_with = "extraction::serialize_date")]
    pub date: Option<NaiveDate>,
    pub source_text: String,
    pub is_latest: bool,
    pub modality: Modality,
    pub findings: Vec<Finding>,
}

/// Sort newest first and flag the head as the latest study
pub(crate) fn mark_latest(studies: &mut [Study]) {
    extraction::sort_newest_first(studies, |s| s.date);
    for (i, study) in studies.iter_mut().enumerate() {
        study.is_latest = i == 0;
    }
}

/// Case-insensitive, word-bounded keyword matcher
pub struct KeywordSet {
    words: &'static [&'static str],
    matcher: Regex,
}

impl KeywordSet {
    pub fn new(words: &'static [&'static str]) -> Self {
        let alternation = words
            .iter()
            .map(|w| regex::escape(w.trim()))
            .collect::<Vec<_>>()
            .join("|");
        let matcher =
            Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("valid regex");
        Self { words, matcher }
    }

    pub fn words(&self) -> &'static [&'static str] {
        self.words
    }

    pub fn matches(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// Named parameter groups an extractor cares about
pub type ParameterCatalog = &'static [(&'static str, &'static [&'static str])];

pub trait ImagingExtractor: Send + Sync {
    fn modality(&self) -> Modality;

    fn keywords(&self) -> &'static KeywordSet;

    fn parameters(&self) -> ParameterCatalog;

    fn default_prompt(&self) -> &'static str;

    /// Findings recognized by the built-in rules
    fn rule_findings(&self, text: &str) -> Vec<Finding>;

    fn detect(&self, text: &str) -> bool {
        self.keywords().matches(text)
    }

    /// Default prompt followed by the parameter catalog
    fn system_prompt(&self) -> String {
        let mut prompt = self.default_prompt().to_string();
        prompt.push_str("\nParameters of interest:\n");
        for (group, names) in self.parameters() {
            prompt.push_str(&format!("- {group}: {}\n", names.join(", ")));
        }
        prompt
    }

    /// Rule-based extraction: one study dated with the first date in the text
    fn extract(&self, text: &str) -> Extraction<Study> {
        if text.trim().is_empty() || !self.detect(text) {
            return Extraction::NoData;
        }
        let findings = self.rule_findings(text);
        if findings.is_empty() {
            return Extraction::NoData;
        }
        Extraction::Found(vec![Study {
            date: dates::parse_date(text),
            source_text: self.modality().report_label().to_string(),
            is_latest: true,
            modality: self.modality(),
            findings,
        }])
    }

    /// Interpret an LLM reply for this modality
    fn parse_llm_response(&self, response: &str) -> Extraction<Study> {
        llm::parse_response(self.modality(), response)
    }
}

pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("valid regex")
}

/// Capture group `group` of the first match, lowercased
pub(crate) fn first_lower(re: &Regex, text: &str, group: usize) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(group))
        .map(|m| m.as_str().to_lowercase())
}

static PLEURAL_EFFUSION: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:pleural\s+)?effusions?[:\s]*(small|moderate|large|trace|minimal|bilateral|right|left|none|no)\b",
    )
});

/// Shared by the CT and radiograph rules
pub(crate) fn pleural_effusion(text: &str) -> Option<Finding> {
    first_lower(&PLEURAL_EFFUSION, text, 1).map(|v| Finding::new("Pleural Effusion", v))
}

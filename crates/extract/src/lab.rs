//! Laboratory result extraction.
//!
//! Lab names are recognized through an alias table mapping abbreviations to
//! canonical names. Values are read from a short window after each name.
//! Multi-line text is scanned twice: once line by line, where a line that is
//! mostly a date sets the date for the lines below it, and once as narrative,
//! where each date governs the text up to the next date. Both passes are
//! merged without duplicates.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::dates::{self, DateMatch};
use crate::extraction::{self, Extraction};

/// Alias to canonical lab name. Aliases are lowercase.
const LAB_ALIASES: &[(&str, &str)] = &[
    // renal
    ("cr", "Creatinine"),
    ("creat", "Creatinine"),
    ("creatinine", "Creatinine"),
    ("serum creatinine", "Creatinine"),
    ("egfr", "eGFR"),
    ("gfr", "GFR"),
    ("estimated gfr", "eGFR"),
    ("bun", "BUN"),
    ("blood urea nitrogen", "BUN"),
    ("urea nitrogen", "BUN"),
    // cardiac
    ("bnp", "BNP"),
    ("b-type natriuretic peptide", "BNP"),
    ("nt-probnp", "NT-proBNP"),
    ("ntprobnp", "NT-proBNP"),
    ("nt probnp", "NT-proBNP"),
    ("pro-bnp", "NT-proBNP"),
    ("hs-trop", "hs-Troponin"),
    ("hstrop", "hs-Troponin"),
    ("hs-troponin", "hs-Troponin"),
    ("hs troponin", "hs-Troponin"),
    ("high sensitivity troponin", "hs-Troponin"),
    ("troponin", "Troponin"),
    ("troponin i", "Troponin I"),
    ("troponin t", "Troponin T"),
    ("trop", "Troponin"),
    ("trop i", "Troponin I"),
    ("trop t", "Troponin T"),
    ("hscrp", "hsCRP"),
    ("hs-crp", "hsCRP"),
    ("hs crp", "hsCRP"),
    ("high sensitivity crp", "hsCRP"),
    ("c-reactive protein", "CRP"),
    ("crp", "CRP"),
    ("ck-mb", "CK-MB"),
    ("ckmb", "CK-MB"),
    ("ck mb", "CK-MB"),
    ("creatine kinase mb", "CK-MB"),
    // hepatic
    ("alt", "ALT"),
    ("sgpt", "ALT"),
    ("alanine aminotransferase", "ALT"),
    ("alanine transaminase", "ALT"),
    ("ast", "AST"),
    ("sgot", "AST"),
    ("aspartate aminotransferase", "AST"),
    ("aspartate transaminase", "AST"),
    ("total bilirubin", "Total Bilirubin"),
    ("tbili", "Total Bilirubin"),
    ("t bili", "Total Bilirubin"),
    ("bilirubin total", "Total Bilirubin"),
    ("bilirubin", "Bilirubin"),
    ("direct bilirubin", "Direct Bilirubin"),
    ("indirect bilirubin", "Indirect Bilirubin"),
    ("alp", "ALP"),
    ("alkaline phosphatase", "ALP"),
    ("alk phos", "ALP"),
    // metabolic and electrolytes
    ("na", "Sodium"),
    ("sodium", "Sodium"),
    ("na+", "Sodium"),
    ("k", "Potassium"),
    ("potassium", "Potassium"),
    ("k+", "Potassium"),
    ("glucose", "Glucose"),
    ("glu", "Glucose"),
    ("blood glucose", "Glucose"),
    ("fasting glucose", "Fasting Glucose"),
    ("fbg", "Fasting Glucose"),
    ("hba1c", "HbA1c"),
    ("a1c", "HbA1c"),
    ("hemoglobin a1c", "HbA1c"),
    ("glycated hemoglobin", "HbA1c"),
    ("glycohemoglobin", "HbA1c"),
    ("cl", "Chloride"),
    ("chloride", "Chloride"),
    ("co2", "CO2"),
    ("bicarbonate", "Bicarbonate"),
    ("bicarb", "Bicarbonate"),
    ("hco3", "Bicarbonate"),
    ("calcium", "Calcium"),
    ("ca", "Calcium"),
    ("ca++", "Calcium"),
    ("magnesium", "Magnesium"),
    ("mg", "Magnesium"),
    ("phosphorus", "Phosphorus"),
    ("phos", "Phosphorus"),
    ("phosphate", "Phosphate"),
    // lipids
    ("ldl", "LDL"),
    ("ldl-c", "LDL"),
    ("ldl cholesterol", "LDL"),
    ("low density lipoprotein", "LDL"),
    ("hdl", "HDL"),
    ("hdl-c", "HDL"),
    ("hdl cholesterol", "HDL"),
    ("high density lipoprotein", "HDL"),
    ("tg", "Triglycerides"),
    ("triglycerides", "Triglycerides"),
    ("trigs", "Triglycerides"),
    ("cholesterol", "Cholesterol"),
    ("total cholesterol", "Total Cholesterol"),
    ("tc", "Total Cholesterol"),
    ("chol", "Cholesterol"),
    // hematology
    ("hgb", "Hemoglobin"),
    ("hb", "Hemoglobin"),
    ("hemoglobin", "Hemoglobin"),
    ("haemoglobin", "Hemoglobin"),
    ("hct", "Hematocrit"),
    ("hematocrit", "Hematocrit"),
    ("wbc", "WBC"),
    ("white blood cells", "WBC"),
    ("white blood cell count", "WBC"),
    ("leukocytes", "WBC"),
    ("rbc", "RBC"),
    ("red blood cells", "RBC"),
    ("red blood cell count", "RBC"),
    ("erythrocytes", "RBC"),
    ("plt", "Platelets"),
    ("platelets", "Platelets"),
    ("platelet count", "Platelets"),
    ("mcv", "MCV"),
    ("mch", "MCH"),
    ("mchc", "MCHC"),
    ("rdw", "RDW"),
    ("mpv", "MPV"),
    // coagulation
    ("pt", "PT"),
    ("prothrombin time", "PT"),
    ("inr", "INR"),
    ("ptt", "PTT"),
    ("aptt", "aPTT"),
    ("partial thromboplastin time", "PTT"),
    // other
    ("albumin", "Albumin"),
    ("alb", "Albumin"),
    ("total protein", "Total Protein"),
    ("protein total", "Total Protein"),
    ("tp", "Total Protein"),
    ("uric acid", "Uric Acid"),
    ("ua", "Uric Acid"),
    ("tsh", "TSH"),
    ("thyroid stimulating hormone", "TSH"),
    ("t3", "T3"),
    ("t4", "T4"),
    ("free t4", "Free T4"),
    ("ft4", "Free T4"),
    ("free t3", "Free T3"),
    ("ft3", "Free T3"),
    ("iron", "Iron"),
    ("fe", "Iron"),
    ("ferritin", "Ferritin"),
    ("tibc", "TIBC"),
    ("transferrin", "Transferrin"),
    ("vitamin d", "Vitamin D"),
    ("vit d", "Vitamin D"),
    ("25-oh vitamin d", "Vitamin D"),
    ("vitamin b12", "Vitamin B12"),
    ("b12", "Vitamin B12"),
    ("folate", "Folate"),
    ("folic acid", "Folate"),
];

/// Bytes after a lab name searched for its value
const VALUE_WINDOW: usize = 50;

/// Lines shorter than this once the date is removed are date headers
const HEADER_REMAINDER: usize = 10;

static LAB_NAME: LazyLock<Regex> = LazyLock::new(|| {
    let mut names: Vec<&str> = LAB_ALIASES
        .iter()
        .flat_map(|(alias, canonical)| [*alias, *canonical])
        .collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    names.dedup();
    let alternation = names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({alternation})\b")).expect("valid regex")
});

static LAB_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?::|=|is|was|of)?\s*<?([<>]?\d+(?:\.\d+)?(?:\s*[-–]\s*\d+(?:\.\d+)?)?)\s*((?:[a-zA-Z]+/?[a-zA-Z]*(?:/[a-zA-Z]+)?)?(?:\^?\d+)?)?",
    )
    .expect("valid regex")
});

static HEADER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[:\-–\s]+").expect("valid regex"));

/// A single lab reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabResult {
    pub lab_name: String,
    pub lab_value: String,
}

/// Lab readings sharing a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabGroup {
    #[serde(serialize_with = "extraction::serialize_date")]
    pub date: Option<NaiveDate>,
    pub labs: Vec<LabResult>,
}

impl LabGroup {
    /// Value recorded for a canonical lab name
    pub fn value_of(&self, lab_name: &str) -> Option<&str> {
        self.labs
            .iter()
            .find(|l| l.lab_name == lab_name)
            .map(|l| l.lab_value.as_str())
    }
}

type Reading = (Option<NaiveDate>, String, String);

#[derive(Debug, Default, Clone, Copy)]
pub struct LabExtractor;

impl LabExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Canonical name for an alias, or the input unchanged when unknown
    pub fn normalize_name(&self, name: &str) -> String {
        let key = name.trim().to_lowercase();
        LAB_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, canonical)| (*canonical).to_string())
            .unwrap_or_else(|| name.to_string())
    }

    /// Extract lab readings grouped by date, newest first
    pub fn extract(&self, text: &str) -> Extraction<LabGroup> {
        if text.trim().is_empty() {
            return Extraction::NoData;
        }

        let line_count = text.lines().filter(|l| !l.trim().is_empty()).count();
        let readings = if line_count > 1 {
            let mut readings = self.columnar(text);
            let mut seen: HashSet<Reading> = readings.iter().cloned().collect();
            for reading in self.narrative(text) {
                if seen.insert(reading.clone()) {
                    readings.push(reading);
                }
            }
            readings
        } else {
            self.narrative(text)
        };

        let mut groups: Vec<LabGroup> = Vec::new();
        for (date, lab_name, lab_value) in readings {
            let reading = LabResult { lab_name, lab_value };
            match groups.iter_mut().find(|g| g.date == date) {
                Some(group) => group.labs.push(reading),
                None => groups.push(LabGroup {
                    date,
                    labs: vec![reading],
                }),
            }
        }
        extraction::sort_newest_first(&mut groups, |g| g.date);
        Extraction::from_vec(groups)
    }

    fn columnar(&self, text: &str) -> Vec<Reading> {
        let mut readings = Vec::new();
        let mut current = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let found = dates::find_dates(line);
            let inline = found.first();
            if inline.is_some_and(|first| is_date_header(line, first)) {
                current = inline.map(|first| first.date);
                continue;
            }
            let date = inline.map(|d| d.date).or(current);
            readings.extend(self.scan(line, date));
        }
        readings
    }

    fn narrative(&self, text: &str) -> Vec<Reading> {
        let found = dates::find_dates(text);
        if found.is_empty() {
            return self.scan(text, None);
        }

        let mut readings = Vec::new();
        for (i, current) in found.iter().enumerate() {
            let end = found.get(i + 1).map_or(text.len(), |next| next.start);
            readings.extend(self.scan(&text[current.start..end], Some(current.date)));
        }
        readings
    }

    fn scan(&self, segment: &str, date: Option<NaiveDate>) -> Vec<Reading> {
        LAB_NAME
            .find_iter(segment)
            .filter_map(|m| {
                let value = read_value(segment, m.end())?;
                Some((date, self.normalize_name(m.as_str()), value))
            })
            .collect()
    }
}

fn is_date_header(line: &str, date: &DateMatch<'_>) -> bool {
    let remaining = line.replace(date.text, "");
    let remaining = HEADER_PREFIX.replace(remaining.trim(), "");
    remaining.chars().count() < HEADER_REMAINDER || !LAB_NAME.is_match(&remaining)
}

fn read_value(text: &str, from: usize) -> Option<String> {
    let mut end = (from + VALUE_WINDOW).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let caps = LAB_VALUE.captures(&text[from..end])?;
    let value = caps.get(1)?.as_str().trim();
    if value.is_empty() {
        return None;
    }
    match caps.get(2).map(|u| u.as_str().trim()).filter(|u| !u.is_empty()) {
        Some(unit) => Some(format!("{value} {unit}")),
        None => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_aliases() {
        let x = LabExtractor::new();
        assert_eq!(x.normalize_name("cr"), "Creatinine");
        assert_eq!(x.normalize_name("CR"), "Creatinine");
        assert_eq!(x.normalize_name("egfr"), "eGFR");
        assert_eq!(x.normalize_name("hs-crp"), "hsCRP");
        assert_eq!(x.normalize_name("Zinc"), "Zinc");
    }

    #[test]
    fn reads_value_with_unit() {
        assert_eq!(
            read_value("Cr 1.3 mg/dL, eGFR 62", 2).as_deref(),
            Some("1.3 mg/dL")
        );
        assert_eq!(read_value("eGFR 62, INR", 4).as_deref(), Some("62"));
        assert_eq!(read_value("BUN = 18 mg/dL", 3).as_deref(), Some("18 mg/dL"));
        assert_eq!(read_value("ALT pending", 3), None);
    }

    #[test]
    fn value_window_respects_char_boundaries() {
        let text = format!("Cr {}", "é".repeat(40));
        assert_eq!(read_value(&text, 2), None);
    }

    #[test]
    fn date_only_line_is_header() {
        let line = "10/05/2024";
        let date = &dates::find_dates(line)[0];
        assert!(is_date_header(line, date));

        let line = "10/05/2024: Creatinine 1.2 mg/dL";
        let date = &dates::find_dates(line)[0];
        assert!(!is_date_header(line, date));
    }
}

//! Interpretation of LLM replies to the extraction prompts.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{Finding, Modality, Study, mark_latest};
use crate::dates;
use crate::extraction::{Extraction, NO_DATA};

/// Parse a reply into studies for `modality`.
///
/// Accepts `{"studies": [...]}`, a single study object or a bare array,
/// optionally wrapped in a markdown code fence. Anything unparseable, or a
/// bare `"No Data"` reply, yields [`Extraction::NoData`].
pub(crate) fn parse_response(modality: Modality, response: &str) -> Extraction<Study> {
    let body = strip_fence(response);
    if body.trim_matches('"').eq_ignore_ascii_case(NO_DATA) {
        return Extraction::NoData;
    }

    let studies = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut obj)) => match obj.remove("studies") {
            Some(Value::Array(items)) => items,
            Some(_) => return Extraction::NoData,
            None if obj.contains_key("findings")
                && obj.get("date").is_some_and(Value::is_string) =>
            {
                vec![Value::Object(obj)]
            }
            None => return Extraction::NoData,
        },
        Ok(Value::Array(items)) => items,
        _ => return Extraction::NoData,
    };

    let mut cleaned: Vec<Study> = studies
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|study| clean_study(modality, study))
        .collect();
    mark_latest(&mut cleaned);
    Extraction::from_vec(cleaned)
}

fn clean_study(modality: Modality, study: &Map<String, Value>) -> Option<Study> {
    let prefix = modality.as_str().to_lowercase();
    let name_keys = [format!("{prefix}_name"), "finding_name".into(), "name".into()];
    let value_keys = [format!("{prefix}_value"), "finding_value".into(), "value".into()];

    let mut seen = HashSet::new();
    let findings: Vec<Finding> = study
        .get("findings")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .filter_map(|f| {
            let name = first_text(f, &name_keys)?;
            let value = first_text(f, &value_keys)?;
            seen.insert((name.to_lowercase(), value.to_lowercase()))
                .then(|| Finding::new(name, value))
        })
        .collect();

    if findings.is_empty() {
        return None;
    }

    Some(Study {
        date: study.get("date").and_then(Value::as_str).and_then(dates::parse_date),
        source_text: study
            .get("source_text")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(modality.report_label())
            .to_string(),
        is_latest: false,
        modality,
        findings,
    })
}

/// First key holding a non-empty string, number or boolean
fn first_text(obj: &Map<String, Value>, keys: &[String]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    for fence in ["```json", "```"] {
        if let Some(start) = trimmed.find(fence) {
            let after = &trimmed[start + fence.len()..];
            if let Some(end) = after.find("```") {
                return after[..end].trim();
            }
        }
    }
    trimmed
}

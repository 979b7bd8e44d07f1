//! Helpers for reading measurements out of finding values.

use std::sync::LazyLock;

use regex::Regex;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+\.?\d*").expect("valid regex"));

/// Checked in order; earlier entries win
static UNITS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"mm\s*Hg",
        r"cm/s",
        r"m/s",
        r"mL/m2",
        r"g/m2",
        r"mm",
        r"cm",
        r"mL",
        r"%",
        r"ms",
        r"bpm",
        r"HU",
        r"SUV",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("valid regex"))
    .collect()
});

/// First number in `text`
pub fn numeric_value(text: &str) -> Option<f64> {
    NUMBER.find(text)?.as_str().parse().ok()
}

/// First recognized unit in `text`, as written
pub fn unit(text: &str) -> Option<&str> {
    UNITS.iter().find_map(|re| re.find(text)).map(|m| m.as_str())
}

/// Collapse whitespace runs and repeated dots
pub fn clean(text: &str) -> String {
    static DOTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{2,}").expect("valid regex"));
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    DOTS.replace_all(&collapsed, ".").into_owned()
}

/// Capitalize each whitespace-separated word
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_numbers_and_units() {
        assert_eq!(numeric_value("55%"), Some(55.0));
        assert_eq!(numeric_value("5.3 cm"), Some(5.3));
        assert_eq!(numeric_value("trace"), None);
        assert_eq!(unit("5.3 cm"), Some("cm"));
        assert_eq!(unit("35 mmHg"), Some("mmHg"));
        assert_eq!(unit("45%"), Some("%"));
        assert_eq!(unit("mild"), None);
    }

    #[test]
    fn cleans_and_titles() {
        assert_eq!(clean("  EF   55%...\n stable "), "EF 55%. stable");
        assert_eq!(title_case("spinal canal"), "Spinal Canal");
        assert_eq!(title_case("SUBDURAL"), "Subdural");
    }
}

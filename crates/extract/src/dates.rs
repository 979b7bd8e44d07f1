//! Date recognition for clinical free text.
//!
//! Recognized shapes: `2024-10-05`, `2024/10/05`, `10/05/2024`, `10-05-24`,
//! `Oct 5 2024`, `October 5, 2024`, `Sept. 5, 2024` and `5 Oct 2024`.
//! Numeric dates are read month-first unless the first field cannot be a
//! month. Two-digit years 00-69 map to 20xx and 70-99 to 19xx.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

const MONTH: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

#[derive(Clone, Copy)]
enum Shape {
    YearFirst,
    MonthFirst,
    MonthFirstShortYear,
    MonthName,
    DayMonthName,
}

static PATTERNS: LazyLock<Vec<(Shape, Regex)>> = LazyLock::new(|| {
    let compile = |p: String| Regex::new(&format!("(?i){p}")).expect("valid regex");
    vec![
        (
            Shape::YearFirst,
            compile(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b".into()),
        ),
        (
            Shape::MonthFirst,
            compile(r"\b(\d{1,2})[-/](\d{1,2})[-/](\d{4})\b".into()),
        ),
        (
            Shape::MonthFirstShortYear,
            compile(r"\b(\d{1,2})[-/](\d{1,2})[-/](\d{2})\b".into()),
        ),
        (
            Shape::MonthName,
            compile(format!(r"\b({MONTH})\.?\s+(\d{{1,2}}),?\s+(\d{{4}})\b")),
        ),
        (
            Shape::DayMonthName,
            compile(format!(r"\b(\d{{1,2}})\s+({MONTH})\.?\s+(\d{{4}})\b")),
        ),
    ]
});

/// A date found in text, with its byte span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
    pub date: NaiveDate,
}

/// Every recognizable date in `text`, ordered by position.
///
/// Matches overlapping an earlier match are dropped.
pub fn find_dates(text: &str) -> Vec<DateMatch<'_>> {
    let mut found: Vec<DateMatch<'_>> = PATTERNS
        .iter()
        .flat_map(|(shape, re)| {
            re.captures_iter(text).filter_map(move |caps| {
                let whole = caps.get(0)?;
                let date = resolve(*shape, &caps)?;
                Some(DateMatch {
                    start: whole.start(),
                    end: whole.end(),
                    text: whole.as_str(),
                    date,
                })
            })
        })
        .collect();

    found.sort_by_key(|m| (m.start, std::cmp::Reverse(m.end)));

    let mut unique: Vec<DateMatch<'_>> = Vec::with_capacity(found.len());
    for m in found {
        if unique.last().is_none_or(|prev| m.start >= prev.end) {
            unique.push(m);
        }
    }
    unique
}

/// First date in `text`, if any
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    find_dates(text).first().map(|m| m.date)
}

fn resolve(shape: Shape, caps: &Captures<'_>) -> Option<NaiveDate> {
    let num = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
    let (year, month, day) = match shape {
        Shape::YearFirst => (num(1)? as i32, num(2)?, num(3)?),
        Shape::MonthFirst => {
            let (month, day) = month_day(num(1)?, num(2)?);
            (num(3)? as i32, month, day)
        }
        Shape::MonthFirstShortYear => {
            let (month, day) = month_day(num(1)?, num(2)?);
            (expand_year(num(3)?), month, day)
        }
        Shape::MonthName => (num(3)? as i32, month_number(caps.get(1)?.as_str())?, num(2)?),
        Shape::DayMonthName => (num(3)? as i32, month_number(caps.get(2)?.as_str())?, num(1)?),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_day(first: u32, second: u32) -> (u32, u32) {
    if first > 12 && second <= 12 {
        (second, first)
    } else {
        (first, second)
    }
}

fn expand_year(yy: u32) -> i32 {
    if yy < 70 { 2000 + yy as i32 } else { 1900 + yy as i32 }
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

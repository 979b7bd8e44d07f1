//! Age and display-format helpers

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Whole years between `date_of_birth` and `on`.
///
/// The birthday itself counts, so someone born on this day N years ago is N.
/// Feb 29 birthdays roll over on Mar 1 in non-leap years. A date of birth
/// after `on` yields 0.
pub fn age_on(date_of_birth: NaiveDate, on: NaiveDate) -> u32 {
    if date_of_birth > on {
        return 0;
    }

    let mut years = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Age as of today (UTC)
pub fn age_today(date_of_birth: NaiveDate) -> u32 {
    age_on(date_of_birth, Utc::now().date_naive())
}

/// `MM/DD/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// e.g. `Oct 5, 2024, 3:07 PM UTC`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %-I:%M %p UTC").to_string()
}

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// Marker emitted in place of an empty result or an unknown date
pub const NO_DATA: &str = "No Data";

/// Result of an extraction pass
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    NoData,
    Found(Vec<T>),
}

impl<T> Extraction<T> {
    pub fn from_vec(items: Vec<T>) -> Self {
        if items.is_empty() {
            Extraction::NoData
        } else {
            Extraction::Found(items)
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Extraction::NoData)
    }

    pub fn items(&self) -> &[T] {
        match self {
            Extraction::NoData => &[],
            Extraction::Found(items) => items,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Extraction::NoData => Vec::new(),
            Extraction::Found(items) => items,
        }
    }
}

impl<T: Serialize> Serialize for Extraction<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Extraction::NoData => serializer.serialize_str(NO_DATA),
            Extraction::Found(items) => items.serialize(serializer),
        }
    }
}

/// Serialize an optional date as `YYYY-MM-DD` or `"No Data"`
pub(crate) fn serialize_date<S: Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
        None => serializer.serialize_str(NO_DATA),
    }
}

/// Newest first, undated last. Stable, so equal dates keep insertion order.
pub(crate) fn sort_newest_first<T>(items: &mut [T], date: impl Fn(&T) -> Option<NaiveDate>) {
    items.sort_by(|a, b| date(b).cmp(&date(a)));
}

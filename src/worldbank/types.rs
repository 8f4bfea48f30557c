//! World Bank record types

use crate::types::{JsonValue, Record};
use serde::Serialize;

/// One indicator value for one country and year, keyed for storage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    /// Indicator identifier, e.g. `SP.POP.TOTL`
    pub indicator_id: String,
    /// Country identifier (ISO3 when the API provides it)
    pub country_id: String,
    /// Observation year
    pub year: i32,
    /// Value as text; `None` when the API reports no value
    pub value: Option<String>,
    /// The record as returned by the API
    pub raw: JsonValue,
}

impl Observation {
    /// Build an observation from an API record.
    ///
    /// Returns `None` when the indicator, country or year cannot be read.
    pub fn from_record(record: &Record) -> Option<Self> {
        let indicator_id = nested_id(record, "indicator")?;
        let country_id = record
            .get("countryiso3code")
            .and_then(JsonValue::as_str)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .or_else(|| nested_id(record, "country"))?;
        let year = record.get("date").and_then(parse_year)?;

        let value = match record.get("value") {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        Some(Self {
            indicator_id,
            country_id,
            year,
            value,
            raw: record.clone(),
        })
    }
}

fn nested_id(record: &Record, key: &str) -> Option<String> {
    record
        .get(key)?
        .get("id")?
        .as_str()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Year of a `date` field: `2020`, `"2020"`, `"2020Q1"` and `"2020M07"` all give 2020
fn parse_year(date: &JsonValue) -> Option<i32> {
    match date {
        JsonValue::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        JsonValue::String(s) => s.get(..4)?.parse().ok(),
        _ => None,
    }
}

//! Inclusive calendar date ranges
//!
//! Text forms:
//! - JSON: `["2014-05-10","2014-05-20"]`
//! - predicate: `[2014-05-10,2014-05-20]`
//!
//! Storage is half-open, `[start, end + 1 day)`, so the application-level
//! end date stays inclusive. `start <= end` is not enforced.

use std::fmt;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Shortest valid JSON form: `["YYYY-MM-DD","YYYY-MM-DD"]`
const MIN_JSON_LEN: usize = 27;

/// Date text layouts accepted by [`DateRange::parse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    /// `YYYY-MM-DD`, used by the JSON API
    Iso,
    /// `YYYY/MM/DD`, used by CSV import feeds
    Slash,
}

impl DateLayout {
    fn format(self) -> &'static str {
        match self {
            DateLayout::Iso => "%Y-%m-%d",
            DateLayout::Slash => "%Y/%m/%d",
        }
    }

    /// Parse one date in this layout
    pub fn parse_date(self, text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text, self.format()).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// One-day range, as used by the by-date search
    pub fn single(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// Parse start and end text with the given layout
    pub fn parse(start: &str, end: &str, layout: DateLayout) -> Result<Self> {
        let start_date = layout.parse_date(start).ok_or_else(|| {
            Error::Parse(format!("DateRange Parse Error: Invalid Date Start {}", start))
        })?;
        let end_date = layout.parse_date(end).ok_or_else(|| {
            Error::Parse(format!("DateRange Parse Error: Invalid Date End {}", end))
        })?;
        Ok(Self::new(start_date, end_date))
    }

    pub fn parse_iso(start: &str, end: &str) -> Result<Self> {
        Self::parse(start, end, DateLayout::Iso)
    }

    pub fn parse_slash(start: &str, end: &str) -> Result<Self> {
        Self::parse(start, end, DateLayout::Slash)
    }

    /// `["<start>","<end>"]`
    pub fn to_json(&self) -> String {
        format!(
            r#"["{}","{}"]"#,
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }

    /// Inverse of [`DateRange::to_json`]; tolerates whitespace around fields
    pub fn from_json(data: &[u8]) -> Result<Self> {
        if data.len() < MIN_JSON_LEN {
            return Err(Error::Parse(
                "DateRange Parse Error: not enough length".to_string(),
            ));
        }
        if data[0] != b'[' || data[data.len() - 1] != b']' {
            return Err(Error::Parse(
                "DateRange Parse Error: daterange should be an array".to_string(),
            ));
        }
        let inner = std::str::from_utf8(&data[1..data.len() - 1])
            .map_err(|e| Error::Parse(format!("DateRange Parse Error: {}", e)))?;
        let fields: Vec<&str> = inner.split(',').collect();
        if fields.len() != 2 {
            return Err(Error::Parse(
                "DateRange Parse Error: DateRange should have two items".to_string(),
            ));
        }
        let trim = |s: &str| s.trim_matches(|c: char| c == '"' || c == ' ').to_string();
        Self::parse_iso(&trim(fields[0]), &trim(fields[1]))
    }

    /// `[<start>,<end>]`, the range-overlap query argument form
    pub fn to_storage_predicate(&self) -> String {
        format!(
            "[{},{}]",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }

    /// Half-open storage bounds `(start, end + 1 day)`
    pub fn storage_bounds(&self) -> Result<(NaiveDate, NaiveDate)> {
        let upper = self.end.succ_opt().ok_or_else(|| {
            Error::Parse(format!("DateRange Parse Error: {} has no successor", self.end))
        })?;
        Ok((self.start, upper))
    }

    /// Recover the inclusive range from half-open storage bounds
    pub fn from_storage(lower: NaiveDate, upper: NaiveDate) -> Self {
        Self::new(lower, upper.pred_opt().unwrap_or(upper))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_storage_predicate())
    }
}

impl Serialize for DateRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let start = self.start.format("%Y-%m-%d").to_string();
        let end = self.end.format("%Y-%m-%d").to_string();
        serializer.collect_seq([start, end])
    }
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (start, end) = <(String, String)>::deserialize(deserializer)?;
        DateRange::parse_iso(start.trim(), end.trim()).map_err(de::Error::custom)
    }
}

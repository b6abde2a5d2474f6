//! Date normalization for extracted receipt dates.
//!
//! Receipts print dates as `2025年4月6日`, `2025/04/06`, `25/04/06`, `4/6` and
//! other variants. [`DateNormalizer`] reduces all of them to a
//! [`NormalizedDate`]; when that is not possible it falls back to the
//! injected current date instead of failing, so a form can always be filled.

use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::config::NormalizationConfig;
use crate::models::receipt::NormalizedDate;

/// Two-digit years below this are read as 20YY.
pub const DEFAULT_CENTURY_PIVOT: u32 = 50;

lazy_static! {
    static ref YEAR_MONTH_DAY: Regex = Regex::new(
        r"([0-9]{4})[/\-]([0-9]{1,2})[/\-]([0-9]{1,2})"
    ).unwrap();

    static ref SHORT_YEAR_MONTH_DAY: Regex = Regex::new(
        r"([0-9]{2})[/\-]([0-9]{1,2})[/\-]([0-9]{1,2})"
    ).unwrap();

    static ref MONTH_DAY: Regex = Regex::new(
        r"([0-9]{1,2})[/\-]([0-9]{1,2})"
    ).unwrap();

    static ref CANONICAL_DATE: Regex = Regex::new(
        r"^([0-9]{4})[/\-]([0-9]{1,2})[/\-]([0-9]{1,2})$"
    ).unwrap();

    static ref DIGIT_GROUP: Regex = Regex::new(r"[0-9]+").unwrap();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Outcome of normalizing a raw date.
#[derive(Debug, Clone, PartialEq)]
pub enum DateResolution {
    /// The raw text was understood.
    Parsed(NormalizedDate),

    /// The raw text was empty or not understood; `date` is the current date.
    Fallback {
        date: NormalizedDate,
        cause: ExtractionError,
    },
}

impl DateResolution {
    /// The resolved date, parsed or fallback.
    pub fn date(&self) -> NormalizedDate {
        match self {
            DateResolution::Parsed(date) => *date,
            DateResolution::Fallback { date, .. } => *date,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DateResolution::Fallback { .. })
    }

    /// Why normalization fell back, if it did.
    pub fn cause(&self) -> Option<&ExtractionError> {
        match self {
            DateResolution::Parsed(_) => None,
            DateResolution::Fallback { cause, .. } => Some(cause),
        }
    }
}

/// Year, month and day as found in the text, before numeric validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DateFields {
    year: String,
    month: String,
    day: String,
}

impl DateFields {
    fn new(year: impl Into<String>, month: &str, day: &str) -> Self {
        Self {
            year: year.into(),
            month: month.to_string(),
            day: day.to_string(),
        }
    }

    fn into_date(self, century_pivot: u32) -> Result<NormalizedDate, ExtractionError> {
        let year: i32 = self
            .year
            .parse()
            .map_err(|_| ExtractionError::parse("date", format!("year {}", self.year)))?;
        let month: u32 = self
            .month
            .parse()
            .map_err(|_| ExtractionError::parse("date", format!("month {}", self.month)))?;
        let day: u32 = self
            .day
            .parse()
            .map_err(|_| ExtractionError::parse("date", format!("day {}", self.day)))?;

        let year = if (0..100).contains(&year) {
            widen_year(year as u32, century_pivot) as i32
        } else {
            year
        };

        NormalizedDate::new(year, month, day)
    }
}

fn widen_year(year: u32, century_pivot: u32) -> u32 {
    if year < century_pivot {
        2000 + year
    } else {
        1900 + year
    }
}

/// Replace era markers, drop whitespace, unify `.` separators to `-`.
fn clean(raw: &str) -> String {
    let replaced = raw
        .trim()
        .replace(['年', '月'], "-")
        .replace('日', "")
        .replace('.', "-");

    WHITESPACE.replace_all(&replaced, "").into_owned()
}

/// Converts raw receipt dates into [`NormalizedDate`]s.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    today: NaiveDate,
    century_pivot: u32,
}

impl DateNormalizer {
    /// Normalizer whose fallback and default year come from the local clock.
    pub fn new() -> Self {
        Self::with_today(Local::now().date_naive())
    }

    /// Normalizer with an injected current date.
    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            today,
            century_pivot: DEFAULT_CENTURY_PIVOT,
        }
    }

    /// Normalizer with the configured pivot; `today` defaults to the local clock.
    pub fn from_config(config: &NormalizationConfig, today: Option<NaiveDate>) -> Self {
        let normalizer = match today {
            Some(today) => Self::with_today(today),
            None => Self::new(),
        };

        normalizer.with_century_pivot(config.century_pivot)
    }

    /// Set the two-digit year pivot.
    pub fn with_century_pivot(mut self, pivot: u32) -> Self {
        self.century_pivot = pivot.min(100);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Normalize a raw date, falling back to the current date.
    pub fn normalize(&self, raw: &str) -> DateResolution {
        match self.parse(raw) {
            Ok(date) => DateResolution::Parsed(date),
            Err(cause) => {
                let date = self.fallback_date();
                debug!(raw, %cause, fallback = %date, "date normalization fell back to today");
                DateResolution::Fallback { date, cause }
            }
        }
    }

    /// Normalize a raw date without the fallback.
    pub fn parse(&self, raw: &str) -> Result<NormalizedDate, ExtractionError> {
        let cleaned = clean(raw);
        if cleaned.is_empty() {
            return Err(ExtractionError::MissingField("date".to_string()));
        }

        let fields = self
            .split_fields(&cleaned)
            .ok_or_else(|| ExtractionError::parse("date", raw.trim()))?;

        fields.into_date(self.century_pivot)
    }

    fn split_fields(&self, cleaned: &str) -> Option<DateFields> {
        if let Some(caps) = YEAR_MONTH_DAY.captures(cleaned) {
            return Some(DateFields::new(&caps[1], &caps[2], &caps[3]));
        }

        if let Some(caps) = SHORT_YEAR_MONTH_DAY.captures(cleaned) {
            // Two-digit field, always parses.
            let short: u32 = caps[1].parse().unwrap_or(0);
            let year = widen_year(short, self.century_pivot);
            return Some(DateFields::new(year.to_string(), &caps[2], &caps[3]));
        }

        let current_year = self.today.year().to_string();

        if let Some(caps) = MONTH_DAY.captures(cleaned) {
            return Some(DateFields::new(current_year, &caps[1], &caps[2]));
        }

        let groups: Vec<&str> = DIGIT_GROUP.find_iter(cleaned).map(|m| m.as_str()).collect();
        match groups.as_slice() {
            [year, month, day, ..] if year.len() == 4 => Some(DateFields::new(*year, month, day)),
            [month, day, year, ..] if day.parse::<u64>().is_ok_and(|d| d <= 12) => {
                Some(DateFields::new(*year, month, day))
            }
            [month, day, ..] => Some(DateFields::new(current_year, month, day)),
            _ => None,
        }
    }

    fn fallback_date(&self) -> NormalizedDate {
        NormalizedDate::from_naive_clamped(self.today)
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for NormalizedDate {
    type Err = ExtractionError;

    /// Parse the canonical `YYYY-MM-DD` (or `YYYY/MM/DD`) form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = CANONICAL_DATE
            .captures(s.trim())
            .ok_or_else(|| ExtractionError::parse("date", s))?;

        DateFields::new(&caps[1], &caps[2], &caps[3]).into_date(DEFAULT_CENTURY_PIVOT)
    }
}

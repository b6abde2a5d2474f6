//! Receipt extraction data models.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::receipt::{DateNormalizer, DateResolution};

/// Presentation tier for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Score of at least 0.7.
    High,
    /// Score of at least 0.4 and below 0.7.
    Medium,
    /// Anything lower, including empty fields.
    Low,
}

impl ConfidenceLevel {
    /// Lowest score classified as [`ConfidenceLevel::High`].
    pub const HIGH_THRESHOLD: f32 = 0.7;

    /// Lowest score classified as [`ConfidenceLevel::Medium`].
    pub const MEDIUM_THRESHOLD: f32 = 0.4;

    /// Classify a confidence score.
    pub fn from_score(score: f32) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            ConfidenceLevel::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single extracted receipt field with its confidence score.
///
/// An empty value always carries confidence `0.0` and a non-empty value
/// always carries a confidence in `(0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FieldRepr")]
pub struct ExtractedField {
    raw_value: String,
    confidence: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldRepr {
    #[serde(default)]
    raw_value: String,
    #[serde(default)]
    confidence: f32,
}

impl From<FieldRepr> for ExtractedField {
    fn from(repr: FieldRepr) -> Self {
        ExtractedField::new(repr.raw_value, repr.confidence)
    }
}

impl ExtractedField {
    /// Create a field, collapsing to [`ExtractedField::empty`] when the value
    /// is empty or the confidence is not positive.
    pub fn new(raw_value: impl Into<String>, confidence: f32) -> Self {
        let raw_value = raw_value.into();
        if raw_value.is_empty() || confidence.is_nan() || confidence <= 0.0 {
            return Self::empty();
        }

        Self {
            raw_value,
            confidence: confidence.min(1.0),
        }
    }

    /// A field that nothing was found for.
    pub fn empty() -> Self {
        Self {
            raw_value: String::new(),
            confidence: 0.0,
        }
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn is_empty(&self) -> bool {
        self.raw_value.is_empty()
    }

    /// Presentation tier of this field's confidence.
    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }

    /// The value, if one was found.
    pub fn value(&self) -> Option<&str> {
        if self.is_empty() {
            None
        } else {
            Some(&self.raw_value)
        }
    }
}

/// Fields extracted from one OCR transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Transaction date as printed on the receipt.
    pub date: ExtractedField,

    /// Merchant name.
    pub store: ExtractedField,

    /// Total amount, digits only.
    pub amount: ExtractedField,

    /// Verbatim input transcript.
    pub full_text: String,
}

impl ExtractionResult {
    /// A result with no fields for the given transcript.
    pub fn empty(full_text: impl Into<String>) -> Self {
        Self {
            date: ExtractedField::empty(),
            store: ExtractedField::empty(),
            amount: ExtractedField::empty(),
            full_text: full_text.into(),
        }
    }

    /// True when none of the three fields was found.
    pub fn is_empty(&self) -> bool {
        self.date.is_empty() && self.store.is_empty() && self.amount.is_empty()
    }

    /// Total amount as a decimal.
    pub fn amount_value(&self) -> Option<Decimal> {
        self.amount.value().and_then(|v| Decimal::from_str(v).ok())
    }

    /// Run the date normalizer over the extracted date.
    pub fn normalized_date(&self, normalizer: &DateNormalizer) -> DateResolution {
        normalizer.normalize(self.date.raw_value())
    }

    /// Map this result onto expense form values.
    pub fn form_values(&self, normalizer: &DateNormalizer) -> FormValues {
        let resolution = self.normalized_date(normalizer);

        FormValues {
            date: resolution.date(),
            date_is_fallback: resolution.is_fallback(),
            store: self.store.value().map(str::to_string),
            amount: self.amount.value().map(str::to_string),
        }
    }
}

/// An unambiguous calendar date produced by the date normalizer.
///
/// Formats and serializes as zero-padded `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NormalizedDate {
    year: i32,
    month: u32,
    day: u32,
}

impl NormalizedDate {
    pub const MIN_YEAR: i32 = 1900;
    pub const MAX_YEAR: i32 = 9999;

    /// Create a date, validating the year, month and day ranges.
    ///
    /// The day is only checked against `1..=31`; use
    /// [`NormalizedDate::to_naive_date`] for a calendar check.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, ExtractionError> {
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(ExtractionError::validation(
                "date",
                format!("year {} out of range", year),
            ));
        }
        if !(1..=12).contains(&month) {
            return Err(ExtractionError::validation(
                "date",
                format!("month {} out of range", month),
            ));
        }
        if !(1..=31).contains(&day) {
            return Err(ExtractionError::validation(
                "date",
                format!("day {} out of range", day),
            ));
        }

        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Build from a chrono date, clamping the year into range.
    pub(crate) fn from_naive_clamped(date: NaiveDate) -> Self {
        Self {
            year: date.year().clamp(Self::MIN_YEAR, Self::MAX_YEAR),
            month: date.month(),
            day: date.day(),
        }
    }

    /// Convert to a chrono date, if the triple names a real calendar day.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl TryFrom<NaiveDate> for NormalizedDate {
    type Error = ExtractionError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        NormalizedDate::new(date.year(), date.month(), date.day())
    }
}

impl fmt::Display for NormalizedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl From<NormalizedDate> for String {
    fn from(date: NormalizedDate) -> Self {
        date.to_string()
    }
}

impl TryFrom<String> for NormalizedDate {
    type Error = ExtractionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Values for the expense entry form, derived from an extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    /// Normalized date, or the current date when normalization fell back.
    pub date: NormalizedDate,

    /// Whether `date` is the current-date fallback.
    pub date_is_fallback: bool,

    /// Merchant name, when one was extracted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,

    /// Total amount, when one was extracted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

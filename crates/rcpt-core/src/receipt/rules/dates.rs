//! Date extraction for receipts.
//!
//! Produces the date substring as printed; see
//! [`DateNormalizer`](crate::receipt::DateNormalizer) for turning it into a
//! calendar date.

use regex::Regex;

use super::patterns::{
    DATE_LABEL, DATE_LABEL_EN, DATE_LIKE, FULL_DATE, ISO_DATE, MONTH_DAY, SHORT_YEAR_DATE,
};
use super::{FieldExtractor, Rule};
use crate::receipt::ReceiptText;

/// `YYYY年M月D日`, `YYYY/MM/DD`, `YYYY.MM.DD`.
pub const FULL_DATE_CONFIDENCE: f32 = 0.8;
/// `M月D日`, `MM/DD` without a year.
pub const MONTH_DAY_CONFIDENCE: f32 = 0.7;
/// `YY/MM/DD`.
pub const SHORT_YEAR_CONFIDENCE: f32 = 0.7;
/// `YYYY-MM-DD`.
pub const ISO_DATE_CONFIDENCE: f32 = 0.8;
/// Line following a date label.
pub const LABEL_CONFIDENCE: f32 = 0.6;

/// Date field extractor.
pub struct DateExtractor {
    rules: Vec<Rule>,
}

impl DateExtractor {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule::new("full_date", FULL_DATE_CONFIDENCE, full_date),
                Rule::new("month_day", MONTH_DAY_CONFIDENCE, month_day),
                Rule::new("short_year", SHORT_YEAR_CONFIDENCE, short_year),
                Rule::new("iso_date", ISO_DATE_CONFIDENCE, iso_date),
                Rule::new("date_label_next_line", LABEL_CONFIDENCE, date_label_next_line),
            ],
        }
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    fn field(&self) -> &'static str {
        "date"
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

fn first_match(pattern: &Regex, text: &ReceiptText<'_>) -> Option<String> {
    pattern
        .find(text.full_text())
        .map(|m| m.as_str().to_string())
}

pub fn full_date(text: &ReceiptText<'_>) -> Option<String> {
    first_match(&FULL_DATE, text)
}

pub fn month_day(text: &ReceiptText<'_>) -> Option<String> {
    first_match(&MONTH_DAY, text)
}

pub fn short_year(text: &ReceiptText<'_>) -> Option<String> {
    first_match(&SHORT_YEAR_DATE, text)
}

pub fn iso_date(text: &ReceiptText<'_>) -> Option<String> {
    first_match(&ISO_DATE, text)
}

/// The line after a `日付` / `date` label, when it looks like a date.
pub fn date_label_next_line(text: &ReceiptText<'_>) -> Option<String> {
    let lines = text.lines();

    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_date_label(line))
        .find_map(|(i, _)| {
            lines
                .get(i + 1)
                .filter(|next| DATE_LIKE.is_match(next))
                .map(|next| next.to_string())
        })
}

fn is_date_label(line: &str) -> bool {
    line.contains(DATE_LABEL) || line.to_lowercase().contains(DATE_LABEL_EN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(text: &str) -> (String, f32, Option<&'static str>) {
        let extractor = DateExtractor::new();
        let receipt = ReceiptText::new(text);
        let field = extractor.extract(&receipt);
        (
            field.raw_value().to_string(),
            field.confidence(),
            extractor.matching_rule(&receipt),
        )
    }

    #[test]
    fn test_extract_japanese_full_date() {
        let (value, confidence, rule) = extract("テストスーパー\n2025年4月6日\n合計 1250円");
        assert_eq!(value, "2025年4月6日");
        assert_eq!(confidence, 0.8);
        assert_eq!(rule, Some("full_date"));
    }

    #[test]
    fn test_extract_numeric_full_date() {
        let (value, confidence, _) = extract("レジ 01\n2025/04/06 12:30");
        assert_eq!(value, "2025/04/06");
        assert_eq!(confidence, FULL_DATE_CONFIDENCE);
    }

    #[test]
    fn test_extract_month_day() {
        let (value, confidence, rule) = extract("4月6日(日) 12:30");
        assert_eq!(value, "4月6日");
        assert_eq!(confidence, 0.7);
        assert_eq!(rule, Some("month_day"));
    }

    #[test]
    fn test_short_year_is_shadowed_by_month_day() {
        // Declared order, not specificity, decides.
        let (value, confidence, rule) = extract("25/04/06");
        assert_eq!(value, "25/04");
        assert_eq!(confidence, MONTH_DAY_CONFIDENCE);
        assert_eq!(rule, Some("month_day"));
    }

    #[test]
    fn test_individual_rules() {
        let receipt = ReceiptText::new("発行 25/4/6");
        assert_eq!(short_year(&receipt), Some("25/4/6".to_string()));

        let receipt = ReceiptText::new("issued 2025-4-6");
        assert_eq!(iso_date(&receipt), Some("2025-4-6".to_string()));
        assert_eq!(full_date(&receipt), Some("2025-4-6".to_string()));
    }

    #[test]
    fn test_date_label_next_line() {
        let (value, confidence, rule) = extract("DATE\nR7年 4 月");
        assert_eq!(value, "R7年 4 月");
        assert_eq!(confidence, 0.6);
        assert_eq!(rule, Some("date_label_next_line"));
    }

    #[test]
    fn test_date_label_requires_date_like_next_line() {
        let (value, confidence, _) = extract("Date\nN/A\n日付\n未記入");
        assert_eq!(value, "");
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn test_date_label_skips_to_later_label() {
        let receipt = ReceiptText::new("date\nnone\n日付\n令7年");
        assert_eq!(date_label_next_line(&receipt), Some("令7年".to_string()));
    }

    #[test]
    fn test_no_date() {
        let (value, confidence, rule) = extract("テストスーパー\n合計 1250円");
        assert_eq!(value, "");
        assert_eq!(confidence, 0.0);
        assert_eq!(rule, None);
    }
}

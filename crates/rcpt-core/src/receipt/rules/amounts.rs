//! Total amount extraction for receipts.
//!
//! Values are digit-only strings with grouping commas removed.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{
    AMOUNT_WITH_CURRENCY, DIGIT_RUN, TOTAL_LABEL, TOTAL_LABEL_EN, TOTAL_WITH_AMOUNT,
};
use super::{FieldExtractor, Rule};
use crate::receipt::ReceiptText;

/// Number right after a total/subtotal label.
pub const TOTAL_LABEL_CONFIDENCE: f32 = 0.9;
/// Number followed by a currency unit.
pub const CURRENCY_SUFFIX_CONFIDENCE: f32 = 0.8;
/// Largest number on a totals line.
pub const TOTAL_LINE_CONFIDENCE: f32 = 0.7;
/// Any number of at least three digits.
pub const BARE_NUMBER_CONFIDENCE: f32 = 0.5;

/// Amount field extractor.
pub struct AmountExtractor {
    rules: Vec<Rule>,
}

impl AmountExtractor {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule::new("total_label", TOTAL_LABEL_CONFIDENCE, total_label),
                Rule::new("currency_suffix", CURRENCY_SUFFIX_CONFIDENCE, currency_suffix),
                Rule::new("bare_number", BARE_NUMBER_CONFIDENCE, bare_number),
                Rule::new("total_line_max", TOTAL_LINE_CONFIDENCE, total_line_max),
            ],
        }
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    fn field(&self) -> &'static str {
        "amount"
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// `合計 1,250円` → `1250`
pub fn total_label(text: &ReceiptText<'_>) -> Option<String> {
    TOTAL_WITH_AMOUNT
        .captures(text.full_text())
        .map(|caps| strip_grouping(&caps[1]))
}

/// `1,250円` / `1250 ¥` → `1250`
pub fn currency_suffix(text: &ReceiptText<'_>) -> Option<String> {
    AMOUNT_WITH_CURRENCY
        .captures(text.full_text())
        .map(|caps| strip_grouping(&caps[1]))
}

/// First digit run holding at least three digits.
pub fn bare_number(text: &ReceiptText<'_>) -> Option<String> {
    DIGIT_RUN
        .find_iter(text.full_text())
        .map(|m| strip_grouping(m.as_str()))
        .find(|digits| digits.len() >= 3)
}

/// Largest number on the first totals line that has any numbers.
pub fn total_line_max(text: &ReceiptText<'_>) -> Option<String> {
    text.lines()
        .iter()
        .filter(|line| is_total_line(line))
        .find_map(|line| max_amount(line))
        .map(|amount| amount.to_string())
}

fn is_total_line(line: &str) -> bool {
    line.contains(TOTAL_LABEL) || line.to_lowercase().contains(TOTAL_LABEL_EN)
}

fn max_amount(line: &str) -> Option<Decimal> {
    DIGIT_RUN
        .find_iter(line)
        .filter_map(|m| Decimal::from_str(&strip_grouping(m.as_str())).ok())
        .max()
}

/// Remove grouping commas from a digit run.
pub fn strip_grouping(digits: &str) -> String {
    digits.replace(',', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(text: &str) -> (String, f32, Option<&'static str>) {
        let extractor = AmountExtractor::new();
        let receipt = ReceiptText::new(text);
        let field = extractor.extract(&receipt);
        (
            field.raw_value().to_string(),
            field.confidence(),
            extractor.matching_rule(&receipt),
        )
    }

    #[test]
    fn test_total_label() {
        assert_eq!(
            extract("商品A 500円\n合計 1250円"),
            ("1250".to_string(), 0.9, Some("total_label"))
        );
    }

    #[test]
    fn test_total_label_strips_commas() {
        let (value, confidence, _) = extract("お買上げ合計 ¥12,800");
        assert_eq!(value, "12800");
        assert_eq!(confidence, TOTAL_LABEL_CONFIDENCE);
    }

    #[test]
    fn test_currency_suffix() {
        assert_eq!(
            extract("1250円"),
            ("1250".to_string(), 0.8, Some("currency_suffix"))
        );
        assert_eq!(extract("お支払 3,480 円").0, "3480");
    }

    #[test]
    fn test_bare_number() {
        assert_eq!(
            extract("Thank you ¥1,250"),
            ("1250".to_string(), 0.5, Some("bare_number"))
        );
    }

    #[test]
    fn test_bare_number_needs_three_digits() {
        let receipt = ReceiptText::new("No. 12\nTable 7");
        assert_eq!(bare_number(&receipt), None);
    }

    #[test]
    fn test_label_without_number_is_not_top_tier() {
        let (value, confidence, rule) = extract("合計\n商品A 500\n商品B 1200");
        assert_ne!(confidence, TOTAL_LABEL_CONFIDENCE);
        assert_eq!(value, "500");
        assert_eq!(confidence, BARE_NUMBER_CONFIDENCE);
        assert_eq!(rule, Some("bare_number"));
    }

    #[test]
    fn test_total_line_max() {
        assert_eq!(
            extract("items 3\nTotal: 45 12"),
            ("45".to_string(), 0.7, Some("total_line_max"))
        );
    }

    #[test]
    fn test_total_line_max_compares_without_commas() {
        let receipt = ReceiptText::new("商品 300\nTOTAL 1,200 300");
        assert_eq!(total_line_max(&receipt), Some("1200".to_string()));
    }

    #[test]
    fn test_total_line_max_skips_label_lines_without_numbers() {
        let receipt = ReceiptText::new("合計\n小計\ntotal 80 15");
        assert_eq!(total_line_max(&receipt), Some("80".to_string()));

        let receipt = ReceiptText::new("合計\n商品A 500");
        assert_eq!(total_line_max(&receipt), None);
    }

    #[test]
    fn test_no_amount() {
        assert_eq!(extract("テストスーパー\nありがとうございました"), (String::new(), 0.0, None));
    }
}

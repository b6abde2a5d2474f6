//! Receipt extraction orchestrator.

use lazy_static::lazy_static;
use tracing::{debug, info};

use super::rules::{AmountExtractor, DateExtractor, FieldExtractor, StoreExtractor};
use super::ReceiptText;
use crate::models::config::ExtractionConfig;
use crate::models::receipt::ExtractionResult;

lazy_static! {
    static ref DEFAULT_EXTRACTOR: ReceiptExtractor = ReceiptExtractor::new();
}

/// Extract date, store and amount from an OCR transcript with default settings.
pub fn extract(raw_text: &str) -> ExtractionResult {
    DEFAULT_EXTRACTOR.extract(raw_text)
}

/// Runs the date, store and amount cascades over a transcript.
///
/// The three fields are independent of each other; the extractor is
/// stateless and can be shared between threads.
#[derive(Default)]
pub struct ReceiptExtractor {
    date: DateExtractor,
    store: StoreExtractor,
    amount: AmountExtractor,
}

impl ReceiptExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            date: DateExtractor::new(),
            store: StoreExtractor::from_config(config),
            amount: AmountExtractor::new(),
        }
    }

    /// Extract all fields. Never fails; missing fields are empty.
    pub fn extract(&self, raw_text: &str) -> ExtractionResult {
        let receipt = ReceiptText::new(raw_text);

        info!(
            "Extracting receipt fields from {} lines of text",
            receipt.len()
        );

        let result = ExtractionResult {
            date: self.date.extract(&receipt),
            store: self.store.extract(&receipt),
            amount: self.amount.extract(&receipt),
            full_text: raw_text.to_string(),
        };

        debug!(
            date = result.date.raw_value(),
            store = result.store.raw_value(),
            amount = result.amount.raw_value(),
            "Extraction finished"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::{ConfidenceLevel, ExtractedField};
    use crate::receipt::DateNormalizer;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const TEST_RECEIPT: &str = "テストスーパー\n2025年4月6日\n商品A 500円\n商品B 750円\n合計 1250円";

    fn assert_invariant(field: &ExtractedField) {
        assert_eq!(field.confidence() == 0.0, field.raw_value().is_empty());
    }

    #[test]
    fn test_end_to_end_receipt() {
        let result = extract(TEST_RECEIPT);

        assert_eq!(result.date.raw_value(), "2025年4月6日");
        assert_eq!(result.date.confidence(), 0.8);
        assert_eq!(result.date.level(), ConfidenceLevel::High);

        assert_eq!(result.store.raw_value(), "テストスーパー");
        assert_eq!(result.store.confidence(), 0.6);

        assert_eq!(result.amount.raw_value(), "1250");
        assert_eq!(result.amount.confidence(), 0.9);
        assert_eq!(result.amount.level(), ConfidenceLevel::High);

        assert_eq!(result.full_text, TEST_RECEIPT);

        let normalizer = DateNormalizer::with_today(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(result.normalized_date(&normalizer).date().to_string(), "2025-04-06");
    }

    #[test]
    fn test_spaced_receipt() {
        let text = "
            スーパーマーケット ABC
            2025年4月6日

            商品A     100円
            商品B     200円
            商品C     300円

            合計     600円
            税込     660円
        ";

        let result = extract(text);
        assert_eq!(result.store.raw_value(), "スーパーマーケット ABC");
        assert_eq!(result.date.raw_value(), "2025年4月6日");
        assert_eq!(result.amount.raw_value(), "600");
    }

    #[test]
    fn test_indicator_store_receipt() {
        let text = "領収書\n店名：ABCマート 渋谷店\n日付 2025/04/06\n合計 ¥3,280";
        let result = extract(text);

        assert_eq!(result.store.raw_value(), "ABCマート 渋谷店");
        assert_eq!(result.store.confidence(), 0.8);
        assert_eq!(result.date.raw_value(), "2025/04/06");
        assert_eq!(result.amount.raw_value(), "3280");
    }

    #[test]
    fn test_empty_input() {
        let result = extract("");
        assert!(result.is_empty());
        assert_eq!(result, ExtractionResult::empty(""));
    }

    #[test]
    fn test_confidence_zero_iff_empty() {
        let inputs = [
            "",
            "   \n\n",
            TEST_RECEIPT,
            "合計\n商品A 500\n商品B 1200",
            "2025/04/06\n12345",
            "Date\nN/A",
            "ありがとうございました",
            "Total 99",
        ];

        for input in inputs {
            let result = extract(input);
            assert_invariant(&result.date);
            assert_invariant(&result.store);
            assert_invariant(&result.amount);
        }
    }

    #[test]
    fn test_config_windows() {
        let config = ExtractionConfig {
            store_indicator_lines: 10,
            store_heading_lines: 1,
        };
        let extractor = ReceiptExtractor::from_config(&config);

        let result = extractor.extract("2025/04/06\nテストスーパー");
        assert!(result.store.is_empty());

        let result = ReceiptExtractor::new().extract("2025/04/06\nテストスーパー");
        assert_eq!(result.store.raw_value(), "テストスーパー");
    }

    #[test]
    fn test_extractor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReceiptExtractor>();

        let extractor = ReceiptExtractor::new();
        let sequential = extractor.extract(TEST_RECEIPT);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| extractor.extract(TEST_RECEIPT)))
                .collect();

            for handle in handles {
                assert_eq!(handle.join().unwrap(), sequential);
            }
        });
    }
}

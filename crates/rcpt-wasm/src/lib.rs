//! WASM bindings for receipt transcript extraction.
//!
//! Browser-side OCR produces the transcript; these bindings turn it into
//! date, store and amount fields and expense form values.

use chrono::NaiveDate;
use wasm_bindgen::prelude::*;

use rcpt_core::models::config::NormalizationConfig;
use rcpt_core::{ConfidenceLevel, DateNormalizer, DateResolution, ReceiptExtractor};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Normalizer for an optional `YYYY-MM-DD` current date.
fn normalizer(today: Option<String>) -> Result<DateNormalizer, JsValue> {
    let today = today
        .map(|today| {
            NaiveDate::parse_from_str(&today, "%Y-%m-%d")
                .map_err(|e| JsValue::from_str(&format!("invalid today {:?}: {}", today, e)))
        })
        .transpose()?;

    Ok(DateNormalizer::from_config(&NormalizationConfig::default(), today))
}

/// Extract date, store and amount from an OCR transcript.
///
/// Returns `{ date, store, amount, fullText }` where each field is
/// `{ rawValue, confidence }`.
#[wasm_bindgen]
pub fn extract_receipt(text: &str) -> Result<JsValue, JsValue> {
    to_js(&rcpt_core::extract(text))
}

/// Normalize a printed receipt date to `YYYY-MM-DD`.
///
/// Unparseable input yields the current date (or `today`, when given).
#[wasm_bindgen]
pub fn normalize_date(raw: &str, today: Option<String>) -> Result<String, JsValue> {
    Ok(normalizer(today)?.normalize(raw).date().to_string())
}

/// Like [`normalize_date`] but fails instead of falling back.
#[wasm_bindgen]
pub fn parse_date(raw: &str) -> Result<String, JsValue> {
    match DateNormalizer::new().normalize(raw) {
        DateResolution::Parsed(date) => Ok(date.to_string()),
        DateResolution::Fallback { cause, .. } => Err(JsValue::from_str(&cause.to_string())),
    }
}

/// Confidence tier ("high", "medium" or "low") for a score.
#[wasm_bindgen]
pub fn confidence_level(score: f32) -> String {
    ConfidenceLevel::from_score(score).as_str().to_string()
}

/// Extract a transcript straight into expense form values.
#[wasm_bindgen]
pub fn form_values(text: &str, today: Option<String>) -> Result<JsValue, JsValue> {
    let normalizer = normalizer(today)?;
    to_js(&rcpt_core::extract(text).form_values(&normalizer))
}

/// Receipt extractor class for browser use.
#[wasm_bindgen(js_name = ReceiptExtractor)]
pub struct ReceiptExtractorJs {
    extractor: ReceiptExtractor,
    normalizer: DateNormalizer,
}

#[wasm_bindgen(js_class = ReceiptExtractor)]
impl ReceiptExtractorJs {
    /// Create a new receipt extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            extractor: ReceiptExtractor::new(),
            normalizer: DateNormalizer::new(),
        }
    }

    /// Configure how many leading lines are searched for the store name.
    #[wasm_bindgen]
    pub fn set_store_windows(&mut self, indicator_lines: usize, heading_lines: usize) {
        let config = rcpt_core::models::config::ExtractionConfig {
            store_indicator_lines: indicator_lines,
            store_heading_lines: heading_lines,
        };
        self.extractor = ReceiptExtractor::from_config(&config);
    }

    /// Pin the current date used by the normalization fallback.
    #[wasm_bindgen]
    pub fn set_today(&mut self, today: &str) -> Result<(), JsValue> {
        self.normalizer = normalizer(Some(today.to_string()))?;
        Ok(())
    }

    /// Extract fields from a transcript.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.extractor.extract(text))
    }

    /// Extract a transcript into expense form values.
    #[wasm_bindgen]
    pub fn form_values(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.extractor.extract(text).form_values(&self.normalizer))
    }
}

impl Default for ReceiptExtractorJs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_normalize_date() {
        let date = normalize_date("2025年4月6日", Some("2026-01-01".to_string())).unwrap();
        assert_eq!(date, "2025-04-06");
    }

    #[wasm_bindgen_test]
    fn test_normalize_date_fallback() {
        let date = normalize_date("abc", Some("2024-12-31".to_string())).unwrap();
        assert_eq!(date, "2024-12-31");
        assert!(parse_date("abc").is_err());
    }

    #[wasm_bindgen_test]
    fn test_confidence_level() {
        assert_eq!(confidence_level(0.9), "high");
        assert_eq!(confidence_level(0.6), "medium");
        assert_eq!(confidence_level(0.0), "low");
    }

    #[wasm_bindgen_test]
    fn test_extract_receipt() {
        let value = extract_receipt("テストスーパー\n合計 1250円").unwrap();
        assert!(value.is_object());
    }
}

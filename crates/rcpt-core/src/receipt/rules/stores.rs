//! Store name extraction for receipts.

use super::patterns::{NOT_STORE_NAME, STORE_INDICATORS, STORE_NAME_SEPARATOR};
use super::{FieldExtractor, Rule};
use crate::models::config::ExtractionConfig;
use crate::receipt::ReceiptText;

/// Name found next to a store indicator word.
pub const INDICATOR_CONFIDENCE: f32 = 0.8;
/// First plausible heading line.
pub const HEADING_CONFIDENCE: f32 = 0.6;

/// Store name field extractor.
pub struct StoreExtractor {
    rules: Vec<Rule>,
}

impl StoreExtractor {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::with_windows(config.store_indicator_lines, config.store_heading_lines)
    }

    /// Search the first `indicator_lines` lines for an indicator word and the
    /// first `heading_lines` lines for a heading.
    pub fn with_windows(indicator_lines: usize, heading_lines: usize) -> Self {
        Self {
            rules: vec![
                Rule::new(
                    "store_indicator",
                    INDICATOR_CONFIDENCE,
                    move |text: &ReceiptText<'_>| indicator_store_name(text, indicator_lines),
                ),
                Rule::new(
                    "store_heading",
                    HEADING_CONFIDENCE,
                    move |text: &ReceiptText<'_>| heading_store_name(text, heading_lines),
                ),
            ],
        }
    }
}

impl Default for StoreExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for StoreExtractor {
    fn field(&self) -> &'static str {
        "store"
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Name after an indicator on the same line (`店名：ABC`), or the next line.
pub fn indicator_store_name(text: &ReceiptText<'_>, window: usize) -> Option<String> {
    for (i, line) in text.head(window).iter().enumerate() {
        if !STORE_INDICATORS.iter().any(|indicator| line.contains(indicator)) {
            continue;
        }

        let name = STORE_NAME_SEPARATOR
            .split(line)
            .nth(1)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .or_else(|| text.line(i + 1));

        if let Some(name) = name {
            return Some(name.to_string());
        }
    }

    None
}

/// First of the leading lines that is not a total, date, tax or number line.
pub fn heading_store_name(text: &ReceiptText<'_>, window: usize) -> Option<String> {
    text.head(window)
        .iter()
        .find(|line| !NOT_STORE_NAME.is_match(line))
        .map(|line| line.to_string())
}

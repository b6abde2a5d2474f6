//! Seam for the external OCR engine.
//!
//! Recognition itself happens outside this crate. A [`TextRecognizer`] turns
//! image bytes into a transcript; [`ReceiptPipeline`] runs it and then the
//! extractor, keeping a recognizer failure separate from a transcript that
//! simply yields no fields.

use tracing::{info, warn};

use crate::error::{OcrError, Result};
use crate::models::receipt::ExtractionResult;
use crate::receipt::ReceiptExtractor;

/// An external engine producing a transcript from a receipt image.
pub trait TextRecognizer {
    fn recognize(&self, image: &[u8]) -> std::result::Result<String, OcrError>;
}

impl<F> TextRecognizer for F
where
    F: Fn(&[u8]) -> std::result::Result<String, OcrError>,
{
    fn recognize(&self, image: &[u8]) -> std::result::Result<String, OcrError> {
        self(image)
    }
}

/// Recognizer followed by field extraction.
pub struct ReceiptPipeline<R> {
    recognizer: R,
    extractor: ReceiptExtractor,
}

impl<R: TextRecognizer> ReceiptPipeline<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            extractor: ReceiptExtractor::new(),
        }
    }

    /// Use a configured extractor.
    pub fn with_extractor(mut self, extractor: ReceiptExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn extractor(&self) -> &ReceiptExtractor {
        &self.extractor
    }

    /// Recognize and extract one receipt image.
    ///
    /// Returns `Err(RcptError::Ocr(_))` only when the recognizer fails; an
    /// empty transcript produces an empty result.
    pub fn process(&self, image: &[u8]) -> Result<ExtractionResult> {
        if image.is_empty() {
            return Err(OcrError::InvalidImage("empty image data".to_string()).into());
        }

        let text = self
            .recognizer
            .recognize(image)
            .inspect_err(|e| warn!("Text recognition failed: {}", e))?;

        if text.trim().is_empty() {
            info!("Recognizer returned no text");
        }

        Ok(self.extractor.extract(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RcptError;

    struct FixedRecognizer(&'static str);

    impl TextRecognizer for FixedRecognizer {
        fn recognize(&self, _image: &[u8]) -> std::result::Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_pipeline_extracts_recognized_text() {
        let pipeline = ReceiptPipeline::new(FixedRecognizer("テストスーパー\n合計 1250円"));
        let result = pipeline.process(b"image").unwrap();

        assert_eq!(result.store.raw_value(), "テストスーパー");
        assert_eq!(result.amount.raw_value(), "1250");
    }

    #[test]
    fn test_recognizer_failure_is_distinct_from_empty() {
        let failing = |_: &[u8]| -> std::result::Result<String, OcrError> { Err(OcrError::NotReady) };
        let err = ReceiptPipeline::new(failing).process(b"image").unwrap_err();
        assert!(matches!(err, RcptError::Ocr(OcrError::NotReady)));

        let result = ReceiptPipeline::new(FixedRecognizer("")).process(b"image").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let err = ReceiptPipeline::new(FixedRecognizer("text")).process(&[]).unwrap_err();
        assert!(matches!(err, RcptError::Ocr(OcrError::InvalidImage(_))));
    }
}

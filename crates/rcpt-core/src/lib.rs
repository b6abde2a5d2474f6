//! Core library for receipt OCR transcript processing.
//!
//! This crate provides:
//! - Line tokenization of raw OCR transcripts
//! - Rule cascades extracting the transaction date, store name and total amount
//! - Date normalization of Japanese and numeric date notations to `YYYY-MM-DD`
//! - Confidence tiers for presenting extracted fields
//! - A seam for the external OCR engine that keeps recognizer failures apart
//!   from empty extractions

pub mod error;
pub mod models;
pub mod ocr;
pub mod receipt;

pub use error::{ExtractionError, OcrError, RcptError, Result};
pub use models::config::RcptConfig;
pub use models::receipt::{
    ConfidenceLevel, ExtractedField, ExtractionResult, FormValues, NormalizedDate,
};
pub use ocr::{ReceiptPipeline, TextRecognizer};
pub use receipt::{extract, DateNormalizer, DateResolution, ReceiptExtractor, ReceiptText};

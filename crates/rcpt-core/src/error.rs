//! Error types for the rcpt-core library.

use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// The OCR collaborator failed before any text was produced.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Field extraction or normalization error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors reported by the external text recognizer.
///
/// These are distinct from a transcript that was recognized but yields no fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OcrError {
    /// The recognition engine has not been initialized.
    #[error("recognition engine is not ready")]
    NotReady,

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or content.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to receipt field extraction and normalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Field validation failed.
    #[error("validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },
}

impl ExtractionError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(field: &str, value: impl Into<String>) -> Self {
        Self::Parse {
            field: field.to_string(),
            value: value.into(),
        }
    }
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;

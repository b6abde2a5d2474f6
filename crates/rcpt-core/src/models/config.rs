//! Configuration structures for receipt extraction.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RcptError, Result};

/// Main configuration for the rcpt pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Date normalization configuration.
    pub normalization: NormalizationConfig,

    /// External OCR collaborator configuration.
    pub ocr: OcrConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of leading lines searched for a store indicator word.
    pub store_indicator_lines: usize,

    /// Number of leading lines considered as a store heading.
    pub store_heading_lines: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            store_indicator_lines: 10,
            store_heading_lines: 5,
        }
    }
}

/// Date normalization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Two-digit years below this value are read as 20YY, others as 19YY.
    pub century_pivot: u32,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self { century_pivot: 50 }
    }
}

/// External OCR command configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Command producing a transcript on stdout; `{input}` is replaced by the
    /// image path, e.g. `tesseract {input} - -l jpn`. The command is split on
    /// whitespace without a shell, so quoted arguments are not supported.
    pub command: Option<String>,

    /// File extensions treated as images rather than transcripts.
    pub image_extensions: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: None,
            image_extensions: ["png", "jpg", "jpeg", "webp", "tiff", "tif", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl OcrConfig {
    /// Whether a path looks like an image by its extension.
    pub fn is_image(&self, path: &Path) -> bool {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        self.image_extensions.iter().any(|e| *e == extension)
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| RcptError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| RcptError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

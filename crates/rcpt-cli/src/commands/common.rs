//! Shared plumbing for the subcommands: config loading, input sources,
//! the external OCR command and output formatting.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use rcpt_core::models::config::OcrConfig;
use rcpt_core::{
    ConfidenceLevel, DateNormalizer, ExtractedField, ExtractionResult, FormValues, OcrError,
    RcptConfig, ReceiptExtractor, ReceiptPipeline, TextRecognizer,
};

/// Output format for extraction results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rcpt")
        .join("config.json")
}

/// Config from `--config`, else the default location, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RcptConfig> {
    let config = match config_path {
        Some(path) => RcptConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Loading config from {}", path.display());
                RcptConfig::from_file(&path)?
            } else {
                RcptConfig::default()
            }
        }
    };

    Ok(config)
}

/// Date normalizer from config, optionally pinned to `--today`.
pub fn build_normalizer(config: &RcptConfig, today: Option<&str>) -> anyhow::Result<DateNormalizer> {
    let today = today
        .map(|today| {
            NaiveDate::parse_from_str(today, "%Y-%m-%d")
                .with_context(|| format!("Invalid --today date (expected YYYY-MM-DD): {}", today))
        })
        .transpose()?;

    Ok(DateNormalizer::from_config(&config.normalization, today))
}

/// Runs a shell-style OCR command over a temporary copy of the image.
///
/// The command's stdout is the transcript. `{input}` in the command is
/// replaced by the image path; without a placeholder the path is appended.
#[derive(Debug, Clone, Default)]
pub struct CommandRecognizer {
    command: Option<String>,
}

impl CommandRecognizer {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl TextRecognizer for CommandRecognizer {
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let command = self.command.as_deref().ok_or(OcrError::NotReady)?;

        let mut file = tempfile::Builder::new()
            .prefix("rcpt-")
            .suffix(image_suffix(image))
            .tempfile()
            .map_err(|e| OcrError::Recognition(format!("Failed to create temp file: {}", e)))?;
        file.write_all(image)
            .and_then(|_| file.flush())
            .map_err(|e| OcrError::Recognition(format!("Failed to write temp file: {}", e)))?;

        let input = file.path().to_string_lossy().into_owned();
        let mut parts: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        if parts.is_empty() {
            return Err(OcrError::NotReady);
        }
        if parts.iter().any(|p| p.contains("{input}")) {
            for part in &mut parts {
                *part = part.replace("{input}", &input);
            }
        } else {
            parts.push(input);
        }

        debug!("Running OCR command: {}", parts.join(" "));

        let output = Command::new(&parts[0])
            .args(&parts[1..])
            .output()
            .map_err(|e| OcrError::Recognition(format!("Failed to run {}: {}", parts[0], e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "{} exited with {}: {}",
                parts[0],
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// File suffix for the temp copy, sniffed from the image magic bytes.
fn image_suffix(image: &[u8]) -> &'static str {
    match image {
        [0x89, b'P', b'N', b'G', ..] => ".png",
        [0xFF, 0xD8, 0xFF, ..] => ".jpg",
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => ".tiff",
        [b'B', b'M', ..] => ".bmp",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => ".webp",
        _ => ".img",
    }
}

/// Turns an input path into an extraction result.
///
/// Images go through the OCR command; anything else is read as a transcript.
/// `-` reads a transcript from stdin.
pub struct ReceiptSource {
    pipeline: ReceiptPipeline<CommandRecognizer>,
    ocr: OcrConfig,
}

impl ReceiptSource {
    pub fn new(config: &RcptConfig) -> Self {
        let extractor = ReceiptExtractor::from_config(&config.extraction);
        let recognizer = CommandRecognizer::new(config.ocr.command.clone());

        Self {
            pipeline: ReceiptPipeline::new(recognizer).with_extractor(extractor),
            ocr: config.ocr.clone(),
        }
    }

    pub fn is_stdin(path: &Path) -> bool {
        path.as_os_str() == "-"
    }

    pub fn is_image(&self, path: &Path) -> bool {
        self.ocr.is_image(path)
    }

    pub fn process(&self, path: &Path) -> anyhow::Result<ExtractionResult> {
        if Self::is_stdin(path) {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            return Ok(self.pipeline.extractor().extract(&text));
        }

        if self.is_image(path) {
            let image = fs::read(path)?;
            let result = self
                .pipeline
                .process(&image)
                .with_context(|| format!("Failed to recognize {}", path.display()))?;
            return Ok(result);
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript {}", path.display()))?;
        Ok(self.pipeline.extractor().extract(&text))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Levels {
    date: ConfidenceLevel,
    store: ConfidenceLevel,
    amount: ConfidenceLevel,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    #[serde(flatten)]
    result: &'a ExtractionResult,
    levels: Levels,
    #[serde(skip_serializing_if = "Option::is_none")]
    form: Option<&'a FormValues>,
}

pub fn format_result(
    result: &ExtractionResult,
    form: Option<&FormValues>,
    format: OutputFormat,
    show_confidence: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(result, form),
        OutputFormat::Csv => format_csv(result, form),
        OutputFormat::Text => Ok(format_text(result, form, show_confidence)),
    }
}

fn format_json(result: &ExtractionResult, form: Option<&FormValues>) -> anyhow::Result<String> {
    let report = Report {
        result,
        levels: Levels {
            date: result.date.level(),
            store: result.store.level(),
            amount: result.amount.level(),
        },
        form,
    };

    Ok(serde_json::to_string(&report)?)
}

fn format_csv(result: &ExtractionResult, form: Option<&FormValues>) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "normalized_date",
        "store",
        "amount",
        "date_confidence",
        "store_confidence",
        "amount_confidence",
    ])?;

    let normalized = form.map(|f| f.date.to_string()).unwrap_or_default();
    wtr.write_record([
        result.date.raw_value(),
        &normalized,
        result.store.raw_value(),
        result.amount.raw_value(),
        &format!("{:.2}", result.date.confidence()),
        &format!("{:.2}", result.store.confidence()),
        &format!("{:.2}", result.amount.confidence()),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult, form: Option<&FormValues>, show_confidence: bool) -> String {
    let mut out = String::new();

    out.push_str(&format_field("Date", &result.date, show_confidence));
    out.push_str(&format_field("Store", &result.store, show_confidence));
    out.push_str(&format_field("Amount", &result.amount, show_confidence));

    if let Some(form) = form {
        let suffix = if form.date_is_fallback { " (fallback)" } else { "" };
        out.push_str(&format!("Normalized date: {}{}\n", form.date, suffix));
    }

    out
}

fn format_field(label: &str, field: &ExtractedField, show_confidence: bool) -> String {
    let value = field.value().unwrap_or("-");

    if show_confidence && !field.is_empty() {
        format!(
            "{}: {} [{} {:.0}%]\n",
            label,
            value,
            field.level(),
            field.confidence() * 100.0
        )
    } else {
        format!("{}: {}\n", label, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEIPT: &str = "テストスーパー\n2025年4月6日\n合計 1250円";

    #[test]
    fn test_image_suffix() {
        assert_eq!(image_suffix(&[0x89, b'P', b'N', b'G', 0x0D]), ".png");
        assert_eq!(image_suffix(&[0xFF, 0xD8, 0xFF, 0xE0]), ".jpg");
        assert_eq!(image_suffix(b"RIFF\0\0\0\0WEBPVP8"), ".webp");
        assert_eq!(image_suffix(b"plain"), ".img");
    }

    #[test]
    fn test_recognizer_without_command_is_not_ready() {
        let err = CommandRecognizer::default().recognize(b"image").unwrap_err();
        assert_eq!(err, OcrError::NotReady);
    }

    #[test]
    fn test_format_text_with_confidence() {
        let result = rcpt_core::extract(RECEIPT);
        let text = format_text(&result, None, true);

        assert!(text.contains("Store: テストスーパー [medium 60%]"));
        assert!(text.contains("Amount: 1250 [high 90%]"));
    }

    #[test]
    fn test_format_text_missing_field() {
        let result = rcpt_core::extract("テストスーパー");
        let text = format_text(&result, None, true);

        assert!(text.contains("Date: -\n"));
        assert!(text.contains("Amount: -\n"));
    }

    #[test]
    fn test_format_csv() {
        let result = rcpt_core::extract(RECEIPT);
        let csv = format_csv(&result, None).unwrap();
        let mut lines = csv.lines();

        assert!(lines.next().unwrap().starts_with("date,normalized_date,store"));
        assert_eq!(
            lines.next().unwrap(),
            "2025年4月6日,,テストスーパー,1250,0.80,0.60,0.90"
        );
    }

    #[test]
    fn test_format_json_includes_levels_and_form() {
        let result = rcpt_core::extract(RECEIPT);
        let normalizer = DateNormalizer::with_today(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        let form = result.form_values(&normalizer);

        let json: serde_json::Value =
            serde_json::from_str(&format_json(&result, Some(&form)).unwrap()).unwrap();

        assert_eq!(json["amount"]["rawValue"], "1250");
        assert_eq!(json["levels"]["store"], "medium");
        assert_eq!(json["form"]["date"], "2025-04-06");
        assert_eq!(json["form"]["dateIsFallback"], false);
        assert_eq!(json["fullText"], RECEIPT);
    }
}

//! Extract command - pull date, store and total from a single receipt.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use super::common::{build_normalizer, format_result, load_config, OutputFormat, ReceiptSource};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input transcript or image, or "-" for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show confidence tiers in text output
    #[arg(long)]
    show_confidence: bool,

    /// Also normalize the extracted date to YYYY-MM-DD
    #[arg(long)]
    normalize_date: bool,

    /// Current date for the normalization fallback (YYYY-MM-DD)
    #[arg(long)]
    today: Option<String>,

    /// OCR command for image inputs, e.g. "tesseract {input} - -l jpn"
    #[arg(long)]
    ocr_command: Option<String>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(command) = args.ocr_command.clone() {
        config.ocr.command = Some(command);
    }

    if !ReceiptSource::is_stdin(&args.input) && !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let normalizer = build_normalizer(&config, args.today.as_deref())?;
    let source = ReceiptSource::new(&config);

    info!("Processing file: {}", args.input.display());

    let result = source.process(&args.input)?;
    if result.is_empty() {
        warn!("No receipt fields found in {}", args.input.display());
    }

    let form = args.normalize_date.then(|| result.form_values(&normalizer));
    if let Some(form) = &form {
        if form.date_is_fallback {
            warn!("Date {:?} could not be normalized, using {}", result.date.raw_value(), form.date);
        }
    }

    let output = format_result(&result, form.as_ref(), args.format, args.show_confidence)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
        if args.format == OutputFormat::Json {
            println!();
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

//! Normalize command - turn a printed receipt date into YYYY-MM-DD.

use clap::Args;
use console::style;

use rcpt_core::DateResolution;

use super::common::{build_normalizer, load_config};

/// Arguments for the normalize command.
#[derive(Args)]
pub struct NormalizeArgs {
    /// Raw date as printed, e.g. "2025年4月6日" or "25/04/06"
    #[arg(required = true)]
    raw: String,

    /// Current date for the fallback (YYYY-MM-DD)
    #[arg(long)]
    today: Option<String>,

    /// Fail instead of falling back to the current date
    #[arg(long)]
    strict: bool,
}

pub async fn run(args: NormalizeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let normalizer = build_normalizer(&config, args.today.as_deref())?;

    match normalizer.normalize(&args.raw) {
        DateResolution::Parsed(date) => println!("{}", date),
        DateResolution::Fallback { date, cause } => {
            if args.strict {
                anyhow::bail!("Could not normalize {:?}: {}", args.raw, cause);
            }
            eprintln!(
                "{} Could not normalize {:?} ({}), using current date",
                style("!").yellow(),
                args.raw,
                cause
            );
            println!("{}", date);
        }
    }

    Ok(())
}

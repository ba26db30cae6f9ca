//! The `to-text` subcommand

use crate::utils::{ensure_supported, log_summary, setup_logger};
use anyhow::{Context, Result};
use clap::Parser;
use dtm::Dtm;
use log::{info, LevelFilter};
use std::path::PathBuf;

/// Arguments for the `to-text` subcommand
#[derive(Parser)]
#[clap(
    name = "dtm2txt",
    author,
    version,
    about = "Convert a .dtm recording to editable text",
    long_about = None
)]
pub struct ToTextArgs {
    /// The .dtm recording to read
    input: PathBuf,

    /// Where to write the text
    output: PathBuf,

    /// Log verbosity (off, error, warn, info, debug or trace)
    #[clap(short, long, default_value = "warn")]
    log_level: LevelFilter,
}

/// Convert a .dtm recording to editable text
pub fn to_text(args: ToTextArgs) -> Result<()> {
    setup_logger(args.log_level).context("Could not set up logging")?;

    let dtm = Dtm::from_path(&args.input)
        .with_context(|| format!("Could not read {}", args.input.to_string_lossy()))?;

    ensure_supported(&dtm.header)?;
    log_summary(&args.input, &dtm.header);

    dtm.to_text_path(&args.output)
        .with_context(|| format!("Could not write {}", args.output.to_string_lossy()))?;

    info!("Wrote {}", args.output.to_string_lossy());
    Ok(())
}

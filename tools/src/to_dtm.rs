//! The `to-dtm` subcommand

use crate::utils::{log_summary, setup_logger};
use anyhow::{Context, Result};
use clap::Parser;
use dtm::Dtm;
use log::{info, LevelFilter};
use std::path::PathBuf;

/// Arguments for the `to-dtm` subcommand
#[derive(Parser)]
#[clap(
    name = "txt2dtm",
    author,
    version,
    about = "Convert an edited text recording back to .dtm",
    long_about = None
)]
pub struct ToDtmArgs {
    /// The text recording to read
    input: PathBuf,

    /// Where to write the .dtm
    output: PathBuf,

    /// Log verbosity (off, error, warn, info, debug or trace)
    #[clap(short, long, default_value = "warn")]
    log_level: LevelFilter,
}

/// Convert an edited text recording back to .dtm
pub fn to_dtm(args: ToDtmArgs) -> Result<()> {
    setup_logger(args.log_level).context("Could not set up logging")?;

    let dtm = Dtm::from_text_path(&args.input)
        .with_context(|| format!("Could not read {}", args.input.to_string_lossy()))?;

    log_summary(&args.input, &dtm.header);

    dtm.to_path(&args.output)
        .with_context(|| format!("Could not write {}", args.output.to_string_lossy()))?;

    info!(
        "Wrote {} ({} inputs)",
        args.output.to_string_lossy(),
        dtm.inputs.len()
    );
    Ok(())
}

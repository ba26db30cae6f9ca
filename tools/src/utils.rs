use anyhow::{bail, Result};
use clap::Parser;
use dtm::DtmHeader;
use fern::colors::ColoredLevelConfig;
use log::{info, LevelFilter};
use std::{path::Path, process::ExitCode};

/// Parse the arguments, run a command and turn its outcome into an exit code
///
/// Failures print `ERROR: ...` to stderr and a usage reminder to stdout, and exit with 1.
/// Asking for `--help` or `--version` exits with 0.
pub fn run<A, F>(command: F) -> ExitCode
where
    A: Parser,
    F: FnOnce(A) -> Result<()>,
{
    let args = match A::try_parse_from(wild::args()) {
        Ok(args) => args,
        Err(error) if !error.use_stderr() => error.exit(),
        Err(error) => return fail::<A>(&clap_message(&error)),
    };

    match command(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => fail::<A>(&format!("{error:#}")),
    }
}

fn fail<A: Parser>(message: &str) -> ExitCode {
    eprintln!("ERROR: {message}");
    println!("{}", A::command().render_usage());
    ExitCode::FAILURE
}

/// Condense a clap error to one line, leaving out its usage and help hints
fn clap_message(error: &clap::Error) -> String {
    let text = error.to_string();
    let summary = text.split("\n\n").next().unwrap_or_default();
    let summary = summary.trim().trim_start_matches("error:");

    summary.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn setup_logger(level: LevelFilter) -> Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new();

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!("[{}] {}", colors.color(record.level()), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

/// Reject recordings the text format can't represent
pub fn ensure_supported(header: &DtmHeader) -> Result<()> {
    if header.wii {
        bail!("Wii not supported");
    }

    if header.num_controllers != 1 {
        bail!(
            "Only one controller supported, this recording has {}",
            header.num_controllers
        );
    }

    Ok(())
}

pub fn log_summary(path: &Path, header: &DtmHeader) {
    info!(
        "{}: {} by '{}', {} inputs, {} rerecords",
        path.to_string_lossy(),
        header.game_id,
        header.author,
        header.input_count,
        header.num_rerecords
    );

    if let Some(started) = header.recording_started_at() {
        info!(
            "Recording started at {}",
            humantime::format_rfc3339_seconds(started)
        );
    }
}

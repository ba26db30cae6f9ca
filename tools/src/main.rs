use clap::Parser;
use std::process::ExitCode;

use dtm_tools::to_dtm::{to_dtm, ToDtmArgs};
use dtm_tools::to_text::{to_text, ToTextArgs};
use dtm_tools::utils::run;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
enum Cli {
    /// Convert a .dtm recording to editable text
    #[clap(name = "to-text")]
    ToText(ToTextArgs),

    /// Convert an edited text recording back to .dtm
    #[clap(name = "to-dtm")]
    ToDtm(ToDtmArgs),
}

fn main() -> ExitCode {
    run(|cli: Cli| match cli {
        Cli::ToText(args) => to_text(args),
        Cli::ToDtm(args) => to_dtm(args),
    })
}

use dtm_tools::{to_text::to_text, utils::run};
use std::process::ExitCode;

fn main() -> ExitCode {
    run(to_text)
}

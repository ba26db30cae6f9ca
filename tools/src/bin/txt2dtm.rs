use dtm_tools::{to_dtm::to_dtm, utils::run};
use std::process::ExitCode;

fn main() -> ExitCode {
    run(to_dtm)
}

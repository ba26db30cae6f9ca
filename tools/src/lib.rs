//! # DTM Tools
//!
//! DTM files are the input recordings ("movies") of the Dolphin GameCube emulator. They're a
//! binary format: a 256-byte header followed by 8 bytes of controller state for every frame.
//! That's hard to edit, so this crate provides command-line utilities that convert a recording
//! to readable text and back.
//!
//! ## dtm2txt
//!
//! ```console
//! dtm2txt 0.1.0
//! Stijn Frishert <info@stijnfrishert.com>
//! Convert a .dtm recording to editable text
//!
//! USAGE:
//!     dtm2txt [OPTIONS] <INPUT> <OUTPUT>
//!
//! ARGS:
//!     <INPUT>     The .dtm recording to read
//!     <OUTPUT>    Where to write the text
//!
//! OPTIONS:
//!     -h, --help                     Print help information
//!     -l, --log-level <LOG_LEVEL>    Log verbosity (off, error, warn, info, debug or trace)
//!                                    [default: warn]
//!     -V, --version                  Print version information
//! ```
//!
//! Only single-controller GameCube recordings are supported.
//!
//! ### Example
//!
//! ```console
//! 4ntler@mbp > dtm2txt melee.dtm melee.txt
//! 4ntler@mbp > tail -n 3 melee.txt
//! 2: A
//! 4: B Start AnalogX:255 TriggerL:30
//! 5: DPadUp disc reset CStickY:0
//! ```
//!
//! Frames without any input are left out. Every other frame gets a line with its index,
//! the buttons held and the analog values that are off-center.
//!
//! ## txt2dtm
//!
//! ```console
//! txt2dtm 0.1.0
//! Stijn Frishert <info@stijnfrishert.com>
//! Convert an edited text recording back to .dtm
//!
//! USAGE:
//!     txt2dtm [OPTIONS] <INPUT> <OUTPUT>
//! ```
//!
//! Frame lines may appear in any amount and leave gaps; missing frames get neutral input.
//! Lines for frames that were already passed are skipped, and `#` starts a comment.
//!
//! ### Example
//!
//! ```console
//! 4ntler@mbp > echo "900: A  # restart" >> melee.txt
//! 4ntler@mbp > txt2dtm -l info melee.txt melee.dtm
//! [INFO] melee.txt: GALE01 by 'tester', 901 inputs, 42 rerecords
//! [INFO] Recording started at 2014-05-13T16:53:20Z
//! [INFO] Wrote melee.dtm (901 inputs)
//! ```
//!
//! ## dtm-tools
//!
//! Both conversions are also available as subcommands of a single binary:
//! `dtm-tools to-text <INPUT> <OUTPUT>` and `dtm-tools to-dtm <INPUT> <OUTPUT>`.

pub mod to_dtm;
pub mod to_text;
pub mod utils;

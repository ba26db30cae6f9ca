//! Turning sparse, frame-numbered text lines back into a dense sequence of inputs
//!
//! The text form only lists frames that have any input on them, each prefixed by its index:
//!
//! ```text
//! 2: A
//! 5: B AnalogX:255  # jump
//! ```
//!
//! [`parse_frame_line`] reads such a line and [`Timeline`] fills in the frames in between.

use crate::controller::{ControllerState, ParseStateError};
use log::debug;
use std::{collections::TryReserveError, num::ParseIntError};
use thiserror::Error;

/// Remove a `#` comment and surrounding whitespace from a line
pub fn strip_comment(line: &str) -> &str {
    let code = match line.split_once('#') {
        Some((code, _comment)) => code,
        None => line,
    };

    code.trim()
}

/// Parse a single `frame: tokens` line
///
/// Returns [`None`] for lines that are empty once comments are stripped.
pub fn parse_frame_line(line: &str) -> Result<Option<(u64, ControllerState)>, ParseLineError> {
    let line = strip_comment(line);
    if line.is_empty() {
        return Ok(None);
    }

    let (frame, tokens) = line.split_once(':').ok_or(ParseLineError::MissingSeparator)?;
    let frame = frame.trim().parse::<u64>()?;
    let state = tokens.parse::<ControllerState>()?;

    Ok(Some((frame, state)))
}

/// A dense sequence of inputs, built from frames that arrive in increasing order
///
/// Every frame skipped between two calls to [`push`](Self::push) is filled with
/// [`ControllerState::NEUTRAL`]. Frames that don't come after the last pushed frame are
/// dropped, so a text file with duplicated or shuffled lines still converts.
#[derive(Debug, Default)]
pub struct Timeline {
    inputs: Vec<ControllerState>,
}

impl Timeline {
    /// Construct an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// The index the next frame needs to be at (or beyond) to be accepted
    pub fn next_frame(&self) -> u64 {
        self.inputs.len() as u64
    }

    /// Place a state at a frame, filling the gap before it with neutral input
    ///
    /// Returns `false` (and changes nothing) if `frame` lies before
    /// [`next_frame()`](Self::next_frame).
    pub fn push(&mut self, frame: u64, state: ControllerState) -> Result<bool, TimelineError> {
        let next = self.next_frame();
        if frame < next {
            debug!("Dropping input for frame {frame}, frames before {next} are already filled");
            return Ok(false);
        }

        let len = self.reserve_to(frame.saturating_add(1))?;
        self.inputs.resize(len - 1, ControllerState::NEUTRAL);
        self.inputs.push(state);
        Ok(true)
    }

    /// Finish the timeline, padding it to at least `declared` frames
    ///
    /// The resulting length is the maximum of `declared` and the number of frames pushed.
    pub fn finish(mut self, declared: u64) -> Result<Vec<ControllerState>, TimelineError> {
        let len = self.reserve_to(declared)?;
        self.inputs.resize(len, ControllerState::NEUTRAL);
        Ok(self.inputs)
    }

    /// Make room for `len` frames without aborting when that's impossible
    ///
    /// Returns the new length, which is never shorter than the current one.
    fn reserve_to(&mut self, len: u64) -> Result<usize, TimelineError> {
        let current = self.inputs.len();
        let additional = usize::try_from(len)
            .unwrap_or(usize::MAX)
            .saturating_sub(current);

        self.inputs
            .try_reserve_exact(additional)
            .map_err(|source| TimelineError::TooManyFrames {
                frames: len,
                source,
            })?;

        Ok(current + additional)
    }
}

/// Errors that might be returned from [`Timeline::push()`] and [`Timeline::finish()`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    /// Memory for the frames couldn't be allocated
    #[error("{frames} frames don't fit in memory")]
    TooManyFrames {
        frames: u64,
        #[source]
        source: TryReserveError,
    },
}

/// Errors that might be returned from [`parse_frame_line()`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseLineError {
    /// There's no `:` between the frame index and the input tokens
    #[error("Expected 'frame: inputs'")]
    MissingSeparator,

    /// The part before the `:` isn't a frame index
    #[error("The frame index is not an unsigned number")]
    InvalidFrame(#[from] ParseIntError),

    /// The input tokens didn't parse
    #[error("The inputs are malformed")]
    Input(#[from] ParseStateError),
}

//! The line-based `key: value` text form of a [`DtmHeader`]
//!
//! Every header field that carries information gets one line, in a fixed order. Reading is
//! strictly positional: the n-th line always fills the n-th field, whatever its key says. The
//! order is defined once, in the `header_lines!` table below.

use super::DtmHeader;
use crate::fixed::FixedStr;
use log::warn;
use std::{
    io::{self, BufRead, Write},
    num::ParseIntError,
    str::ParseBoolError,
};
use thiserror::Error;

/// A header field type that can be rendered to and parsed from the value part of a line
trait Value: Sized {
    fn render(&self) -> String;
    fn parse(text: &str) -> Result<Self, ParseFieldError>;
}

impl Value for bool {
    fn render(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Result<Self, ParseFieldError> {
        Ok(text.trim().parse()?)
    }
}

macro_rules! integer_value {
    ($($int:ty),*) => {
        $(
            impl Value for $int {
                fn render(&self) -> String {
                    self.to_string()
                }

                fn parse(text: &str) -> Result<Self, ParseFieldError> {
                    Ok(text.trim().parse()?)
                }
            }
        )*
    };
}

integer_value!(u8, u32, u64);

/// Strings are copied verbatim, including surrounding whitespace
impl<const N: usize> Value for FixedStr<N> {
    fn render(&self) -> String {
        self.to_str_lossy().into_owned()
    }

    fn parse(text: &str) -> Result<Self, ParseFieldError> {
        Ok(text.into())
    }
}

/// Digests are lowercase hex, without separators
///
/// Digits beyond the width of the field are ignored. When fewer digits are present, the
/// remaining bytes stay zero.
impl<const N: usize> Value for [u8; N] {
    fn render(&self) -> String {
        hex::encode(self)
    }

    fn parse(text: &str) -> Result<Self, ParseFieldError> {
        let digits = text.trim().as_bytes();
        let decoded = hex::decode(&digits[..digits.len().min(N * 2)])?;

        let mut bytes = [0; N];
        bytes[..decoded.len()].copy_from_slice(&decoded);
        Ok(bytes)
    }
}

/// Pulls header lines from a reader, one field at a time
struct Lines<'a, R> {
    reader: &'a mut R,
    line: usize,
    buffer: String,
}

impl<'a, R: BufRead> Lines<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            line: 0,
            buffer: String::new(),
        }
    }

    /// Read the next line and parse its value as the field called `key`
    ///
    /// The value is everything after the first `:`, minus one optional space. A line without
    /// a `:` is taken as a value in its entirety.
    fn next_value<T: Value>(&mut self, key: &'static str) -> Result<T, ReadError> {
        self.line += 1;
        self.buffer.clear();
        if self.reader.read_line(&mut self.buffer)? == 0 {
            return Err(ReadError::MissingLine {
                line: self.line,
                key,
            });
        }

        let text = self.buffer.strip_suffix('\n').unwrap_or(&self.buffer);
        let text = text.strip_suffix('\r').unwrap_or(text);

        let value = match text.split_once(':') {
            Some((label, value)) => {
                if label.trim() != key {
                    warn!("Line {}: expected '{key}', found '{}'", self.line, label.trim());
                }
                value.strip_prefix(' ').unwrap_or(value)
            }
            None => {
                warn!("Line {}: no ':' found, reading the whole line as '{key}'", self.line);
                text
            }
        };

        T::parse(value).map_err(|source| ReadError::InvalidValue {
            line: self.line,
            key,
            source,
        })
    }
}

macro_rules! header_lines {
    ($($key:literal => $($field:ident).+,)*) => {
        /// The number of lines the header takes up in text form
        pub const LINE_COUNT: usize = [$($key),*].len();

        /// Serialize a [`DtmHeader`] as `key: value` lines
        ///
        /// The signature and the reserved regions have no text representation.
        pub fn write<W>(header: &DtmHeader, mut writer: W) -> Result<(), io::Error>
        where
            W: Write,
        {
            $(writeln!(writer, "{}: {}", $key, Value::render(&header.$($field).+))?;)*
            Ok(())
        }

        /// Deserialize a [`DtmHeader`] from exactly [`LINE_COUNT`] lines
        ///
        /// Parsing starts from [`DtmHeader::default()`], so the signature is always valid and
        /// the reserved regions are zero. The reader is left positioned right after the
        /// header, so the caller can continue with whatever follows.
        pub fn read<R>(reader: &mut R) -> Result<DtmHeader, ReadError>
        where
            R: BufRead,
        {
            let mut header = DtmHeader::default();
            let mut lines = Lines::new(reader);
            $(header.$($field).+ = lines.next_value($key)?;)*
            Ok(header)
        }
    };
}

header_lines! {
    "gameID" => game_id,
    "bWii" => wii,
    "numControllers" => num_controllers,
    "bFromSaveState" => from_save_state,
    "frameCount" => frame_count,
    "inputCount" => input_count,
    "lagCount" => lag_count,
    "uniqueID" => unique_id,
    "numRerecords" => num_rerecords,
    "author" => author,
    "videoBackend" => video_backend,
    "audioEmulator" => audio_emulator,
    "md5" => md5,
    "recordingStartTime" => recording_start_time,
    "bSaveConfig" => config.save_config,
    "bSkipIdle" => config.skip_idle,
    "bDualCore" => config.dual_core,
    "bProgressive" => config.progressive,
    "bDSPHLE" => config.dsp_hle,
    "bFastDiscSpeed" => config.fast_disc_speed,
    "CPUCore" => config.cpu_core,
    "bEFBAccessEnable" => config.efb_access_enable,
    "bEFBCopyEnable" => config.efb_copy_enable,
    "bCopyEFBToTexture" => config.copy_efb_to_texture,
    "bEFBCopyCacheEnable" => config.efb_copy_cache_enable,
    "bEFBEmulateFormatChanges" => config.efb_emulate_format_changes,
    "bUseXFB" => config.use_xfb,
    "bUseRealXFB" => config.use_real_xfb,
    "memcards" => config.memcards,
    "bClearSave" => config.clear_save,
    "bongos" => config.bongos,
    "bSyncGPU" => config.sync_gpu,
    "bNetPlay" => config.net_play,
    "discChange" => disc_change,
    "revision" => revision,
    "DSPiromHash" => dsp_irom_hash,
    "DSPcoefHash" => dsp_coef_hash,
    "tickCount" => tick_count,
}

/// Errors that might occur parsing the value of a single header line
#[derive(Debug, Error, PartialEq)]
pub enum ParseFieldError {
    /// The value should have been `true` or `false`
    #[error("Expected 'true' or 'false'")]
    Bool(#[from] ParseBoolError),

    /// The value should have been an unsigned decimal number that fits the field
    #[error("Expected an unsigned number that fits the field")]
    Int(#[from] ParseIntError),

    /// The value should have been pairs of hexadecimal digits
    #[error("Expected hexadecimal digits")]
    Hex(#[from] hex::FromHexError),
}

/// Errors that might be returned from [`read()`]
#[derive(Debug, Error)]
pub enum ReadError {
    /// Reading from the underlying reader failed
    #[error("Something failed with I/O")]
    Io(#[from] io::Error),

    /// The text ended before every header line was read
    #[error("Line {line}: the text ended before '{key}' was read")]
    MissingLine { line: usize, key: &'static str },

    /// A line was present, but its value didn't parse
    #[error("Line {line}: the value for '{key}' is malformed")]
    InvalidValue {
        line: usize,
        key: &'static str,
        #[source]
        source: ParseFieldError,
    },
}

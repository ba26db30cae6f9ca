//! The 256-byte header at the start of every DTM file
//!
//! The header is a packed little-endian structure. This module maps it onto [`DtmHeader`]
//! and back, byte for byte. The line-based text form lives in [`text`].

pub mod text;

use crate::fixed::FixedStr;
use static_assertions::const_assert_eq;
use std::{
    fs::File,
    io::{self, Read, Write},
    ops::Range,
    path::Path,
    time::{Duration, SystemTime},
};
use thiserror::Error;

const SIGNATURE_RANGE: Range<usize> = 0x00..0x04;
const GAME_ID_RANGE: Range<usize> = 0x04..0x0A;
const WII: usize = 0x0A;
const NUM_CONTROLLERS: usize = 0x0B;
const FROM_SAVE_STATE: usize = 0x0C;
const FRAME_COUNT_RANGE: Range<usize> = 0x0D..0x15;
const INPUT_COUNT_RANGE: Range<usize> = 0x15..0x1D;
const LAG_COUNT_RANGE: Range<usize> = 0x1D..0x25;
const UNIQUE_ID_RANGE: Range<usize> = 0x25..0x2D;
const NUM_RERECORDS_RANGE: Range<usize> = 0x2D..0x31;
const AUTHOR_RANGE: Range<usize> = 0x31..0x51;
const VIDEO_BACKEND_RANGE: Range<usize> = 0x51..0x61;
const AUDIO_EMULATOR_RANGE: Range<usize> = 0x61..0x71;
const MD5_RANGE: Range<usize> = 0x71..0x81;
const RECORDING_START_TIME_RANGE: Range<usize> = 0x81..0x89;
const CONFIG_RANGE: Range<usize> = 0x89..0x9C;
const RESERVED_RANGE: Range<usize> = 0x9C..0xA9;
const DISC_CHANGE_RANGE: Range<usize> = 0xA9..0xD1;
const REVISION_RANGE: Range<usize> = 0xD1..0xE5;
const DSP_IROM_HASH_RANGE: Range<usize> = 0xE5..0xE9;
const DSP_COEF_HASH_RANGE: Range<usize> = 0xE9..0xED;
const TICK_COUNT_RANGE: Range<usize> = 0xED..0xF5;
const RESERVED_2_RANGE: Range<usize> = 0xF5..0x100;

const_assert_eq!(CONFIG_RANGE.end - CONFIG_RANGE.start, EmulatorConfig::LEN);
const_assert_eq!(RESERVED_2_RANGE.end, DtmHeader::LEN);

/// Metadata describing a DTM recording
///
/// Next to counters and identification, the header stores a snapshot of the emulator
/// settings at the time of recording (see [`EmulatorConfig`]). The two reserved regions are
/// not exposed, but whatever was read from disk is written back unchanged.
///
/// ```no_run
/// # use dtm::header::DtmHeader;
/// # use std::fs::File;
/// let header = DtmHeader::from_reader(File::open("run.dtm")?)?;
/// println!("{} frames by {}", header.input_count, header.author);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtmHeader {
    /// The six character game ID (e.g. `GALE01`)
    pub game_id: FixedStr<6>,

    /// Was this recorded on a Wii game?
    pub wii: bool,

    /// The number of connected controllers
    pub num_controllers: u8,

    /// `false` means the recording starts from boot, `true` from a save state
    pub from_save_state: bool,

    /// Number of (video) frames in the recording
    pub frame_count: u64,

    /// Number of input records following the header
    pub input_count: u64,

    /// Number of lag frames in the recording
    pub lag_count: u64,

    /// Unused by the emulator, but kept around
    pub unique_id: u64,

    /// How many times the recording was rerecorded
    pub num_rerecords: u32,

    /// The author's name, in UTF-8
    pub author: FixedStr<32>,

    /// The video backend the recording was made with
    pub video_backend: FixedStr<16>,

    /// The audio emulation mode the recording was made with
    pub audio_emulator: FixedStr<16>,

    /// MD5 digest of the disc image
    pub md5: [u8; 16],

    /// Seconds since the Unix epoch at which the recording started (used to seed the RTC)
    pub recording_start_time: u64,

    /// Emulator settings stored alongside the recording
    pub config: EmulatorConfig,

    reserved: [u8; 13],

    /// File name of the disc to switch to, for multi-disc games
    pub disc_change: FixedStr<40>,

    /// Git hash of the emulator revision
    pub revision: [u8; 20],

    pub dsp_irom_hash: u32,

    pub dsp_coef_hash: u32,

    /// Number of CPU ticks in the recording
    pub tick_count: u64,

    reserved_2: [u8; 11],
}

impl DtmHeader {
    /// The number of bytes the header takes up on disk
    pub const LEN: usize = 256;

    /// The magic bytes every DTM file starts with
    pub const SIGNATURE: [u8; 4] = *b"DTM\x1A";

    /// Decode a header from its on-disk bytes
    ///
    /// This fails if the bytes don't start with [`DtmHeader::SIGNATURE`].
    pub fn from_bytes(bytes: &[u8; Self::LEN]) -> Result<Self, FromBytesError> {
        let found = array(bytes, SIGNATURE_RANGE);
        if found != Self::SIGNATURE {
            return Err(FromBytesError::BadSignature { found });
        }

        Ok(Self {
            game_id: FixedStr::from_array(array(bytes, GAME_ID_RANGE)),
            wii: bytes[WII] != 0,
            num_controllers: bytes[NUM_CONTROLLERS],
            from_save_state: bytes[FROM_SAVE_STATE] != 0,
            frame_count: u64::from_le_bytes(array(bytes, FRAME_COUNT_RANGE)),
            input_count: u64::from_le_bytes(array(bytes, INPUT_COUNT_RANGE)),
            lag_count: u64::from_le_bytes(array(bytes, LAG_COUNT_RANGE)),
            unique_id: u64::from_le_bytes(array(bytes, UNIQUE_ID_RANGE)),
            num_rerecords: u32::from_le_bytes(array(bytes, NUM_RERECORDS_RANGE)),
            author: FixedStr::from_array(array(bytes, AUTHOR_RANGE)),
            video_backend: FixedStr::from_array(array(bytes, VIDEO_BACKEND_RANGE)),
            audio_emulator: FixedStr::from_array(array(bytes, AUDIO_EMULATOR_RANGE)),
            md5: array(bytes, MD5_RANGE),
            recording_start_time: u64::from_le_bytes(array(bytes, RECORDING_START_TIME_RANGE)),
            config: EmulatorConfig::from_bytes(&array(bytes, CONFIG_RANGE)),
            reserved: array(bytes, RESERVED_RANGE),
            disc_change: FixedStr::from_array(array(bytes, DISC_CHANGE_RANGE)),
            revision: array(bytes, REVISION_RANGE),
            dsp_irom_hash: u32::from_le_bytes(array(bytes, DSP_IROM_HASH_RANGE)),
            dsp_coef_hash: u32::from_le_bytes(array(bytes, DSP_COEF_HASH_RANGE)),
            tick_count: u64::from_le_bytes(array(bytes, TICK_COUNT_RANGE)),
            reserved_2: array(bytes, RESERVED_2_RANGE),
        })
    }

    /// Encode the header to its on-disk bytes
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut bytes = [0; Self::LEN];

        bytes[SIGNATURE_RANGE].copy_from_slice(&Self::SIGNATURE);
        bytes[GAME_ID_RANGE].copy_from_slice(self.game_id.bytes());
        bytes[WII] = self.wii.into();
        bytes[NUM_CONTROLLERS] = self.num_controllers;
        bytes[FROM_SAVE_STATE] = self.from_save_state.into();
        bytes[FRAME_COUNT_RANGE].copy_from_slice(&self.frame_count.to_le_bytes());
        bytes[INPUT_COUNT_RANGE].copy_from_slice(&self.input_count.to_le_bytes());
        bytes[LAG_COUNT_RANGE].copy_from_slice(&self.lag_count.to_le_bytes());
        bytes[UNIQUE_ID_RANGE].copy_from_slice(&self.unique_id.to_le_bytes());
        bytes[NUM_RERECORDS_RANGE].copy_from_slice(&self.num_rerecords.to_le_bytes());
        bytes[AUTHOR_RANGE].copy_from_slice(self.author.bytes());
        bytes[VIDEO_BACKEND_RANGE].copy_from_slice(self.video_backend.bytes());
        bytes[AUDIO_EMULATOR_RANGE].copy_from_slice(self.audio_emulator.bytes());
        bytes[MD5_RANGE].copy_from_slice(&self.md5);
        bytes[RECORDING_START_TIME_RANGE].copy_from_slice(&self.recording_start_time.to_le_bytes());
        bytes[CONFIG_RANGE].copy_from_slice(&self.config.to_bytes());
        bytes[RESERVED_RANGE].copy_from_slice(&self.reserved);
        bytes[DISC_CHANGE_RANGE].copy_from_slice(self.disc_change.bytes());
        bytes[REVISION_RANGE].copy_from_slice(&self.revision);
        bytes[DSP_IROM_HASH_RANGE].copy_from_slice(&self.dsp_irom_hash.to_le_bytes());
        bytes[DSP_COEF_HASH_RANGE].copy_from_slice(&self.dsp_coef_hash.to_le_bytes());
        bytes[TICK_COUNT_RANGE].copy_from_slice(&self.tick_count.to_le_bytes());
        bytes[RESERVED_2_RANGE].copy_from_slice(&self.reserved_2);

        bytes
    }

    /// Deserialize a [`DtmHeader`] from an arbitrary I/O reader
    pub fn from_reader<R>(mut reader: R) -> Result<Self, FromReaderError>
    where
        R: Read,
    {
        let mut bytes = [0; Self::LEN];
        reader.read_exact(bytes.as_mut_slice())?;

        Ok(Self::from_bytes(&bytes)?)
    }

    /// Deserialize a [`DtmHeader`] from the start of a file on disk
    pub fn from_path<P>(path: P) -> Result<Self, FromPathError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        Ok(Self::from_reader(file)?)
    }

    /// Serialize the [`DtmHeader`] to an arbitrary I/O writer
    pub fn to_writer<W>(&self, mut writer: W) -> Result<(), io::Error>
    where
        W: Write,
    {
        writer.write_all(&self.to_bytes())
    }

    /// The moment the recording was started
    ///
    /// Returns [`None`] if the timestamp can't be represented on this platform.
    pub fn recording_started_at(&self) -> Option<SystemTime> {
        SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(self.recording_start_time))
    }
}

/// An all-zero header with a valid signature
impl Default for DtmHeader {
    fn default() -> Self {
        Self {
            game_id: FixedStr::default(),
            wii: false,
            num_controllers: 0,
            from_save_state: false,
            frame_count: 0,
            input_count: 0,
            lag_count: 0,
            unique_id: 0,
            num_rerecords: 0,
            author: FixedStr::default(),
            video_backend: FixedStr::default(),
            audio_emulator: FixedStr::default(),
            md5: [0; 16],
            recording_start_time: 0,
            config: EmulatorConfig::default(),
            reserved: [0; 13],
            disc_change: FixedStr::default(),
            revision: [0; 20],
            dsp_irom_hash: 0,
            dsp_coef_hash: 0,
            tick_count: 0,
            reserved_2: [0; 11],
        }
    }
}

/// Emulator settings the recording was made with
///
/// When [`save_config`](Self::save_config) is set, the emulator applies these on playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmulatorConfig {
    pub save_config: bool,
    pub skip_idle: bool,
    pub dual_core: bool,
    pub progressive: bool,
    pub dsp_hle: bool,
    pub fast_disc_speed: bool,

    /// 0 = interpreter, 1 = JIT, 2 = JITIL
    pub cpu_core: u8,

    pub efb_access_enable: bool,
    pub efb_copy_enable: bool,
    pub copy_efb_to_texture: bool,
    pub efb_copy_cache_enable: bool,
    pub efb_emulate_format_changes: bool,
    pub use_xfb: bool,
    pub use_real_xfb: bool,

    /// Number of memory cards inserted
    pub memcards: u8,

    /// Create a new memory card on playback
    pub clear_save: bool,

    /// Number of bongo controllers
    pub bongos: u8,

    pub sync_gpu: bool,
    pub net_play: bool,
}

impl EmulatorConfig {
    const LEN: usize = 19;

    fn from_bytes(bytes: &[u8; Self::LEN]) -> Self {
        let flag = |index: usize| bytes[index] != 0;

        Self {
            save_config: flag(0),
            skip_idle: flag(1),
            dual_core: flag(2),
            progressive: flag(3),
            dsp_hle: flag(4),
            fast_disc_speed: flag(5),
            cpu_core: bytes[6],
            efb_access_enable: flag(7),
            efb_copy_enable: flag(8),
            copy_efb_to_texture: flag(9),
            efb_copy_cache_enable: flag(10),
            efb_emulate_format_changes: flag(11),
            use_xfb: flag(12),
            use_real_xfb: flag(13),
            memcards: bytes[14],
            clear_save: flag(15),
            bongos: bytes[16],
            sync_gpu: flag(17),
            net_play: flag(18),
        }
    }

    fn to_bytes(self) -> [u8; Self::LEN] {
        [
            self.save_config.into(),
            self.skip_idle.into(),
            self.dual_core.into(),
            self.progressive.into(),
            self.dsp_hle.into(),
            self.fast_disc_speed.into(),
            self.cpu_core,
            self.efb_access_enable.into(),
            self.efb_copy_enable.into(),
            self.copy_efb_to_texture.into(),
            self.efb_copy_cache_enable.into(),
            self.efb_emulate_format_changes.into(),
            self.use_xfb.into(),
            self.use_real_xfb.into(),
            self.memcards,
            self.clear_save.into(),
            self.bongos,
            self.sync_gpu.into(),
            self.net_play.into(),
        ]
    }
}

/// Copy a sub-range of the header into a fixed size array
fn array<const N: usize>(bytes: &[u8], range: Range<usize>) -> [u8; N] {
    let mut dest = [0; N];
    dest.copy_from_slice(&bytes[range]);
    dest
}

/// Errors that might be returned from [`DtmHeader::from_bytes()`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FromBytesError {
    /// The first four bytes aren't [`DtmHeader::SIGNATURE`]
    #[error("Not a DTM file (signature {found:02X?})")]
    BadSignature { found: [u8; 4] },
}

/// Errors that might be returned from [`DtmHeader::from_reader()`]
#[derive(Debug, Error)]
pub enum FromReaderError {
    /// Reading the bytes failed
    #[error("Something failed with I/O")]
    Read(#[from] io::Error),

    /// Deserialization from the read bytes failed
    #[error("Deserialization from the read bytes failed")]
    FromBytes(#[from] FromBytesError),
}

/// Errors that might be returned from [`DtmHeader::from_path()`]
#[derive(Debug, Error)]
pub enum FromPathError {
    /// Opening the file itself failed
    #[error("Opening the file failed")]
    FileOpen(#[from] io::Error),

    /// Deserialization failed
    #[error("Reading the header from file failed")]
    Read(#[from] FromReaderError),
}

//! A complete DTM recording: header plus per-frame inputs

use crate::{
    controller::ControllerState,
    header::{self, text, DtmHeader},
    timeline::{parse_frame_line, ParseLineError, Timeline, TimelineError},
};
use log::{debug, warn};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};
use thiserror::Error;

/// Upper bound on how many inputs are allocated up front based on the header alone
const MAX_PREALLOCATED_INPUTS: u64 = 1 << 20;

/// A [`DtmHeader`] and the controller input for every frame
///
/// A recording can be read from and written to both the binary `.dtm` format and an editable
/// text format. The text format lists the header fields line by line, followed by one line
/// for every frame that has _any_ input on it:
///
/// ```text
/// gameID: GALE01
/// ...
/// tickCount: 9876543210
///
/// 2: A
/// 4: B Start AnalogX:255 TriggerL:30
/// ```
///
/// ```no_run
/// # use dtm::Dtm;
/// let dtm = Dtm::from_path("run.dtm")?;
/// dtm.to_text_path("run.txt")?;
///
/// let edited = Dtm::from_text_path("run.txt")?;
/// edited.to_path("edited.dtm")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dtm {
    /// Metadata about the recording
    pub header: DtmHeader,

    /// The controller state for every frame, starting at frame 0
    pub inputs: Vec<ControllerState>,
}

impl Dtm {
    /// Create a recording from its parts
    pub fn new(header: DtmHeader, inputs: Vec<ControllerState>) -> Self {
        Self { header, inputs }
    }

    /// Deserialize a [`Dtm`] from an arbitrary I/O reader
    ///
    /// At most [`DtmHeader::input_count`] inputs are read. Reading stops early if the data
    /// runs out, and a trailing partial record is ignored.
    pub fn from_reader<R>(mut reader: R) -> Result<Self, FromReaderError>
    where
        R: Read,
    {
        let header = DtmHeader::from_reader(&mut reader)?;

        let declared = header.input_count;
        let mut inputs = Vec::with_capacity(declared.min(MAX_PREALLOCATED_INPUTS) as usize);
        while (inputs.len() as u64) < declared {
            let mut bytes = [0; ControllerState::LEN];
            match reader.read_exact(bytes.as_mut_slice()) {
                Ok(()) => inputs.push(ControllerState::from_bytes(bytes)),
                Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(error) => return Err(error.into()),
            }
        }

        if (inputs.len() as u64) < declared {
            warn!(
                "The header declares {declared} inputs, but only {} are present",
                inputs.len()
            );
        }
        debug!("Read {} inputs", inputs.len());

        Ok(Self { header, inputs })
    }

    /// Deserialize a [`Dtm`] from a path on disk (.dtm)
    pub fn from_path<P>(path: P) -> Result<Self, FromPathError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file))?)
    }

    /// Serialize the [`Dtm`] to an arbitrary I/O writer
    ///
    /// The header is written as-is, followed by every input.
    pub fn to_writer<W>(&self, mut writer: W) -> Result<(), io::Error>
    where
        W: Write,
    {
        self.header.to_writer(&mut writer)?;
        for input in &self.inputs {
            writer.write_all(&input.to_bytes())?;
        }

        debug!("Wrote {} inputs", self.inputs.len());
        Ok(())
    }

    /// Serialize the [`Dtm`] to a path on disk (.dtm)
    pub fn to_path<P>(&self, path: P) -> Result<(), io::Error>
    where
        P: AsRef<Path>,
    {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_writer(&mut writer)?;
        writer.flush()
    }

    /// Deserialize a [`Dtm`] from its text form
    ///
    /// The header is read positionally (see [`header::text::read()`]). The frame lines after
    /// it are expanded into a dense sequence of inputs by a [`Timeline`], padded up to the
    /// declared input count. The header's input count is updated to match.
    pub fn from_text_reader<R>(mut reader: R) -> Result<Self, FromTextError>
    where
        R: BufRead,
    {
        let mut header = text::read(&mut reader)?;

        let mut timeline = Timeline::new();
        for (index, line) in reader.lines().enumerate() {
            let line_number = text::LINE_COUNT + index + 1;
            match parse_frame_line(&line?) {
                Ok(Some((frame, state))) => {
                    timeline.push(frame, state)?;
                }
                Ok(None) => {}
                Err(source) => {
                    return Err(FromTextError::Line {
                        line: line_number,
                        source,
                    })
                }
            }
        }

        let inputs = timeline.finish(header.input_count)?;
        header.input_count = inputs.len() as u64;

        Ok(Self { header, inputs })
    }

    /// Deserialize a [`Dtm`] from a text file on disk
    pub fn from_text_path<P>(path: P) -> Result<Self, FromTextPathError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        Ok(Self::from_text_reader(BufReader::new(file))?)
    }

    /// Serialize the [`Dtm`] to its text form
    ///
    /// Frames without any input are left out.
    pub fn to_text_writer<W>(&self, mut writer: W) -> Result<(), io::Error>
    where
        W: Write,
    {
        text::write(&self.header, &mut writer)?;
        writeln!(writer)?;

        let mut written = 0;
        for (frame, input) in self.inputs.iter().enumerate() {
            if !input.is_default() {
                writeln!(writer, "{frame}: {input}")?;
                written += 1;
            }
        }

        debug!("Wrote {written} of {} frames as text", self.inputs.len());
        Ok(())
    }

    /// Serialize the [`Dtm`] to a text file on disk
    pub fn to_text_path<P>(&self, path: P) -> Result<(), io::Error>
    where
        P: AsRef<Path>,
    {
        let mut writer = BufWriter::new(File::create(path)?);
        self.to_text_writer(&mut writer)?;
        writer.flush()
    }
}

/// Errors that might be returned from [`Dtm::from_reader()`]
#[derive(Debug, Error)]
pub enum FromReaderError {
    /// Reading the header failed
    #[error("Reading the header failed")]
    Header(#[from] header::FromReaderError),

    /// Reading the inputs failed
    #[error("Something failed with I/O")]
    Read(#[from] io::Error),
}

/// Errors that might be returned from [`Dtm::from_path()`]
#[derive(Debug, Error)]
pub enum FromPathError {
    /// Opening the file itself failed
    #[error("Opening the file failed")]
    FileOpen(#[from] io::Error),

    /// Deserialization failed
    #[error("Reading the DTM from file failed")]
    Read(#[from] FromReaderError),
}

/// Errors that might be returned from [`Dtm::from_text_reader()`]
#[derive(Debug, Error)]
pub enum FromTextError {
    /// Reading the header lines failed
    #[error("Reading the header failed")]
    Header(#[from] text::ReadError),

    /// Reading the frame lines failed
    #[error("Something failed with I/O")]
    Read(#[from] io::Error),

    /// A frame line was malformed
    #[error("Line {line} is not a valid frame")]
    Line {
        line: usize,
        #[source]
        source: ParseLineError,
    },

    /// The frame indices or the declared input count ask for more inputs than fit in memory
    #[error("The recording is too long")]
    Timeline(#[from] TimelineError),
}

/// Errors that might be returned from [`Dtm::from_text_path()`]
#[derive(Debug, Error)]
pub enum FromTextPathError {
    /// Opening the file itself failed
    #[error("Opening the file failed")]
    FileOpen(#[from] io::Error),

    /// Deserialization failed
    #[error("Reading the text from file failed")]
    Read(#[from] FromTextError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Axis, Button};
    use std::io::Cursor;

    const SAMPLE_DTM: &[u8] = include_bytes!("../test/sample.dtm");
    const SAMPLE_TXT: &str = include_str!("../test/sample.txt");

    fn header_text(input_count: u64) -> String {
        let mut header = DtmHeader::default();
        header.num_controllers = 1;
        header.input_count = input_count;

        let mut text = Vec::new();
        text::write(&header, &mut text).unwrap();
        String::from_utf8(text).unwrap()
    }

    fn from_text(text: &str) -> Result<Dtm, FromTextError> {
        Dtm::from_text_reader(Cursor::new(text))
    }

    #[test]
    fn sample() -> anyhow::Result<()> {
        let dtm = Dtm::from_reader(Cursor::new(SAMPLE_DTM))?;

        assert_eq!(dtm.inputs.len(), 8);
        assert_eq!(
            dtm.inputs.iter().filter(|input| input.is_default()).count(),
            4
        );
        assert!(dtm.inputs[2].buttons.is_pressed(Button::A));
        assert_eq!(dtm.inputs[4].axis(Axis::TriggerL), 30);
        assert!(dtm.inputs[5].buttons.is_pressed(Button::Disc));
        assert_eq!(dtm.inputs[7].trigger_r, 255);

        let mut dest = Vec::new();
        dtm.to_writer(&mut dest)?;
        assert_eq!(dest, SAMPLE_DTM);

        Ok(())
    }

    #[test]
    fn binary_to_text() -> anyhow::Result<()> {
        let dtm = Dtm::from_reader(Cursor::new(SAMPLE_DTM))?;

        let mut text = Vec::new();
        dtm.to_text_writer(&mut text)?;
        assert_eq!(String::from_utf8(text)?, SAMPLE_TXT);

        Ok(())
    }

    #[test]
    fn text_to_binary() -> anyhow::Result<()> {
        let dtm = from_text(SAMPLE_TXT)?;

        let mut dest = Vec::new();
        dtm.to_writer(&mut dest)?;
        assert_eq!(dest, SAMPLE_DTM);

        Ok(())
    }

    #[test]
    fn truncated_inputs() -> anyhow::Result<()> {
        // Five full records, plus half of the sixth
        let len = DtmHeader::LEN + 5 * ControllerState::LEN + 4;
        let dtm = Dtm::from_reader(Cursor::new(&SAMPLE_DTM[..len]))?;

        assert_eq!(dtm.inputs.len(), 5);
        assert_eq!(dtm.header.input_count, 8);

        Ok(())
    }

    #[test]
    fn reads_only_declared_inputs() -> anyhow::Result<()> {
        let mut bytes = SAMPLE_DTM.to_vec();
        bytes.extend_from_slice(&ControllerState::NEUTRAL.to_bytes());

        let dtm = Dtm::from_reader(Cursor::new(bytes))?;
        assert_eq!(dtm.inputs.len(), 8);

        Ok(())
    }

    #[test]
    fn bad_signature() {
        let mut bytes = SAMPLE_DTM.to_vec();
        bytes[0] = b'X';

        assert!(matches!(
            Dtm::from_reader(Cursor::new(bytes)),
            Err(FromReaderError::Header(header::FromReaderError::FromBytes(_)))
        ));
    }

    #[test]
    fn gap_filling() -> anyhow::Result<()> {
        let dtm = from_text(&format!("{}\n2: A\n5: B\n", header_text(0)))?;

        assert_eq!(dtm.inputs.len(), 6);
        assert_eq!(dtm.header.input_count, 6);
        for frame in [0, 1, 3, 4] {
            assert_eq!(dtm.inputs[frame], ControllerState::NEUTRAL);
        }
        assert!(dtm.inputs[2].buttons.is_pressed(Button::A));
        assert!(dtm.inputs[5].buttons.is_pressed(Button::B));

        Ok(())
    }

    #[test]
    fn non_increasing_frames() -> anyhow::Result<()> {
        let dtm = from_text(&format!("{}\n3: A\n1: B\n", header_text(0)))?;

        assert_eq!(dtm.inputs.len(), 4);
        assert_eq!(dtm.inputs[1], ControllerState::NEUTRAL);
        assert!(dtm.inputs[3].buttons.is_pressed(Button::A));

        Ok(())
    }

    #[test]
    fn declared_count_padding() -> anyhow::Result<()> {
        let dtm = from_text(&format!("{}\n2: A\n", header_text(10)))?;

        assert_eq!(dtm.inputs.len(), 10);
        assert_eq!(dtm.header.input_count, 10);
        assert!(dtm.inputs[3..].iter().all(ControllerState::is_default));

        Ok(())
    }

    #[test]
    fn comments_and_blank_lines() -> anyhow::Result<()> {
        let text = format!(
            "{}\n# intro\n\n  1: X   # jump\n\t\n2: Y TriggerL:5#no space\n",
            header_text(0)
        );
        let dtm = from_text(&text)?;

        assert_eq!(dtm.inputs.len(), 3);
        assert!(dtm.inputs[1].buttons.is_pressed(Button::X));
        assert!(dtm.inputs[2].buttons.is_pressed(Button::Y));
        assert_eq!(dtm.inputs[2].trigger_l, 5);

        Ok(())
    }

    #[test]
    fn malformed_frame_line() {
        let text = format!("{}\n1: A\n2: AnalogX:far\n", header_text(0));

        assert!(matches!(
            from_text(&text),
            Err(FromTextError::Line {
                line: 41,
                source: ParseLineError::Input(_)
            })
        ));
    }

    #[test]
    fn missing_header_line() {
        let text: String = SAMPLE_TXT.lines().take(20).map(|l| format!("{l}\n")).collect();

        assert!(matches!(
            from_text(&text),
            Err(FromTextError::Header(text::ReadError::MissingLine { .. }))
        ));
    }

    #[test]
    fn default_inputs_are_omitted() -> anyhow::Result<()> {
        let mut header = DtmHeader::default();
        header.input_count = 3;
        let dtm = Dtm::new(header, vec![ControllerState::NEUTRAL; 3]);

        let mut text = Vec::new();
        dtm.to_text_writer(&mut text)?;
        let text = String::from_utf8(text)?;

        assert_eq!(text.lines().count(), text::LINE_COUNT + 1);
        assert!(text.ends_with("tickCount: 0\n\n"));
        assert_eq!(from_text(&text)?, dtm);

        Ok(())
    }

    #[test]
    fn round_trip() -> anyhow::Result<()> {
        let mut header = DtmHeader::default();
        header.game_id = "GALE01".into();
        header.author = "tester".into();
        header.num_controllers = 1;
        header.input_count = 64;

        let inputs = (0..64u8)
            .map(|frame| {
                let mut state = ControllerState::NEUTRAL;
                if frame % 3 == 0 {
                    state.buttons.set(Button::ALL[usize::from(frame) % Button::ALL.len()], true);
                }
                if frame % 5 == 0 {
                    state.set_axis(Axis::ALL[usize::from(frame) % Axis::ALL.len()], frame * 4);
                }
                state
            })
            .collect();
        let dtm = Dtm::new(header, inputs);

        let mut text = Vec::new();
        dtm.to_text_writer(&mut text)?;
        let parsed = Dtm::from_text_reader(Cursor::new(text))?;

        assert_eq!(parsed, dtm);

        Ok(())
    }

    #[test]
    fn frame_index_too_large() {
        let text = format!("{}\n2: A\n{}: B\n", header_text(0), u64::MAX);

        assert!(matches!(
            from_text(&text),
            Err(FromTextError::Timeline(TimelineError::TooManyFrames {
                frames: u64::MAX,
                ..
            }))
        ));
    }

    #[test]
    fn declared_count_too_large() {
        let text = format!("{}\n2: A\n", header_text(u64::MAX));

        assert!(matches!(
            from_text(&text),
            Err(FromTextError::Timeline(TimelineError::TooManyFrames {
                frames: u64::MAX,
                ..
            }))
        ));
    }
}

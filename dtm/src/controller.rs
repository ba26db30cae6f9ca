//! Per-frame GameCube controller input
//!
//! Every frame of a DTM recording stores one [`ControllerState`]: an 8-byte record with 14
//! digital buttons packed into two bytes, followed by six analog values.

use std::{fmt, num::ParseIntError, str::FromStr};
use thiserror::Error;
use ux::u2;

/// A digital button (or signal) in a [`ControllerState`]
///
/// The discriminant of each button is its bit position in [`Buttons`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Start = 0,
    A = 1,
    B = 2,
    X = 3,
    Y = 4,
    Z = 5,
    DPadUp = 6,
    DPadDown = 7,
    DPadLeft = 8,
    DPadRight = 9,
    L = 10,
    R = 11,
    /// Signals the disc being changed
    Disc = 12,
    /// The console reset button
    Reset = 13,
}

impl Button {
    /// Every button, in bit order
    pub const ALL: [Self; 14] = [
        Self::Start,
        Self::A,
        Self::B,
        Self::X,
        Self::Y,
        Self::Z,
        Self::DPadUp,
        Self::DPadDown,
        Self::DPadLeft,
        Self::DPadRight,
        Self::L,
        Self::R,
        Self::Disc,
        Self::Reset,
    ];

    /// The mask for this button within [`Buttons`]
    pub const fn bit(self) -> u16 {
        1 << self as u16
    }

    /// The token used for this button in the text format
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::A => "A",
            Self::B => "B",
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
            Self::DPadUp => "DPadUp",
            Self::DPadDown => "DPadDown",
            Self::DPadLeft => "DPadLeft",
            Self::DPadRight => "DPadRight",
            Self::L => "L",
            Self::R => "R",
            Self::Disc => "disc",
            Self::Reset => "reset",
        }
    }

    /// Look up a button by its text token (case-sensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|button| button.name() == name)
    }
}

/// The two bytes of packed button state at the start of every [`ControllerState`]
///
/// Bits 0 through 13 hold the [`Button`]s (see their discriminants), bits 14 and 15 are
/// reserved. Reserved bits read from disk are kept as-is so that a binary round trip is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Buttons(u16);

impl Buttons {
    /// No buttons pressed, reserved bits cleared
    pub const NONE: Self = Self(0);

    const BUTTONS_MASK: u16 = 0x3FFF;
    const RESERVED_SHIFT: u16 = 14;

    /// Wrap the raw (little-endian decoded) bits
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// The raw bits, reserved bits included
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Is a specific button held down?
    pub const fn is_pressed(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    /// Press or release a button
    pub fn set(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.0 |= button.bit();
        } else {
            self.0 &= !button.bit();
        }
    }

    /// Return a copy with the button pressed
    pub const fn with(self, button: Button) -> Self {
        Self(self.0 | button.bit())
    }

    /// Is any button (not counting the reserved bits) pressed?
    pub const fn any_pressed(self) -> bool {
        self.0 & Self::BUTTONS_MASK != 0
    }

    /// Iterate over the pressed buttons, in bit order
    pub fn pressed(self) -> impl Iterator<Item = Button> {
        Button::ALL
            .into_iter()
            .filter(move |button| self.is_pressed(*button))
    }

    /// The two reserved padding bits
    pub fn reserved(self) -> u2 {
        u2::new((self.0 >> Self::RESERVED_SHIFT) as u8)
    }

    /// Overwrite the two reserved padding bits
    pub fn set_reserved(&mut self, reserved: u2) {
        let reserved: u8 = reserved.into();
        self.0 = (self.0 & Self::BUTTONS_MASK) | (u16::from(reserved) << Self::RESERVED_SHIFT);
    }
}

impl FromIterator<Button> for Buttons {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

/// One of the six analog values in a [`ControllerState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    TriggerL,
    TriggerR,
    AnalogX,
    AnalogY,
    CStickX,
    CStickY,
}

impl Axis {
    /// Every axis, in byte order
    pub const ALL: [Self; 6] = [
        Self::TriggerL,
        Self::TriggerR,
        Self::AnalogX,
        Self::AnalogY,
        Self::CStickX,
        Self::CStickY,
    ];

    /// The key used for this axis in `key:value` text tokens
    pub const fn name(self) -> &'static str {
        match self {
            Self::TriggerL => "TriggerL",
            Self::TriggerR => "TriggerR",
            Self::AnalogX => "AnalogX",
            Self::AnalogY => "AnalogY",
            Self::CStickX => "CStickX",
            Self::CStickY => "CStickY",
        }
    }

    /// The value this axis has when the controller is left alone
    ///
    /// Triggers rest at 0, sticks rest centered.
    pub const fn neutral(self) -> u8 {
        match self {
            Self::TriggerL | Self::TriggerR => 0,
            _ => ControllerState::STICK_CENTER,
        }
    }

    /// Look up an axis by its text key (case-sensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|axis| axis.name() == name)
    }
}

/// The state of a single GameCube controller during one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerState {
    /// The digital buttons
    pub buttons: Buttons,

    /// Analog pressure on the left trigger
    pub trigger_l: u8,

    /// Analog pressure on the right trigger
    pub trigger_r: u8,

    /// Main stick, horizontal
    pub analog_x: u8,

    /// Main stick, vertical
    pub analog_y: u8,

    /// C-stick, horizontal
    pub c_stick_x: u8,

    /// C-stick, vertical
    pub c_stick_y: u8,
}

impl ControllerState {
    /// The number of bytes a record takes up on disk
    pub const LEN: usize = 8;

    /// The resting position of both sticks on either axis
    pub const STICK_CENTER: u8 = 128;

    /// No buttons, no trigger pressure, both sticks centered
    pub const NEUTRAL: Self = Self {
        buttons: Buttons::NONE,
        trigger_l: 0,
        trigger_r: 0,
        analog_x: Self::STICK_CENTER,
        analog_y: Self::STICK_CENTER,
        c_stick_x: Self::STICK_CENTER,
        c_stick_y: Self::STICK_CENTER,
    };

    /// Decode a record from its on-disk bytes
    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self {
            buttons: Buttons::from_bits(u16::from_le_bytes([bytes[0], bytes[1]])),
            trigger_l: bytes[2],
            trigger_r: bytes[3],
            analog_x: bytes[4],
            analog_y: bytes[5],
            c_stick_x: bytes[6],
            c_stick_y: bytes[7],
        }
    }

    /// Encode the record to its on-disk bytes
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let [lo, hi] = self.buttons.bits().to_le_bytes();
        [
            lo,
            hi,
            self.trigger_l,
            self.trigger_r,
            self.analog_x,
            self.analog_y,
            self.c_stick_x,
            self.c_stick_y,
        ]
    }

    /// Read the value of one of the analog axes
    pub fn axis(&self, axis: Axis) -> u8 {
        match axis {
            Axis::TriggerL => self.trigger_l,
            Axis::TriggerR => self.trigger_r,
            Axis::AnalogX => self.analog_x,
            Axis::AnalogY => self.analog_y,
            Axis::CStickX => self.c_stick_x,
            Axis::CStickY => self.c_stick_y,
        }
    }

    /// Change the value of one of the analog axes
    pub fn set_axis(&mut self, axis: Axis, value: u8) {
        let slot = match axis {
            Axis::TriggerL => &mut self.trigger_l,
            Axis::TriggerR => &mut self.trigger_r,
            Axis::AnalogX => &mut self.analog_x,
            Axis::AnalogY => &mut self.analog_y,
            Axis::CStickX => &mut self.c_stick_x,
            Axis::CStickY => &mut self.c_stick_y,
        };
        *slot = value;
    }

    /// Does this record represent "no input"?
    ///
    /// The reserved bits are ignored. Default records are left out of the text format.
    pub fn is_default(&self) -> bool {
        !self.buttons.any_pressed()
            && Axis::ALL
                .iter()
                .all(|axis| self.axis(*axis) == axis.neutral())
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Writes the text tokens for this state
///
/// Pressed buttons come first, then `key:value` pairs for every axis that isn't neutral.
/// Both groups are sorted by name, so the output does not depend on bit or byte order.
/// A default state writes nothing at all.
impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut buttons: Vec<_> = self.buttons.pressed().map(Button::name).collect();
        buttons.sort_unstable();

        let mut axes: Vec<_> = Axis::ALL
            .into_iter()
            .filter(|axis| self.axis(*axis) != axis.neutral())
            .collect();
        axes.sort_unstable_by_key(|axis| axis.name());

        let values = axes
            .into_iter()
            .map(|axis| format!("{}:{}", axis.name(), self.axis(axis)));

        let mut separator = "";
        for token in buttons.into_iter().map(str::to_owned).chain(values) {
            write!(f, "{separator}{token}")?;
            separator = " ";
        }

        Ok(())
    }
}

/// Parses whitespace separated tokens into a state
///
/// Unknown button names and unknown value keys are ignored. Anything not mentioned stays neutral.
impl FromStr for ControllerState {
    type Err = ParseStateError;

    fn from_str(str: &str) -> Result<Self, Self::Err> {
        let mut state = Self::NEUTRAL;

        for token in str.split_whitespace() {
            match token.rsplit_once(':') {
                None => {
                    if let Some(button) = Button::from_name(token) {
                        state.buttons.set(button, true);
                    }
                }
                Some((key, value)) => {
                    let value = value
                        .parse()
                        .map_err(|source| ParseStateError::InvalidValue {
                            token: token.to_owned(),
                            source,
                        })?;

                    if let Some(axis) = Axis::from_name(key) {
                        state.set_axis(axis, value);
                    }
                }
            }
        }

        Ok(state)
    }
}

/// Errors that might be returned from parsing a [`ControllerState`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseStateError {
    /// The part after the `:` of a `key:value` token isn't a number from 0 to 255
    #[error("The value in token '{token}' is not a number from 0 to 255")]
    InvalidValue {
        token: String,
        #[source]
        source: ParseIntError,
    },
}

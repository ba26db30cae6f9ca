//! A null-padded/length-restricted UTF-8 string
use std::{borrow::Cow, fmt, str::FromStr};

/// A null-padded/length-restricted UTF-8 string
///
/// Several DTM header fields (the game ID, author, backend names, ...) are stored as
/// fixed-width byte arrays, where unused space at the end is filled with zeroes. The width
/// isn't the same everywhere, which is why this struct is generic over its length.
///
/// Conversion is lossless in the binary direction: whatever bytes are read are written back.
/// Converting text into a [`FixedStr`] silently truncates to `N` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedStr<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FixedStr<N> {
    /// Wrap the raw bytes of a field, exactly as they appear on disk
    pub const fn from_array(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    /// Copy bytes into a new string
    ///
    /// Copying stops at the first null byte or after `N` bytes, whichever comes first.
    /// The rest of the array is zero-filled.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut dest = [0; N];
        for (dest, byte) in dest.iter_mut().zip(bytes.iter().take_while(|byte| **byte != 0)) {
            *dest = *byte;
        }

        Self { bytes: dest }
    }

    /// Access the underlying bytes, including any padding
    pub fn bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// The maximal number of bytes the field can hold
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The number of bytes up to the trailing padding
    ///
    /// Only _trailing_ zeroes count as padding, so a null byte in the middle of the
    /// field is kept.
    pub fn len(&self) -> usize {
        self.bytes.iter().rposition(|c| *c != 0).map_or(0, |last| last + 1)
    }

    /// Are there _any_ bytes before the padding?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert to a string, replacing invalid UTF-8 sequences
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes[..self.len()])
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self { bytes: [0; N] }
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_str_lossy())
    }
}

impl<'a, const N: usize> From<&'a str> for FixedStr<N> {
    #[inline]
    fn from(str: &'a str) -> Self {
        Self::from_bytes(str.as_bytes())
    }
}

impl<const N: usize> FromStr for FixedStr<N> {
    type Err = std::convert::Infallible;

    #[inline]
    fn from_str(str: &str) -> Result<Self, Self::Err> {
        Ok(str.into())
    }
}

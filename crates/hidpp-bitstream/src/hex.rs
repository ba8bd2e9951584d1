//! Hexadecimal byte lists for logs and test vectors.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use hidpp_errors::CodecError;

/// A byte vector that displays as upper-case, space separated hex.
///
/// Parses from either `"10 01 05"` or `"100105"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct HexList(pub Vec<u8>);

impl HexList {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Display without separators, as used in compact summaries.
    pub fn to_compact_string(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl Deref for HexList {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for HexList {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for HexList {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for HexList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl FromStr for HexList {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<(usize, char)> = s
            .char_indices()
            .filter(|(_, c)| !c.is_whitespace())
            .collect();
        if digits.len() % 2 != 0 {
            return Err(CodecError::InvalidHex { position: s.len() });
        }
        digits
            .chunks(2)
            .map(|pair| {
                let mut byte = 0u8;
                for (position, c) in pair {
                    let nibble = c
                        .to_digit(16)
                        .ok_or(CodecError::InvalidHex { position: *position })?;
                    byte = (byte << 4) | nibble as u8;
                }
                Ok(byte)
            })
            .collect::<Result<Vec<u8>, CodecError>>()
            .map(HexList)
    }
}

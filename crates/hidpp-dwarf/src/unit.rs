//! Unit framing shared by every section: initial lengths and offset sizes.

use hidpp_bitstream::{BitReader, Endian};
use serde::{Deserialize, Serialize};

use crate::error::{DwarfError, Result};

/// 32-bit or 64-bit DWARF, as announced by a unit's initial length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Format {
    #[default]
    Dwarf32,
    Dwarf64,
}

impl Format {
    /// Size in bytes of section offsets and lengths.
    pub fn offset_size(self) -> usize {
        match self {
            Format::Dwarf32 => 4,
            Format::Dwarf64 => 8,
        }
    }
}

/// Framing of one unit inside a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UnitFrame {
    pub format: Format,
    /// Section offset of the initial length field.
    pub start: usize,
    /// Section offset of the first byte after the initial length.
    pub body: usize,
    /// Section offset one past the last byte of the unit.
    pub end: usize,
}

pub(crate) fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Read the initial length at `offset` and frame the unit.
pub(crate) fn read_unit_frame(section_name: &'static str, section: &[u8], offset: usize) -> Result<UnitFrame> {
    let codec = DwarfError::codec(section_name);
    let mut reader = BitReader::with_window(section, offset, section.len().saturating_sub(offset)).map_err(codec)?;
    let length = reader.read_unsigned(4, Endian::Little).map_err(DwarfError::codec(section_name))?;
    let (format, length) = match length {
        0xFFFF_FFFF => (
            Format::Dwarf64,
            reader.read_unsigned(8, Endian::Little).map_err(DwarfError::codec(section_name))?,
        ),
        0xFFFF_FFF0.. => {
            return Err(DwarfError::ReservedLength {
                section: section_name,
                length,
            });
        }
        _ => (Format::Dwarf32, length),
    };
    let body = reader.position();
    let end = body
        .checked_add(to_usize(length))
        .filter(|end| *end <= section.len())
        .ok_or_else(|| DwarfError::Codec {
            section: section_name,
            source: hidpp_errors::CodecError::out_of_bounds(body * 8, to_usize(length).saturating_mul(8), section.len() * 8),
        })?;
    Ok(UnitFrame {
        format,
        start: offset,
        body,
        end,
    })
}

/// Reader over the body of `frame`.
pub(crate) fn body_reader<'a>(section_name: &'static str, section: &'a [u8], frame: &UnitFrame) -> Result<BitReader<'a>> {
    BitReader::with_window(section, frame.body, frame.end - frame.body).map_err(DwarfError::codec(section_name))
}

/// Read a section offset or length of the unit's format.
pub(crate) fn read_offset(reader: &mut BitReader<'_>, format: Format) -> hidpp_errors::CodecResult<u64> {
    reader.read_unsigned(format.offset_size(), Endian::Little)
}

/// Validate an address size byte.
pub(crate) fn address_size(size: u64) -> Result<usize> {
    match size {
        1 | 2 | 4 | 8 => Ok(to_usize(size)),
        other => Err(DwarfError::UnsupportedAddressSize(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_dwarf32_frame() -> TestResult {
        let section = [0x02, 0x00, 0x00, 0x00, 0xAA, 0xBB, 0xCC];
        let frame = read_unit_frame(".debug_line", &section, 0)?;
        assert_eq!(frame.format, Format::Dwarf32);
        assert_eq!((frame.body, frame.end), (4, 6));
        Ok(())
    }

    #[test]
    fn test_dwarf64_frame() -> TestResult {
        let mut section = vec![0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0, 0, 0, 0, 0, 0, 0];
        section.push(0x7F);
        let frame = read_unit_frame(".debug_info", &section, 0)?;
        assert_eq!(frame.format, Format::Dwarf64);
        assert_eq!(frame.format.offset_size(), 8);
        assert_eq!((frame.body, frame.end), (12, 13));
        Ok(())
    }

    #[test]
    fn test_reserved_and_truncated_lengths() {
        let reserved = [0xF0, 0xFF, 0xFF, 0xFF];
        assert!(matches!(
            read_unit_frame(".debug_line", &reserved, 0),
            Err(DwarfError::ReservedLength { .. })
        ));
        let truncated = [0x10, 0x00, 0x00, 0x00, 0x01];
        assert!(matches!(
            read_unit_frame(".debug_line", &truncated, 0),
            Err(DwarfError::Codec { .. })
        ));
    }

    #[test]
    fn test_address_sizes() {
        assert!(address_size(4).is_ok());
        assert!(matches!(address_size(3), Err(DwarfError::UnsupportedAddressSize(3))));
    }
}

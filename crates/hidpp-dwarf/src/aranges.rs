//! `.debug_aranges`: address range sets pointing into `.debug_info`.

use serde::{Deserialize, Serialize};

use crate::constants::section;
use crate::error::{DwarfError, Result};
use crate::unit::{self, Format};
use hidpp_bitstream::Endian;

const SECTION: &str = section::ARANGES;

/// A half-open address range `[start, start + length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange {
    pub start: u64,
    pub length: u64,
}

impl AddressRange {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.length)
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.start && address < self.end()
    }
}

/// One address range set: the ranges covered by a single compile unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArangeSet {
    pub offset: usize,
    pub format: Format,
    pub version: u16,
    /// Offset of the owning compile unit in `.debug_info`.
    pub debug_info_offset: u64,
    pub address_size: u8,
    pub segment_size: u8,
    pub ranges: Vec<AddressRange>,
}

impl ArangeSet {
    pub fn contains(&self, address: u64) -> bool {
        self.ranges.iter().any(|range| range.contains(address))
    }
}

/// Decode every range set of the section.
///
/// # Errors
///
/// `UnsupportedVersion` for anything but version 2, `UnsupportedAddressSize`
/// and codec errors for truncated sets.
pub fn parse_aranges(section: &[u8]) -> Result<Vec<ArangeSet>> {
    let mut sets = Vec::new();
    let mut offset = 0;
    while offset < section.len() {
        let frame = unit::read_unit_frame(SECTION, section, offset)?;
        let mut reader = unit::body_reader(SECTION, section, &frame)?;
        let codec = || DwarfError::codec(SECTION);

        let version = reader.read_u16_le().map_err(codec())?;
        if version != 2 {
            return Err(DwarfError::UnsupportedVersion {
                section: SECTION,
                version,
            });
        }
        let debug_info_offset = unit::read_offset(&mut reader, frame.format).map_err(codec())?;
        let address_size = reader.read_u8().map_err(codec())?;
        let segment_size = reader.read_u8().map_err(codec())?;
        let width = unit::address_size(u64::from(address_size))?;
        let segment_width = usize::from(segment_size);

        // Tuples start at a multiple of the tuple size from the set start.
        let tuple_size = 2 * width + segment_width;
        let consumed = reader.position() - frame.start;
        let padding = (tuple_size - consumed % tuple_size) % tuple_size;
        reader.read_block(padding).map_err(codec())?;

        let mut ranges = Vec::new();
        while !reader.is_at_end() {
            if segment_width > 0 {
                reader.read_block(segment_width).map_err(codec())?;
            }
            let start = reader.read_unsigned(width, Endian::Little).map_err(codec())?;
            let length = reader.read_unsigned(width, Endian::Little).map_err(codec())?;
            if start == 0 && length == 0 {
                break;
            }
            ranges.push(AddressRange { start, length });
        }

        sets.push(ArangeSet {
            offset,
            format: frame.format,
            version,
            debug_info_offset,
            address_size,
            segment_size,
            ranges,
        });
        offset = frame.end;
    }
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn set(debug_info_offset: u32, ranges: &[(u32, u32)]) -> Vec<u8> {
        let mut body = 2u16.to_le_bytes().to_vec();
        body.extend(debug_info_offset.to_le_bytes());
        body.extend([4, 0]);
        // 12 header bytes, padded to the 8-byte tuple size.
        body.extend([0; 4]);
        for (start, length) in ranges.iter().chain(&[(0, 0)]) {
            body.extend(start.to_le_bytes());
            body.extend(length.to_le_bytes());
        }
        let mut unit = (body.len() as u32).to_le_bytes().to_vec();
        unit.extend(body);
        unit
    }

    #[test]
    fn test_single_set() -> TestResult {
        let sets = parse_aranges(&set(0x40, &[(0x1000, 0x25), (0x2000, 0x10)]))?;
        assert_eq!(sets.len(), 1);
        let first = sets.first().ok_or("no set")?;
        assert_eq!(first.debug_info_offset, 0x40);
        assert_eq!(first.ranges.len(), 2);
        assert!(first.contains(0x1024));
        assert!(!first.contains(0x1025));
        assert!(first.contains(0x2000));
        Ok(())
    }

    #[test]
    fn test_consecutive_sets() -> TestResult {
        let mut section = set(0, &[(0x1000, 0x10)]);
        section.extend(set(0x80, &[(0x3000, 0x20)]));
        let sets = parse_aranges(&section)?;
        let offsets: Vec<u64> = sets.iter().map(|set| set.debug_info_offset).collect();
        assert_eq!(offsets, vec![0, 0x80]);
        assert_eq!(sets.get(1).map(|set| set.offset), Some(set(0, &[(0x1000, 0x10)]).len()));
        Ok(())
    }

    #[test]
    fn test_rejects_other_versions() {
        let mut section = set(0, &[]);
        section[4] = 3;
        assert!(matches!(
            parse_aranges(&section),
            Err(DwarfError::UnsupportedVersion { version: 3, .. })
        ));
    }

    #[test]
    fn test_range_end_saturates() {
        let range = AddressRange {
            start: u64::MAX - 1,
            length: 4,
        };
        assert_eq!(range.end(), u64::MAX);
        assert!(range.contains(u64::MAX - 1));
    }
}

//! `.debug_info`: compile unit headers and their top-level DIE.
//!
//! Only the compile unit entry is decoded; children are skipped with the
//! rest of the unit.

use std::collections::HashMap;

use hidpp_bitstream::{BitReader, Endian};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::abbrev::{AbbreviationTable, AttributeSpec};
use crate::constants::{attribute, form, section};
use crate::error::{DwarfError, Result};
use crate::unit::{self, Format};

const SECTION: &str = section::INFO;

/// Header of one compile unit (versions 2 to 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitHeader {
    /// Section offset of the unit.
    pub offset: usize,
    pub format: Format,
    pub version: u16,
    pub abbrev_offset: u64,
    pub address_size: u8,
}

/// A decoded attribute value, grouped by form class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    Address(u64),
    Unsigned(u64),
    Signed(i64),
    Flag(bool),
    Text(String),
    /// A `.debug_str` offset that could not be resolved.
    StrOffset(u64),
    Reference(u64),
    SecOffset(u64),
    Block(Vec<u8>),
}

impl AttributeValue {
    /// The value as an integer, for constant, address, offset and
    /// reference classes.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AttributeValue::Address(value)
            | AttributeValue::Unsigned(value)
            | AttributeValue::Reference(value)
            | AttributeValue::SecOffset(value) => Some(*value),
            AttributeValue::Signed(value) => u64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Compile unit summary used to locate line programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub header: UnitHeader,
    pub name: Option<String>,
    pub comp_dir: Option<String>,
    pub producer: Option<String>,
    /// Offset of the unit's line program in `.debug_line`.
    pub stmt_list: Option<u64>,
    pub low_pc: Option<u64>,
    /// Absolute end address; an offset-class `DW_AT_high_pc` is added to
    /// `low_pc`.
    pub high_pc: Option<u64>,
    /// Every attribute of the compile unit DIE, in declaration order.
    pub attributes: Vec<(u64, AttributeValue)>,
}

impl CompilationUnit {
    /// Whether `address` lies in `[low_pc, high_pc)`.
    pub fn contains(&self, address: u64) -> bool {
        matches!((self.low_pc, self.high_pc), (Some(low), Some(high)) if address >= low && address < high)
    }

    pub fn attribute(&self, name: u64) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(attribute, _)| *attribute == name)
            .map(|(_, value)| value)
    }
}

/// Decode every compile unit of `.debug_info`.
///
/// `debug_str` resolves `DW_FORM_strp` attributes; pass an empty slice when
/// the section is missing.
///
/// # Errors
///
/// `UnsupportedVersion` outside versions 2 to 4, `UnknownAbbreviation`,
/// `UnknownForm` and codec errors.
pub fn parse_compilation_units(debug_info: &[u8], debug_abbrev: &[u8], debug_str: &[u8]) -> Result<Vec<CompilationUnit>> {
    let mut tables: HashMap<u64, AbbreviationTable> = HashMap::new();
    let mut units = Vec::new();
    let mut offset = 0;
    while offset < debug_info.len() {
        let frame = unit::read_unit_frame(SECTION, debug_info, offset)?;
        let mut reader = unit::body_reader(SECTION, debug_info, &frame)?;
        let codec = || DwarfError::codec(SECTION);

        let version = reader.read_u16_le().map_err(codec())?;
        if !(2..=4).contains(&version) {
            return Err(DwarfError::UnsupportedVersion {
                section: SECTION,
                version,
            });
        }
        let abbrev_offset = unit::read_offset(&mut reader, frame.format).map_err(codec())?;
        let address_size = reader.read_u8().map_err(codec())?;
        unit::address_size(u64::from(address_size))?;
        let header = UnitHeader {
            offset,
            format: frame.format,
            version,
            abbrev_offset,
            address_size,
        };

        let table = match tables.entry(abbrev_offset) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(AbbreviationTable::parse(debug_abbrev, unit::to_usize(abbrev_offset))?)
            }
        };
        units.push(read_unit_entry(&mut reader, header, table, debug_str)?);
        offset = frame.end;
    }
    Ok(units)
}

fn read_unit_entry(
    reader: &mut BitReader<'_>,
    header: UnitHeader,
    table: &AbbreviationTable,
    debug_str: &[u8],
) -> Result<CompilationUnit> {
    let die_offset = reader.position();
    let code = reader.read_uleb128().map_err(DwarfError::codec(SECTION))?;
    let abbreviation = table.get(code).ok_or(DwarfError::UnknownAbbreviation {
        code,
        offset: die_offset,
    })?;

    let mut attributes = Vec::with_capacity(abbreviation.attributes.len());
    let mut high_pc_is_offset = false;
    for AttributeSpec { name, form } in &abbreviation.attributes {
        let value = read_attribute(reader, *form, &header, debug_str)?;
        if *name == attribute::HIGH_PC {
            high_pc_is_offset = !matches!(value, AttributeValue::Address(_));
        }
        attributes.push((*name, value));
    }

    let find = |name: u64| attributes.iter().find(|(attr, _)| *attr == name).map(|(_, value)| value);
    let text = |name: u64| find(name).and_then(AttributeValue::as_text).map(str::to_string);
    let low_pc = find(attribute::LOW_PC).and_then(AttributeValue::as_u64);
    let high_pc = find(attribute::HIGH_PC)
        .and_then(AttributeValue::as_u64)
        .map(|high| if high_pc_is_offset { low_pc.unwrap_or(0).saturating_add(high) } else { high });

    let unit = CompilationUnit {
        header,
        name: text(attribute::NAME),
        comp_dir: text(attribute::COMP_DIR),
        producer: text(attribute::PRODUCER),
        stmt_list: find(attribute::STMT_LIST).and_then(AttributeValue::as_u64),
        low_pc,
        high_pc,
        attributes: Vec::new(),
    };
    trace!(offset = header.offset, name = ?unit.name, stmt_list = ?unit.stmt_list, "compile unit");
    Ok(CompilationUnit { attributes, ..unit })
}

fn read_attribute(reader: &mut BitReader<'_>, form: u64, header: &UnitHeader, debug_str: &[u8]) -> Result<AttributeValue> {
    let codec = || DwarfError::codec(SECTION);
    let address_size = usize::from(header.address_size);
    let offset_size = header.format.offset_size();
    let value = match form {
        form::ADDR => AttributeValue::Address(reader.read_unsigned(address_size, Endian::Little).map_err(codec())?),
        form::DATA1 => AttributeValue::Unsigned(reader.read_unsigned(1, Endian::Little).map_err(codec())?),
        form::DATA2 => AttributeValue::Unsigned(reader.read_unsigned(2, Endian::Little).map_err(codec())?),
        form::DATA4 => AttributeValue::Unsigned(reader.read_unsigned(4, Endian::Little).map_err(codec())?),
        form::DATA8 => AttributeValue::Unsigned(reader.read_unsigned(8, Endian::Little).map_err(codec())?),
        form::UDATA => AttributeValue::Unsigned(reader.read_uleb128().map_err(codec())?),
        form::SDATA => AttributeValue::Signed(reader.read_sleb128().map_err(codec())?),
        form::FLAG => AttributeValue::Flag(reader.read_u8().map_err(codec())? != 0),
        form::FLAG_PRESENT => AttributeValue::Flag(true),
        form::STRING => AttributeValue::Text(reader.read_cstring().map_err(codec())?),
        form::STRP => {
            let offset = unit::read_offset(reader, header.format).map_err(codec())?;
            match hidpp_bitstream::primitives::read_cstring(debug_str, unit::to_usize(offset)) {
                Ok((text, _)) => AttributeValue::Text(text),
                Err(_) => AttributeValue::StrOffset(offset),
            }
        }
        form::REF1 => AttributeValue::Reference(reader.read_unsigned(1, Endian::Little).map_err(codec())?),
        form::REF2 => AttributeValue::Reference(reader.read_unsigned(2, Endian::Little).map_err(codec())?),
        form::REF4 => AttributeValue::Reference(reader.read_unsigned(4, Endian::Little).map_err(codec())?),
        form::REF8 | form::REF_SIG8 => {
            AttributeValue::Reference(reader.read_unsigned(8, Endian::Little).map_err(codec())?)
        }
        form::REF_UDATA => AttributeValue::Reference(reader.read_uleb128().map_err(codec())?),
        form::REF_ADDR => {
            // Address sized in version 2, offset sized afterwards.
            let size = if header.version <= 2 { address_size } else { offset_size };
            AttributeValue::Reference(reader.read_unsigned(size, Endian::Little).map_err(codec())?)
        }
        form::SEC_OFFSET => AttributeValue::SecOffset(unit::read_offset(reader, header.format).map_err(codec())?),
        form::BLOCK1 => {
            let length = reader.read_unsigned(1, Endian::Little).map_err(codec())?;
            AttributeValue::Block(reader.read_bytes(unit::to_usize(length)).map_err(codec())?)
        }
        form::BLOCK2 => {
            let length = reader.read_unsigned(2, Endian::Little).map_err(codec())?;
            AttributeValue::Block(reader.read_bytes(unit::to_usize(length)).map_err(codec())?)
        }
        form::BLOCK4 => {
            let length = reader.read_unsigned(4, Endian::Little).map_err(codec())?;
            AttributeValue::Block(reader.read_bytes(unit::to_usize(length)).map_err(codec())?)
        }
        form::BLOCK | form::EXPRLOC => {
            let length = reader.read_uleb128().map_err(codec())?;
            AttributeValue::Block(reader.read_bytes(unit::to_usize(length)).map_err(codec())?)
        }
        form::INDIRECT => {
            let actual = reader.read_uleb128().map_err(codec())?;
            return read_attribute(reader, actual, header, debug_str);
        }
        unknown => return Err(DwarfError::UnknownForm(unknown)),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    /// Compile unit abbreviation: name (string), stmt_list, low_pc (addr),
    /// high_pc with the given form, producer (strp).
    fn abbrev(stmt_list_form: u8, high_pc_form: u8) -> Vec<u8> {
        vec![
            0x01, 0x11, 0x00, 0x03, 0x08, 0x10, stmt_list_form, 0x11, 0x01, 0x12, high_pc_form, 0x25, 0x0E, 0x00, 0x00,
            0x00,
        ]
    }

    fn unit(version: u16, high_pc: u32) -> Vec<u8> {
        let mut body = version.to_le_bytes().to_vec();
        body.extend(0u32.to_le_bytes());
        body.push(4);
        body.push(0x01);
        body.extend(b"main.c\0");
        body.extend(0u32.to_le_bytes());
        body.extend(0x1000u32.to_le_bytes());
        body.extend(high_pc.to_le_bytes());
        body.extend(0u32.to_le_bytes());
        let mut unit = (body.len() as u32).to_le_bytes().to_vec();
        unit.extend(body);
        unit
    }

    #[test]
    fn test_version_four_unit_with_offset_high_pc() -> TestResult {
        let units = parse_compilation_units(&unit(4, 0x25), &abbrev(0x17, 0x06), b"gcc 13\0")?;
        let unit = units.first().ok_or("no unit")?;
        assert_eq!(unit.header.version, 4);
        assert_eq!(unit.name.as_deref(), Some("main.c"));
        assert_eq!(unit.producer.as_deref(), Some("gcc 13"));
        assert_eq!(unit.stmt_list, Some(0));
        assert_eq!((unit.low_pc, unit.high_pc), (Some(0x1000), Some(0x1025)));
        assert!(unit.contains(0x1024));
        assert!(!unit.contains(0x1025));
        assert_eq!(unit.attributes.len(), 5);
        Ok(())
    }

    #[test]
    fn test_version_two_unit_with_address_high_pc() -> TestResult {
        let units = parse_compilation_units(&unit(2, 0x1080), &abbrev(0x06, 0x01), b"")?;
        let unit = units.first().ok_or("no unit")?;
        assert_eq!(unit.high_pc, Some(0x1080));
        assert_eq!(unit.producer, None);
        assert_eq!(unit.attribute(attribute::PRODUCER), Some(&AttributeValue::StrOffset(0)));
        Ok(())
    }

    #[test]
    fn test_units_share_abbreviation_tables() -> TestResult {
        let mut info = unit(4, 0x10);
        info.extend(unit(4, 0x20));
        let units = parse_compilation_units(&info, &abbrev(0x17, 0x06), b"")?;
        assert_eq!(units.len(), 2);
        assert_eq!(units.get(1).map(|u| u.header.offset), Some(unit(4, 0x10).len()));
        assert_eq!(units.get(1).and_then(|u| u.high_pc), Some(0x1020));
        Ok(())
    }

    #[test]
    fn test_unknown_abbreviation_code() {
        let mut info = unit(4, 0x10);
        info[11] = 0x07;
        assert!(matches!(
            parse_compilation_units(&info, &abbrev(0x17, 0x06), b""),
            Err(DwarfError::UnknownAbbreviation { code: 7, offset: 11 })
        ));
    }

    #[test]
    fn test_unknown_form() {
        assert!(matches!(
            parse_compilation_units(&unit(4, 0x10), &abbrev(0x17, 0x2C), b""),
            Err(DwarfError::UnknownForm(0x2C))
        ));
    }
}

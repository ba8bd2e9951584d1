//! `.debug_abbrev`: abbreviation tables describing DIE layouts.

use std::collections::BTreeMap;

use hidpp_bitstream::BitReader;
use serde::{Deserialize, Serialize};

use crate::constants::section;
use crate::error::{DwarfError, Result};

const SECTION: &str = section::ABBREV;

/// One `(attribute, form)` pair of an abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub name: u64,
    pub form: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abbreviation {
    pub code: u64,
    pub tag: u64,
    pub has_children: bool,
    pub attributes: Vec<AttributeSpec>,
}

/// The abbreviations of one table, keyed by code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationTable {
    entries: BTreeMap<u64, Abbreviation>,
}

impl AbbreviationTable {
    /// Decode the table starting at `offset`, up to its zero code.
    ///
    /// # Errors
    ///
    /// Codec errors for a truncated table.
    pub fn parse(section: &[u8], offset: usize) -> Result<Self> {
        let codec = || DwarfError::codec(SECTION);
        let mut reader =
            BitReader::with_window(section, offset, section.len().saturating_sub(offset)).map_err(codec())?;
        let mut entries = BTreeMap::new();
        loop {
            let code = reader.read_uleb128().map_err(codec())?;
            if code == 0 {
                break;
            }
            let tag = reader.read_uleb128().map_err(codec())?;
            let has_children = reader.read_u8().map_err(codec())? != 0;
            let mut attributes = Vec::new();
            loop {
                let name = reader.read_uleb128().map_err(codec())?;
                let form = reader.read_uleb128().map_err(codec())?;
                if name == 0 && form == 0 {
                    break;
                }
                attributes.push(AttributeSpec { name, form });
            }
            entries.insert(
                code,
                Abbreviation {
                    code,
                    tag,
                    has_children,
                    attributes,
                },
            );
        }
        Ok(Self { entries })
    }

    pub fn get(&self, code: u64) -> Option<&Abbreviation> {
        self.entries.get(&code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{attribute, form, tag};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_compile_unit_abbreviation() -> TestResult {
        let section = [
            0x01, 0x11, 0x00, 0x03, 0x08, 0x10, 0x17, 0x00, 0x00, // code 1
            0x02, 0x2E, 0x01, 0x03, 0x08, 0x00, 0x00, // code 2
            0x00,
        ];
        let table = AbbreviationTable::parse(&section, 0)?;
        assert_eq!(table.len(), 2);
        let unit = table.get(1).ok_or("missing code 1")?;
        assert_eq!(unit.tag, tag::COMPILE_UNIT);
        assert!(!unit.has_children);
        assert_eq!(
            unit.attributes,
            vec![
                AttributeSpec {
                    name: attribute::NAME,
                    form: form::STRING
                },
                AttributeSpec {
                    name: attribute::STMT_LIST,
                    form: form::SEC_OFFSET
                },
            ]
        );
        assert!(table.get(2).is_some_and(|abbrev| abbrev.has_children));
        assert!(table.get(3).is_none());
        Ok(())
    }

    #[test]
    fn test_table_at_offset() -> TestResult {
        let section = [0x00, 0x05, 0x11, 0x00, 0x00, 0x00, 0x00];
        let table = AbbreviationTable::parse(&section, 1)?;
        assert!(table.get(5).is_some());
        assert!(AbbreviationTable::parse(&section, 0)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_truncated_table() {
        assert!(matches!(
            AbbreviationTable::parse(&[0x01, 0x11], 0),
            Err(DwarfError::Codec { .. })
        ));
    }
}

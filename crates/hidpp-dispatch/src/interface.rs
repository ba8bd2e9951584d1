//! HID input interfaces and their descriptor collections.
//!
//! A HID descriptor parser (outside this crate) yields one collection per
//! report ID. The dispatcher only needs two things from a collection: the
//! report family it announces and a way to turn the LSB-first payload into
//! the MSB-first byte string the HID records parse.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use hidpp_bitstream::{BitReader, BitWriter};
use hidpp_errors::Result;
use hidpp_messages::HidFamily;
use serde::{Deserialize, Serialize};

/// The three HID input interfaces a device may expose next to HID++.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HidInterface {
    Mouse,
    Keyboard,
    Digitizer,
}

impl HidInterface {
    pub const ALL: [HidInterface; 3] = [HidInterface::Mouse, HidInterface::Keyboard, HidInterface::Digitizer];
}

impl fmt::Display for HidInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HidInterface::Mouse => write!(f, "mouse"),
            HidInterface::Keyboard => write!(f, "keyboard"),
            HidInterface::Digitizer => write!(f, "digitizer"),
        }
    }
}

/// One parsed top-level collection of a HID report descriptor.
pub trait HidCollection: Send + Sync + fmt::Debug {
    /// Report family announced by the collection's usages.
    fn family(&self) -> HidFamily;

    /// Turn a payload whose bytes have already been bit-reversed into an
    /// MSB-first byte string, field by field.
    ///
    /// # Errors
    ///
    /// Codec errors when the payload is shorter than the declared fields.
    fn deserialize(&self, reversed_payload: &[u8]) -> Result<Vec<u8>>;
}

/// Collection described by the bit sizes of its input fields, in report
/// order.
///
/// Each field is read from the reversed stream, its bits are reversed back
/// into value order and the value is written MSB-first. Bits left after
/// the declared fields are copied bit by bit, which suits button and key
/// bitmaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageCollection {
    family: HidFamily,
    field_sizes: Vec<usize>,
}

impl UsageCollection {
    pub fn new(family: HidFamily, field_sizes: impl Into<Vec<usize>>) -> Self {
        Self {
            family,
            field_sizes: field_sizes.into(),
        }
    }

    /// Field layout matching the records of `hidpp_messages::hid`.
    pub fn for_family(family: HidFamily) -> Self {
        let sizes: Vec<usize> = match family {
            HidFamily::Mouse => vec![16, 12, 12, 8, 8],
            // Modifier usages are eight one-bit fields.
            HidFamily::Keyboard => [vec![1; 8], vec![8; 7]].concat(),
            HidFamily::KeyboardBitmap => vec![1; 8],
            HidFamily::ConsumerControl => vec![16, 16],
            HidFamily::SystemControl => vec![8],
            HidFamily::CallStateManagement => vec![8],
            HidFamily::Digitizer => vec![1, 3, 4, 16, 16, 16, 8, 8],
        };
        Self::new(family, sizes)
    }

    pub fn field_sizes(&self) -> &[usize] {
        &self.field_sizes
    }
}

/// Reverse the order of the low `bits` bits of `value`.
fn reverse_low_bits(value: u64, bits: usize) -> u64 {
    match bits {
        0 => 0,
        1..=63 => value.reverse_bits() >> (64 - bits),
        _ => value.reverse_bits(),
    }
}

impl HidCollection for UsageCollection {
    fn family(&self) -> HidFamily {
        self.family
    }

    fn deserialize(&self, reversed_payload: &[u8]) -> Result<Vec<u8>> {
        let mut reader = BitReader::new(reversed_payload);
        let mut writer = BitWriter::with_capacity(reversed_payload.len());
        for &bits in &self.field_sizes {
            if reader.is_at_end() {
                break;
            }
            let value = reader.read_bits(bits)?;
            writer.write_bits(reverse_low_bits(value, bits), bits)?;
        }
        while !reader.is_at_end() {
            let bit = reader.read_bits(1)?;
            writer.write_bits(bit, 1)?;
        }
        Ok(writer.finish())
    }
}

/// Report IDs and collections of one interface.
#[derive(Debug, Clone, Default)]
pub struct InterfaceTable {
    report_ids: BTreeSet<u8>,
    collections: BTreeMap<u8, Arc<dyn HidCollection>>,
}

impl InterfaceTable {
    pub fn with_report_ids(report_ids: impl IntoIterator<Item = u8>) -> Self {
        Self {
            report_ids: report_ids.into_iter().collect(),
            collections: BTreeMap::new(),
        }
    }

    /// Whether the interface owns `report_id`, declared or through a
    /// collection.
    pub fn owns(&self, report_id: u8) -> bool {
        self.report_ids.contains(&report_id) || self.collections.contains_key(&report_id)
    }

    pub fn collection(&self, report_id: u8) -> Option<&Arc<dyn HidCollection>> {
        self.collections.get(&report_id)
    }

    pub fn has_collections(&self) -> bool {
        !self.collections.is_empty()
    }

    pub fn set_report_ids(&mut self, report_ids: impl IntoIterator<Item = u8>) {
        self.report_ids = report_ids.into_iter().collect();
    }

    /// Replace the collection table; the keys join the owned report IDs.
    pub fn set_collections(&mut self, collections: BTreeMap<u8, Arc<dyn HidCollection>>) {
        self.report_ids.extend(collections.keys().copied());
        self.collections = collections;
    }

    pub fn clear_collections(&mut self) {
        self.collections.clear();
    }

    pub fn report_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.report_ids.iter().copied().chain(
            self.collections
                .keys()
                .copied()
                .filter(|id| !self.report_ids.contains(id)),
        )
    }
}

/// The mouse, keyboard and digitizer tables of one device.
#[derive(Debug, Clone, Default)]
pub struct HidInterfaces {
    tables: BTreeMap<HidInterface, InterfaceTable>,
}

impl HidInterfaces {
    pub fn new() -> Self {
        let tables = HidInterface::ALL
            .into_iter()
            .map(|interface| (interface, InterfaceTable::default()))
            .collect();
        Self { tables }
    }

    pub fn table(&self, interface: HidInterface) -> Option<&InterfaceTable> {
        self.tables.get(&interface)
    }

    pub fn table_mut(&mut self, interface: HidInterface) -> &mut InterfaceTable {
        self.tables.entry(interface).or_default()
    }

    /// Interface owning `report_id`, in mouse, keyboard, digitizer order.
    pub fn owner_of(&self, report_id: u8) -> Option<(HidInterface, &InterfaceTable)> {
        self.tables
            .iter()
            .find(|(_, table)| table.owns(report_id))
            .map(|(interface, table)| (*interface, table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidpp_bitstream::reverse_bits_in_bytes;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_reverse_low_bits() {
        assert_eq!(reverse_low_bits(0b001, 3), 0b100);
        assert_eq!(reverse_low_bits(0x01, 8), 0x80);
        assert_eq!(reverse_low_bits(0x0001, 16), 0x8000);
        assert_eq!(reverse_low_bits(1, 1), 1);
        assert_eq!(reverse_low_bits(1, 64), 1 << 63);
    }

    #[test]
    fn test_mouse_fields_become_big_endian() -> TestResult {
        // buttons=0x0001, x=-1, y=16, wheel=-1, ac_pan=0 packed LSB-first.
        let wire = [0x01, 0x00, 0xFF, 0x0F, 0x01, 0xFF, 0x00];
        let collection = UsageCollection::for_family(HidFamily::Mouse);
        let bytes = collection.deserialize(&reverse_bits_in_bytes(&wire))?;
        assert_eq!(bytes, vec![0x00, 0x01, 0xFF, 0xF0, 0x10, 0xFF, 0x00]);
        Ok(())
    }

    #[test]
    fn test_keyboard_modifier_bits_keep_usage_order() -> TestResult {
        let wire = [0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00];
        let collection = UsageCollection::for_family(HidFamily::Keyboard);
        let bytes = collection.deserialize(&reverse_bits_in_bytes(&wire))?;
        assert_eq!(bytes, vec![0x40, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]);
        Ok(())
    }

    #[test]
    fn test_short_payload_stops_at_the_end() -> TestResult {
        let collection = UsageCollection::for_family(HidFamily::ConsumerControl);
        let bytes = collection.deserialize(&reverse_bits_in_bytes(&[0xE9, 0x00]))?;
        assert_eq!(bytes, vec![0x00, 0xE9]);
        Ok(())
    }

    #[test]
    fn test_owner_lookup() {
        let mut interfaces = HidInterfaces::new();
        interfaces.table_mut(HidInterface::Mouse).set_report_ids([0x02]);
        let mut collections: BTreeMap<u8, Arc<dyn HidCollection>> = BTreeMap::new();
        collections.insert(0x03, Arc::new(UsageCollection::for_family(HidFamily::ConsumerControl)));
        interfaces.table_mut(HidInterface::Keyboard).set_collections(collections);

        assert_eq!(interfaces.owner_of(0x02).map(|(i, _)| i), Some(HidInterface::Mouse));
        assert_eq!(interfaces.owner_of(0x03).map(|(i, _)| i), Some(HidInterface::Keyboard));
        assert!(interfaces.owner_of(0x04).is_none());
        assert!(interfaces.table(HidInterface::Keyboard).is_some_and(InterfaceTable::has_collections));
    }
}

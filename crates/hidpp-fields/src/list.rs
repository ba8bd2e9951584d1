//! Heterogeneous record lists.
//!
//! A [`RecordList`] holds an ordered set of candidate schemas. Parsing walks
//! the input and, for each element, picks the first candidate whose
//! acceptance predicate matches the bytes at the current offset.

use std::fmt;

use hidpp_bitstream::BitReader;
use hidpp_errors::{ListError, Result};
use tracing::trace;

use crate::record::Record;
use crate::schema::Schema;

pub struct RecordList {
    name: &'static str,
    candidates: &'static [&'static Schema],
}

impl RecordList {
    pub const fn new(name: &'static str, candidates: &'static [&'static Schema]) -> Self {
        Self { name, candidates }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn candidates(&self) -> &'static [&'static Schema] {
        self.candidates
    }

    /// First candidate accepting `data` at byte `offset` before `limit`.
    pub fn candidate_for(&self, data: &[u8], offset: usize, limit: usize) -> Option<&'static Schema> {
        self.candidates
            .iter()
            .copied()
            .find(|schema| schema.accepts(data, offset, limit))
    }

    /// Parse records from `data[offset..limit]` until the limit is reached.
    ///
    /// # Errors
    ///
    /// `NoMatchingParser` if no candidate accepts an element, `NoProgress`
    /// if an accepting candidate consumes nothing, or the element's own
    /// parse error.
    pub fn parse(&self, data: &[u8], offset: usize, limit: usize) -> Result<Vec<Record>> {
        let length = limit.saturating_sub(offset);
        let mut reader = BitReader::with_window(data, offset, length)?;
        self.read_from(&mut reader)
    }

    /// Parse records from the reader position up to its limit.
    ///
    /// # Errors
    ///
    /// As [`RecordList::parse`].
    pub fn read_from(&self, reader: &mut BitReader<'_>) -> Result<Vec<Record>> {
        let data = reader.data();
        let limit = reader.bit_limit() / 8;
        let mut records = Vec::new();
        while !reader.is_at_end() {
            let offset = reader.position();
            let schema = self
                .candidate_for(data, offset, limit)
                .ok_or_else(|| ListError::NoMatchingParser {
                    list: self.name.to_string(),
                    offset,
                })?;
            let before = reader.bit_position();
            let record = Record::read_from(schema, reader)?;
            if reader.bit_position() == before {
                return Err(ListError::NoProgress {
                    list: self.name.to_string(),
                    schema: schema.name().to_string(),
                    offset,
                }
                .into());
            }
            trace!(list = self.name, schema = schema.name(), offset, "parsed list element");
            records.push(record);
        }
        Ok(records)
    }
}

impl fmt::Debug for RecordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.candidates.iter().map(|schema| schema.name()).collect();
        f.debug_struct("RecordList")
            .field("name", &self.name)
            .field("candidates", &names)
            .finish()
    }
}

/// Declare a `static` [`RecordList`] over candidate schemas, tried in order.
#[macro_export]
macro_rules! record_list {
    ($vis:vis static $ident:ident = $name:literal; $($candidate:path),* $(,)?) => {
        $vis static $ident: $crate::RecordList = {
            static CANDIDATES: &[&$crate::Schema] = &[$(&$candidate),*];
            $crate::RecordList::new($name, CANDIDATES)
        };
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldDescriptor, schema};
    use hidpp_errors::HidppError;

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn is_short(data: &[u8], offset: usize, limit: usize) -> bool {
        offset < limit && data.get(offset) == Some(&0x01)
    }

    fn accepts_anything(_: &[u8], _: usize, _: usize) -> bool {
        true
    }

    schema! {
        static SHORT = "Short", accept = is_short;
        FieldDescriptor::unsigned("kind", 8),
        FieldDescriptor::unsigned("value", 8),
    }

    schema! {
        static LONG = "Long";
        FieldDescriptor::unsigned("kind", 8).with_fid(2).tagged(8),
        FieldDescriptor::unsigned("value", 16),
    }

    schema! {
        static NOTHING = "Nothing", accept = accepts_anything;
    }

    record_list! { static ITEMS = "Items"; SHORT, LONG }
    record_list! { static STUCK = "Stuck"; NOTHING }

    #[test]
    fn test_candidates_tried_in_order() -> TestResult {
        let data = [0x01, 0xAA, 0x02, 0x12, 0x34, 0x01, 0xBB];
        let records = ITEMS.parse(&data, 0, data.len())?;
        let names: Vec<&str> = records.iter().map(|record| record.schema().name()).collect();
        assert_eq!(names, vec!["Short", "Long", "Short"]);
        assert_eq!(records[1].get_u64("value")?, 0x1234);
        assert_eq!(records[2].get_u64("value")?, 0xBB);
        Ok(())
    }

    #[test]
    fn test_no_matching_parser() {
        let data = [0x01, 0xAA, 0x07, 0x00];
        assert!(matches!(
            ITEMS.parse(&data, 0, data.len()),
            Err(HidppError::List(ListError::NoMatchingParser { offset: 2, .. }))
        ));
    }

    #[test]
    fn test_zero_length_candidate_is_rejected() {
        let data = [0x00];
        assert!(matches!(
            STUCK.parse(&data, 0, 1),
            Err(HidppError::List(ListError::NoProgress { .. }))
        ));
    }

    #[test]
    fn test_empty_range_yields_empty_list() -> TestResult {
        assert!(ITEMS.parse(&[0x01, 0x02], 1, 1)?.is_empty());
        Ok(())
    }
}

//! Field values.

use std::fmt;

use hidpp_bitstream::HexList;

use crate::record::Record;

/// The value held by one field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    Bytes(HexList),
    Text(String),
    Record(Box<Record>),
    List(Vec<Record>),
}

impl Value {
    pub fn kind_label(&self) -> &'static str {
        match self {
            Value::Unsigned(_) => "unsigned integer",
            Value::Signed(_) => "signed integer",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Record(_) => "record",
            Value::List(_) => "record list",
        }
    }

    /// Integer view: integers as-is, byte strings of up to 8 bytes as
    /// big-endian numbers.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(value) => Some(*value),
            Value::Signed(value) => u64::try_from(*value).ok(),
            Value::Bytes(bytes) if bytes.len() <= 8 => {
                Some(bytes.iter().fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
            }
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Signed(value) => Some(*value),
            Value::Unsigned(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            Value::Text(text) => Some(text.as_bytes()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Record]> {
        match self {
            Value::List(records) => Some(records),
            _ => None,
        }
    }

    /// Zero integers and all-zero byte strings.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Unsigned(value) => *value == 0,
            Value::Signed(value) => *value == 0,
            Value::Bytes(bytes) => bytes.iter().all(|byte| *byte == 0),
            Value::Text(text) => text.is_empty(),
            Value::Record(_) => false,
            Value::List(records) => records.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unsigned(value) => write!(f, "{value:#04x}"),
            Value::Signed(value) => write!(f, "{value}"),
            Value::Bytes(bytes) => write!(f, "[{bytes}]"),
            Value::Text(text) => write!(f, "{text:?}"),
            Value::Record(record) => write!(f, "{}", record.schema().name()),
            Value::List(records) => write!(f, "{} records", records.len()),
        }
    }
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Unsigned(u64::from(value))
            }
        })*
    };
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Signed(i64::from(value))
            }
        })*
    };
}

impl_from_unsigned!(bool, u8, u16, u32, u64);
impl_from_signed!(i8, i16, i32, i64);

impl From<HexList> for Value {
    fn from(bytes: HexList) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(HexList(bytes))
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(HexList::from(bytes))
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(bytes: [u8; N]) -> Self {
        Value::Bytes(HexList(bytes.to_vec()))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(Box::new(record))
    }
}

impl From<Vec<Record>> for Value {
    fn from(records: Vec<Record>) -> Self {
        Value::List(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_views() {
        assert_eq!(Value::from(0x12u8).as_u64(), Some(0x12));
        assert_eq!(Value::from(-1i8).as_u64(), None);
        assert_eq!(Value::from(vec![0x12, 0x34]).as_u64(), Some(0x1234));
        assert_eq!(Value::from(7u32).as_i64(), Some(7));
    }

    #[test]
    fn test_zero_detection() {
        assert!(Value::from(vec![0, 0, 0]).is_zero());
        assert!(!Value::from(vec![0, 1]).is_zero());
        assert!(Value::from(0u16).is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(0x0Eu8).to_string(), "0x0e");
        assert_eq!(Value::from(vec![0xAA, 0x01]).to_string(), "[AA 01]");
        assert_eq!(Value::from(-3i16).to_string(), "-3");
    }
}

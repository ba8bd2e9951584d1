//! Field descriptors: the declarative half of a record schema.
//!
//! Descriptors are plain `Copy` data built with `const fn` constructors so
//! that record schemas can live in `static` items:
//!
//! ```
//! use hidpp_fields::{Check, FieldDescriptor};
//!
//! const DPI: FieldDescriptor = FieldDescriptor::unsigned("dpi", 16)
//!     .with_checks(&[Check::Range { min: 100, max: 25_600 }])
//!     .with_default(800);
//! assert_eq!(DPI.length, 16);
//! ```

use std::fmt;

use hidpp_bitstream::Endian;

use crate::list::RecordList;
use crate::record::Record;
use crate::schema::Schema;

/// Value → label mapping used only when rendering summaries.
pub type Interpreter = &'static [(u64, &'static str)];

/// Predicate evaluated against the enclosing record.
pub type PresencePredicate = fn(&Record) -> bool;

/// How a field's value is laid out on the wire.
#[derive(Clone, Copy)]
pub enum FieldKind {
    /// Unsigned integer of `length` bits (1..=64).
    Unsigned,
    /// Two's complement integer of `length` bits (1..=64).
    Signed,
    /// Raw bytes; `length` is a multiple of 8, or 0 for a variable tail.
    Bytes,
    /// UTF-8 text padded with zeros to `length`, or a variable tail.
    Text,
    /// Null-terminated UTF-8 text.
    CString,
    /// Unsigned LEB128 integer.
    Uleb128,
    /// A nested record.
    Record(&'static Schema),
    /// A sequence of records drawn from a candidate list.
    List(&'static RecordList),
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Unsigned => "unsigned integer",
            FieldKind::Signed => "signed integer",
            FieldKind::Bytes => "bytes",
            FieldKind::Text => "text",
            FieldKind::CString => "null-terminated text",
            FieldKind::Uleb128 => "LEB128 integer",
            FieldKind::Record(_) => "record",
            FieldKind::List(_) => "record list",
        }
    }

    /// Kinds whose encoded size does not depend on the value.
    pub fn is_self_delimiting(&self) -> bool {
        matches!(self, FieldKind::CString | FieldKind::Uleb128)
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Record(schema) => write!(f, "Record({})", schema.name()),
            FieldKind::List(list) => write!(f, "List({})", list.name()),
            other => f.write_str(other.label()),
        }
    }
}

/// Whether a field appears on the wire.
#[derive(Clone, Copy)]
pub enum Presence {
    /// Always present; serialization fails if unset without default.
    Always,
    /// Elided when unset; parsed only if data (and a matching tag) remains.
    Optional,
    /// Present iff the predicate holds for the fields parsed or set so far.
    When(PresencePredicate),
}

impl fmt::Debug for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presence::Always => f.write_str("Always"),
            Presence::Optional => f.write_str("Optional"),
            Presence::When(_) => f.write_str("When(..)"),
        }
    }
}

/// Default assigned when a record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    None,
    Unsigned(u64),
    Signed(i64),
    Bytes(&'static [u8]),
    Text(&'static str),
    /// Zero bytes filling the field's computed length.
    Zeroed,
}

/// Validator applied on assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Inclusive unsigned range.
    Range { min: u64, max: u64 },
    /// Inclusive signed range.
    SignedRange { min: i64, max: i64 },
    /// Value must be one of the listed constants.
    OneOf(&'static [u64]),
    /// Byte or text payload no longer than this.
    MaxBytes(usize),
}

/// One field of a record schema.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    /// Explicit identifier; `None` means auto-assigned (negative).
    pub fid: Option<i32>,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Width in bits; 0 with no length prefix means "remaining tail".
    pub length: usize,
    pub kind: FieldKind,
    /// Width in bits of the identifier tag written before the value.
    pub tag_length: usize,
    /// Width in bits of the byte count written before the value.
    pub len_length: usize,
    pub default: DefaultValue,
    pub interpreter: Option<Interpreter>,
    pub checks: &'static [Check],
    pub presence: Presence,
    /// Omit from summaries when the value is zero.
    pub elide_zero: bool,
    pub endian: Endian,
}

impl FieldDescriptor {
    const fn base(name: &'static str, length: usize, kind: FieldKind) -> Self {
        Self {
            fid: None,
            name,
            aliases: &[],
            length,
            kind,
            tag_length: 0,
            len_length: 0,
            default: DefaultValue::None,
            interpreter: None,
            checks: &[],
            presence: Presence::Always,
            elide_zero: false,
            endian: Endian::Big,
        }
    }

    pub const fn unsigned(name: &'static str, bits: usize) -> Self {
        Self::base(name, bits, FieldKind::Unsigned)
    }

    pub const fn signed(name: &'static str, bits: usize) -> Self {
        Self::base(name, bits, FieldKind::Signed)
    }

    pub const fn bytes(name: &'static str, bits: usize) -> Self {
        Self::base(name, bits, FieldKind::Bytes)
    }

    /// Raw bytes consuming the rest of the container.
    pub const fn tail(name: &'static str) -> Self {
        Self::base(name, 0, FieldKind::Bytes)
    }

    /// Zero-filled padding. With `bits == 0` it fills the record's `length`.
    pub const fn padding(bits: usize) -> Self {
        Self::base("padding", bits, FieldKind::Bytes)
            .with_default_value(DefaultValue::Zeroed)
            .with_elide_zero()
    }

    pub const fn text(name: &'static str, bits: usize) -> Self {
        Self::base(name, bits, FieldKind::Text)
    }

    pub const fn cstring(name: &'static str) -> Self {
        Self::base(name, 0, FieldKind::CString)
    }

    pub const fn uleb128(name: &'static str) -> Self {
        Self::base(name, 0, FieldKind::Uleb128)
    }

    /// A nested record; `bits == 0` lets the nested schema decide its size.
    pub const fn record(name: &'static str, schema: &'static Schema, bits: usize) -> Self {
        Self::base(name, bits, FieldKind::Record(schema))
    }

    /// A record list; `bits == 0` means the list spans its length prefix or
    /// the remaining tail.
    pub const fn list(name: &'static str, list: &'static RecordList, bits: usize) -> Self {
        Self::base(name, bits, FieldKind::List(list))
    }

    pub const fn with_fid(mut self, fid: i32) -> Self {
        self.fid = Some(fid);
        self
    }

    pub const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub const fn with_default(self, value: u64) -> Self {
        self.with_default_value(DefaultValue::Unsigned(value))
    }

    pub const fn with_default_value(mut self, value: DefaultValue) -> Self {
        self.default = value;
        self
    }

    /// Prefix the value with its identifier on `bits` bits.
    pub const fn tagged(mut self, bits: usize) -> Self {
        self.tag_length = bits;
        self
    }

    /// Prefix the value with its byte count on `bits` bits.
    pub const fn length_prefixed(mut self, bits: usize) -> Self {
        self.len_length = bits;
        self
    }

    pub const fn with_interpreter(mut self, interpreter: Interpreter) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub const fn with_checks(mut self, checks: &'static [Check]) -> Self {
        self.checks = checks;
        self
    }

    pub const fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub const fn present_when(mut self, predicate: PresencePredicate) -> Self {
        self.presence = Presence::When(predicate);
        self
    }

    pub const fn with_elide_zero(mut self) -> Self {
        self.elide_zero = true;
        self
    }

    pub const fn little_endian(mut self) -> Self {
        self.endian = Endian::Little;
        self
    }

    /// A field that consumes whatever remains of its container.
    pub fn is_tail(&self) -> bool {
        self.length == 0 && self.len_length == 0 && !self.kind.is_self_delimiting()
    }

    pub fn is_optional(&self) -> bool {
        !matches!(self.presence, Presence::Always)
    }

    /// Whether `name` matches this field's name or an alias, ignoring case.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }

    /// Wire size in bits including tag and length prefix, if it does not
    /// depend on the value.
    pub fn fixed_bits(&self) -> Option<usize> {
        if self.is_optional() || self.len_length > 0 || self.kind.is_self_delimiting() {
            return None;
        }
        let body = match self.kind {
            FieldKind::Record(schema) if self.length == 0 => schema.fixed_bits()?,
            _ if self.length == 0 => return None,
            _ => self.length,
        };
        Some(self.tag_length + body)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("fid", &self.fid)
            .field("name", &self.name)
            .field("length", &self.length)
            .field("kind", &self.kind)
            .field("tag_length", &self.tag_length)
            .field("len_length", &self.len_length)
            .field("presence", &self.presence)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_compose() {
        const FIELD: FieldDescriptor = FieldDescriptor::unsigned("profile_id", 8)
            .with_fid(3)
            .with_aliases(&["profile"])
            .tagged(8)
            .optional();
        assert_eq!(FIELD.fid, Some(3));
        assert!(FIELD.answers_to("PROFILE"));
        assert!(FIELD.answers_to("Profile_Id"));
        assert!(FIELD.is_optional());
        assert_eq!(FIELD.fixed_bits(), None);
    }

    #[test]
    fn test_tail_detection() {
        assert!(FieldDescriptor::tail("data").is_tail());
        assert!(!FieldDescriptor::cstring("name").is_tail());
        assert!(!FieldDescriptor::bytes("body", 0).length_prefixed(8).is_tail());
        assert_eq!(FieldDescriptor::padding(24).fixed_bits(), Some(24));
    }
}

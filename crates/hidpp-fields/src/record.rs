//! Record instances.
//!
//! A [`Record`] pairs a shared [`Schema`] with one optional [`Value`] per
//! field. Fields are addressed by name (or alias) or by identifier.
//!
//! Getters match names case-insensitively. Setters require the exact
//! declared spelling: a name that only differs in case or underscores from a
//! declared one is rejected as [`FieldError::AmbiguousAttribute`] so that
//! typos never silently create or shadow data. Records built with
//! [`Record::lenient`] accept such names instead.

use std::collections::BTreeMap;

use hidpp_bitstream::HexList;
use hidpp_errors::{CodecError, FieldError, HidppError, Result};

use crate::descriptor::{Check, DefaultValue, FieldDescriptor, FieldKind};
use crate::schema::Schema;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static Schema,
    values: Vec<Option<Value>>,
    name: Option<String>,
    properties: BTreeMap<String, String>,
    timestamp: Option<u64>,
    strict_names: bool,
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Record {
    /// Create a record with every field at its default.
    ///
    /// # Errors
    ///
    /// Returns a schema error if the declaration is invalid.
    pub fn new(schema: &'static Schema) -> Result<Self> {
        schema.layout()?;
        let mut record = Self {
            schema,
            values: vec![None; schema.fields().len()],
            name: None,
            properties: BTreeMap::new(),
            timestamp: None,
            strict_names: true,
        };
        for (index, field) in schema.fields().iter().enumerate() {
            record.values[index] = record.default_for(index, field);
        }
        Ok(record)
    }

    /// Create a record with every field unset, as the parser does.
    pub(crate) fn empty(schema: &'static Schema) -> Result<Self> {
        schema.layout()?;
        Ok(Self {
            schema,
            values: vec![None; schema.fields().len()],
            name: None,
            properties: BTreeMap::new(),
            timestamp: None,
            strict_names: true,
        })
    }

    /// Create a record and assign the given fields in order.
    ///
    /// # Errors
    ///
    /// Fails like [`Record::set`] for the first bad assignment.
    pub fn with_values<I, K, V>(schema: &'static Schema, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut record = Self::new(schema)?;
        for (name, value) in values {
            record.set(name.as_ref(), value)?;
        }
        Ok(record)
    }

    /// Accept setter names that only match after normalization.
    #[must_use]
    pub fn lenient(mut self) -> Self {
        self.strict_names = false;
        self
    }

    pub fn set_strict_names(&mut self, strict: bool) {
        self.strict_names = strict;
    }

    fn default_for(&self, index: usize, field: &FieldDescriptor) -> Option<Value> {
        match field.default {
            DefaultValue::None => None,
            DefaultValue::Unsigned(value) => Some(match field.kind {
                FieldKind::Signed => Value::Signed(value as i64),
                _ => Value::Unsigned(value),
            }),
            DefaultValue::Signed(value) => Some(Value::Signed(value)),
            DefaultValue::Bytes(bytes) => Some(Value::Bytes(HexList::from(bytes))),
            DefaultValue::Text(text) => Some(Value::Text(text.to_string())),
            DefaultValue::Zeroed => {
                let bits = if field.length > 0 {
                    field.length
                } else {
                    self.tail_bits(index).unwrap_or(0)
                };
                Some(Value::Bytes(HexList(vec![0; bits / 8])))
            }
        }
    }

    /// Bits left for the tail field at `index` when the schema declares its
    /// total length.
    fn tail_bits(&self, index: usize) -> Option<usize> {
        let total = self.schema.length()?;
        let others = self
            .schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .map(|(_, field)| field.fixed_bits())
            .sum::<Option<usize>>()?;
        total.checked_sub(others)
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Whether this record's schema is `schema` or derives from it.
    pub fn is_a(&self, schema: &Schema) -> bool {
        self.schema.is_a(schema)
    }

    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.schema.fields()
    }

    /// Instance name, defaulting to the schema name.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.schema.name())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Free-form annotations that are not part of the wire format.
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Reception time in monotonic nanoseconds, as stamped by the transport.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = Some(timestamp);
    }

    /// Field identifiers in declaration order.
    pub fn fids(&self) -> &[i32] {
        // layout() succeeded in the constructor and is cached
        self.schema.layout().map(|layout| layout.fids()).unwrap_or(&[])
    }

    pub(crate) fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    fn getter_index(&self, name: &str) -> Result<usize> {
        let fields = self.schema.fields();
        if let Some(index) = fields.iter().position(|field| field.answers_to(name)) {
            return Ok(index);
        }
        let wanted = normalize(name);
        fields
            .iter()
            .position(|field| {
                std::iter::once(field.name)
                    .chain(field.aliases.iter().copied())
                    .any(|declared| normalize(declared) == wanted)
            })
            .ok_or_else(|| FieldError::unknown(self.schema.name(), name).into())
    }

    fn setter_index(&self, name: &str) -> Result<usize> {
        let fields = self.schema.fields();
        if let Some(index) = fields
            .iter()
            .position(|field| field.name == name || field.aliases.contains(&name))
        {
            return Ok(index);
        }
        let wanted = normalize(name);
        for (index, field) in fields.iter().enumerate() {
            let declared = std::iter::once(field.name)
                .chain(field.aliases.iter().copied())
                .find(|declared| normalize(declared) == wanted);
            if let Some(declared) = declared {
                if self.strict_names {
                    return Err(FieldError::AmbiguousAttribute {
                        schema: self.schema.name().to_string(),
                        requested: name.to_string(),
                        declared: declared.to_string(),
                    }
                    .into());
                }
                return Ok(index);
            }
        }
        Err(FieldError::unknown(self.schema.name(), name).into())
    }

    /// Read a field by name or alias.
    ///
    /// # Errors
    ///
    /// `UnknownField` for an undeclared name, `MissingValue` when unset.
    pub fn get(&self, name: &str) -> Result<&Value> {
        let index = self.getter_index(name)?;
        self.values[index].as_ref().ok_or_else(|| {
            FieldError::MissingValue {
                schema: self.schema.name().to_string(),
                field: self.schema.fields()[index].name.to_string(),
            }
            .into()
        })
    }

    /// The value of `name`, or `None` when undeclared or unset.
    pub fn try_get(&self, name: &str) -> Option<&Value> {
        self.getter_index(name)
            .ok()
            .and_then(|index| self.values[index].as_ref())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.try_get(name).is_some()
    }

    /// # Errors
    ///
    /// As [`Record::get`], or `TypeMismatch` for a non-integer value.
    pub fn get_u64(&self, name: &str) -> Result<u64> {
        let value = self.get(name)?;
        value.as_u64().ok_or_else(|| self.mismatch(name, "unsigned integer", value))
    }

    /// # Errors
    ///
    /// As [`Record::get`], or `TypeMismatch` for a non-integer value.
    pub fn get_i64(&self, name: &str) -> Result<i64> {
        let value = self.get(name)?;
        value.as_i64().ok_or_else(|| self.mismatch(name, "signed integer", value))
    }

    /// # Errors
    ///
    /// As [`Record::get`], or `TypeMismatch` for a non-byte value.
    pub fn get_bytes(&self, name: &str) -> Result<&[u8]> {
        let value = self.get(name)?;
        value.as_bytes().ok_or_else(|| self.mismatch(name, "bytes", value))
    }

    /// # Errors
    ///
    /// As [`Record::get`], or `TypeMismatch` for a non-text value.
    pub fn get_text(&self, name: &str) -> Result<&str> {
        let value = self.get(name)?;
        value.as_text().ok_or_else(|| self.mismatch(name, "text", value))
    }

    /// # Errors
    ///
    /// As [`Record::get`], or `TypeMismatch` for a non-record value.
    pub fn get_record(&self, name: &str) -> Result<&Record> {
        let value = self.get(name)?;
        value.as_record().ok_or_else(|| self.mismatch(name, "record", value))
    }

    /// # Errors
    ///
    /// As [`Record::get`], or `TypeMismatch` for a non-list value.
    pub fn get_list(&self, name: &str) -> Result<&[Record]> {
        let value = self.get(name)?;
        value.as_list().ok_or_else(|| self.mismatch(name, "record list", value))
    }

    fn mismatch(&self, name: &str, expected: &'static str, value: &Value) -> HidppError {
        FieldError::TypeMismatch {
            field: name.to_string(),
            expected,
            actual: value.kind_label(),
        }
        .into()
    }

    /// Assign a field by its exact name or alias.
    ///
    /// The value is converted to the field kind and validated against the
    /// field width and checks.
    ///
    /// # Errors
    ///
    /// `AmbiguousAttribute`, `UnknownField`, `TypeMismatch`, `CheckFailed`
    /// or a `ValueOutOfRange` codec error.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let index = self.setter_index(name)?;
        self.set_index(index, value.into())?;
        Ok(self)
    }

    /// # Errors
    ///
    /// As [`Record::set`], with `UnknownField` for an undeclared identifier.
    pub fn set_by_fid(&mut self, fid: i32, value: impl Into<Value>) -> Result<&mut Self> {
        let index = self
            .schema
            .field_index(fid)?
            .ok_or_else(|| FieldError::unknown(self.schema.name(), fid.to_string()))?;
        self.set_index(index, value.into())?;
        Ok(self)
    }

    pub fn get_by_fid(&self, fid: i32) -> Option<&Value> {
        let index = self.schema.field_index(fid).ok().flatten()?;
        self.values[index].as_ref()
    }

    /// Clear a field so that it is omitted (optional) or rejected (required).
    ///
    /// # Errors
    ///
    /// `UnknownField` for an undeclared name.
    pub fn unset(&mut self, name: &str) -> Result<()> {
        let index = self.setter_index(name)?;
        self.values[index] = None;
        Ok(())
    }

    pub(crate) fn set_index(&mut self, index: usize, value: Value) -> Result<()> {
        let field = &self.schema.fields()[index];
        let value = coerce(field, value)?;
        validate(field, &value)?;
        self.values[index] = Some(value);
        Ok(())
    }

    /// Store a parsed value without re-validating checks.
    pub(crate) fn store(&mut self, index: usize, value: Value) {
        self.values[index] = Some(value);
    }
}

/// Convert `value` to the representation `field` stores.
fn coerce(field: &FieldDescriptor, value: Value) -> Result<Value> {
    let mismatch = |value: &Value| -> HidppError {
        FieldError::TypeMismatch {
            field: field.name.to_string(),
            expected: field.kind.label(),
            actual: value.kind_label(),
        }
        .into()
    };
    let converted = match (field.kind, value) {
        (FieldKind::Unsigned | FieldKind::Uleb128, Value::Signed(v)) => {
            Value::Unsigned(u64::try_from(v).map_err(|_| {
                FieldError::codec(field.name, CodecError::value_out_of_range(v, field.length))
            })?)
        }
        (FieldKind::Unsigned | FieldKind::Uleb128, value @ Value::Bytes(_)) => {
            Value::Unsigned(value.as_u64().ok_or_else(|| mismatch(&value))?)
        }
        (FieldKind::Signed, Value::Unsigned(v)) => Value::Signed(i64::try_from(v).map_err(|_| {
            FieldError::codec(field.name, CodecError::value_out_of_range(v, field.length))
        })?),
        (FieldKind::Bytes, Value::Unsigned(v)) if field.length > 0 && field.length <= 64 => {
            let size = field.length / 8;
            let mut bytes = Vec::with_capacity(size);
            hidpp_bitstream::primitives::write_unsigned(
                &mut bytes,
                v,
                size,
                hidpp_bitstream::Endian::Big,
            )
            .map_err(|source| FieldError::codec(field.name, source))?;
            Value::Bytes(HexList(bytes))
        }
        (FieldKind::Bytes, Value::Text(text)) => Value::Bytes(HexList(text.into_bytes())),
        (FieldKind::Text | FieldKind::CString, Value::Bytes(bytes)) => Value::Text(
            String::from_utf8(bytes.into_inner()).map_err(|_| {
                FieldError::codec(field.name, CodecError::InvalidUtf8 { offset: 0 })
            })?,
        ),
        (FieldKind::Record(schema), Value::Record(record)) => {
            if !record.schema().is_a(schema) {
                return Err(FieldError::TypeMismatch {
                    field: field.name.to_string(),
                    expected: schema.name(),
                    actual: record.schema().name(),
                }
                .into());
            }
            Value::Record(record)
        }
        (FieldKind::Unsigned | FieldKind::Uleb128, value @ Value::Unsigned(_))
        | (FieldKind::Signed, value @ Value::Signed(_))
        | (FieldKind::Bytes, value @ Value::Bytes(_))
        | (FieldKind::Text | FieldKind::CString, value @ Value::Text(_))
        | (FieldKind::List(_), value @ Value::List(_)) => value,
        (_, value) => return Err(mismatch(&value)),
    };
    Ok(converted)
}

/// Enforce the field width and declared checks.
fn validate(field: &FieldDescriptor, value: &Value) -> Result<()> {
    let codec = |source| HidppError::from(FieldError::codec(field.name, source));
    match (field.kind, value) {
        (FieldKind::Unsigned, Value::Unsigned(v)) => {
            hidpp_bitstream::primitives::check_unsigned(*v, field.length).map_err(codec)?;
        }
        (FieldKind::Signed, Value::Signed(v)) => {
            hidpp_bitstream::primitives::check_signed(*v, field.length).map_err(codec)?;
        }
        (FieldKind::Bytes | FieldKind::Text, _) if field.length > 0 => {
            let size = value.as_bytes().map_or(0, <[u8]>::len);
            let fits = match field.kind {
                FieldKind::Text => size <= field.length / 8,
                _ => size == field.length / 8,
            };
            if !fits {
                return Err(FieldError::check_failed(
                    field.name,
                    format!("{size} bytes do not fill a {}-bit field", field.length),
                )
                .into());
            }
        }
        _ => {}
    }

    for check in field.checks {
        let failure = match (check, value) {
            (Check::Range { min, max }, _) => value
                .as_u64()
                .filter(|v| v < min || v > max)
                .map(|v| format!("{v} is outside {min}..={max}")),
            (Check::SignedRange { min, max }, _) => value
                .as_i64()
                .filter(|v| v < min || v > max)
                .map(|v| format!("{v} is outside {min}..={max}")),
            (Check::OneOf(allowed), _) => value
                .as_u64()
                .filter(|v| !allowed.contains(v))
                .map(|v| format!("{v:#x} is not an accepted value")),
            (Check::MaxBytes(max), _) => value
                .as_bytes()
                .map(<[u8]>::len)
                .filter(|len| len > max)
                .map(|len| format!("{len} bytes exceed the maximum of {max}")),
        };
        if let Some(reason) = failure {
            return Err(FieldError::check_failed(field.name, reason).into());
        }
    }
    Ok(())
}

impl PartialEq for Record {
    /// Same identifier sequence and same values; names, properties and
    /// timestamps are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.fids() == other.fids() && self.values == other.values
    }
}

impl Eq for Record {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    schema! {
        static DPI_SETTING = "DpiSetting", length = 64;
        FieldDescriptor::unsigned("sensor_index", 8).with_aliases(&["sensor"]),
        FieldDescriptor::unsigned("dpi", 16)
            .with_checks(&[Check::Range { min: 100, max: 25_600 }])
            .with_default(800),
        FieldDescriptor::signed("offset", 8),
        FieldDescriptor::padding(0),
    }

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_defaults_fill_padding_to_length() -> TestResult {
        let record = Record::new(&DPI_SETTING)?;
        assert_eq!(record.get_u64("dpi")?, 800);
        assert_eq!(record.get_bytes("padding")?, &[0, 0, 0, 0]);
        assert!(!record.is_set("sensor_index"));
        Ok(())
    }

    #[test]
    fn test_getter_is_case_insensitive() -> TestResult {
        let mut record = Record::new(&DPI_SETTING)?;
        record.set("sensor_index", 2u8)?;
        assert_eq!(record.get_u64("SENSOR_INDEX")?, 2);
        assert_eq!(record.get_u64("Sensor")?, 2);
        assert_eq!(record.get_u64("SensorIndex")?, 2);
        Ok(())
    }

    #[test]
    fn test_confusable_setter_is_rejected() -> TestResult {
        let mut record = Record::new(&DPI_SETTING)?;
        let err = record.set("SensorIndex", 1u8).err();
        assert!(matches!(
            err,
            Some(HidppError::Field(FieldError::AmbiguousAttribute { ref declared, .. }))
                if declared == "sensor_index"
        ));
        assert!(!record.is_set("sensor_index"));

        let mut lenient = Record::new(&DPI_SETTING)?.lenient();
        lenient.set("SensorIndex", 1u8)?;
        assert_eq!(lenient.get_u64("sensor_index")?, 1);
        Ok(())
    }

    #[test]
    fn test_unknown_field() -> TestResult {
        let mut record = Record::new(&DPI_SETTING)?;
        assert!(matches!(
            record.set("resolution", 1u8),
            Err(HidppError::Field(FieldError::UnknownField { .. }))
        ));
        assert!(record.get("resolution").is_err());
        Ok(())
    }

    #[test]
    fn test_width_and_checks() -> TestResult {
        let mut record = Record::new(&DPI_SETTING)?;
        assert!(record.set("sensor_index", 0x100u16).is_err());
        assert!(matches!(
            record.set("dpi", 50u16),
            Err(HidppError::Field(FieldError::CheckFailed { .. }))
        ));
        record.set("offset", -5i8)?;
        assert_eq!(record.get_i64("offset")?, -5);
        assert!(record.set("offset", 200u8).is_err());
        Ok(())
    }

    #[test]
    fn test_fixed_bytes_must_fill_field() -> TestResult {
        let mut record = Record::new(&DPI_SETTING)?;
        assert!(record.set("padding", vec![0u8; 3]).is_err());
        record.set("padding", vec![1u8, 2, 3, 4])?;
        Ok(())
    }

    #[test]
    fn test_equality_ignores_timestamp_and_name() -> TestResult {
        let mut left = Record::new(&DPI_SETTING)?;
        let mut right = Record::new(&DPI_SETTING)?;
        left.set_timestamp(10);
        right.set_name("other");
        right.set_property("source", "test");
        assert_eq!(left, right);
        right.set("dpi", 1600u16)?;
        assert_ne!(left, right);
        Ok(())
    }
}

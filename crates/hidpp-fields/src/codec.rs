//! Record serialization and parsing over the bit stream codec.

use hidpp_bitstream::{BitReader, BitWriter, HexList};
use hidpp_errors::{CodecError, FieldError, HidppError, Result};

use crate::descriptor::{FieldDescriptor, FieldKind, Presence};
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;

fn codec_err(field: &FieldDescriptor) -> impl Fn(CodecError) -> HidppError + '_ {
    move |source| FieldError::codec(field.name, source).into()
}

impl Record {
    /// Serialize to bytes. A trailing partial byte is zero padded.
    ///
    /// # Errors
    ///
    /// `MissingValue` for an unset required field, or a codec error.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = BitWriter::new();
        self.write_to(&mut writer)?;
        Ok(writer.finish())
    }

    pub fn to_hex(&self) -> Result<HexList> {
        self.to_bytes().map(HexList)
    }

    /// Append this record's fields in declaration order.
    ///
    /// # Errors
    ///
    /// As [`Record::to_bytes`].
    pub fn write_to(&self, writer: &mut BitWriter) -> Result<()> {
        let fids = self.fids().to_vec();
        for (index, field) in self.fields().iter().enumerate() {
            let value = match (&self.values()[index], field.presence) {
                (Some(_), Presence::When(predicate)) if !predicate(self) => continue,
                (Some(value), _) => value,
                (None, Presence::Always) => {
                    return Err(FieldError::MissingValue {
                        schema: self.schema().name().to_string(),
                        field: field.name.to_string(),
                    }
                    .into());
                }
                (None, _) => continue,
            };

            if field.tag_length > 0 {
                let tag = u64::try_from(fids[index]).unwrap_or_default();
                writer.write_bits(tag, field.tag_length).map_err(codec_err(field))?;
            }

            if field.len_length > 0 {
                let mut body = BitWriter::new();
                write_value(field, value, &mut body)?;
                body.align();
                let count = (body.bit_len() / 8) as u64;
                writer
                    .write_bits(count, field.len_length)
                    .map_err(codec_err(field))?;
                writer.append(&body);
            } else {
                write_value(field, value, writer)?;
            }
        }
        Ok(())
    }

    /// Parse a record spanning all of `data`.
    ///
    /// # Errors
    ///
    /// Codec errors for short or malformed input, schema errors for a broken
    /// declaration, list errors for unparseable list elements.
    pub fn from_bytes(schema: &'static Schema, data: &[u8]) -> Result<Self> {
        let mut reader = BitReader::new(data);
        Self::read_from(schema, &mut reader)
    }

    /// Parse a record from `data[offset..offset + length]` (bytes).
    ///
    /// # Errors
    ///
    /// As [`Record::from_bytes`], plus `OutOfBounds` for a bad window.
    pub fn from_window(
        schema: &'static Schema,
        data: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<Self> {
        let mut reader = BitReader::with_window(data, offset, length)?;
        Self::read_from(schema, &mut reader)
    }

    /// Parse a record at the reader position, leaving the reader after it.
    ///
    /// # Errors
    ///
    /// As [`Record::from_bytes`].
    pub fn read_from(schema: &'static Schema, reader: &mut BitReader<'_>) -> Result<Self> {
        let start = reader.bit_position();
        let mut outer = reader.clone();
        let mut scoped = match schema.length() {
            Some(bits) => reader.restrict(bits)?,
            None => reader.clone(),
        };

        let mut record = Record::empty(schema)?;
        let fids = schema.layout()?.fids().to_vec();
        for (index, field) in schema.fields().iter().enumerate() {
            let present = match field.presence {
                Presence::Always => true,
                Presence::Optional => !scoped.is_at_end(),
                Presence::When(predicate) => predicate(&record),
            };
            if !present {
                continue;
            }

            if field.tag_length > 0 {
                let mut lookahead = scoped.clone();
                let tag = lookahead.read_bits(field.tag_length).ok();
                let expected = u64::try_from(fids[index]).ok();
                if tag.is_none() || tag != expected {
                    if field.is_optional() {
                        continue;
                    }
                    return Err(FieldError::check_failed(
                        field.name,
                        format!(
                            "expected tag {} at bit offset {}",
                            fids[index],
                            scoped.bit_position()
                        ),
                    )
                    .into());
                }
                scoped = lookahead;
            }

            let value = if field.len_length > 0 {
                let count = scoped
                    .read_bits(field.len_length)
                    .map_err(codec_err(field))?;
                let bits = usize::try_from(count)
                    .ok()
                    .and_then(|count| count.checked_mul(8))
                    .ok_or_else(|| codec_err(field)(CodecError::Overflow { offset: scoped.bit_position() }))?;
                let mut body = scoped.restrict(bits).map_err(codec_err(field))?;
                let value = read_value(field, &mut body, bits)?;
                scoped.skip_bits(bits).map_err(codec_err(field))?;
                value
            } else {
                let bits = field_span(schema, index, &scoped)?;
                read_value(field, &mut scoped, bits)?
            };
            record.store(index, value);
        }

        let end = match schema.length() {
            Some(bits) => start + bits,
            None => scoped.bit_position(),
        };
        outer.seek_bits(end)?;
        *reader = outer;
        Ok(record)
    }
}

/// Bits taken by the value of field `index` when it has no length prefix.
///
/// Tail fields get whatever the container has left after the fixed-size
/// fields that follow them.
fn field_span(schema: &Schema, index: usize, reader: &BitReader<'_>) -> Result<usize> {
    let field = &schema.fields()[index];
    if !field.is_tail() {
        return Ok(field.length);
    }
    let after = schema.fields()[index + 1..]
        .iter()
        .map(FieldDescriptor::fixed_bits)
        .sum::<Option<usize>>()
        .ok_or_else(|| {
            hidpp_errors::SchemaError::invalid(
                schema.name(),
                format!("tail field '{}' is followed by a variable field", field.name),
            )
        })?;
    reader.remaining_bits().checked_sub(after).ok_or_else(|| {
        codec_err(field)(CodecError::out_of_bounds(
            reader.bit_position(),
            after,
            reader.bit_limit(),
        ))
    })
}

fn write_value(field: &FieldDescriptor, value: &Value, writer: &mut BitWriter) -> Result<()> {
    let err = codec_err(field);
    match (field.kind, value) {
        (FieldKind::Unsigned, Value::Unsigned(v)) => {
            if field.length % 8 == 0 && writer.is_aligned() {
                writer
                    .write_unsigned(*v, field.length / 8, field.endian)
                    .map_err(err)?;
            } else {
                writer.write_bits(*v, field.length).map_err(err)?;
            }
        }
        (FieldKind::Signed, Value::Signed(v)) => {
            if field.length % 8 == 0 && writer.is_aligned() {
                writer
                    .write_signed(*v, field.length / 8, field.endian)
                    .map_err(err)?;
            } else {
                writer.write_signed_bits(*v, field.length).map_err(err)?;
            }
        }
        (FieldKind::Uleb128, Value::Unsigned(v)) => {
            writer.write_uleb128(*v);
        }
        (FieldKind::CString, Value::Text(text)) => {
            writer.write_cstring(text);
        }
        (FieldKind::Bytes | FieldKind::Text, value) => {
            let bytes = value.as_bytes().unwrap_or_default();
            if field.length > 0 {
                let size = field.length / 8;
                if bytes.len() > size {
                    return Err(FieldError::check_failed(
                        field.name,
                        format!("{} bytes do not fit in {size}", bytes.len()),
                    )
                    .into());
                }
                writer.write_bytes(bytes);
                writer.write_bytes(&vec![0; size - bytes.len()]);
            } else {
                writer.write_bytes(bytes);
            }
        }
        (FieldKind::Record(_), Value::Record(record)) => {
            let mut body = BitWriter::new();
            record.write_to(&mut body)?;
            if field.length > 0 && body.bit_len() != field.length {
                return Err(FieldError::check_failed(
                    field.name,
                    format!("nested record takes {} of {} bits", body.bit_len(), field.length),
                )
                .into());
            }
            writer.append(&body);
        }
        (FieldKind::List(_), Value::List(records)) => {
            let mut body = BitWriter::new();
            for record in records {
                record.write_to(&mut body)?;
            }
            if field.length > 0 {
                if body.bit_len() > field.length {
                    return Err(FieldError::check_failed(
                        field.name,
                        format!("list takes {} of {} bits", body.bit_len(), field.length),
                    )
                    .into());
                }
                let fill = field.length - body.bit_len();
                writer.append(&body);
                writer.write_bytes(&vec![0; fill / 8]);
                writer.write_bits(0, fill % 8).map_err(err)?;
            } else {
                writer.append(&body);
            }
        }
        (kind, value) => {
            return Err(FieldError::TypeMismatch {
                field: field.name.to_string(),
                expected: kind.label(),
                actual: value.kind_label(),
            }
            .into());
        }
    }
    Ok(())
}

/// Read one value occupying `bits` bits (ignored for self-delimiting kinds).
fn read_value(field: &FieldDescriptor, reader: &mut BitReader<'_>, bits: usize) -> Result<Value> {
    let err = codec_err(field);
    let value = match field.kind {
        FieldKind::Unsigned => {
            if bits % 8 == 0 && reader.is_aligned() {
                Value::Unsigned(reader.read_unsigned(bits / 8, field.endian).map_err(err)?)
            } else {
                Value::Unsigned(reader.read_bits(bits).map_err(err)?)
            }
        }
        FieldKind::Signed => {
            if bits % 8 == 0 && reader.is_aligned() {
                Value::Signed(reader.read_signed(bits / 8, field.endian).map_err(err)?)
            } else {
                Value::Signed(reader.read_signed_bits(bits).map_err(err)?)
            }
        }
        FieldKind::Uleb128 => Value::Unsigned(reader.read_uleb128().map_err(err)?),
        FieldKind::CString => Value::Text(reader.read_cstring().map_err(err)?),
        FieldKind::Bytes => Value::Bytes(HexList(read_whole_bytes(field, reader, bits)?)),
        FieldKind::Text => {
            let mut bytes = read_whole_bytes(field, reader, bits)?;
            if let Some(end) = bytes.iter().position(|byte| *byte == 0) {
                bytes.truncate(end);
            }
            let offset = reader.bit_position();
            Value::Text(String::from_utf8(bytes).map_err(|_| err(CodecError::InvalidUtf8 { offset }))?)
        }
        FieldKind::Record(schema) => {
            let nested = match (bits, schema.fixed_bits()) {
                (0, Some(fixed)) if fixed > 0 => {
                    let mut body = reader.restrict(fixed).map_err(&err)?;
                    let record = Record::read_from(schema, &mut body)?;
                    reader.skip_bits(fixed).map_err(err)?;
                    record
                }
                (0, _) => Record::read_from(schema, reader)?,
                (bits, _) => {
                    let mut body = reader.restrict(bits).map_err(&err)?;
                    let record = Record::read_from(schema, &mut body)?;
                    reader.skip_bits(bits).map_err(err)?;
                    record
                }
            };
            Value::Record(Box::new(nested))
        }
        FieldKind::List(list) => {
            let mut body = reader.restrict(bits).map_err(&err)?;
            let records = list.read_from(&mut body)?;
            reader.skip_bits(bits).map_err(err)?;
            Value::List(records)
        }
    };
    Ok(value)
}

fn read_whole_bytes(field: &FieldDescriptor, reader: &mut BitReader<'_>, bits: usize) -> Result<Vec<u8>> {
    if bits % 8 != 0 {
        return Err(FieldError::codec(
            field.name,
            CodecError::Misaligned {
                offset: reader.bit_position(),
            },
        )
        .into());
    }
    reader.read_bytes(bits / 8).map_err(codec_err(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Check, schema};

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    schema! {
        static HEADER = "Header";
        FieldDescriptor::unsigned("report_id", 8),
        FieldDescriptor::unsigned("function_index", 4),
        FieldDescriptor::unsigned("software_id", 4),
    }

    schema! {
        static TLV = "Tlv";
        FieldDescriptor::unsigned("kind", 8).with_fid(1).tagged(8),
        FieldDescriptor::bytes("name", 0).with_fid(2).tagged(8).length_prefixed(8),
        FieldDescriptor::unsigned("flags", 8).with_fid(3).tagged(8).optional(),
        FieldDescriptor::uleb128("size").with_fid(4).tagged(8).optional(),
    }

    schema! {
        static CONDITIONAL = "Conditional";
        FieldDescriptor::unsigned("has_extra", 8),
        FieldDescriptor::unsigned("extra", 16).present_when(has_extra),
        FieldDescriptor::tail("rest"),
    }

    schema! {
        static WRAPPER = "Wrapper", length = 48;
        FieldDescriptor::record("header", &HEADER, 0),
        FieldDescriptor::text("label", 16).with_checks(&[Check::MaxBytes(2)]),
        FieldDescriptor::padding(0),
    }

    fn has_extra(record: &Record) -> bool {
        record.try_get("has_extra").and_then(Value::as_u64) == Some(1)
    }

    #[test]
    fn test_sub_byte_fields_pack() -> TestResult {
        let record = Record::with_values(
            &HEADER,
            [("report_id", 0x10u8), ("function_index", 0x0), ("software_id", 0xE)],
        )?;
        assert_eq!(record.to_bytes()?, vec![0x10, 0x0E]);
        let parsed = Record::from_bytes(&HEADER, &[0x10, 0x0E])?;
        assert_eq!(parsed, record);
        Ok(())
    }

    #[test]
    fn test_tagged_and_length_prefixed() -> TestResult {
        let mut record = Record::new(&TLV)?;
        record.set("kind", 7u8)?.set("name", b"abc".to_vec())?;
        let bytes = record.to_bytes()?;
        assert_eq!(bytes, vec![0x01, 0x07, 0x02, 0x03, b'a', b'b', b'c']);

        let parsed = Record::from_bytes(&TLV, &bytes)?;
        assert_eq!(parsed.get_bytes("name")?, b"abc");
        assert!(!parsed.is_set("flags"));
        assert_eq!(parsed, record);
        Ok(())
    }

    #[test]
    fn test_optional_tag_mismatch_skips_field() -> TestResult {
        let data = [0x01, 0x07, 0x02, 0x00, 0x04, 0xAC, 0x02];
        let parsed = Record::from_bytes(&TLV, &data)?;
        assert!(!parsed.is_set("flags"));
        assert_eq!(parsed.get_u64("size")?, 300);
        Ok(())
    }

    #[test]
    fn test_required_tag_mismatch_fails() {
        assert!(Record::from_bytes(&TLV, &[0x09, 0x07]).is_err());
    }

    #[test]
    fn test_presence_predicate() -> TestResult {
        let with = Record::from_bytes(&CONDITIONAL, &[0x01, 0x12, 0x34, 0xFF])?;
        assert_eq!(with.get_u64("extra")?, 0x1234);
        assert_eq!(with.get_bytes("rest")?, &[0xFF]);

        let without = Record::from_bytes(&CONDITIONAL, &[0x00, 0x12, 0x34])?;
        assert!(!without.is_set("extra"));
        assert_eq!(without.get_bytes("rest")?, &[0x12, 0x34]);
        Ok(())
    }

    #[test]
    fn test_nested_record_and_padding() -> TestResult {
        let header = Record::with_values(
            &HEADER,
            [("report_id", 0x11u8), ("function_index", 1), ("software_id", 2)],
        )?;
        let mut wrapper = Record::new(&WRAPPER)?;
        wrapper.set("header", header)?.set("label", "ok")?;
        let bytes = wrapper.to_bytes()?;
        assert_eq!(bytes, vec![0x11, 0x12, b'o', b'k', 0x00, 0x00]);

        let parsed = Record::from_bytes(&WRAPPER, &bytes)?;
        assert_eq!(parsed.get_record("header")?.get_u64("software_id")?, 2);
        assert_eq!(parsed.get_text("label")?, "ok");
        assert_eq!(parsed, wrapper);
        Ok(())
    }

    #[test]
    fn test_short_input_is_out_of_bounds() {
        assert!(matches!(
            Record::from_bytes(&HEADER, &[0x10]),
            Err(HidppError::Field(FieldError::Codec {
                source: CodecError::OutOfBounds { .. },
                ..
            }))
        ));
    }

    #[test]
    fn test_missing_required_value() -> TestResult {
        let record = Record::new(&HEADER)?;
        assert!(matches!(
            record.to_bytes(),
            Err(HidppError::Field(FieldError::MissingValue { .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_window_parse() -> TestResult {
        let data = [0xAA, 0x10, 0x0E, 0xBB];
        let parsed = Record::from_window(&HEADER, &data, 1, 2)?;
        assert_eq!(parsed.get_u64("software_id")?, 0xE);
        Ok(())
    }
}

//! Stateless read/write primitives.
//!
//! Every reader takes a buffer and an offset and returns `(value, new_offset)`.
//! Byte readers use byte offsets; [`read_bits`] uses a bit offset. A read
//! that needs more data than remains fails with [`CodecError::OutOfBounds`],
//! and a zero-width read returns `(None, offset)` unchanged.

use hidpp_errors::{CodecError, CodecResult};

/// Byte order of a multi-byte integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Most significant byte first (HID++ header and payload fields).
    #[default]
    Big,
    /// Least significant byte first (DWARF tables).
    Little,
}

fn check_bytes(data: &[u8], offset: usize, count: usize) -> CodecResult<()> {
    match offset.checked_add(count) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(CodecError::out_of_bounds(
            offset.saturating_mul(8),
            count.saturating_mul(8),
            data.len().saturating_mul(8),
        )),
    }
}

/// Read an unsigned integer of `size` bytes.
///
/// # Errors
///
/// Returns `OutOfBounds` if fewer than `size` bytes remain and
/// `WidthTooLarge` if `size` exceeds eight bytes.
pub fn read_unsigned(
    data: &[u8],
    offset: usize,
    size: usize,
    endian: Endian,
) -> CodecResult<(Option<u64>, usize)> {
    if size == 0 {
        return Ok((None, offset));
    }
    if size > 8 {
        return Err(CodecError::WidthTooLarge { bits: size * 8 });
    }
    check_bytes(data, offset, size)?;
    let bytes = data.get(offset..offset + size).unwrap_or_default();
    let value = match endian {
        Endian::Big => bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)),
        Endian::Little => bytes
            .iter()
            .rev()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)),
    };
    Ok((Some(value), offset + size))
}

/// Read a two's complement signed integer of `size` bytes.
///
/// # Errors
///
/// Same failure modes as [`read_unsigned`].
pub fn read_signed(
    data: &[u8],
    offset: usize,
    size: usize,
    endian: Endian,
) -> CodecResult<(Option<i64>, usize)> {
    let (value, next) = read_unsigned(data, offset, size, endian)?;
    Ok((value.map(|v| sign_extend(v, size * 8)), next))
}

/// Read an unsigned LEB128 value: 7-bit groups, continuation bit in the MSB.
///
/// # Errors
///
/// Returns `OutOfBounds` if the buffer ends mid-value and `Overflow` if the
/// value does not fit in 64 bits.
pub fn read_uleb128(data: &[u8], offset: usize) -> CodecResult<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0u32;
    let mut pos = offset;
    loop {
        let byte = *data
            .get(pos)
            .ok_or_else(|| CodecError::out_of_bounds(pos * 8, 8, data.len() * 8))?;
        pos += 1;
        let group = u64::from(byte & 0x7F);
        if shift >= 64 || (shift == 63 && group > 1) {
            if group != 0 {
                return Err(CodecError::Overflow { offset });
            }
        } else {
            result |= group << shift;
        }
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok((result, pos));
        }
    }
}

/// Read a signed LEB128 value; the sign comes from bit 6 of the final group.
///
/// # Errors
///
/// Same failure modes as [`read_uleb128`].
pub fn read_sleb128(data: &[u8], offset: usize) -> CodecResult<(i64, usize)> {
    let mut result = 0i64;
    let mut shift = 0u32;
    let mut pos = offset;
    loop {
        let byte = *data
            .get(pos)
            .ok_or_else(|| CodecError::out_of_bounds(pos * 8, 8, data.len() * 8))?;
        pos += 1;
        if shift >= 64 {
            let expected = if result < 0 { 0x7F } else { 0x00 };
            if byte & 0x7F != expected {
                return Err(CodecError::Overflow { offset });
            }
        } else {
            result |= i64::from(byte & 0x7F) << shift;
        }
        shift += 7;
        if byte & 0x80 == 0 {
            if shift < 64 && byte & 0x40 != 0 {
                result |= -1i64 << shift;
            }
            return Ok((result, pos));
        }
    }
}

/// Read `size` raw bytes as a slice view.
///
/// # Errors
///
/// Returns `OutOfBounds` if fewer than `size` bytes remain.
pub fn read_block(data: &[u8], offset: usize, size: usize) -> CodecResult<(Option<&[u8]>, usize)> {
    if size == 0 {
        return Ok((None, offset));
    }
    check_bytes(data, offset, size)?;
    Ok((data.get(offset..offset + size), offset + size))
}

/// Read a null-terminated string. The returned offset points past the terminator.
///
/// # Errors
///
/// Returns `Unterminated` if no zero byte follows `offset` and `InvalidUtf8`
/// if the characters are not UTF-8.
pub fn read_cstring(data: &[u8], offset: usize) -> CodecResult<(String, usize)> {
    let tail = data
        .get(offset..)
        .ok_or_else(|| CodecError::out_of_bounds(offset * 8, 8, data.len() * 8))?;
    let end = tail
        .iter()
        .position(|b| *b == 0)
        .ok_or(CodecError::Unterminated { offset })?;
    let text = std::str::from_utf8(tail.get(..end).unwrap_or_default())
        .map_err(|_utf8| CodecError::InvalidUtf8 { offset })?;
    Ok((text.to_string(), offset + end + 1))
}

/// Read `bits` bits starting at `bit_offset`, assembled MSB-first across
/// byte boundaries.
///
/// # Errors
///
/// Returns `OutOfBounds` if the buffer is too short and `WidthTooLarge`
/// for more than 64 bits.
pub fn read_bits(data: &[u8], bit_offset: usize, bits: usize) -> CodecResult<(Option<u64>, usize)> {
    if bits == 0 {
        return Ok((None, bit_offset));
    }
    if bits > 64 {
        return Err(CodecError::WidthTooLarge { bits });
    }
    let available = data.len() * 8;
    if bit_offset.checked_add(bits).is_none_or(|end| end > available) {
        return Err(CodecError::out_of_bounds(bit_offset, bits, available));
    }
    let mut value = 0u64;
    let mut pos = bit_offset;
    let end = bit_offset + bits;
    while pos < end {
        let byte = u64::from(data.get(pos / 8).copied().unwrap_or(0));
        let in_byte = pos % 8;
        // Take as many bits as possible from the current byte.
        let take = (8 - in_byte).min(end - pos);
        let shifted = byte >> (8 - in_byte - take);
        let mask = (1u64 << take) - 1;
        value = (value << take) | (shifted & mask);
        pos += take;
    }
    Ok((Some(value), end))
}

/// Sign-extend the low `bits` bits of `value`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    if bits == 0 || bits >= 64 {
        return value as i64;
    }
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// Check that `value` fits in `bits` unsigned bits.
///
/// # Errors
///
/// Returns `ValueOutOfRange` if it does not.
pub fn check_unsigned(value: u64, bits: usize) -> CodecResult<()> {
    if bits < 64 && value >> bits != 0 {
        return Err(CodecError::value_out_of_range(value, bits));
    }
    Ok(())
}

/// Check that `value` fits in `bits` two's complement bits.
///
/// # Errors
///
/// Returns `ValueOutOfRange` if it does not.
pub fn check_signed(value: i64, bits: usize) -> CodecResult<()> {
    if bits == 0 {
        return if value == 0 {
            Ok(())
        } else {
            Err(CodecError::value_out_of_range(value, bits))
        };
    }
    if bits < 64 {
        let min = -(1i64 << (bits - 1));
        let max = (1i64 << (bits - 1)) - 1;
        if value < min || value > max {
            return Err(CodecError::value_out_of_range(value, bits));
        }
    }
    Ok(())
}

/// Append an unsigned integer of `size` bytes.
///
/// # Errors
///
/// Returns `ValueOutOfRange` if `value` does not fit in `size` bytes.
pub fn write_unsigned(out: &mut Vec<u8>, value: u64, size: usize, endian: Endian) -> CodecResult<()> {
    if size > 8 {
        return Err(CodecError::WidthTooLarge { bits: size * 8 });
    }
    check_unsigned(value, size * 8)?;
    let be = value.to_be_bytes();
    let bytes = be.get(8 - size..).unwrap_or_default();
    match endian {
        Endian::Big => out.extend_from_slice(bytes),
        Endian::Little => out.extend(bytes.iter().rev()),
    }
    Ok(())
}

/// Append a two's complement signed integer of `size` bytes.
///
/// # Errors
///
/// Returns `ValueOutOfRange` if `value` does not fit in `size` bytes.
pub fn write_signed(out: &mut Vec<u8>, value: i64, size: usize, endian: Endian) -> CodecResult<()> {
    check_signed(value, size * 8)?;
    let mask = if size >= 8 { u64::MAX } else { (1u64 << (size * 8)) - 1 };
    write_unsigned(out, (value as u64) & mask, size, endian)
}

/// Append an unsigned LEB128 value.
pub fn write_uleb128(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let group = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(group);
            return;
        }
        out.push(group | 0x80);
    }
}

/// Append a signed LEB128 value.
pub fn write_sleb128(out: &mut Vec<u8>, mut value: i64) {
    loop {
        let group = (value & 0x7F) as u8;
        value >>= 7;
        let done = (value == 0 && group & 0x40 == 0) || (value == -1 && group & 0x40 != 0);
        if done {
            out.push(group);
            return;
        }
        out.push(group | 0x80);
    }
}

/// Append raw bytes.
pub fn write_block(out: &mut Vec<u8>, block: &[u8]) {
    out.extend_from_slice(block);
}

/// Append a string followed by its zero terminator.
pub fn write_cstring(out: &mut Vec<u8>, text: &str) {
    out.extend_from_slice(text.as_bytes());
    out.push(0);
}

/// Reverse the bit order inside every byte.
///
/// HID packs sub-byte fields LSB-first while records read MSB-first.
pub fn reverse_bits_in_bytes(data: &[u8]) -> Vec<u8> {
    data.iter().map(|b| b.reverse_bits()).collect()
}

//! Cursor over a byte buffer with a bit-granular position and a limit.

use hidpp_errors::{CodecError, CodecResult};

use crate::primitives::{self, Endian};

/// Reads typed values from a borrowed buffer.
///
/// The position is tracked in bits; byte-granular operations require the
/// cursor to be aligned. Reads never go past `limit`.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
    limit: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            limit: data.len() * 8,
        }
    }

    /// Reader over `data[offset..offset + length]`, with positions still
    /// expressed relative to the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` if the window extends past the buffer.
    pub fn with_window(data: &'a [u8], offset: usize, length: usize) -> CodecResult<Self> {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= data.len())
            .ok_or_else(|| CodecError::out_of_bounds(offset * 8, length * 8, data.len() * 8))?;
        Ok(Self {
            data,
            position: offset * 8,
            limit: end * 8,
        })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Current position in bits.
    pub fn bit_position(&self) -> usize {
        self.position
    }

    /// Current position in whole bytes (rounded down).
    pub fn position(&self) -> usize {
        self.position / 8
    }

    /// Limit in bits.
    pub fn bit_limit(&self) -> usize {
        self.limit
    }

    pub fn remaining_bits(&self) -> usize {
        self.limit.saturating_sub(self.position)
    }

    pub fn remaining(&self) -> usize {
        self.remaining_bits() / 8
    }

    pub fn is_aligned(&self) -> bool {
        self.position % 8 == 0
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.limit
    }

    /// Narrow the limit; the new limit may not exceed the current one.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` if `bits` more bits are not available.
    pub fn restrict(&self, bits: usize) -> CodecResult<Self> {
        self.ensure(bits)?;
        Ok(Self {
            data: self.data,
            position: self.position,
            limit: self.position + bits,
        })
    }

    /// Move the cursor to an absolute bit position inside the limit.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` if `bit_position` is past the limit.
    pub fn seek_bits(&mut self, bit_position: usize) -> CodecResult<()> {
        if bit_position > self.limit {
            return Err(CodecError::out_of_bounds(bit_position, 0, self.limit));
        }
        self.position = bit_position;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `OutOfBounds` when skipping past the limit.
    pub fn skip_bits(&mut self, bits: usize) -> CodecResult<()> {
        self.ensure(bits)?;
        self.position += bits;
        Ok(())
    }

    fn ensure(&self, bits: usize) -> CodecResult<()> {
        if bits > self.remaining_bits() {
            return Err(CodecError::out_of_bounds(self.position, bits, self.limit));
        }
        Ok(())
    }

    fn ensure_aligned(&self) -> CodecResult<()> {
        if !self.is_aligned() {
            return Err(CodecError::Misaligned {
                offset: self.position,
            });
        }
        Ok(())
    }

    /// Read an unsigned value of `bits` bits, MSB-first. Zero bits read as 0.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` past the limit, `WidthTooLarge` above 64 bits.
    pub fn read_bits(&mut self, bits: usize) -> CodecResult<u64> {
        self.ensure(bits)?;
        let (value, next) = primitives::read_bits(self.data, self.position, bits)?;
        self.position = next;
        Ok(value.unwrap_or(0))
    }

    /// Read a two's complement value of `bits` bits.
    ///
    /// # Errors
    ///
    /// Same as [`BitReader::read_bits`].
    pub fn read_signed_bits(&mut self, bits: usize) -> CodecResult<i64> {
        let raw = self.read_bits(bits)?;
        Ok(primitives::sign_extend(raw, bits))
    }

    /// # Errors
    ///
    /// Returns `OutOfBounds` at the limit.
    pub fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// # Errors
    ///
    /// Returns `OutOfBounds` at the limit.
    pub fn peek_u8(&self) -> CodecResult<u8> {
        let mut lookahead = self.clone();
        lookahead.read_u8()
    }

    /// # Errors
    ///
    /// Returns `OutOfBounds` past the limit, `Misaligned` off a byte boundary.
    pub fn read_unsigned(&mut self, size: usize, endian: Endian) -> CodecResult<u64> {
        self.ensure_aligned()?;
        self.ensure(size * 8)?;
        let (value, next) = primitives::read_unsigned(self.data, self.position / 8, size, endian)?;
        self.position = next * 8;
        Ok(value.unwrap_or(0))
    }

    /// # Errors
    ///
    /// Same as [`BitReader::read_unsigned`].
    pub fn read_signed(&mut self, size: usize, endian: Endian) -> CodecResult<i64> {
        let raw = self.read_unsigned(size, endian)?;
        Ok(primitives::sign_extend(raw, size * 8))
    }

    /// # Errors
    ///
    /// Returns `OutOfBounds` at the limit.
    pub fn read_u16_be(&mut self) -> CodecResult<u16> {
        Ok(self.read_bits(16)? as u16)
    }

    /// # Errors
    ///
    /// Same as [`BitReader::read_unsigned`].
    pub fn read_u16_le(&mut self) -> CodecResult<u16> {
        Ok(self.read_unsigned(2, Endian::Little)? as u16)
    }

    /// # Errors
    ///
    /// Same as [`BitReader::read_unsigned`].
    pub fn read_u32_le(&mut self) -> CodecResult<u32> {
        Ok(self.read_unsigned(4, Endian::Little)? as u32)
    }

    /// Borrow `size` bytes from an aligned position.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` past the limit, `Misaligned` off a byte boundary.
    pub fn read_block(&mut self, size: usize) -> CodecResult<&'a [u8]> {
        self.ensure_aligned()?;
        self.ensure(size * 8)?;
        let (block, next) = primitives::read_block(self.data, self.position / 8, size)?;
        self.position = next * 8;
        Ok(block.unwrap_or_default())
    }

    /// Copy `size` bytes from any position, aligned or not.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` past the limit.
    pub fn read_bytes(&mut self, size: usize) -> CodecResult<Vec<u8>> {
        if self.is_aligned() {
            return self.read_block(size).map(<[u8]>::to_vec);
        }
        self.ensure(size * 8)?;
        (0..size).map(|_| self.read_u8()).collect()
    }

    /// Consume everything up to the limit.
    ///
    /// # Errors
    ///
    /// Returns `Misaligned` if the remaining bit count is not whole bytes.
    pub fn read_remaining(&mut self) -> CodecResult<Vec<u8>> {
        let bits = self.remaining_bits();
        if bits % 8 != 0 {
            return Err(CodecError::Misaligned {
                offset: self.position,
            });
        }
        self.read_bytes(bits / 8)
    }

    /// # Errors
    ///
    /// Returns `Misaligned`, `OutOfBounds` or `Overflow`.
    pub fn read_uleb128(&mut self) -> CodecResult<u64> {
        self.ensure_aligned()?;
        let window = self.window();
        let (value, next) = primitives::read_uleb128(window, self.position / 8)?;
        self.position = next * 8;
        Ok(value)
    }

    /// # Errors
    ///
    /// Returns `Misaligned`, `OutOfBounds` or `Overflow`.
    pub fn read_sleb128(&mut self) -> CodecResult<i64> {
        self.ensure_aligned()?;
        let window = self.window();
        let (value, next) = primitives::read_sleb128(window, self.position / 8)?;
        self.position = next * 8;
        Ok(value)
    }

    /// # Errors
    ///
    /// Returns `Misaligned`, `Unterminated` or `InvalidUtf8`.
    pub fn read_cstring(&mut self) -> CodecResult<String> {
        self.ensure_aligned()?;
        let window = self.window();
        let (text, next) = primitives::read_cstring(window, self.position / 8)?;
        self.position = next * 8;
        Ok(text)
    }

    /// The buffer cut at the limit, so that scanning readers respect it.
    fn window(&self) -> &'a [u8] {
        self.data.get(..self.limit / 8).unwrap_or(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_reader_u8_sequence() -> TestResult {
        let data = [0x01, 0x02, 0x03];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_u8()?, 0x01);
        assert_eq!(reader.read_u8()?, 0x02);
        assert_eq!(reader.read_u8()?, 0x03);
        assert!(reader.read_u8().is_err());
        Ok(())
    }

    #[test]
    fn test_reader_mixed_bits_and_bytes() -> TestResult {
        // function index 0xA, software id 0x5, then a big-endian u16
        let data = [0xA5, 0x12, 0x34];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(4)?, 0xA);
        assert!(!reader.is_aligned());
        assert!(matches!(
            reader.read_unsigned(2, Endian::Big),
            Err(CodecError::Misaligned { offset: 4 })
        ));
        assert_eq!(reader.read_bits(4)?, 0x5);
        assert_eq!(reader.read_unsigned(2, Endian::Big)?, 0x1234);
        assert!(reader.is_at_end());
        Ok(())
    }

    #[test]
    fn test_window_limits_reads() -> TestResult {
        let data = [0x10, 0x20, 0x30, 0x40];
        let mut reader = BitReader::with_window(&data, 1, 2)?;
        assert_eq!(reader.read_remaining()?, vec![0x20, 0x30]);
        assert!(reader.read_u8().is_err());
        Ok(())
    }

    #[test]
    fn test_unaligned_bytes() -> TestResult {
        let data = [0x0F, 0xF0];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(4)?;
        assert_eq!(reader.read_bytes(1)?, vec![0xFF]);
        Ok(())
    }

    #[test]
    fn test_cstring_respects_limit() -> TestResult {
        let data = b"ab\0cd\0";
        let mut reader = BitReader::with_window(data, 3, 2)?;
        assert!(matches!(
            reader.read_cstring(),
            Err(CodecError::Unterminated { offset: 3 })
        ));
        Ok(())
    }

    #[test]
    fn test_signed_bits() -> TestResult {
        let data = [0xF0];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_signed_bits(4)?, -1);
        assert_eq!(reader.read_signed_bits(4)?, 0);
        Ok(())
    }
}

//! Bit-granular writer.
//!
//! Values are appended MSB-first. Partial bits accumulate until a byte is
//! complete; [`BitWriter::finish`] pads the last byte with zeros in its low
//! bits.

use hidpp_errors::CodecResult;

use crate::primitives::{self, Endian};

#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    buffer: Vec<u8>,
    pending: u8,
    pending_bits: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            pending: 0,
            pending_bits: 0,
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.buffer.len() * 8 + self.pending_bits
    }

    pub fn is_aligned(&self) -> bool {
        self.pending_bits == 0
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len() == 0
    }

    /// Append the low `bits` bits of `value`.
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` if `value` needs more than `bits` bits and
    /// `WidthTooLarge` above 64 bits.
    pub fn write_bits(&mut self, value: u64, bits: usize) -> CodecResult<&mut Self> {
        if bits > 64 {
            return Err(hidpp_errors::CodecError::WidthTooLarge { bits });
        }
        primitives::check_unsigned(value, bits)?;
        let mut remaining = bits;
        while remaining > 0 {
            let free = 8 - self.pending_bits;
            let take = free.min(remaining);
            let chunk = (value >> (remaining - take)) & ((1u64 << take) - 1);
            self.pending = ((u64::from(self.pending) << take) | chunk) as u8;
            self.pending_bits += take;
            remaining -= take;
            if self.pending_bits == 8 {
                self.buffer.push(self.pending);
                self.pending = 0;
                self.pending_bits = 0;
            }
        }
        Ok(self)
    }

    /// Append a two's complement value in `bits` bits.
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` if `value` does not fit.
    pub fn write_signed_bits(&mut self, value: i64, bits: usize) -> CodecResult<&mut Self> {
        primitives::check_signed(value, bits)?;
        let mask = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
        self.write_bits((value as u64) & mask, bits)
    }

    /// # Errors
    ///
    /// Never fails for a byte; kept fallible for symmetry with the other writers.
    pub fn write_u8(&mut self, value: u8) -> CodecResult<&mut Self> {
        self.write_bits(u64::from(value), 8)
    }

    /// Append an integer of `size` bytes in the requested byte order.
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` if `value` does not fit in `size` bytes.
    pub fn write_unsigned(&mut self, value: u64, size: usize, endian: Endian) -> CodecResult<&mut Self> {
        let mut bytes = Vec::with_capacity(size);
        primitives::write_unsigned(&mut bytes, value, size, endian)?;
        self.write_bytes(&bytes);
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `ValueOutOfRange` if `value` does not fit in `size` bytes.
    pub fn write_signed(&mut self, value: i64, size: usize, endian: Endian) -> CodecResult<&mut Self> {
        let mut bytes = Vec::with_capacity(size);
        primitives::write_signed(&mut bytes, value, size, endian)?;
        self.write_bytes(&bytes);
        Ok(self)
    }

    /// Append raw bytes at any bit position.
    pub fn write_bytes(&mut self, data: &[u8]) -> &mut Self {
        if self.is_aligned() {
            self.buffer.extend_from_slice(data);
        } else {
            for byte in data {
                let free = 8 - self.pending_bits;
                let high = byte >> (8 - free);
                self.buffer.push((self.pending << free) | high);
                self.pending = byte & ((1u8 << (8 - free)) - 1);
            }
        }
        self
    }

    pub fn write_uleb128(&mut self, value: u64) -> &mut Self {
        let mut bytes = Vec::new();
        primitives::write_uleb128(&mut bytes, value);
        self.write_bytes(&bytes)
    }

    pub fn write_sleb128(&mut self, value: i64) -> &mut Self {
        let mut bytes = Vec::new();
        primitives::write_sleb128(&mut bytes, value);
        self.write_bytes(&bytes)
    }

    pub fn write_cstring(&mut self, text: &str) -> &mut Self {
        let mut bytes = Vec::with_capacity(text.len() + 1);
        primitives::write_cstring(&mut bytes, text);
        self.write_bytes(&bytes)
    }

    /// Append the bits of another writer, preserving sub-byte alignment.
    pub fn append(&mut self, other: &BitWriter) -> &mut Self {
        self.write_bytes(&other.buffer);
        if other.pending_bits > 0 {
            // other.pending holds exactly pending_bits bits, so this cannot fail
            for bit in (0..other.pending_bits).rev() {
                let chunk = (other.pending >> bit) & 1;
                self.push_bit(chunk);
            }
        }
        self
    }

    fn push_bit(&mut self, bit: u8) {
        self.pending = (self.pending << 1) | (bit & 1);
        self.pending_bits += 1;
        if self.pending_bits == 8 {
            self.buffer.push(self.pending);
            self.pending = 0;
            self.pending_bits = 0;
        }
    }

    /// Pad to a byte boundary with zero low bits.
    pub fn align(&mut self) -> &mut Self {
        if self.pending_bits > 0 {
            self.buffer.push(self.pending << (8 - self.pending_bits));
            self.pending = 0;
            self.pending_bits = 0;
        }
        self
    }

    /// Flush pending bits and return the bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.align();
        self.buffer
    }

    /// The completed bytes, excluding any pending partial byte.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }
}

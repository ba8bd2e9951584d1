//! Bit stream codec for HID++ reports and DWARF tables.
//!
//! This crate is the lowest layer of the harness. It reads and writes typed
//! primitives at bit-granular offsets:
//!
//! - [`primitives`]: stateless `(value, new_offset)` readers and appending
//!   writers (fixed-width integers in either byte order, LEB128, blocks,
//!   null-terminated strings, MSB-first bit fields)
//! - [`BitReader`]: a cursor with a limit, used by record parsing
//! - [`BitWriter`]: an accumulator that packs sub-byte fields MSB-first and
//!   pads the final byte with zero low bits
//! - [`HexList`]: hex display/parse for logs and test vectors

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod hex;
pub mod primitives;
pub mod reader;
pub mod writer;

pub use hex::HexList;
pub use primitives::{Endian, reverse_bits_in_bytes};
pub use reader::BitReader;
pub use writer::BitWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_reads_what_writer_wrote() -> Result<(), Box<dyn std::error::Error>> {
        let mut writer = BitWriter::new();
        writer
            .write_u8(0x11)?
            .write_bits(0x3, 4)?
            .write_bits(0xA, 4)?
            .write_uleb128(300)
            .write_cstring("G502");
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_u8()?, 0x11);
        assert_eq!(reader.read_bits(4)?, 0x3);
        assert_eq!(reader.read_bits(4)?, 0xA);
        assert_eq!(reader.read_uleb128()?, 300);
        assert_eq!(reader.read_cstring()?, "G502");
        assert!(reader.is_at_end());
        Ok(())
    }
}

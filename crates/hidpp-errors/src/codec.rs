//! Bit stream codec errors.

use crate::common::ErrorSeverity;

/// Failures raised by the bit stream reader and writer.
///
/// Offsets and sizes are expressed in bits so that sub-byte fields report
/// their exact position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A read needed more bits than remain in the buffer.
    #[error("read of {needed} bits at bit offset {offset} exceeds buffer of {available} bits")]
    OutOfBounds {
        /// Bit offset where the read started
        offset: usize,
        /// Number of bits requested
        needed: usize,
        /// Total number of bits in the buffer (or current limit)
        available: usize,
    },

    /// A value does not fit in the declared field width.
    #[error("value {value:#x} does not fit in {bits} bits")]
    ValueOutOfRange {
        /// The offending value
        value: i128,
        /// Declared width in bits
        bits: usize,
    },

    /// A width larger than the integer primitives support.
    #[error("width of {bits} bits exceeds the 64-bit integer limit")]
    WidthTooLarge {
        /// Requested width in bits
        bits: usize,
    },

    /// A variable-length integer ran past the 64-bit range.
    #[error("LEB128 value at byte offset {offset} overflows 64 bits")]
    Overflow {
        /// Byte offset where the variable-length integer started
        offset: usize,
    },

    /// A null-terminated string did not contain valid UTF-8.
    #[error("string at byte offset {offset} is not valid UTF-8")]
    InvalidUtf8 {
        /// Byte offset where the string started
        offset: usize,
    },

    /// A byte-granular operation was attempted at a sub-byte offset.
    #[error("byte operation at unaligned bit offset {offset}")]
    Misaligned {
        /// Bit offset of the attempted operation
        offset: usize,
    },

    /// A hexadecimal text could not be decoded.
    #[error("invalid hex digit at position {position}")]
    InvalidHex {
        /// Character position of the bad digit
        position: usize,
    },

    /// A null-terminated string had no terminator before the limit.
    #[error("string at byte offset {offset} has no terminator")]
    Unterminated {
        /// Byte offset where the string started
        offset: usize,
    },
}

impl CodecError {
    /// Create an out-of-bounds error.
    #[must_use]
    pub fn out_of_bounds(offset: usize, needed: usize, available: usize) -> Self {
        Self::OutOfBounds {
            offset,
            needed,
            available,
        }
    }

    /// Create a value-out-of-range error.
    #[must_use]
    pub fn value_out_of_range(value: impl Into<i128>, bits: usize) -> Self {
        Self::ValueOutOfRange {
            value: value.into(),
            bits,
        }
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CodecError::OutOfBounds { .. }
            | CodecError::Overflow { .. }
            | CodecError::InvalidUtf8 { .. }
            | CodecError::Unterminated { .. } => ErrorSeverity::DeviceFault,
            CodecError::ValueOutOfRange { .. } | CodecError::InvalidHex { .. } => ErrorSeverity::Misuse,
            CodecError::WidthTooLarge { .. } | CodecError::Misaligned { .. } => ErrorSeverity::Declaration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_display() {
        let err = CodecError::out_of_bounds(16, 8, 16);
        assert_eq!(
            err.to_string(),
            "read of 8 bits at bit offset 16 exceeds buffer of 16 bits"
        );
    }

    #[test]
    fn test_value_out_of_range_display() {
        let err = CodecError::value_out_of_range(0x1FFu16, 8);
        assert_eq!(err.to_string(), "value 0x1ff does not fit in 8 bits");
        assert_eq!(err.severity(), ErrorSeverity::Misuse);
    }
}

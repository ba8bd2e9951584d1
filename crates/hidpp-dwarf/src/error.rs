//! DWARF decoding errors.

use hidpp_errors::{CodecError, HidppError};

/// Failures raised while decoding DWARF sections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DwarfError {
    /// The underlying byte stream ran short or held a bad value.
    #[error("{section}: {source}")]
    Codec {
        /// Section being decoded
        section: &'static str,
        /// Codec failure
        #[source]
        source: CodecError,
    },

    /// A unit header announced a version this decoder does not handle.
    #[error("{section}: unsupported version {version}")]
    UnsupportedVersion {
        /// Section being decoded
        section: &'static str,
        /// Announced version
        version: u16,
    },

    /// An initial length in the reserved `0xfffffff0..0xffffffff` range.
    #[error("{section}: reserved initial length {length:#x}")]
    ReservedLength {
        /// Section being decoded
        section: &'static str,
        /// The raw 32-bit length
        length: u64,
    },

    /// An address size other than 1, 2, 4 or 8 bytes.
    #[error("unsupported address size {0}")]
    UnsupportedAddressSize(u64),

    /// A line program header with a zero line range.
    #[error(".debug_line: line_range is zero")]
    ZeroLineRange,

    /// A DIE referenced an abbreviation code missing from its table.
    #[error(".debug_info: unknown abbreviation code {code} at offset {offset:#x}")]
    UnknownAbbreviation {
        /// Abbreviation code read from the DIE
        code: u64,
        /// Section offset of the DIE
        offset: usize,
    },

    /// An attribute form this decoder cannot size.
    #[error(".debug_info: unknown attribute form {0:#x}")]
    UnknownForm(u64),
}

impl DwarfError {
    pub(crate) fn codec(section: &'static str) -> impl FnOnce(CodecError) -> Self {
        move |source| Self::Codec { section, source }
    }
}

impl From<DwarfError> for HidppError {
    fn from(error: DwarfError) -> Self {
        match error {
            DwarfError::Codec { source, .. } => HidppError::Codec(source),
            other => HidppError::Other(other.to_string()),
        }
    }
}

/// A specialized `Result` type for DWARF decoding.
pub type Result<T> = std::result::Result<T, DwarfError>;

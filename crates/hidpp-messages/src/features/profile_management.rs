//! ProfileManagement (0x8101) file directory.
//!
//! A directory is a sequence of fixed eight-byte file entries followed by a
//! CRC-32 over the serialized entries.

use hidpp_errors::{FieldError, Result};
use hidpp_fields::{FieldDescriptor, Record, Value, record_list, schema};
use tracing::debug;

use crate::category::GAMING;

pub mod fields {
    pub const FILE_ID_MSB: &str = "file_id_msb";
    pub const FILE_ID_LSB: &str = "file_id_lsb";
    pub const FEATURE_ID: &str = "feature_id";
    pub const FILE_TYPE_ID: &str = "file_type_id";
    pub const SETTINGS: &str = "settings";
    pub const FILE_LENGTH: &str = "file_length";
    pub const FILES: &str = "files";
    pub const CRC_32: &str = "crc_32";
}

/// Bytes taken by one directory entry.
pub const FILE_ENTRY_SIZE: usize = 8;

fn file_fits(_data: &[u8], offset: usize, limit: usize) -> bool {
    offset + FILE_ENTRY_SIZE <= limit
}

schema! {
    pub static FILE = "File", length = FILE_ENTRY_SIZE * 8, parents = [GAMING], accept = file_fits;
    FieldDescriptor::unsigned(fields::FILE_ID_MSB, 8).with_default(0),
    FieldDescriptor::unsigned(fields::FILE_ID_LSB, 8),
    FieldDescriptor::unsigned(fields::FEATURE_ID, 16),
    FieldDescriptor::unsigned(fields::FILE_TYPE_ID, 8),
    FieldDescriptor::unsigned(fields::SETTINGS, 8).with_default(0),
    FieldDescriptor::unsigned(fields::FILE_LENGTH, 16),
}

record_list! { pub static FILES = "Files"; FILE }

schema! {
    pub static DIRECTORY = "Directory", parents = [GAMING];
    FieldDescriptor::list(fields::FILES, &FILES, 0),
    FieldDescriptor::unsigned(fields::CRC_32, 32),
}

/// CRC-32 over the concatenated serialization of `records`.
///
/// # Errors
///
/// Any serialization error of the records.
pub fn crc32_of_records(records: &[Record]) -> Result<u32> {
    let mut hasher = crc32fast::Hasher::new();
    for record in records {
        hasher.update(&record.to_bytes()?);
    }
    Ok(hasher.finalize())
}

fn files_of(directory: &Record) -> &[Record] {
    directory
        .try_get(fields::FILES)
        .and_then(Value::as_list)
        .unwrap_or_default()
}

/// Compute the directory CRC and store it in `crc_32`.
///
/// # Errors
///
/// `TypeMismatch` if `directory` is not a [`DIRECTORY`] record, or a file
/// serialization error.
pub fn seal(directory: &mut Record) -> Result<u32> {
    ensure_directory(directory)?;
    let crc = crc32_of_records(files_of(directory))?;
    directory.set(fields::CRC_32, crc)?;
    debug!(crc, files = files_of(directory).len(), "sealed profile directory");
    Ok(crc)
}

/// Whether the stored `crc_32` matches the files.
///
/// # Errors
///
/// As [`seal`], plus `MissingValue` when no CRC is stored.
pub fn verify(directory: &Record) -> Result<bool> {
    ensure_directory(directory)?;
    let stored = directory.get_u64(fields::CRC_32)?;
    let computed = crc32_of_records(files_of(directory))?;
    Ok(stored == u64::from(computed))
}

fn ensure_directory(record: &Record) -> Result<()> {
    if record.is_a(&DIRECTORY) {
        return Ok(());
    }
    Err(FieldError::TypeMismatch {
        field: record.name().to_string(),
        expected: "Directory",
        actual: "record",
    }
    .into())
}

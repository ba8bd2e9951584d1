//! # hidpp-dwarf
//!
//! DWARF 2 to 4 decoding for on-target coverage analysis of device
//! firmware: maps instruction addresses back to source lines.
//!
//! ## Sections
//!
//! - [`line`] - `.debug_line` headers and the line number state machine
//! - [`aranges`] - `.debug_aranges` address range sets
//! - [`abbrev`] - `.debug_abbrev` tables
//! - [`info`] - `.debug_info` compile unit entries
//! - [`address_map`] - the joined `address -> (file, line, column)` table
//!
//! All decoding goes through the `hidpp-bitstream` reader in little-endian
//! mode.
//!
//! ## Example
//!
//! ```rust
//! use hidpp_dwarf::prelude::*;
//!
//! let sections = DebugSections::default();
//! let info = DebugInfo::parse(&sections)?;
//! assert!(info.address_map.is_empty());
//! # Ok::<(), hidpp_dwarf::DwarfError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod abbrev;
pub mod address_map;
pub mod aranges;
pub mod constants;
pub mod error;
pub mod info;
pub mod line;
pub mod prelude;

mod unit;

pub use abbrev::{Abbreviation, AbbreviationTable, AttributeSpec};
pub use address_map::{AddressMap, DebugInfo, DebugSections, SourceLocation};
pub use aranges::{AddressRange, ArangeSet, parse_aranges};
pub use error::{DwarfError, Result};
pub use info::{AttributeValue, CompilationUnit, UnitHeader, parse_compilation_units};
pub use line::{FileEntry, LineProgram, LineProgramHeader, LineRow};
pub use unit::Format;

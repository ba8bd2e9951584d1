//! Prelude for hidpp-dwarf.

pub use crate::address_map::{AddressMap, DebugInfo, DebugSections, SourceLocation};
pub use crate::error::{DwarfError, Result};
pub use crate::line::{LineProgram, LineRow};

//! Address to source location mapping for coverage analysis.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aranges::{ArangeSet, parse_aranges};
use crate::error::Result;
use crate::info::{CompilationUnit, parse_compilation_units};
use crate::line::LineProgram;

/// Raw debug sections of one image. Missing sections are empty slices.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugSections<'a> {
    pub info: &'a [u8],
    pub abbrev: &'a [u8],
    pub line: &'a [u8],
    pub aranges: &'a [u8],
    pub str: &'a [u8],
}

/// Where an instruction address comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u64,
    pub column: u64,
    pub is_stmt: bool,
    pub basic_block: bool,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Address to source location table built from line programs.
///
/// When several rows share an address the last one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMap {
    locations: BTreeMap<u64, SourceLocation>,
    sequences: Vec<Range<u64>>,
}

impl AddressMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every row of `program`.
    pub fn add_program(&mut self, program: &LineProgram) {
        let mut sequence_start = None;
        for row in &program.rows {
            if row.end_sequence {
                if let Some(start) = sequence_start.take() {
                    self.sequences.push(start..row.address);
                }
                continue;
            }
            sequence_start.get_or_insert(row.address);
            let file = program
                .header
                .file_path(row.file)
                .unwrap_or_else(|| format!("<file {}>", row.file));
            self.locations.insert(
                row.address,
                SourceLocation {
                    file,
                    line: row.line,
                    column: row.column,
                    is_stmt: row.is_stmt,
                    basic_block: row.basic_block,
                },
            );
        }
    }

    /// Location of the row starting exactly at `address`.
    pub fn get(&self, address: u64) -> Option<&SourceLocation> {
        self.locations.get(&address)
    }

    /// Location of the row covering `address`: the closest row at or below
    /// it, inside a terminated sequence.
    pub fn lookup(&self, address: u64) -> Option<&SourceLocation> {
        if !self.sequences.iter().any(|sequence| sequence.contains(&address)) {
            return None;
        }
        self.locations.range(..=address).next_back().map(|(_, location)| location)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &SourceLocation)> + '_ {
        self.locations.iter().map(|(address, location)| (*address, location))
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Everything decoded from the debug sections of one image.
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    pub units: Vec<CompilationUnit>,
    pub aranges: Vec<ArangeSet>,
    pub programs: Vec<LineProgram>,
    pub address_map: AddressMap,
}

impl DebugInfo {
    /// Decode the sections and join them into an address map.
    ///
    /// Line programs are taken from the compile units' `DW_AT_stmt_list`;
    /// without `.debug_info` every program in `.debug_line` is used.
    ///
    /// # Errors
    ///
    /// The first decoding error of any section.
    pub fn parse(sections: &DebugSections<'_>) -> Result<Self> {
        let units = parse_compilation_units(sections.info, sections.abbrev, sections.str)?;
        let aranges = parse_aranges(sections.aranges)?;
        let programs = if units.is_empty() {
            LineProgram::parse_all(sections.line)?
        } else {
            units
                .iter()
                .filter_map(|unit| unit.stmt_list)
                .map(|offset| LineProgram::parse(sections.line, crate::unit::to_usize(offset)))
                .collect::<Result<Vec<_>>>()?
        };

        let mut address_map = AddressMap::new();
        for program in &programs {
            address_map.add_program(program);
        }
        debug!(
            units = units.len(),
            range_sets = aranges.len(),
            programs = programs.len(),
            addresses = address_map.len(),
            "debug sections decoded"
        );
        Ok(Self {
            units,
            aranges,
            programs,
            address_map,
        })
    }

    /// Compile unit covering `address`, through `.debug_aranges` first and
    /// the units' own pc ranges otherwise.
    pub fn unit_for_address(&self, address: u64) -> Option<&CompilationUnit> {
        let from_ranges = self
            .aranges
            .iter()
            .find(|set| set.contains(address))
            .and_then(|set| {
                self.units
                    .iter()
                    .find(|unit| unit.header.offset as u64 == set.debug_info_offset)
            });
        from_ranges.or_else(|| self.units.iter().find(|unit| unit.contains(address)))
    }

    pub fn location(&self, address: u64) -> Option<&SourceLocation> {
        self.address_map.lookup(address)
    }
}

//! `.debug_line`: line program headers (versions 2 to 4) and the line
//! number state machine.
//!
//! Running a program yields one [`LineRow`] per emitted row of the line
//! table, end-of-sequence rows included.

use hidpp_bitstream::{BitReader, Endian};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{line_extended, line_opcode, section};
use crate::error::{DwarfError, Result};
use crate::unit::{self, Format, UnitFrame};

const SECTION: &str = section::LINE;

/// One entry of the header's file table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    /// Index into the include directories; 0 is the compilation directory.
    pub directory_index: u64,
    pub modification_time: u64,
    pub length: u64,
}

/// Header of one line program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineProgramHeader {
    /// Section offset of the unit (the `DW_AT_stmt_list` value).
    pub offset: usize,
    pub format: Format,
    pub version: u16,
    pub minimum_instruction_length: u8,
    /// Always 1 before version 4.
    pub maximum_operations_per_instruction: u8,
    pub default_is_stmt: bool,
    pub line_base: i8,
    pub line_range: u8,
    pub opcode_base: u8,
    /// Operand counts of standard opcodes `1..opcode_base`.
    pub standard_opcode_lengths: Vec<u8>,
    pub include_directories: Vec<String>,
    pub file_names: Vec<FileEntry>,
}

impl LineProgramHeader {
    /// File entry for a 1-based file register value.
    pub fn file(&self, index: u64) -> Option<&FileEntry> {
        let index = usize::try_from(index).ok()?.checked_sub(1)?;
        self.file_names.get(index)
    }

    /// Path of a file, joined with its include directory when it has one.
    pub fn file_path(&self, index: u64) -> Option<String> {
        let entry = self.file(index)?;
        let directory = usize::try_from(entry.directory_index)
            .ok()
            .and_then(|dir| dir.checked_sub(1))
            .and_then(|dir| self.include_directories.get(dir));
        Some(match directory {
            Some(directory) if !entry.name.starts_with('/') => format!("{directory}/{}", entry.name),
            _ => entry.name.clone(),
        })
    }

    /// Split a special opcode into its operation advance and line delta.
    ///
    /// The advance uses integer division by `line_range`.
    pub fn special_opcode_effect(&self, opcode: u8) -> (u64, i64) {
        let adjusted = opcode.saturating_sub(self.opcode_base);
        let range = self.line_range.max(1);
        let operation_advance = u64::from(adjusted / range);
        let line_delta = i64::from(self.line_base) + i64::from(adjusted % range);
        (operation_advance, line_delta)
    }
}

/// One row of the line number table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineRow {
    pub address: u64,
    pub file: u64,
    pub line: u64,
    pub column: u64,
    pub is_stmt: bool,
    pub basic_block: bool,
    pub end_sequence: bool,
    pub prologue_end: bool,
    pub epilogue_begin: bool,
    pub isa: u64,
    pub discriminator: u64,
}

/// A decoded line program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineProgram {
    pub header: LineProgramHeader,
    pub rows: Vec<LineRow>,
}

impl LineProgram {
    /// Decode the line program whose unit starts at `offset`.
    ///
    /// # Errors
    ///
    /// `UnsupportedVersion` outside versions 2 to 4, `ZeroLineRange`, and
    /// codec errors for truncated data.
    pub fn parse(section: &[u8], offset: usize) -> Result<Self> {
        let frame = unit::read_unit_frame(SECTION, section, offset)?;
        let mut reader = unit::body_reader(SECTION, section, &frame)?;
        let (header, program_start) = parse_header(&mut reader, &frame)?;
        let program = BitReader::with_window(section, program_start, frame.end.saturating_sub(program_start))
            .map_err(DwarfError::codec(SECTION))?;
        let mut machine = LineStateMachine::new(header);
        machine.run(program)?;
        Ok(Self {
            header: machine.header,
            rows: machine.rows,
        })
    }

    /// Decode every line program in the section, in order.
    ///
    /// # Errors
    ///
    /// The first failing program's error.
    pub fn parse_all(section: &[u8]) -> Result<Vec<Self>> {
        let mut programs = Vec::new();
        let mut offset = 0;
        while offset < section.len() {
            let frame = unit::read_unit_frame(SECTION, section, offset)?;
            programs.push(Self::parse(section, offset)?);
            offset = frame.end;
        }
        Ok(programs)
    }

    /// Rows that start a location, end-of-sequence rows excluded.
    pub fn locations(&self) -> impl Iterator<Item = &LineRow> + '_ {
        self.rows.iter().filter(|row| !row.end_sequence)
    }
}

fn parse_header(reader: &mut BitReader<'_>, frame: &UnitFrame) -> Result<(LineProgramHeader, usize)> {
    let codec = || DwarfError::codec(SECTION);
    let version = reader.read_u16_le().map_err(codec())?;
    if !(2..=4).contains(&version) {
        return Err(DwarfError::UnsupportedVersion {
            section: SECTION,
            version,
        });
    }
    let header_length = unit::read_offset(reader, frame.format).map_err(codec())?;
    let program_start = reader.position().saturating_add(unit::to_usize(header_length));

    let minimum_instruction_length = reader.read_u8().map_err(codec())?;
    let maximum_operations_per_instruction = if version >= 4 {
        reader.read_u8().map_err(codec())?
    } else {
        1
    };
    let default_is_stmt = reader.read_u8().map_err(codec())? != 0;
    let line_base = reader.read_signed(1, Endian::Little).map_err(codec())? as i8;
    let line_range = reader.read_u8().map_err(codec())?;
    if line_range == 0 {
        return Err(DwarfError::ZeroLineRange);
    }
    let opcode_base = reader.read_u8().map_err(codec())?;
    let standard_opcode_lengths = reader
        .read_bytes(usize::from(opcode_base.saturating_sub(1)))
        .map_err(codec())?;

    let mut include_directories = Vec::new();
    loop {
        let directory = reader.read_cstring().map_err(codec())?;
        if directory.is_empty() {
            break;
        }
        include_directories.push(directory);
    }

    let mut file_names = Vec::new();
    loop {
        let name = reader.read_cstring().map_err(codec())?;
        if name.is_empty() {
            break;
        }
        file_names.push(read_file_entry(reader, name)?);
    }

    let header = LineProgramHeader {
        offset: frame.start,
        format: frame.format,
        version,
        minimum_instruction_length,
        maximum_operations_per_instruction,
        default_is_stmt,
        line_base,
        line_range,
        opcode_base,
        standard_opcode_lengths,
        include_directories,
        file_names,
    };
    Ok((header, program_start))
}

fn read_file_entry(reader: &mut BitReader<'_>, name: String) -> Result<FileEntry> {
    let codec = || DwarfError::codec(SECTION);
    Ok(FileEntry {
        name,
        directory_index: reader.read_uleb128().map_err(codec())?,
        modification_time: reader.read_uleb128().map_err(codec())?,
        length: reader.read_uleb128().map_err(codec())?,
    })
}

/// Registers of the line number state machine.
#[derive(Debug, Clone, Copy)]
struct Registers {
    address: u64,
    op_index: u64,
    file: u64,
    line: u64,
    column: u64,
    is_stmt: bool,
    basic_block: bool,
    end_sequence: bool,
    prologue_end: bool,
    epilogue_begin: bool,
    isa: u64,
    discriminator: u64,
}

impl Registers {
    fn new(default_is_stmt: bool) -> Self {
        Self {
            address: 0,
            op_index: 0,
            file: 1,
            line: 1,
            column: 0,
            is_stmt: default_is_stmt,
            basic_block: false,
            end_sequence: false,
            prologue_end: false,
            epilogue_begin: false,
            isa: 0,
            discriminator: 0,
        }
    }
}

struct LineStateMachine {
    header: LineProgramHeader,
    registers: Registers,
    rows: Vec<LineRow>,
}

impl LineStateMachine {
    fn new(header: LineProgramHeader) -> Self {
        let registers = Registers::new(header.default_is_stmt);
        Self {
            header,
            registers,
            rows: Vec::new(),
        }
    }

    fn emit_row(&mut self) {
        let r = &self.registers;
        self.rows.push(LineRow {
            address: r.address,
            file: r.file,
            line: r.line,
            column: r.column,
            is_stmt: r.is_stmt,
            basic_block: r.basic_block,
            end_sequence: r.end_sequence,
            prologue_end: r.prologue_end,
            epilogue_begin: r.epilogue_begin,
            isa: r.isa,
            discriminator: r.discriminator,
        });
        let r = &mut self.registers;
        r.basic_block = false;
        r.prologue_end = false;
        r.epilogue_begin = false;
        r.discriminator = 0;
    }

    fn advance(&mut self, operation_advance: u64) {
        let min_length = u64::from(self.header.minimum_instruction_length);
        let max_ops = u64::from(self.header.maximum_operations_per_instruction.max(1));
        let r = &mut self.registers;
        let total = r.op_index.wrapping_add(operation_advance);
        r.address = r.address.wrapping_add(min_length.wrapping_mul(total / max_ops));
        r.op_index = total % max_ops;
    }

    fn run(&mut self, mut program: BitReader<'_>) -> Result<()> {
        let codec = || DwarfError::codec(SECTION);
        while !program.is_at_end() {
            let opcode = program.read_u8().map_err(codec())?;
            if opcode >= self.header.opcode_base {
                let (operation_advance, line_delta) = self.header.special_opcode_effect(opcode);
                self.advance(operation_advance);
                self.registers.line = self.registers.line.saturating_add_signed(line_delta);
                self.emit_row();
                continue;
            }
            match opcode {
                line_opcode::EXTENDED => self.run_extended(&mut program)?,
                line_opcode::COPY => self.emit_row(),
                line_opcode::ADVANCE_PC => {
                    let operation_advance = program.read_uleb128().map_err(codec())?;
                    self.advance(operation_advance);
                }
                line_opcode::ADVANCE_LINE => {
                    let delta = program.read_sleb128().map_err(codec())?;
                    self.registers.line = self.registers.line.saturating_add_signed(delta);
                }
                line_opcode::SET_FILE => self.registers.file = program.read_uleb128().map_err(codec())?,
                line_opcode::SET_COLUMN => self.registers.column = program.read_uleb128().map_err(codec())?,
                line_opcode::NEGATE_STMT => self.registers.is_stmt = !self.registers.is_stmt,
                line_opcode::SET_BASIC_BLOCK => self.registers.basic_block = true,
                line_opcode::CONST_ADD_PC => {
                    let (operation_advance, _) = self.header.special_opcode_effect(255);
                    self.advance(operation_advance);
                }
                line_opcode::FIXED_ADVANCE_PC => {
                    let delta = program.read_u16_le().map_err(codec())?;
                    self.registers.address = self.registers.address.wrapping_add(u64::from(delta));
                    self.registers.op_index = 0;
                }
                line_opcode::SET_PROLOGUE_END => self.registers.prologue_end = true,
                line_opcode::SET_EPILOGUE_BEGIN => self.registers.epilogue_begin = true,
                line_opcode::SET_ISA => self.registers.isa = program.read_uleb128().map_err(codec())?,
                unknown => {
                    let operands = self
                        .header
                        .standard_opcode_lengths
                        .get(usize::from(unknown) - 1)
                        .copied()
                        .unwrap_or(0);
                    debug!(opcode = unknown, operands, "skipping unknown standard opcode");
                    for _ in 0..operands {
                        program.read_uleb128().map_err(codec())?;
                    }
                }
            }
        }
        Ok(())
    }

    fn run_extended(&mut self, program: &mut BitReader<'_>) -> Result<()> {
        let codec = || DwarfError::codec(SECTION);
        let length = unit::to_usize(program.read_uleb128().map_err(codec())?);
        if length == 0 {
            return Ok(());
        }
        let sub_opcode = program.read_u8().map_err(codec())?;
        let operand_length = length - 1;
        match sub_opcode {
            line_extended::END_SEQUENCE => {
                self.registers.end_sequence = true;
                self.emit_row();
                self.registers = Registers::new(self.header.default_is_stmt);
            }
            line_extended::SET_ADDRESS => {
                let size = unit::address_size(operand_length as u64)?;
                self.registers.address = program.read_unsigned(size, Endian::Little).map_err(codec())?;
                self.registers.op_index = 0;
            }
            line_extended::DEFINE_FILE => {
                let name = program.read_cstring().map_err(codec())?;
                let entry = read_file_entry(program, name)?;
                self.header.file_names.push(entry);
            }
            line_extended::SET_DISCRIMINATOR => {
                self.registers.discriminator = program.read_uleb128().map_err(codec())?;
            }
            unknown => {
                debug!(opcode = unknown, length = operand_length, "skipping unknown extended opcode");
                program.read_bytes(operand_length).map_err(codec())?;
            }
        }
        Ok(())
    }
}

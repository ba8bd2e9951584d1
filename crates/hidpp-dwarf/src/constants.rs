//! DWARF constants used by the decoders.
//!
//! Only the values the compile-unit, address range and line program
//! decoders act on are listed; the rest of the standard is skipped by size.

/// `DW_TAG_*` values.
pub mod tag {
    pub const COMPILE_UNIT: u64 = 0x11;
}

/// `DW_AT_*` values.
pub mod attribute {
    pub const NAME: u64 = 0x03;
    pub const STMT_LIST: u64 = 0x10;
    pub const LOW_PC: u64 = 0x11;
    pub const HIGH_PC: u64 = 0x12;
    pub const LANGUAGE: u64 = 0x13;
    pub const COMP_DIR: u64 = 0x1B;
    pub const PRODUCER: u64 = 0x25;
}

/// `DW_FORM_*` values of DWARF 2 to 4.
pub mod form {
    pub const ADDR: u64 = 0x01;
    pub const BLOCK2: u64 = 0x03;
    pub const BLOCK4: u64 = 0x04;
    pub const DATA2: u64 = 0x05;
    pub const DATA4: u64 = 0x06;
    pub const DATA8: u64 = 0x07;
    pub const STRING: u64 = 0x08;
    pub const BLOCK: u64 = 0x09;
    pub const BLOCK1: u64 = 0x0A;
    pub const DATA1: u64 = 0x0B;
    pub const FLAG: u64 = 0x0C;
    pub const SDATA: u64 = 0x0D;
    pub const STRP: u64 = 0x0E;
    pub const UDATA: u64 = 0x0F;
    pub const REF_ADDR: u64 = 0x10;
    pub const REF1: u64 = 0x11;
    pub const REF2: u64 = 0x12;
    pub const REF4: u64 = 0x13;
    pub const REF8: u64 = 0x14;
    pub const REF_UDATA: u64 = 0x15;
    pub const INDIRECT: u64 = 0x16;
    pub const SEC_OFFSET: u64 = 0x17;
    pub const EXPRLOC: u64 = 0x18;
    pub const FLAG_PRESENT: u64 = 0x19;
    pub const REF_SIG8: u64 = 0x20;
}

/// Standard line program opcodes (`DW_LNS_*`).
pub mod line_opcode {
    pub const EXTENDED: u8 = 0x00;
    pub const COPY: u8 = 0x01;
    pub const ADVANCE_PC: u8 = 0x02;
    pub const ADVANCE_LINE: u8 = 0x03;
    pub const SET_FILE: u8 = 0x04;
    pub const SET_COLUMN: u8 = 0x05;
    pub const NEGATE_STMT: u8 = 0x06;
    pub const SET_BASIC_BLOCK: u8 = 0x07;
    pub const CONST_ADD_PC: u8 = 0x08;
    pub const FIXED_ADVANCE_PC: u8 = 0x09;
    pub const SET_PROLOGUE_END: u8 = 0x0A;
    pub const SET_EPILOGUE_BEGIN: u8 = 0x0B;
    pub const SET_ISA: u8 = 0x0C;
}

/// Extended line program opcodes (`DW_LNE_*`).
pub mod line_extended {
    pub const END_SEQUENCE: u8 = 0x01;
    pub const SET_ADDRESS: u8 = 0x02;
    pub const DEFINE_FILE: u8 = 0x03;
    pub const SET_DISCRIMINATOR: u8 = 0x04;
}

/// Section names, as used in error messages.
pub mod section {
    pub const ABBREV: &str = ".debug_abbrev";
    pub const ARANGES: &str = ".debug_aranges";
    pub const INFO: &str = ".debug_info";
    pub const LINE: &str = ".debug_line";
    pub const STR: &str = ".debug_str";
}

//! Decoding a complete set of debug sections into an address map.

use hidpp_bitstream::primitives::{write_cstring, write_sleb128, write_uleb128};
use hidpp_dwarf::constants::{line_extended, line_opcode};
use hidpp_dwarf::prelude::*;
use hidpp_dwarf::{Format, LineProgramHeader};
use proptest::prelude::*;

type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

const OPCODE_BASE: u8 = 13;
const LINE_BASE: i8 = -5;
const LINE_RANGE: u8 = 14;

fn with_length(body: Vec<u8>) -> Vec<u8> {
    let mut unit = (body.len() as u32).to_le_bytes().to_vec();
    unit.extend(body);
    unit
}

fn line_section(program: &[u8]) -> Vec<u8> {
    let mut rest = vec![1, 1, LINE_BASE as u8, LINE_RANGE, OPCODE_BASE];
    rest.extend([0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1]);
    write_cstring(&mut rest, "firmware/src");
    rest.push(0);
    write_cstring(&mut rest, "battery.c");
    rest.extend([1, 0, 0]);
    rest.push(0);

    let mut body = 3u16.to_le_bytes().to_vec();
    body.extend((rest.len() as u32).to_le_bytes());
    body.extend(rest);
    body.extend(program);
    with_length(body)
}

fn special(address_advance: u8, line_delta: i8) -> u8 {
    let adjusted = i16::from(line_delta) - i16::from(LINE_BASE) + i16::from(address_advance) * i16::from(LINE_RANGE);
    (adjusted + i16::from(OPCODE_BASE)) as u8
}

fn battery_program() -> Vec<u8> {
    let mut program = vec![0x00, 0x05, line_extended::SET_ADDRESS];
    program.extend(0x0800_0100u32.to_le_bytes());
    program.push(line_opcode::ADVANCE_LINE);
    write_sleb128(&mut program, 41);
    program.push(line_opcode::COPY);
    program.push(special(6, 1));
    program.extend([line_opcode::SET_COLUMN, 9]);
    program.push(special(4, 2));
    program.push(line_opcode::ADVANCE_PC);
    write_uleb128(&mut program, 10);
    program.extend([0x00, 0x01, line_extended::END_SEQUENCE]);
    program
}

fn sections_bytes() -> (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>) {
    let line = line_section(&battery_program());

    // name (strp), stmt_list (sec_offset), low_pc (addr), high_pc (data4)
    let abbrev = vec![
        0x01, 0x11, 0x00, 0x03, 0x0E, 0x10, 0x17, 0x11, 0x01, 0x12, 0x06, 0x00, 0x00, 0x00,
    ];
    let mut str_section = Vec::new();
    write_cstring(&mut str_section, "battery.c");

    let mut info = 4u16.to_le_bytes().to_vec();
    info.extend(0u32.to_le_bytes());
    info.push(4);
    info.push(0x01);
    info.extend(0u32.to_le_bytes());
    info.extend(0u32.to_le_bytes());
    info.extend(0x0800_0100u32.to_le_bytes());
    info.extend(0x14u32.to_le_bytes());
    let info = with_length(info);

    let mut aranges = 2u16.to_le_bytes().to_vec();
    aranges.extend(0u32.to_le_bytes());
    aranges.extend([4, 0, 0, 0, 0, 0]);
    aranges.extend(0x0800_0100u32.to_le_bytes());
    aranges.extend(0x14u32.to_le_bytes());
    aranges.extend([0; 8]);
    let aranges = with_length(aranges);

    (info, abbrev, line, aranges, str_section)
}

// ── Full pipeline ───────────────────────────────────────────────────────

#[test]
fn test_address_map_from_all_sections() -> TestResult {
    let (info, abbrev, line, aranges, str_section) = sections_bytes();
    let sections = DebugSections {
        info: &info,
        abbrev: &abbrev,
        line: &line,
        aranges: &aranges,
        str: &str_section,
    };
    let debug = DebugInfo::parse(&sections)?;

    assert_eq!(debug.units.len(), 1);
    assert_eq!(debug.programs.len(), 1);
    let map = &debug.address_map;
    let addresses: Vec<u64> = map.iter().map(|(address, _)| address).collect();
    assert_eq!(addresses, vec![0x0800_0100, 0x0800_0106, 0x0800_010A]);

    let first = map.get(0x0800_0100).ok_or("first row missing")?;
    assert_eq!(first.to_string(), "firmware/src/battery.c:42:0");
    assert!(first.is_stmt);
    assert_eq!(map.get(0x0800_010A).map(ToString::to_string).as_deref(), Some("firmware/src/battery.c:45:9"));

    // Inside the sequence, between rows.
    assert_eq!(debug.location(0x0800_0108).map(|l| l.line), Some(43));
    // Past the end of the sequence.
    assert!(debug.location(0x0800_0114).is_none());
    assert!(debug.location(0x0800_00FF).is_none());

    let unit = debug.unit_for_address(0x0800_0110).ok_or("no unit for address")?;
    assert_eq!(unit.name.as_deref(), Some("battery.c"));
    assert!(debug.unit_for_address(0x0900_0000).is_none());
    Ok(())
}

#[test]
fn test_line_only_image() -> TestResult {
    let line = line_section(&battery_program());
    let debug = DebugInfo::parse(&DebugSections {
        line: &line,
        ..DebugSections::default()
    })?;
    assert!(debug.units.is_empty());
    assert_eq!(debug.address_map.len(), 3);
    assert!(debug.unit_for_address(0x0800_0100).is_none());
    Ok(())
}

#[test]
fn test_location_serializes() -> TestResult {
    let line = line_section(&battery_program());
    let program = LineProgram::parse(&line, 0)?;
    let mut map = AddressMap::new();
    map.add_program(&program);
    let location = map.get(0x0800_0106).ok_or("row missing")?;
    let json = serde_json::to_value(location)?;
    assert_eq!(json["file"], "firmware/src/battery.c");
    assert_eq!(json["line"], 43);
    assert_eq!(json["is_stmt"], true);
    Ok(())
}

#[test]
fn test_truncated_line_section_is_an_error() {
    let mut line = line_section(&battery_program());
    line.truncate(line.len() - 3);
    assert!(matches!(
        LineProgram::parse(&line, 0),
        Err(DwarfError::Codec { .. })
    ));
}

// ── Special opcodes ─────────────────────────────────────────────────────

fn header() -> LineProgramHeader {
    LineProgramHeader {
        offset: 0,
        format: Format::Dwarf32,
        version: 3,
        minimum_instruction_length: 1,
        maximum_operations_per_instruction: 1,
        default_is_stmt: true,
        line_base: LINE_BASE,
        line_range: LINE_RANGE,
        opcode_base: OPCODE_BASE,
        standard_opcode_lengths: vec![0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1],
        include_directories: Vec::new(),
        file_names: Vec::new(),
    }
}

proptest! {
    #[test]
    fn test_special_opcode_round_trip(advance in 0u8..17, delta in -5i8..9) {
        let opcode = special(advance, delta);
        prop_assert_eq!(header().special_opcode_effect(opcode), (u64::from(advance), i64::from(delta)));
    }

    #[test]
    fn test_special_opcode_rows(advance in 0u8..17, delta in 0i8..9) {
        let mut program = vec![0x00, 0x05, line_extended::SET_ADDRESS, 0x00, 0x20, 0x00, 0x00];
        program.push(special(advance, delta));
        let line = line_section(&program);
        let parsed = LineProgram::parse(&line, 0).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let row = parsed.rows.first().copied().unwrap_or_default();
        prop_assert_eq!(row.address, 0x2000 + u64::from(advance));
        prop_assert_eq!(row.line, 1 + delta as u64);
    }
}

//! Every record type the classifier can resolve survives parse then
//! serialize byte for byte.

use hidpp_fields::{Record, Schema};
use hidpp_messages::ReportKind;
use hidpp_messages::catalog::{EVENTS, RECEIVER_EVENTS, RECEIVER_RESPONSES, RESPONSES, VLP_EVENTS, VLP_RESPONSES};
use hidpp_messages::features::error;
use proptest::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn registered_schemas() -> Vec<&'static Schema> {
    let features = [RESPONSES, EVENTS, VLP_RESPONSES, VLP_EVENTS]
        .into_iter()
        .flatten()
        .map(|entry| entry.schema);
    let registers = RECEIVER_RESPONSES
        .iter()
        .chain(RECEIVER_EVENTS)
        .map(|entry| entry.schema);
    let sized_errors = [ReportKind::Short, ReportKind::Long, ReportKind::VeryLong]
        .into_iter()
        .map(error::hidpp2_error_for);
    features.chain(registers).chain(sized_errors).collect()
}

fn frame_len(schema: &Schema) -> Result<usize, String> {
    schema
        .fixed_bits()
        .map(|bits| bits / 8)
        .ok_or_else(|| format!("{} has no fixed frame size", schema.name()))
}

/// Non-zero ASCII, so text fields keep every byte.
fn pattern(len: usize) -> Vec<u8> {
    (0x21u8..=0x7E).cycle().take(len).collect()
}

#[test]
fn test_every_registered_schema_round_trips() -> TestResult {
    for schema in registered_schemas() {
        let frame = pattern(frame_len(schema)?);
        let record = Record::from_bytes(schema, &frame)?;
        assert_eq!(record.to_bytes()?, frame, "{}", schema.name());
    }
    Ok(())
}

#[test]
fn test_zeroed_frames_round_trip() -> TestResult {
    for schema in registered_schemas() {
        let frame = vec![0; frame_len(schema)?];
        let record = Record::from_bytes(schema, &frame)?;
        assert_eq!(record.to_bytes()?, frame, "{}", schema.name());
    }
    Ok(())
}

#[test]
fn test_error_layouts_match_report_sizes() -> TestResult {
    for kind in [ReportKind::Short, ReportKind::Long, ReportKind::VeryLong] {
        assert_eq!(frame_len(error::hidpp2_error_for(kind))?, kind.length());
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_random_payloads_round_trip(
        pick in any::<prop::sample::Index>(),
        seed in prop::collection::vec(1u8..0x80, 64),
    ) {
        let schemas = registered_schemas();
        let schema = schemas[pick.index(schemas.len())];
        let len = frame_len(schema).map_err(TestCaseError::fail)?;
        let frame: Vec<u8> = seed.iter().copied().cycle().take(len).collect();
        let record = Record::from_bytes(schema, &frame).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let bytes = record.to_bytes().map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(bytes, frame, "{}", schema.name());
    }
}

//! Property-based tests for error composition and classification.

use hidpp_errors::prelude::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_out_of_bounds_message_carries_offsets(offset in 0usize..4096, needed in 1usize..64) {
        let err: HidppError = CodecError::out_of_bounds(offset, needed, offset).into();
        let msg = err.to_string();
        prop_assert!(msg.contains(&offset.to_string()));
        prop_assert!(msg.contains(&needed.to_string()));
        prop_assert_eq!(err.category(), ErrorCategory::Codec);
    }

    #[test]
    fn test_unknown_feature_index_never_critical(index in any::<u8>()) {
        let err: HidppError = RegistryError::UnknownFeatureIndex(index).into();
        prop_assert!(!err.is_programmer_error());
        prop_assert!(err.is_expected());
    }

    #[test]
    fn test_empty_queue_is_normal(name in "[A-Za-z]{1,16}", ms in 0u64..10_000) {
        let err = QueueError::empty(&name, std::time::Duration::from_millis(ms));
        prop_assert!(err.is_empty());
        prop_assert!(err.to_string().contains(&name));
    }

    #[test]
    fn test_frame_context_preserves_classification(report in prop::collection::vec(any::<u8>(), 0..64)) {
        let result: std::result::Result<(), SchemaError> = Err(SchemaError::invalid("S", "bad"));
        let err = result.in_frame("classify", &report).err();
        prop_assert!(err.as_ref().is_some_and(HidppError::is_programmer_error));
        prop_assert!(err.as_ref().is_some_and(|e| e.category() == ErrorCategory::Schema));

        let shown = err.map(|e| e.to_string()).unwrap_or_default();
        let hex: Vec<String> = report.iter().map(|byte| format!("{byte:02X}")).collect();
        let expected = format!("classify [{}]", hex.join(" "));
        prop_assert!(shown.starts_with(&expected));
    }
}

#[test]
fn test_every_category_reachable() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let errors: Vec<HidppError> = vec![
        CodecError::WidthTooLarge { bits: 65 }.into(),
        SchemaError::invalid("S", "r").into(),
        FieldError::unknown("S", "x").into(),
        ListError::NoMatchingParser { list: "L".into(), offset: 0 }.into(),
        RegistryError::UnknownFeatureIndex(1).into(),
        QueueError::UnknownQueue("Q".into()).into(),
        HidppError::config("c"),
        HidppError::other("o"),
    ];
    let categories: Vec<ErrorCategory> = errors.iter().map(HidppError::category).collect();
    assert_eq!(
        categories,
        vec![
            ErrorCategory::Codec,
            ErrorCategory::Schema,
            ErrorCategory::Field,
            ErrorCategory::Field,
            ErrorCategory::Registry,
            ErrorCategory::Queue,
            ErrorCategory::Config,
            ErrorCategory::Other,
        ]
    );
    Ok(())
}

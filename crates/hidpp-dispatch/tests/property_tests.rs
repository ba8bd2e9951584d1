//! Property-based tests for feature index tables and message delivery.

use std::collections::BTreeSet;
use std::sync::Arc;

use hidpp_dispatch::prelude::*;
use hidpp_dispatch::{Classifier, FeatureIndexTable};
use hidpp_messages::ids::feature_ids;
use proptest::prelude::*;

fn hidpp_frame() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 6).prop_map(|tail| [vec![0x10], tail].concat()),
        prop::collection::vec(any::<u8>(), 19).prop_map(|tail| [vec![0x11], tail].concat()),
    ]
}

fn any_report() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![hidpp_frame(), prop::collection::vec(any::<u8>(), 0..24)]
}

fn queued(dispatcher: &Dispatcher) -> usize {
    dispatcher
        .queues()
        .iter()
        .chain(std::iter::once(dispatcher.default_queue()))
        .map(|queue| queue.len())
        .sum()
}

fn announce_known_features(dispatcher: &Dispatcher) {
    dispatcher.add_feature_entry(0x00, feature_ids::ROOT, 0);
    dispatcher.add_feature_entry(0x01, feature_ids::FEATURE_SET, 1);
    dispatcher.add_feature_entry(0x04, feature_ids::UNIFIED_BATTERY, 1);
    dispatcher.add_feature_entry(0x05, feature_ids::ONBOARD_PROFILES, 0);
    dispatcher.add_feature_entry(0x06, feature_ids::ADJUSTABLE_DPI, 0);
}

proptest! {
    #[test]
    fn test_inverse_feature_map_stays_unique(
        entries in prop::collection::vec((any::<u8>(), 0..8u16, 0..3u8), 0..64),
    ) {
        let mut table = FeatureIndexTable::hidpp();
        for (index, feature_id, version) in entries {
            table.add(index, feature_id, version);
            prop_assert_eq!(table.get(index).map(|key| (key.feature_id, key.version)), Some((feature_id, version)));

            let keys: BTreeSet<_> = table.entries().map(|(_, key)| key).collect();
            prop_assert_eq!(keys.len(), table.len());
        }
    }

    #[test]
    fn test_each_classified_message_lands_in_one_queue(
        reports in prop::collection::vec(hidpp_frame(), 1..32),
    ) {
        let dispatcher = Dispatcher::new(DispatcherConfig::default())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        announce_known_features(&dispatcher);

        for report in reports {
            let before = (queued(&dispatcher), dispatcher.sequence_number());
            let outcome = dispatcher.process_interrupt(&mut TransportMessage::new(report, 0));
            let after = (queued(&dispatcher), dispatcher.sequence_number());
            match outcome {
                Ok(Some(delivery)) => {
                    prop_assert_eq!(after, (before.0 + 1, before.1 + 1));
                    prop_assert_eq!(delivery.sequence, after.1);
                }
                Ok(None) | Err(_) => prop_assert_eq!(after, before),
            }
        }
    }

    #[test]
    fn test_without_handlers_everything_falls_back(
        reports in prop::collection::vec(any_report(), 1..32),
    ) {
        let registry = Arc::new(FeatureRegistry::standard().map_err(|e| TestCaseError::fail(e.to_string()))?);
        let dispatcher = Dispatcher::with_registry(DispatcherConfig::default(), registry)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        announce_known_features(&dispatcher);

        let mut delivered = 0;
        for report in reports {
            if let Ok(Some(delivery)) = dispatcher.process_interrupt(&mut TransportMessage::new(report, 0)) {
                prop_assert_eq!(delivery.handler.as_str(), DEFAULT_QUEUE_NAME);
                delivered += 1;
            }
        }
        prop_assert_eq!(dispatcher.default_queue().len(), delivered);
    }

    #[test]
    fn test_queues_only_hold_accepted_types(
        reports in prop::collection::vec(any_report(), 1..32),
    ) {
        let dispatcher = Dispatcher::new(DispatcherConfig::default())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        announce_known_features(&dispatcher);
        let delivered = reports
            .into_iter()
            .filter(|report| {
                matches!(
                    dispatcher.process_interrupt(&mut TransportMessage::new(report.clone(), 0)),
                    Ok(Some(_))
                )
            })
            .count();

        let mut drained = dispatcher.default_queue().drain().len();
        for queue in dispatcher.queues() {
            let records = queue.drain();
            drained += records.len();
            for record in records {
                prop_assert!(
                    queue.accepts(&record),
                    "{} holds a {}",
                    queue.name(),
                    record.schema().name()
                );
            }
        }
        prop_assert_eq!(drained, delivered);
    }

    #[test]
    fn test_classification_is_deterministic(report in any_report()) {
        let registry = Arc::new(FeatureRegistry::standard().map_err(|e| TestCaseError::fail(e.to_string()))?);
        let mut classifier = Classifier::new(registry, &DispatcherConfig::default());
        classifier.hidpp_index_mut().add(0x05, feature_ids::ONBOARD_PROFILES, 0);

        let first = classifier.classify(&TransportMessage::new(report.clone(), 1));
        let second = classifier.classify(&TransportMessage::new(report, 2));
        match (first, second) {
            (Ok(first), Ok(second)) => prop_assert_eq!(first, second),
            (Err(_), Err(_)) => {}
            (first, second) => prop_assert!(false, "diverging outcomes: {:?} / {:?}", first, second),
        }
    }
}

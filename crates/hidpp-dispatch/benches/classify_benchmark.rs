//! Performance benchmarks for classification and delivery.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hidpp_dispatch::prelude::*;
use hidpp_dispatch::Classifier;
use hidpp_messages::ids::feature_ids;

fn long_frame(head: &[u8]) -> Vec<u8> {
    let mut data = head.to_vec();
    data.resize(20, 0);
    data
}

fn bench_classify(c: &mut Criterion) {
    let Ok(registry) = FeatureRegistry::standard() else {
        return;
    };
    let mut classifier = Classifier::new(Arc::new(registry), &DispatcherConfig::default());
    classifier.hidpp_index_mut().add(0x00, feature_ids::ROOT, 0);
    classifier.hidpp_index_mut().add(0x05, feature_ids::ONBOARD_PROFILES, 0);

    let inputs = [
        ("root_response", long_frame(&[0x11, 0x01, 0x00, 0x0E, 0x05])),
        ("onboard_event", long_frame(&[0x11, 0x01, 0x05, 0x00, 0x01, 0x02])),
        ("register_error", vec![0x10, 0xFF, 0x8F, 0x81, 0xB5, 0x02, 0x00]),
        ("boot_keyboard", vec![0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]),
        ("unknown_index", long_frame(&[0x11, 0x01, 0x09, 0x0E])),
    ];

    let mut group = c.benchmark_group("classify");
    for (name, data) in inputs {
        let message = TransportMessage::new(data, 0);
        group.bench_with_input(BenchmarkId::from_parameter(name), &message, |b, message| {
            b.iter(|| classifier.classify(black_box(message)));
        });
    }
    group.finish();
}

fn bench_process_interrupt(c: &mut Criterion) {
    let Ok(dispatcher) = Dispatcher::new(DispatcherConfig::default()) else {
        return;
    };
    dispatcher.add_feature_entry(0x05, feature_ids::ONBOARD_PROFILES, 0);
    let frame = long_frame(&[0x11, 0x01, 0x05, 0x0E, 0x01, 0x02, 0x03]);

    c.bench_function("process_interrupt_to_queue", |b| {
        b.iter(|| {
            let mut message = TransportMessage::new(frame.clone(), 0);
            let outcome = dispatcher.process_interrupt(black_box(&mut message));
            dispatcher.queues().iter().for_each(|queue| queue.clear());
            outcome
        });
    });
}

criterion_group!(benches, bench_classify, bench_process_interrupt);
criterion_main!(benches);

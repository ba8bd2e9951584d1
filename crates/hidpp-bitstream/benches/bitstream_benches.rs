use criterion::{Criterion, criterion_group, criterion_main};
use hidpp_bitstream::{BitReader, BitWriter};
use std::hint::black_box;

fn bench_read_long_report(c: &mut Criterion) {
    let report: [u8; 20] = [
        0x11, 0x01, 0x05, 0x0E, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x00, 0x08, 0x09, 0x0A,
        0x0B, 0x00, 0x00, 0x00, 0x00,
    ];

    c.bench_function("read_hidpp_header_and_payload", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(black_box(&report));
            let mut acc = 0u64;
            for _ in 0..3 {
                acc ^= reader.read_bits(8).unwrap_or(0);
            }
            acc ^= reader.read_bits(4).unwrap_or(0);
            acc ^= reader.read_bits(4).unwrap_or(0);
            while !reader.is_at_end() {
                acc ^= reader.read_bits(8).unwrap_or(0);
            }
            black_box(acc)
        });
    });
}

fn bench_write_nibbles(c: &mut Criterion) {
    c.bench_function("write_sub_byte_fields", |b| {
        b.iter(|| {
            let mut writer = BitWriter::with_capacity(20);
            for i in 0..40u64 {
                let written = writer.write_bits(black_box(i & 0xF), 4);
                black_box(written.is_ok());
            }
            black_box(writer.finish())
        });
    });
}

criterion_group!(benches, bench_read_long_report, bench_write_nibbles);
criterion_main!(benches);

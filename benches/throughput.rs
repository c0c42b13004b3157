//! Codec throughput benchmarks

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use ins_driver::core::fix::GpsFix;
use ins_driver::core::protocol::{checksum, decode, encode, CommandKind};

fn encode_benchmark(c: &mut Criterion) {
    let fix = GpsFix::new(48.117_3, 11.516_7, 545.4);

    let mut group = c.benchmark_group("encode");

    group.bench_function("all_commands", |b| {
        b.iter(|| {
            for kind in CommandKind::ALL {
                let request = encode(black_box(kind), Some(&fix));
                black_box(request).ok();
            }
        })
    });

    group.bench_function("manual_fix", |b| {
        b.iter(|| black_box(encode(CommandKind::SetManualFix, black_box(Some(&fix)))).ok())
    });

    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let reply: &[u8] = b"$PIXSE,CONFIG,GPSKFM,2*47\r\n";

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(reply.len() as u64));

    group.bench_function("reply_token", |b| b.iter(|| black_box(decode(black_box(reply))).ok()));

    group.bench_function("checksum_verify", |b| {
        let frame = "$PIXSE,CONFIG,MANGPS,12.345678,-98.765432,10.500000,0.5,0.5,5.0*7f\r\n";
        b.iter(|| black_box(checksum::verify(black_box(frame))))
    });

    group.finish();
}

criterion_group!(benches, encode_benchmark, decode_benchmark);
criterion_main!(benches);

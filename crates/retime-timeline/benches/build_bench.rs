//! Benchmarks for the two build strategies.
//!
//! Run with: cargo bench -p retime-timeline

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use retime_core::MediaTime;
use retime_timeline::{BuildCancel, BuildStrategy, SourceClip, TimelineBuilder};

fn bench_strategies(c: &mut Criterion) {
    let builder = TimelineBuilder::default();
    let source = SourceClip::audio("Sound.aac", MediaTime::new(441_001, 44_100));
    let cancel = BuildCancel::new();

    for strategy in BuildStrategy::ALL {
        c.bench_function(&format!("build_{strategy}"), |bencher| {
            bencher.iter(|| builder.build(black_box(strategy), black_box(&source), &cancel));
        });
    }

    c.bench_function("compare_strategies", |bencher| {
        bencher.iter(|| builder.compare(black_box(&source)));
    });
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);

//! Benchmarks for both structuring strategies and the DOT codec.
//!
//! The input is a synthetic function of `n` regions chained one after the
//! other, alternating between `if .. else` diamonds and `while` loops.

use std::{fmt::Write, hint::black_box};

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use restructure::analysis::{analyze, derived_sequence, Cfg, Strategy};

fn synthetic_dot(regions: usize) -> String {
    let mut dot = String::from("digraph bench {\n    R0 [entry=true];\n");
    for i in 0..regions {
        let next = i + 1;
        if i % 2 == 0 {
            let _ = writeln!(
                dot,
                "    R{i} -> T{i} [cond=true]; R{i} -> F{i} [cond=false]; T{i} -> R{next}; F{i} -> R{next};"
            );
        } else {
            let _ = writeln!(
                dot,
                "    R{i} -> B{i} [cond=true]; R{i} -> R{next} [cond=false]; B{i} -> R{i};"
            );
        }
    }
    dot.push_str("}\n");
    dot
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("structure");
    for regions in [16, 128, 512] {
        let cfg = Cfg::from_dot(&synthetic_dot(regions)).unwrap();
        group.throughput(Throughput::Elements(regions as u64));

        for strategy in [Strategy::Hammock, Strategy::Interval] {
            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), regions),
                &cfg,
                |b, cfg| {
                    b.iter_batched(
                        || cfg.clone(),
                        |mut cfg| {
                            let analysis = analyze(&mut cfg, strategy).unwrap();
                            black_box(analysis)
                        },
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }
    group.finish();
}

fn bench_derived_sequence(c: &mut Criterion) {
    let cfg = Cfg::from_dot(&synthetic_dot(512)).unwrap();
    c.bench_function("derived_sequence_512", |b| {
        b.iter(|| black_box(derived_sequence(black_box(&cfg)).unwrap()));
    });
}

fn bench_dot_codec(c: &mut Criterion) {
    let text = synthetic_dot(512);
    let mut group = c.benchmark_group("dot");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("parse", |b| {
        b.iter(|| black_box(Cfg::from_dot(black_box(&text)).unwrap()));
    });

    let cfg = Cfg::from_dot(&text).unwrap();
    group.bench_function("write", |b| {
        b.iter(|| black_box(cfg.to_dot()));
    });
    group.finish();
}

criterion_group!(benches, bench_strategies, bench_derived_sequence, bench_dot_codec);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cosma::params::UniverseParameters;
use cosma::timefmt::format_timestamp;
use cosma::universe::SimulatedUniverse;

fn bench_generate_timeline(c: &mut Criterion) {
    let standard = SimulatedUniverse::with_created_at(
        "bench",
        UniverseParameters::default(),
        0,
    );
    let phantom = SimulatedUniverse::with_created_at(
        "bench-phantom",
        UniverseParameters::new(0.2, 0.8, 70.0, 1e-9, -1.2),
        0,
    );

    c.bench_function("generate_timeline_standard", |b| {
        b.iter(|| black_box(&standard).generate_timeline())
    });
    c.bench_function("generate_timeline_phantom", |b| {
        b.iter(|| black_box(&phantom).generate_timeline())
    });
}

fn bench_format_timestamp(c: &mut Criterion) {
    // One value per branch of the unit ladder.
    let samples: Vec<Option<f64>> = vec![
        None,
        Some(0.0),
        Some(-1.0),
        Some(f64::INFINITY),
        Some(1e-49),
        Some(1e-12),
        Some(1e-9),
        Some(3.8e-4),
        Some(0.2),
        Some(13.8),
        Some(1e100),
    ];

    c.bench_function("format_timestamp_ladder", |b| {
        b.iter(|| {
            for &t in &samples {
                black_box(format_timestamp(black_box(t)));
            }
        })
    });
}

criterion_group!(benches, bench_generate_timeline, bench_format_timestamp);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use farpoint_base::types::Vector;
use farpoint_selection::{FarthestPointSampling, Initialize, TargetSize};
use rand::prelude::*;
use rand_xorshift::XorShiftRng;

fn synthetic(n: usize, d: usize, seed: u64) -> Vec<Vector> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Vector::new((0..d).map(|_| rng.gen_range(-1.0..1.0)).collect()))
        .collect()
}

fn bench_fps(c: &mut Criterion) {
    let data = synthetic(8192, 16, 1234);
    let k = 32;

    let mut group = c.benchmark_group("fps");
    for frac in [0.25, 0.5, 1.0].iter() {
        let n = (data.len() as f64 * frac) as usize;
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut fps = FarthestPointSampling::new(Initialize::Index(0));
                fps.fit(black_box(&data[..n]), None, TargetSize::Count(k), false)
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fps);
criterion_main!(benches);

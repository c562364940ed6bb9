use broadphase::{GridIndex, SpatialIndex, SweepIndex};
use common::bb::Bb;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_bounds(count: usize) -> Vec<(u32, Bb)> {
    let mut rng: StdRng = SeedableRng::seed_from_u64(42);
    (0..count as u32)
        .map(|id| {
            let x = rng.gen_range(-1000.0..1000.0);
            let y = rng.gen_range(-1000.0..1000.0);
            let w = rng.gen_range(1.0..20.0);
            let h = rng.gen_range(1.0..20.0);
            (id, Bb::new(x, y, x + w, y + h))
        })
        .collect()
}

fn bench_each_pair(c: &mut Criterion) {
    let bounds = random_bounds(2000);

    c.bench_function("sweep_each_pair_2000", |b| {
        let mut index = SweepIndex::new();
        for &(id, bb) in &bounds {
            index.insert(id, bb);
        }
        b.iter(|| {
            let mut count = 0u32;
            index.each_pair(&mut |_, _| count += 1);
            black_box(count)
        })
    });

    c.bench_function("grid_each_pair_2000", |b| {
        let mut index = GridIndex::new(25.0, 2048).expect("valid grid parameters");
        for &(id, bb) in &bounds {
            index.insert(id, bb);
        }
        b.iter(|| {
            let mut count = 0u32;
            index.each_pair(&mut |_, _| count += 1);
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_each_pair);
criterion_main!(benches);

use broadphase::{BroadphaseError, GridIndex, SpatialIndex, SweepIndex};
use common::bb::Bb;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn boxes() -> Vec<(u32, Bb)> {
    vec![
        (1, Bb::new(0.0, 0.0, 10.0, 10.0)),
        (2, Bb::new(5.0, 5.0, 15.0, 15.0)),
        (3, Bb::new(40.0, 40.0, 50.0, 50.0)),
        (4, Bb::new(45.0, 45.0, 55.0, 55.0)),
        (5, Bb::new(-30.0, -30.0, -20.0, -20.0)),
    ]
}

fn collect_pairs(index: &mut dyn SpatialIndex) -> HashSet<(u32, u32)> {
    let mut pairs = HashSet::new();
    index.each_pair(&mut |a, b| {
        let key = if a < b { (a, b) } else { (b, a) };
        assert!(pairs.insert(key), "pair ({}, {}) reported twice", a, b);
    });
    pairs
}

fn collect_ids(index: &dyn SpatialIndex) -> HashSet<u32> {
    let mut ids = HashSet::new();
    index.each(&mut |id| {
        ids.insert(id);
    });
    ids
}

#[test]
fn test_sweep_pairs() {
    let mut index = SweepIndex::new();
    for (id, bb) in boxes() {
        index.insert(id, bb);
    }
    let pairs = collect_pairs(&mut index);
    assert_eq!(pairs, HashSet::from([(1, 2), (3, 4)]));
}

#[test]
fn test_grid_pairs() {
    let mut index = GridIndex::new(20.0, 16).unwrap();
    for (id, bb) in boxes() {
        index.insert(id, bb);
    }
    let pairs = collect_pairs(&mut index);
    assert_eq!(pairs, HashSet::from([(1, 2), (3, 4)]));
}

#[test]
fn test_query() {
    let mut index = SweepIndex::new();
    for (id, bb) in boxes() {
        index.insert(id, bb);
    }
    let mut hits = Vec::new();
    index.query(Bb::new(8.0, 8.0, 12.0, 12.0), &mut |id| hits.push(id));
    hits.sort();
    assert_eq!(hits, vec![1, 2]);
}

#[test]
fn test_remove_and_reindex() {
    let mut index = GridIndex::new(10.0, 16).unwrap();
    index.insert(7, Bb::new(0.0, 0.0, 5.0, 5.0));
    index.insert(8, Bb::new(100.0, 100.0, 105.0, 105.0));

    let mut hits = Vec::new();
    index.query(Bb::new(0.0, 0.0, 10.0, 10.0), &mut |id| hits.push(id));
    assert_eq!(hits, vec![7]);

    // Move 7 next to 8; the old cells must be vacated.
    assert!(index.reindex(7, Bb::new(101.0, 101.0, 106.0, 106.0)));
    let mut hits = Vec::new();
    index.query(Bb::new(0.0, 0.0, 10.0, 10.0), &mut |id| hits.push(id));
    assert!(hits.is_empty());
    let pairs = collect_pairs(&mut index);
    assert_eq!(pairs, HashSet::from([(7, 8)]));

    assert!(index.remove(7));
    assert!(!index.remove(7));
    assert!(!index.reindex(7, Bb::new(0.0, 0.0, 1.0, 1.0)));
    assert_eq!(index.len(), 1);
}

#[test]
fn test_grid_rejects_bad_parameters() {
    assert_eq!(
        GridIndex::new(0.0, 16).unwrap_err(),
        BroadphaseError::InvalidCellDimension { dim: 0.0 }
    );
    assert_eq!(
        GridIndex::new(10.0, 0).unwrap_err(),
        BroadphaseError::InvalidCellCount { count: 0 }
    );
}

#[test]
fn test_sweep_and_grid_agree_on_random_scenes() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(99);
    let mut sweep = SweepIndex::new();
    let mut grid = GridIndex::new(25.0, 256).unwrap();
    for id in 0..200u32 {
        let x = rng.gen_range(-500.0..500.0);
        let y = rng.gen_range(-500.0..500.0);
        let w = rng.gen_range(1.0..30.0);
        let h = rng.gen_range(1.0..30.0);
        let bb = Bb::new(x, y, x + w, y + h);
        sweep.insert(id, bb);
        grid.insert(id, bb);
    }
    assert_eq!(collect_pairs(&mut sweep), collect_pairs(&mut grid));
    assert_eq!(collect_ids(&sweep), collect_ids(&grid));
}

#[test]
fn test_migration_preserves_contents() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(7);
    let mut sweep = SweepIndex::new();
    for id in 0..64u32 {
        let x = rng.gen_range(-100.0..100.0);
        let y = rng.gen_range(-100.0..100.0);
        sweep.insert(id, Bb::new(x, y, x + 5.0, y + 5.0));
    }

    // Same bulk-copy the space performs when hot-swapping indices.
    let mut grid = GridIndex::new(10.0, 64).unwrap();
    sweep.each(&mut |id| {
        grid.insert(id, sweep.bb(id).expect("tracked id has bounds"));
    });

    assert_eq!(collect_ids(&sweep), collect_ids(&grid));
    for id in 0..64u32 {
        assert_eq!(sweep.bb(id), grid.bb(id));
    }
}

#![allow(dead_code)]

use lentil::{LeafInput, Merge};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Random rows and a monotone merge sequence joining them
pub fn random_linkage(n: usize, seed: u64) -> (Vec<LeafInput>, Vec<Merge>) {
    let mut rng = StdRng::seed_from_u64(seed);

    let leaves = (0..n)
        .map(|i| {
            let features: Vec<f64> = (0..3).map(|_| rng.random_range(-5.0..5.0)).collect();
            LeafInput::dense(format!("obj_{}", i), &features)
        })
        .collect();

    let mut active: Vec<(usize, usize)> = (0..n).map(|i| (i, 1)).collect();
    let mut merges = Vec::with_capacity(n.saturating_sub(1));
    let mut distance = 0.0;

    while active.len() > 1 {
        let a = active.swap_remove(rng.random_range(0..active.len()));
        let b = active.swap_remove(rng.random_range(0..active.len()));
        distance += rng.random_range(0.05..1.0);
        let id = n + merges.len();
        merges.push(Merge::new(a.0, b.0, distance, a.1 + b.1));
        active.push((id, a.1 + b.1));
    }

    (leaves, merges)
}

/// 6 rows: {0,1} @1, {2,3} @2, {4,5} @3, {01,23} @8, {0123,45} @12
pub fn six_leaves() -> (Vec<LeafInput>, Vec<Merge>) {
    let leaves = (0..6)
        .map(|i| LeafInput::dense(format!("obj_{}", i), &[i as f64, 10.0 * i as f64]))
        .collect();
    let merges = vec![
        Merge::new(0, 1, 1.0, 2),
        Merge::new(2, 3, 2.0, 2),
        Merge::new(4, 5, 3.0, 2),
        Merge::new(6, 7, 8.0, 4),
        Merge::new(9, 8, 12.0, 6),
    ];
    (leaves, merges)
}

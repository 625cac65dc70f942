//! Parallel odd-even transposition sort used by the bundled kernel.
//!
//! Runs in whatever rayon pool is current; the kernel binary installs one
//! sized to the requested thread count.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Fixed seed so every run sorts the same numbers.
pub const SEED: u64 = 42;
pub const MAX_VALUE: i32 = 1_000_000;

/// Pairs per rayon task. Every compare-exchange costs the same, so fixed
/// blocks avoid splitting a phase into thousands of two-element jobs.
const MIN_PAIRS_PER_TASK: usize = 1024;

pub fn random_input(n: usize, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new_inclusive(0, MAX_VALUE);
    (0..n).map(|_| dist.sample(&mut rng)).collect()
}

/// n phases, each an odd pass (1,2),(3,4).. then an even pass (0,1),(2,3)..
/// Each pass finishes before the next starts.
pub fn odd_even_sort(data: &mut [i32]) {
    let n = data.len();
    if n < 2 {
        return;
    }
    for _ in 0..n {
        compare_exchange_pairs(&mut data[1..]);
        compare_exchange_pairs(data);
    }
}

fn compare_exchange_pairs(data: &mut [i32]) {
    data.par_chunks_mut(2)
        .with_min_len(MIN_PAIRS_PER_TASK)
        .for_each(|pair| {
            if pair.len() == 2 && pair[0] > pair[1] {
                pair.swap(0, 1);
            }
        });
}

pub fn is_sorted(data: &[i32]) -> bool {
    data.windows(2).all(|w| w[0] <= w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_random_input() {
        let mut data = random_input(500, SEED);
        let mut expected = data.clone();
        expected.sort_unstable();

        odd_even_sort(&mut data);
        assert!(is_sorted(&data));
        assert_eq!(data, expected);
    }

    #[test]
    fn test_reverse_order_needs_all_phases() {
        let mut data: Vec<i32> = (0..257).rev().collect();
        odd_even_sort(&mut data);
        assert_eq!(data, (0..257).collect::<Vec<_>>());
    }

    #[test]
    fn test_trivial_inputs() {
        let mut empty: Vec<i32> = Vec::new();
        odd_even_sort(&mut empty);
        assert!(empty.is_empty());

        let mut one = vec![7];
        odd_even_sort(&mut one);
        assert_eq!(one, vec![7]);
    }

    #[test]
    fn test_sorted_in_sized_pool() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(3)
            .build()
            .unwrap();
        let mut data = random_input(3000, 7);
        pool.install(|| odd_even_sort(&mut data));
        assert!(is_sorted(&data));
    }

    #[test]
    fn test_input_is_reproducible() {
        let a = random_input(100, SEED);
        assert_eq!(a, random_input(100, SEED));
        assert!(a.iter().all(|&v| (0..=MAX_VALUE).contains(&v)));
    }
}

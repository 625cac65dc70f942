//! Weak scaling: the input grows with the thread count.
//!
//! The sort is O(N^2), so growing N by ~sqrt(2) per step roughly doubles the
//! total work as threads double. That is not constant work per thread; the
//! growth law is kept as-is so results stay comparable.

use tracing::info;

use crate::config::ExperimentConfig;
use crate::runner::{Measurement, Probe};

#[derive(Debug)]
pub struct WeakRow {
    /// Untruncated size from the growth law.
    pub target_size: f64,
    /// `measurement.input_size` is `target_size` truncated.
    pub measurement: Measurement,
}

/// Target sizes for `steps` consecutive weak-scaling rows.
pub fn weak_sizes(start: u64, factor: f64, steps: usize) -> Vec<f64> {
    std::iter::successors(Some(start as f64), |size| Some(size * factor))
        .take(steps)
        .collect()
}

pub fn weak_scaling<P: Probe>(config: &ExperimentConfig, probe: &mut P) -> Vec<WeakRow> {
    info!(
        start = config.weak_start(),
        factor = config.growth_factor,
        "weak scaling sweep"
    );

    let sizes = weak_sizes(config.weak_start(), config.growth_factor, config.threads.len());

    sizes
        .into_iter()
        .zip(&config.threads)
        .map(|(target_size, &p)| WeakRow {
            target_size,
            measurement: probe.record(target_size as u64, p),
        })
        .collect()
}

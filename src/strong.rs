//! Strong scaling: fixed input size, growing thread count.

use tracing::{debug, info};

use crate::config::ExperimentConfig;
use crate::runner::{Measurement, Probe};

#[derive(Debug)]
pub struct StrongRow {
    pub measurement: Measurement,
    /// `None` when this row or the baseline row failed.
    pub speedup: Option<f64>,
}

/// All rows for one input size, in configured thread order.
#[derive(Debug)]
pub struct StrongSeries {
    pub input_size: u64,
    pub rows: Vec<StrongRow>,
}

impl StrongSeries {
    pub fn failures(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.measurement.timing.is_failure())
            .count()
    }
}

/// `baseline / time`, or 0.0 for a zero-duration time.
pub fn speedup(baseline: f64, time: f64) -> f64 {
    if time > 0.0 {
        baseline / time
    } else {
        0.0
    }
}

/// Sweeps every configured thread count for the small then the large size.
///
/// The baseline is whatever the first configured thread count measures, so
/// conventional speedup needs `threads[0] == 1`.
pub fn strong_scaling<P: Probe>(config: &ExperimentConfig, probe: &mut P) -> Vec<StrongSeries> {
    debug!(baseline = ?config.baseline_threads(), "speedup baseline");
    config
        .strong_sizes()
        .iter()
        .map(|&n| sweep_size(n, &config.threads, probe))
        .collect()
}

fn sweep_size<P: Probe>(n: u64, threads: &[usize], probe: &mut P) -> StrongSeries {
    info!(n, "strong scaling sweep");

    let mut rows: Vec<StrongRow> = Vec::with_capacity(threads.len());
    let mut baseline = None;

    for (i, &p) in threads.iter().enumerate() {
        let measurement = probe.record(n, p);
        let time = measurement.timing.seconds();

        let speedup = if i == 0 {
            baseline = time;
            time.map(|_| 1.0)
        } else {
            match (baseline, time) {
                (Some(base), Some(t)) => Some(speedup(base, t)),
                _ => None,
            }
        };

        rows.push(StrongRow {
            measurement,
            speedup,
        });
    }

    StrongSeries {
        input_size: n,
        rows,
    }
}

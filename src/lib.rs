//! Strong and weak scaling study for a parallel odd-even sort.
//!
//! The workload is an external executable (`<exe> <N> <P>` printing elapsed
//! seconds). This crate builds it, sweeps (N, P) pairs one at a time, and
//! reduces the timings into speedup and weak-scaling tables.

pub mod build;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod runner;
pub mod sort;
pub mod strong;
pub mod suite;
pub mod weak;

pub use config::ExperimentConfig;
pub use error::{BuildError, ConfigError, MeasureError, SuiteError};
pub use runner::{BenchmarkRunner, Measurement, Probe, Timing};

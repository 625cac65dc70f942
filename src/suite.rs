//! Build once, then run the selected analyses and print their tables.

use std::io::Write;
use std::path::PathBuf;

use clap::ValueEnum;
use tracing::info;

use crate::config::ExperimentConfig;
use crate::error::{BuildError, SuiteError};
use crate::report;
use crate::runner::Probe;
use crate::strong::{self, StrongSeries};
use crate::weak::{self, WeakRow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Analysis {
    Strong,
    Weak,
    #[default]
    All,
}

impl Analysis {
    fn strong(self) -> bool {
        matches!(self, Analysis::Strong | Analysis::All)
    }

    fn weak(self) -> bool {
        matches!(self, Analysis::Weak | Analysis::All)
    }
}

#[derive(Debug, Default)]
pub struct SuiteReport {
    pub strong: Vec<StrongSeries>,
    pub weak: Vec<WeakRow>,
}

/// Runs `build`, and only if it succeeds hands the executable to
/// `make_probe` and sweeps. A build error returns before any measurement.
pub fn run_suite<B, F, P, W>(
    config: &ExperimentConfig,
    analysis: Analysis,
    build: B,
    make_probe: F,
    out: &mut W,
) -> Result<SuiteReport, SuiteError>
where
    B: FnOnce() -> Result<PathBuf, BuildError>,
    F: FnOnce(PathBuf) -> P,
    P: Probe,
    W: Write,
{
    let exe = build()?;
    info!(exe = %exe.display(), threads = ?config.threads, "starting experiments");
    let mut probe = make_probe(exe);
    let mut suite = SuiteReport::default();

    if analysis.strong() {
        suite.strong = strong::strong_scaling(config, &mut probe);
        report::write_strong(out, &suite.strong)?;
    }
    if analysis.weak() {
        suite.weak = weak::weak_scaling(config, &mut probe);
        report::write_weak(out, &suite.weak)?;
    }
    out.flush()?;

    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Timing;
    use std::cell::Cell;

    fn small_config() -> ExperimentConfig {
        ExperimentConfig {
            threads: vec![1, 2, 4],
            small_size: 100,
            large_size: 400,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_failure_skips_measurements() {
        let calls = Cell::new(0);
        let counter = &calls;
        let mut out = Vec::new();
        let result = run_suite(
            &small_config(),
            Analysis::All,
            || {
                Err(BuildError::Status {
                    program: "g++".to_string(),
                    code: Some(1),
                })
            },
            move |_exe| {
                move |_n: u64, _p: usize| {
                    counter.set(counter.get() + 1);
                    Timing::Success(1.0)
                }
            },
            &mut out,
        );

        assert!(matches!(result, Err(SuiteError::Build(_))));
        assert_eq!(calls.get(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_all_runs_strong_then_weak() {
        let mut out = Vec::new();
        let suite = run_suite(
            &small_config(),
            Analysis::All,
            || Ok(PathBuf::from("./fake")),
            |exe| {
                assert_eq!(exe, PathBuf::from("./fake"));
                |n: u64, p: usize| Timing::Success(n as f64 / p as f64)
            },
            &mut out,
        )
        .unwrap();

        assert_eq!(suite.strong.len(), 2);
        assert_eq!(suite.weak.len(), 3);

        let text = String::from_utf8(out).unwrap();
        let strong_at = text.find("STRONG SCALING").unwrap();
        let weak_at = text.find("WEAK SCALING").unwrap();
        assert!(strong_at < weak_at);
    }

    #[test]
    fn test_single_analysis() {
        let mut out = Vec::new();
        let suite = run_suite(
            &small_config(),
            Analysis::Weak,
            || Ok(PathBuf::from("./fake")),
            |_| |_n: u64, _p: usize| Timing::Success(1.0),
            &mut out,
        )
        .unwrap();

        assert!(suite.strong.is_empty());
        assert_eq!(suite.weak.len(), 3);
        assert!(!String::from_utf8(out).unwrap().contains("STRONG"));
    }
}

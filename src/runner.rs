//! Runs the benchmark executable once per (N, P) pair.
//!
//! Contract with the executable: `<exe> <N> <P>`, exit status 0, and the
//! elapsed seconds as the only thing on stdout. Anything else is a failed
//! measurement; the sweep carries on with the failure recorded.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::MeasureError;

#[derive(Debug)]
pub enum Timing {
    Success(f64),
    Failure(MeasureError),
}

impl Timing {
    pub fn seconds(&self) -> Option<f64> {
        match self {
            Timing::Success(secs) => Some(*secs),
            Timing::Failure(_) => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Timing::Failure(_))
    }
}

impl From<Result<f64, MeasureError>> for Timing {
    fn from(result: Result<f64, MeasureError>) -> Self {
        match result {
            Ok(secs) => Timing::Success(secs),
            Err(err) => Timing::Failure(err),
        }
    }
}

/// One recorded invocation.
#[derive(Debug)]
pub struct Measurement {
    pub input_size: u64,
    pub threads: usize,
    pub timing: Timing,
}

/// Anything that can time the workload at a given size and thread count.
///
/// Implementations block until the run completes; analyzers never overlap
/// two measurements.
pub trait Probe {
    fn measure(&mut self, n: u64, p: usize) -> Timing;

    fn record(&mut self, n: u64, p: usize) -> Measurement {
        Measurement {
            input_size: n,
            threads: p,
            timing: self.measure(n, p),
        }
    }
}

impl<F> Probe for F
where
    F: FnMut(u64, usize) -> Timing,
{
    fn measure(&mut self, n: u64, p: usize) -> Timing {
        self(n, p)
    }
}

/// Subprocess-backed probe.
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    executable: PathBuf,
}

impl BenchmarkRunner {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    fn invoke(&self, n: u64, p: usize) -> Result<f64, MeasureError> {
        let output = Command::new(&self.executable)
            .arg(n.to_string())
            .arg(p.to_string())
            .output()
            .map_err(MeasureError::Spawn)?;

        if !output.status.success() {
            return Err(MeasureError::ExitStatus {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| MeasureError::NotUtf8)?;
        parse_seconds(&stdout)
    }
}

impl Probe for BenchmarkRunner {
    fn measure(&mut self, n: u64, p: usize) -> Timing {
        debug!(exe = %self.executable.display(), n, p, "running benchmark");
        let timing = Timing::from(self.invoke(n, p));
        if let Timing::Failure(err) = &timing {
            warn!(n, p, "measurement failed: {}", err);
        }
        timing
    }
}

/// Parses the whole trimmed stdout as elapsed seconds.
pub fn parse_seconds(stdout: &str) -> Result<f64, MeasureError> {
    let text = stdout.trim();
    let secs: f64 = text.parse().map_err(|source| MeasureError::Parse {
        output: text.to_string(),
        source,
    })?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(MeasureError::InvalidDuration(secs));
    }
    Ok(secs)
}

//! Error types for the build, measurement and configuration stages.

use std::io;
use std::num::ParseFloatError;
use std::path::PathBuf;

use thiserror::Error;

/// Toolchain invocation failed. Fatal: nothing is measured after this.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("benchmark source {} not found", .0.display())]
    MissingSource(PathBuf),

    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {}", exit_code(.code))]
    Status { program: String, code: Option<i32> },

    #[error("`{program}` succeeded but reported no benchmark executable")]
    NoArtifact { program: String },
}

/// Why a single `<exe> <N> <P>` invocation produced no timing.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("failed to launch benchmark: {0}")]
    Spawn(#[source] io::Error),

    #[error("benchmark exited with {}: {stderr}", exit_code(.code))]
    ExitStatus { code: Option<i32>, stderr: String },

    #[error("benchmark output is not valid UTF-8")]
    NotUtf8,

    #[error("could not parse {output:?} as seconds: {source}")]
    Parse {
        output: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("benchmark reported an invalid duration: {0}")]
    InvalidDuration(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("thread list is empty")]
    EmptyThreads,

    #[error("thread counts must be positive")]
    ZeroThreads,

    #[error("thread counts must be strictly ascending ({prev} then {next})")]
    NotAscending { prev: usize, next: usize },

    #[error("{0} must be positive")]
    ZeroSize(&'static str),

    #[error("growth factor must be a finite value >= 1.0, got {0}")]
    GrowthFactor(f64),

    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that stops a suite run before both tables are written.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("compilation failed: {0}")]
    Build(#[from] BuildError),

    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_status_message() {
        let err = BuildError::Status {
            program: "g++".to_string(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "`g++` exited with status 1");
    }

    #[test]
    fn test_missing_source_message() {
        let err = BuildError::MissingSource(PathBuf::from("odd_even_sort.cpp"));
        assert_eq!(err.to_string(), "benchmark source odd_even_sort.cpp not found");
    }

    #[test]
    fn test_signal_exit_message() {
        let err = MeasureError::ExitStatus {
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_not_ascending_message() {
        let err = ConfigError::NotAscending { prev: 4, next: 2 };
        assert_eq!(
            err.to_string(),
            "thread counts must be strictly ascending (4 then 2)"
        );
    }
}

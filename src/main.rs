// Scaling study runner
// Builds the odd-even sort kernel, then runs strong and/or weak scaling
// sweeps against it and prints the tables.

use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use odd_even_scaling::build::{
    self, BuildSpec, Platform, ProfileKind, DEFAULT_COMPILER, DEFAULT_OUTPUT, DEFAULT_SOURCE,
    MISSING_SOURCE_HINT,
};
use odd_even_scaling::config::{ExperimentConfig, Overrides};
use odd_even_scaling::logging;
use odd_even_scaling::suite::{self, Analysis};
use odd_even_scaling::{BenchmarkRunner, BuildError, SuiteError};

#[derive(Debug, Parser)]
#[command(
    name = "scaling",
    about = "Strong and weak scaling study for a parallel odd-even sort"
)]
struct Cli {
    /// Which experiment to run
    #[arg(value_enum, default_value_t = Analysis::All)]
    analysis: Analysis,

    /// JSON file with experiment parameters
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Thread counts, ascending; the first is the speedup baseline
    #[arg(long, value_delimiter = ',', value_name = "P,P,...")]
    threads: Option<Vec<usize>>,

    /// Small strong-scaling input size
    #[arg(long, value_name = "N")]
    small: Option<u64>,

    /// Large strong-scaling input size
    #[arg(long, value_name = "N")]
    large: Option<u64>,

    /// First weak-scaling input size (defaults to the small size)
    #[arg(long, value_name = "N")]
    weak_start: Option<u64>,

    /// Weak-scaling size multiplier per step
    #[arg(long, value_name = "FACTOR")]
    growth: Option<f64>,

    /// Build profile (auto falls back to the bundled Rust kernel when the
    /// source file is missing)
    #[arg(long, value_enum, default_value_t = ProfileKind::Auto)]
    toolchain: ProfileKind,

    /// C++ compiler
    #[arg(long, default_value = DEFAULT_COMPILER)]
    compiler: String,

    /// Benchmark source file
    #[arg(long, default_value = DEFAULT_SOURCE)]
    source: PathBuf,

    /// Executable to produce
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Skip the build and run this executable
    #[arg(long, value_name = "EXE")]
    executable: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short)]
    quiet: bool,
}

impl Cli {
    fn experiment_config(&self) -> anyhow::Result<ExperimentConfig> {
        let base = match &self.config {
            Some(path) => ExperimentConfig::from_file(path)?,
            None => ExperimentConfig::default(),
        };
        let overrides = Overrides {
            threads: self.threads.clone(),
            small_size: self.small,
            large_size: self.large,
            weak_start: self.weak_start,
            growth_factor: self.growth,
        };
        base.with_overrides(overrides)
            .context("invalid experiment configuration")
    }

    fn build_spec(&self) -> BuildSpec {
        BuildSpec {
            platform: Platform::current(),
            source: self.source.clone(),
            output: self.output.clone(),
            compiler: self.compiler.clone(),
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.experiment_config()?;
    let spec = cli.build_spec();
    let profile = cli.toolchain.select(&spec);

    let build_step = || match &cli.executable {
        Some(exe) => Ok(exe.clone()),
        None => build::build(&spec, profile.as_ref()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match suite::run_suite(
        &config,
        cli.analysis,
        build_step,
        |exe| BenchmarkRunner::new(exe),
        &mut out,
    ) {
        Ok(_) => Ok(()),
        Err(SuiteError::Build(err)) => {
            // Nothing after the build can run without the executable.
            error!("{}", err);
            let hint = match err {
                BuildError::MissingSource(_) => MISSING_SOURCE_HINT,
                _ => profile.remediation(),
            };
            eprintln!("{:-<50}", "");
            eprintln!("{}", hint);
            eprintln!("{:-<50}", "");
            process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet);

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

//! Compiles the benchmark kernel before any measurement runs.
//!
//! Each platform family gets a [`ToolchainProfile`] that knows its own
//! flags and how to explain a failed build.

use std::env::consts::EXE_SUFFIX;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clap::ValueEnum;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::BuildError;

pub const DEFAULT_SOURCE: &str = "odd_even_sort.cpp";
pub const DEFAULT_OUTPUT: &str = "odd_even_sort";
pub const DEFAULT_COMPILER: &str = "g++";

pub const MISSING_SOURCE_HINT: &str = "Pass the benchmark source with --source <FILE>, \
     or use --toolchain cargo to build the bundled Rust kernel.";

/// Apple Silicon Homebrew prefix, used when `brew` cannot be queried.
const HOMEBREW_FALLBACK_INCLUDE: &str = "/opt/homebrew/include";
const HOMEBREW_FALLBACK_LIB: &str = "/opt/homebrew/lib";
const USR_LOCAL_INCLUDE: &str = "/usr/local/include";
const USR_LOCAL_LIB: &str = "/usr/local/lib";

const KERNEL_BIN: &str = "odd_even_sort";
const KERNEL_MANIFEST: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildSpec {
    pub platform: Platform,
    pub source: PathBuf,
    pub output: PathBuf,
    pub compiler: String,
}

impl Default for BuildSpec {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            source: PathBuf::from(DEFAULT_SOURCE),
            output: PathBuf::from(DEFAULT_OUTPUT),
            compiler: DEFAULT_COMPILER.to_string(),
        }
    }
}

/// How one toolchain turns a [`BuildSpec`] into a command line.
pub trait ToolchainProfile {
    fn name(&self) -> &'static str;

    /// Program to launch.
    fn program(&self, spec: &BuildSpec) -> String;

    /// Fully resolved arguments; any discovery happens here, before launch.
    fn resolve_args(&self, spec: &BuildSpec) -> Vec<OsString>;

    /// Source file that must exist before the toolchain is started.
    fn source<'a>(&self, spec: &'a BuildSpec) -> Option<&'a Path> {
        Some(&spec.source)
    }

    /// Where the executable landed, before the platform suffix. `stdout`
    /// is whatever the toolchain printed there.
    fn artifact(&self, spec: &BuildSpec, _stdout: &str) -> Option<PathBuf> {
        Some(spec.output.clone())
    }

    fn remediation(&self) -> &'static str;
}

/// Plain `-fopenmp` build for Linux and Windows toolchains.
#[derive(Debug, Default)]
pub struct GnuOpenMp;

impl ToolchainProfile for GnuOpenMp {
    fn name(&self) -> &'static str {
        "gnu-openmp"
    }

    fn program(&self, spec: &BuildSpec) -> String {
        spec.compiler.clone()
    }

    fn resolve_args(&self, spec: &BuildSpec) -> Vec<OsString> {
        vec![
            "-fopenmp".into(),
            "-O3".into(),
            spec.source.clone().into(),
            "-o".into(),
            spec.output.clone().into(),
        ]
    }

    fn remediation(&self) -> &'static str {
        "Make sure a C++ compiler with OpenMP support is installed \
         (e.g. `apt install g++` or MinGW-w64 on Windows)."
    }
}

/// macOS: Apple Clang needs libomp passed through the preprocessor and
/// its include/lib directories spelled out.
#[derive(Debug)]
pub struct HomebrewOpenMp {
    /// Skips the package-manager query when set.
    pub prefix: Option<PathBuf>,
    /// Package manager asked for `--prefix libomp`.
    pub brew: String,
}

impl Default for HomebrewOpenMp {
    fn default() -> Self {
        Self {
            prefix: None,
            brew: "brew".to_string(),
        }
    }
}

impl HomebrewOpenMp {
    fn discover_prefix(&self) -> Option<PathBuf> {
        if let Some(prefix) = &self.prefix {
            return Some(prefix.clone());
        }

        let output = Command::new(&self.brew)
            .args(["--prefix", "libomp"])
            .stderr(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let prefix = String::from_utf8(output.stdout).ok()?;
        let prefix = prefix.trim();
        (!prefix.is_empty()).then(|| PathBuf::from(prefix))
    }

    fn search_paths(&self) -> (OsString, OsString) {
        match self.discover_prefix() {
            Some(prefix) => {
                info!(prefix = %prefix.display(), "found libomp");
                (
                    include_flag(&prefix.join("include")),
                    lib_flag(&prefix.join("lib")),
                )
            }
            None => {
                warn!("could not locate libomp via {}, using default paths", self.brew);
                warn!("if compilation fails, run: brew install libomp");
                (
                    include_flag(Path::new(HOMEBREW_FALLBACK_INCLUDE)),
                    lib_flag(Path::new(HOMEBREW_FALLBACK_LIB)),
                )
            }
        }
    }
}

fn include_flag(dir: &Path) -> OsString {
    let mut flag = OsString::from("-I");
    flag.push(dir);
    flag
}

fn lib_flag(dir: &Path) -> OsString {
    let mut flag = OsString::from("-L");
    flag.push(dir);
    flag
}

impl ToolchainProfile for HomebrewOpenMp {
    fn name(&self) -> &'static str {
        "homebrew-libomp"
    }

    fn program(&self, spec: &BuildSpec) -> String {
        spec.compiler.clone()
    }

    fn resolve_args(&self, spec: &BuildSpec) -> Vec<OsString> {
        let (include, lib) = self.search_paths();
        vec![
            "-Xpreprocessor".into(),
            "-fopenmp".into(),
            "-O3".into(),
            include,
            include_flag(Path::new(USR_LOCAL_INCLUDE)),
            lib,
            lib_flag(Path::new(USR_LOCAL_LIB)),
            spec.source.clone().into(),
            "-o".into(),
            spec.output.clone().into(),
            "-lomp".into(),
        ]
    }

    fn remediation(&self) -> &'static str {
        "macOS troubleshooting:\n\
         1. Open a new terminal window.\n\
         2. Run: brew install libomp\n\
         3. Run this tool again."
    }
}

/// Builds the in-repo Rust kernel with cargo instead of compiling C++.
#[derive(Debug)]
pub struct CargoKernel {
    pub manifest: PathBuf,
}

impl Default for CargoKernel {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(KERNEL_MANIFEST),
        }
    }
}

/// The parts of a `cargo --message-format=json` line we read.
#[derive(Debug, Deserialize)]
struct CargoMessage {
    reason: String,
    #[serde(default)]
    target: Option<CargoTarget>,
    #[serde(default)]
    executable: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CargoTarget {
    name: String,
}

/// Finds the kernel executable cargo reported, wherever the target
/// directory is.
fn kernel_from_messages(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<CargoMessage>(line).ok())
        .filter(|msg| msg.reason == "compiler-artifact")
        .filter(|msg| msg.target.as_ref().map_or(false, |t| t.name == KERNEL_BIN))
        .filter_map(|msg| msg.executable)
        .last()
}

impl ToolchainProfile for CargoKernel {
    fn name(&self) -> &'static str {
        "cargo-kernel"
    }

    fn program(&self, _spec: &BuildSpec) -> String {
        // Set when running under cargo; keeps the same toolchain.
        std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string())
    }

    fn resolve_args(&self, _spec: &BuildSpec) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["build", "--release", "--bin", KERNEL_BIN]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push("--manifest-path".into());
        args.push(self.manifest.clone().into());
        args.push("--message-format=json-render-diagnostics".into());
        args
    }

    fn source<'a>(&self, _spec: &'a BuildSpec) -> Option<&'a Path> {
        None
    }

    fn artifact(&self, _spec: &BuildSpec, stdout: &str) -> Option<PathBuf> {
        kernel_from_messages(stdout)
    }

    fn remediation(&self) -> &'static str {
        "Make sure a working Rust toolchain is installed \
         (`cargo build --release --bin odd_even_sort` should succeed)."
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ProfileKind {
    /// Pick by platform; the Rust kernel when the source file is missing.
    #[default]
    Auto,
    Homebrew,
    Gnu,
    Cargo,
}

impl ProfileKind {
    pub fn select(self, spec: &BuildSpec) -> Box<dyn ToolchainProfile> {
        match self {
            ProfileKind::Auto if !spec.source.is_file() => {
                info!(
                    source = %spec.source.display(),
                    "benchmark source not found, building the bundled Rust kernel"
                );
                Box::new(CargoKernel::default())
            }
            ProfileKind::Auto => match spec.platform {
                Platform::MacOs => Box::new(HomebrewOpenMp::default()),
                _ => Box::new(GnuOpenMp),
            },
            ProfileKind::Homebrew => Box::new(HomebrewOpenMp::default()),
            ProfileKind::Gnu => Box::new(GnuOpenMp),
            ProfileKind::Cargo => Box::new(CargoKernel::default()),
        }
    }
}

/// Path the runner should launch, with the platform executable suffix
/// applied and bare names anchored to the working directory.
pub fn executable_path(artifact: &Path) -> PathBuf {
    let mut path = artifact.to_path_buf();
    if !EXE_SUFFIX.is_empty() && path.extension().is_none() {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(EXE_SUFFIX);
        path.set_file_name(name);
    }
    if path.is_relative() && path.parent().map_or(true, |p| p.as_os_str().is_empty()) {
        path = Path::new(".").join(path);
    }
    path
}

/// Runs the toolchain synchronously. Any nonzero status is a failure, no
/// matter what the compiler printed.
pub fn build(spec: &BuildSpec, profile: &dyn ToolchainProfile) -> Result<PathBuf, BuildError> {
    if let Some(source) = profile.source(spec) {
        if !source.is_file() {
            return Err(BuildError::MissingSource(source.to_path_buf()));
        }
    }

    let program = profile.program(spec);
    let args = profile.resolve_args(spec);
    info!(profile = profile.name(), %program, ?args, "compiling benchmark");

    let output = Command::new(&program)
        .args(&args)
        .stderr(Stdio::inherit())
        .output()
        .map_err(|source| BuildError::Spawn {
            program: program.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(BuildError::Status {
            program,
            code: output.status.code(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let artifact = profile
        .artifact(spec, &stdout)
        .ok_or(BuildError::NoArtifact { program })?;
    let exe = executable_path(&artifact);
    info!(exe = %exe.display(), "compilation successful");
    Ok(exe)
}

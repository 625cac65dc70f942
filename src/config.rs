//! Experiment parameters, fixed once at startup.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// O(N^2) sort, so sizes stay well below what an O(n log n) sweep would use.
pub const SMALL_N: u64 = 10_000;
pub const LARGE_N: u64 = 40_000;
pub const THREAD_COUNTS: [usize; 5] = [1, 2, 4, 8, 16];

/// Approximately sqrt(2). Kept at the historical value so reported sizes
/// stay comparable across runs.
pub const WEAK_GROWTH_FACTOR: f64 = 1.414;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Ascending. The first entry is the strong-scaling baseline.
    pub threads: Vec<usize>,
    pub small_size: u64,
    pub large_size: u64,
    /// Falls back to `small_size` when unset.
    pub weak_start: Option<u64>,
    pub growth_factor: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            threads: THREAD_COUNTS.to_vec(),
            small_size: SMALL_N,
            large_size: LARGE_N,
            weak_start: None,
            growth_factor: WEAK_GROWTH_FACTOR,
        }
    }
}

/// Command-line values layered over defaults or a config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub threads: Option<Vec<usize>>,
    pub small_size: Option<u64>,
    pub large_size: Option<u64>,
    pub weak_start: Option<u64>,
    pub growth_factor: Option<f64>,
}

impl ExperimentConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies overrides and validates, producing the value every analyzer reads.
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(threads) = overrides.threads {
            self.threads = threads;
        }
        if let Some(n) = overrides.small_size {
            self.small_size = n;
        }
        if let Some(n) = overrides.large_size {
            self.large_size = n;
        }
        if let Some(n) = overrides.weak_start {
            self.weak_start = Some(n);
        }
        if let Some(f) = overrides.growth_factor {
            self.growth_factor = f;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads.is_empty() {
            return Err(ConfigError::EmptyThreads);
        }
        if self.threads.contains(&0) {
            return Err(ConfigError::ZeroThreads);
        }
        if let Some(w) = self.threads.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ConfigError::NotAscending {
                prev: w[0],
                next: w[1],
            });
        }
        if self.small_size == 0 {
            return Err(ConfigError::ZeroSize("small_size"));
        }
        if self.large_size == 0 {
            return Err(ConfigError::ZeroSize("large_size"));
        }
        if self.weak_start == Some(0) {
            return Err(ConfigError::ZeroSize("weak_start"));
        }
        if !self.growth_factor.is_finite() || self.growth_factor < 1.0 {
            return Err(ConfigError::GrowthFactor(self.growth_factor));
        }
        Ok(())
    }

    /// `None` only for an unvalidated, empty thread list.
    pub fn baseline_threads(&self) -> Option<usize> {
        self.threads.first().copied()
    }

    /// Strong scaling sweeps these in order, small first.
    pub fn strong_sizes(&self) -> [u64; 2] {
        [self.small_size, self.large_size]
    }

    pub fn weak_start(&self) -> u64 {
        self.weak_start.unwrap_or(self.small_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExperimentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strong_sizes(), [10_000, 40_000]);
        assert_eq!(config.weak_start(), 10_000);
        assert_eq!(config.baseline_threads(), Some(1));
    }

    #[test]
    fn test_rejects_unordered_threads() {
        let err = ExperimentConfig::default()
            .with_overrides(Overrides {
                threads: Some(vec![1, 4, 2]),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotAscending { prev: 4, next: 2 }));
    }

    #[test]
    fn test_rejects_empty_and_zero_threads() {
        let mut config = ExperimentConfig::default();
        config.threads.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyThreads)));

        config.threads = vec![0, 1];
        assert!(matches!(config.validate(), Err(ConfigError::ZeroThreads)));
    }

    #[test]
    fn test_rejects_shrinking_growth() {
        let mut config = ExperimentConfig::default();
        config.growth_factor = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GrowthFactor(_))
        ));
        config.growth_factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_weak_start_follows_small_size() {
        let config = ExperimentConfig::default()
            .with_overrides(Overrides {
                small_size: Some(100),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.weak_start(), 100);

        let config = config
            .with_overrides(Overrides {
                weak_start: Some(250),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.weak_start(), 250);
        assert_eq!(config.small_size, 100);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "threads": [1, 2, 4], "large_size": 500 }}"#).unwrap();

        let config = ExperimentConfig::from_file(file.path()).unwrap();
        assert_eq!(config.threads, vec![1, 2, 4]);
        assert_eq!(config.large_size, 500);
        assert_eq!(config.small_size, SMALL_N);
        assert_eq!(config.growth_factor, WEAK_GROWTH_FACTOR);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "thread": [1] }}"#).unwrap();
        assert!(matches!(
            ExperimentConfig::from_file(file.path()),
            Err(ConfigError::Json { .. })
        ));
    }
}

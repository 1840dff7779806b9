//! Benchmark configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::error::{Error, Result};
use crate::workload::HobbySelection;

/// Default data directory; each backend keeps its artifact beneath it.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Number of random fetches issued per tier.
pub const DEFAULT_FETCH_ITERATIONS: usize = 1_000_000;

/// A named dataset size class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tier {
    pub name: String,
    pub target_size: usize,
}

impl Tier {
    pub fn new(name: impl Into<String>, target_size: usize) -> Self {
        Self {
            name: name.into(),
            target_size,
        }
    }

    /// The standard tier set, in execution order.
    pub fn defaults() -> Vec<Tier> {
        vec![
            Tier::new("Small", 100),
            Tier::new("Medium", 20_000),
            Tier::new("Large", 50_000),
        ]
    }
}

/// Harness configuration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Directory holding every backend's persisted artifact.
    pub data_dir: PathBuf,

    /// Tiers to run, in order.
    pub tiers: Vec<Tier>,

    /// Fetch calls per tier.
    pub fetch_iterations: usize,

    /// Hobby-list selection policy for generated records.
    pub hobbies: HobbySelection,

    /// Backends to run. Empty means all registered backends.
    pub backends: Vec<String>,
}

impl BenchConfig {
    /// Create a configuration with the standard constants under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            tiers: Tier::defaults(),
            fetch_iterations: DEFAULT_FETCH_ITERATIONS,
            hobbies: HobbySelection::default(),
            backends: Vec::new(),
        }
    }

    /// Replace the tier set.
    pub fn with_tiers(mut self, tiers: Vec<Tier>) -> Self {
        self.tiers = tiers;
        self
    }

    /// Set the number of fetch calls per tier.
    pub fn with_fetch_iterations(mut self, iterations: usize) -> Self {
        self.fetch_iterations = iterations;
        self
    }

    /// Set the hobby selection policy.
    pub fn with_hobbies(mut self, hobbies: HobbySelection) -> Self {
        self.hobbies = hobbies;
        self
    }

    /// Restrict the run to the named backends.
    pub fn with_backends<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backends = names.into_iter().map(Into::into).collect();
        self
    }

    /// Reject configurations the harness cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.tiers.is_empty() {
            return Err(Error::Config("at least one tier is required".into()));
        }
        for tier in &self.tiers {
            if tier.target_size == 0 {
                return Err(Error::Config(format!(
                    "tier '{}' must have a positive target size",
                    tier.name
                )));
            }
        }
        for (i, tier) in self.tiers.iter().enumerate() {
            if self.tiers[..i].iter().any(|t| t.name == tier.name) {
                return Err(Error::Config(format!("duplicate tier '{}'", tier.name)));
            }
        }
        if self.fetch_iterations == 0 {
            return Err(Error::Config("fetch iterations must be positive".into()));
        }
        Ok(())
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

/// Command-line arguments. With no flags the run uses the standard constants.
#[derive(Parser, Debug)]
#[command(name = "kvbench")]
#[command(version, about = "Tiered populate/fetch benchmark for key-value backends", long_about = None)]
pub struct Args {
    /// Directory for backend data files.
    #[arg(short, long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Only run the named backend (repeatable).
    #[arg(short, long = "backend")]
    pub backends: Vec<String>,

    /// Fetch calls per tier.
    #[arg(long, default_value_t = DEFAULT_FETCH_ITERATIONS)]
    pub fetch_iterations: usize,

    /// Pick hobby lists by rounding a uniform draw (favours the middle list).
    #[arg(long)]
    pub rounded_hobbies: bool,
}

impl Args {
    /// Convert command-line arguments to a harness configuration.
    pub fn into_config(self) -> BenchConfig {
        let hobbies = if self.rounded_hobbies {
            HobbySelection::Rounded
        } else {
            HobbySelection::Uniform
        };

        BenchConfig::new(self.data_dir)
            .with_fetch_iterations(self.fetch_iterations)
            .with_hobbies(hobbies)
            .with_backends(self.backends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.fetch_iterations, 1_000_000);
        assert_eq!(config.hobbies, HobbySelection::Uniform);
        assert!(config.backends.is_empty());
        assert_eq!(
            config.tiers,
            vec![
                Tier::new("Small", 100),
                Tier::new("Medium", 20_000),
                Tier::new("Large", 50_000),
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = BenchConfig::new("/tmp/kv")
            .with_tiers(vec![Tier::new("Tiny", 5)])
            .with_fetch_iterations(10)
            .with_hobbies(HobbySelection::Rounded)
            .with_backends(["memory"]);

        assert_eq!(config.data_dir, PathBuf::from("/tmp/kv"));
        assert_eq!(config.tiers, vec![Tier::new("Tiny", 5)]);
        assert_eq!(config.fetch_iterations, 10);
        assert_eq!(config.hobbies, HobbySelection::Rounded);
        assert_eq!(config.backends, vec!["memory".to_string()]);
    }

    #[test]
    fn test_validate_rejects_bad_tiers() {
        let empty = BenchConfig::default().with_tiers(vec![]);
        assert!(empty.validate().is_err());

        let zero = BenchConfig::default().with_tiers(vec![Tier::new("Empty", 0)]);
        assert!(zero.validate().is_err());

        let dup = BenchConfig::default()
            .with_tiers(vec![Tier::new("Small", 1), Tier::new("Small", 2)]);
        assert!(dup.validate().is_err());

        let no_fetch = BenchConfig::default().with_fetch_iterations(0);
        assert!(no_fetch.validate().is_err());
    }

    #[test]
    fn test_args_without_flags_match_defaults() {
        let args = Args::parse_from(["kvbench"]);
        let config = args.into_config();
        let defaults = BenchConfig::default();
        assert_eq!(config.data_dir, defaults.data_dir);
        assert_eq!(config.tiers, defaults.tiers);
        assert_eq!(config.fetch_iterations, defaults.fetch_iterations);
        assert_eq!(config.hobbies, defaults.hobbies);
        assert!(config.backends.is_empty());
    }

    #[test]
    fn test_args_flags() {
        let args = Args::parse_from([
            "kvbench",
            "--data-dir",
            "/var/tmp/kv",
            "--backend",
            "sled",
            "-b",
            "memory",
            "--fetch-iterations",
            "500",
            "--rounded-hobbies",
        ]);
        let config = args.into_config();
        assert_eq!(config.data_dir, PathBuf::from("/var/tmp/kv"));
        assert_eq!(config.backends, vec!["sled".to_string(), "memory".to_string()]);
        assert_eq!(config.fetch_iterations, 500);
        assert_eq!(config.hobbies, HobbySelection::Rounded);
    }
}

//! Tiered population and fetch phases, and the run orchestrator.
//!
//! Everything runs on one thread: each adapter call returns before the next
//! is issued, tiers run in order, and backends run one after another.

use std::fs;
use std::io::Write;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::adapter::{Adapter, AdapterRegistry};
use crate::config::{BenchConfig, Tier};
use crate::error::{Error, Result};
use crate::report::{fetch_line, population_line, BenchmarkResult, ResultStore};
use crate::workload::WorkloadGenerator;

/// What the population phase did for one tier.
#[derive(Clone, Debug, PartialEq)]
pub struct PopulationOutcome {
    pub tier_name: String,
    /// Inserts issued.
    pub requested: usize,
    /// Entries the backend reported afterwards; below `requested` when keys
    /// collided.
    pub stored: usize,
    pub elapsed_seconds: f64,
}

/// Populate every tier of `adapter`, in order.
///
/// The backend's whole store is reset before the first tier. One progress
/// line per tier is written to `out`.
pub fn populate<W: Write + ?Sized>(
    adapter: &mut dyn Adapter,
    tiers: &[Tier],
    generator: &mut WorkloadGenerator,
    out: &mut W,
) -> Result<Vec<PopulationOutcome>> {
    debug!(backend = adapter.name(), "resetting store");
    adapter.reset()?;

    let mut outcomes = Vec::with_capacity(tiers.len());
    for tier in tiers {
        let mut handle = adapter.open(&tier.name)?;

        let start = Instant::now();
        for i in 0..tier.target_size {
            let (key, record) = generator.generate(i);
            handle.insert(&key, &record)?;
        }
        let elapsed_seconds = start.elapsed().as_secs_f64();

        let stored = handle.size()?;
        handle.close()?;

        info!(
            backend = adapter.name(),
            tier = %tier.name,
            requested = tier.target_size,
            stored,
            elapsed_seconds,
            "tier populated"
        );
        writeln!(out, "{}", population_line(&tier.name, stored, elapsed_seconds))?;

        outcomes.push(PopulationOutcome {
            tier_name: tier.name.clone(),
            requested: tier.target_size,
            stored,
            elapsed_seconds,
        });
    }

    Ok(outcomes)
}

/// Time `iterations` uniformly sampled fetches per tier of `adapter` and
/// record each tier's timing in `results`.
///
/// Fetched records are not checked; a missing record is not an error.
pub fn fetch<R, W>(
    adapter: &mut dyn Adapter,
    tiers: &[Tier],
    iterations: usize,
    rng: &mut R,
    results: &mut ResultStore,
    out: &mut W,
) -> Result<()>
where
    R: Rng,
    W: Write + ?Sized,
{
    for tier in tiers {
        let (mut handle, keys) = adapter.open_for_fetch(&tier.name)?;
        if keys.is_empty() {
            return Err(Error::EmptyKeyIndex {
                backend: adapter.name().to_string(),
                table: tier.name.clone(),
            });
        }

        let start = Instant::now();
        for _ in 0..iterations {
            let key = &keys[rng.gen_range(0..keys.len())];
            handle.fetch(key)?;
        }
        let elapsed_seconds = start.elapsed().as_secs_f64();

        info!(
            backend = adapter.name(),
            tier = %tier.name,
            keys = keys.len(),
            iterations,
            elapsed_seconds,
            "tier fetched"
        );
        results.record(BenchmarkResult {
            test_name: adapter.name().to_string(),
            tier_name: tier.name.clone(),
            elapsed_seconds,
            dataset_size: keys.len(),
        });

        handle.close()?;
        writeln!(out, "{}", fetch_line(&tier.name, elapsed_seconds))?;
    }

    Ok(())
}

/// Runs every registered backend through both phases and reports the results.
pub struct Harness<W: Write> {
    config: BenchConfig,
    out: W,
    seed: Option<u64>,
}

impl<W: Write> Harness<W> {
    /// Create a harness writing its report to `out`.
    pub fn new(config: BenchConfig, out: W) -> Self {
        Self {
            config,
            out,
            seed: None,
        }
    }

    /// Seed the workload and sampling RNGs for a reproducible run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Consume the harness, returning its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the benchmark over `registry`.
    ///
    /// For each backend, in registry order: populate all tiers, then fetch
    /// from all tiers. The first error aborts the whole run.
    pub fn run(&mut self, registry: &mut AdapterRegistry) -> Result<ResultStore> {
        self.config.validate()?;
        registry.retain_named(&self.config.backends)?;
        fs::create_dir_all(&self.config.data_dir)?;

        let (mut generator, mut rng) = match self.seed {
            Some(seed) => (
                WorkloadGenerator::with_seed(seed, self.config.hobbies),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (
                WorkloadGenerator::new(self.config.hobbies),
                StdRng::from_entropy(),
            ),
        };

        info!(
            backends = ?registry.names(),
            tiers = self.config.tiers.len(),
            fetch_iterations = self.config.fetch_iterations,
            data_dir = %self.config.data_dir.display(),
            "starting benchmark run"
        );

        let mut results = ResultStore::new();
        for adapter in registry.iter_mut() {
            writeln!(self.out, "\n{}", adapter.name())?;
            populate(adapter, &self.config.tiers, &mut generator, &mut self.out)?;

            writeln!(self.out, "\nFetching from {}", adapter.name())?;
            fetch(
                adapter,
                &self.config.tiers,
                self.config.fetch_iterations,
                &mut rng,
                &mut results,
                &mut self.out,
            )?;
        }

        writeln!(self.out, "\nResults\n")?;
        results.write_to(&mut self.out)?;

        info!(results = results.len(), "benchmark run complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryAdapter;
    use crate::workload::HobbySelection;

    #[test]
    fn test_populate_small_tier() {
        let mut adapter = MemoryAdapter::new();
        let mut gen = WorkloadGenerator::with_seed(1, HobbySelection::Uniform);
        let mut out = Vec::new();
        let tiers = [Tier::new("Small", 100)];

        let outcomes = populate(&mut adapter, &tiers, &mut gen, &mut out).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].tier_name, "Small");
        assert_eq!(outcomes[0].requested, 100);
        assert_eq!(outcomes[0].stored, 100);
        assert!(outcomes[0].elapsed_seconds > 0.0);

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Small      Created 100 entries ("), "{}", out);
    }

    #[test]
    fn test_populate_resets_before_first_tier() {
        let mut adapter = MemoryAdapter::new();
        let mut gen = WorkloadGenerator::with_seed(2, HobbySelection::Uniform);
        {
            let mut stale = adapter.open("Stale").unwrap();
            let (key, record) = gen.generate(0);
            stale.insert(&key, &record).unwrap();
        }

        let tiers = [Tier::new("Small", 3), Tier::new("Medium", 5)];
        populate(&mut adapter, &tiers, &mut gen, &mut std::io::sink()).unwrap();

        assert_eq!(adapter.table_names(), vec!["Medium", "Small"]);
    }

    #[test]
    fn test_fetch_records_one_result_per_tier() {
        let mut adapter = MemoryAdapter::new();
        let mut gen = WorkloadGenerator::with_seed(3, HobbySelection::Uniform);
        let tiers = [Tier::new("Small", 10), Tier::new("Medium", 20)];
        populate(&mut adapter, &tiers, &mut gen, &mut std::io::sink()).unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let mut results = ResultStore::new();
        let mut out = Vec::new();
        fetch(&mut adapter, &tiers, 1_000, &mut rng, &mut results, &mut out).unwrap();

        assert_eq!(results.len(), 2);
        let medium = results.get("memory", "Medium").unwrap();
        assert_eq!(medium.dataset_size, 20);
        assert!(medium.elapsed_seconds >= 0.0);
        let lines: Vec<_> = String::from_utf8(out).unwrap().lines().map(String::from).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Small           "));
        assert!(lines[1].starts_with("Medium          "));
    }

    #[test]
    fn test_fetch_empty_key_index_fails() {
        let mut adapter = MemoryAdapter::new();
        adapter.open("Small").unwrap().close().unwrap();

        let mut rng = StdRng::seed_from_u64(4);
        let mut results = ResultStore::new();
        let err = fetch(
            &mut adapter,
            &[Tier::new("Small", 1)],
            10,
            &mut rng,
            &mut results,
            &mut std::io::sink(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::EmptyKeyIndex { .. }));
        assert!(results.is_empty());
    }
}

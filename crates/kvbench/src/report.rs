//! Result collection and the plain-text comparison report.

use std::fmt::Write as _;
use std::io;

/// Width the tier name is padded to on population lines.
pub const POPULATION_NAME_WIDTH: usize = 10;

/// Width the tier name is padded or truncated to on fetch lines.
pub const FETCH_NAME_WIDTH: usize = 15;

/// Fetch-phase timing of one tier of one backend.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkResult {
    pub test_name: String,
    pub tier_name: String,
    pub elapsed_seconds: f64,
    /// Number of keys the fetch phase sampled from.
    pub dataset_size: usize,
}

#[derive(Debug)]
struct TestResults {
    name: String,
    tiers: Vec<BenchmarkResult>,
}

/// Results keyed by test name, then tier name.
///
/// Tests and tiers keep the order they were first recorded in, which is the
/// registry order and the tier order of the run.
#[derive(Debug, Default)]
pub struct ResultStore {
    tests: Vec<TestResults>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result, replacing any earlier one for the same test and tier.
    pub fn record(&mut self, result: BenchmarkResult) {
        let test = match self.tests.iter().position(|t| t.name == result.test_name) {
            Some(i) => &mut self.tests[i],
            None => {
                self.tests.push(TestResults {
                    name: result.test_name.clone(),
                    tiers: Vec::new(),
                });
                let last = self.tests.len() - 1;
                &mut self.tests[last]
            }
        };

        match test.tiers.iter_mut().find(|r| r.tier_name == result.tier_name) {
            Some(existing) => *existing = result,
            None => test.tiers.push(result),
        }
    }

    pub fn get(&self, test_name: &str, tier_name: &str) -> Option<&BenchmarkResult> {
        self.tiers(test_name)
            .iter()
            .find(|r| r.tier_name == tier_name)
    }

    /// Results of one test, in tier order. Empty if the test is unknown.
    pub fn tiers(&self, test_name: &str) -> &[BenchmarkResult] {
        self.tests
            .iter()
            .find(|t| t.name == test_name)
            .map(|t| t.tiers.as_slice())
            .unwrap_or(&[])
    }

    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(|t| t.name.as_str())
    }

    /// Total number of recorded results.
    pub fn len(&self) -> usize {
        self.tests.iter().map(|t| t.tiers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render one test: a header line, then one line per tier.
    pub fn render_test(&self, test_name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", test_name);
        for result in self.tiers(test_name) {
            let _ = writeln!(out, "{}", fetch_line(&result.tier_name, result.elapsed_seconds));
        }
        out
    }

    /// Render every test, separated by blank lines.
    pub fn render(&self) -> String {
        self.tests
            .iter()
            .map(|t| self.render_test(&t.name))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.render().as_bytes())?;
        out.flush()
    }
}

/// Seconds to exactly three decimals with a trailing `s`.
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.3}s", seconds)
}

/// `"<tier> Created <N> entries (<T>s)"`, tier padded to [`POPULATION_NAME_WIDTH`].
pub fn population_line(tier_name: &str, stored: usize, elapsed_seconds: f64) -> String {
    format!(
        "{:<width$} Created {} entries ({})",
        tier_name,
        stored,
        format_seconds(elapsed_seconds),
        width = POPULATION_NAME_WIDTH
    )
}

/// `"<tier> <T>s"`, tier padded or truncated to [`FETCH_NAME_WIDTH`].
pub fn fetch_line(tier_name: &str, elapsed_seconds: f64) -> String {
    format!(
        "{:<width$.width$} {}",
        tier_name,
        format_seconds(elapsed_seconds),
        width = FETCH_NAME_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(test: &str, tier: &str, secs: f64) -> BenchmarkResult {
        BenchmarkResult {
            test_name: test.into(),
            tier_name: tier.into(),
            elapsed_seconds: secs,
            dataset_size: 100,
        }
    }

    #[test]
    fn test_format_seconds_rounds_to_millis() {
        assert_eq!(format_seconds(1.23456), "1.235s");
        assert_eq!(format_seconds(0.0), "0.000s");
        assert_eq!(format_seconds(12.0), "12.000s");
    }

    #[test]
    fn test_population_line() {
        assert_eq!(
            population_line("Small", 100, 0.01234),
            "Small      Created 100 entries (0.012s)"
        );
    }

    #[test]
    fn test_fetch_line_pads_and_truncates() {
        assert_eq!(fetch_line("Medium", 2.5), "Medium          2.500s");
        assert_eq!(
            fetch_line("AVeryLongTierNameIndeed", 1.0),
            "AVeryLongTierNa 1.000s"
        );
    }

    #[test]
    fn test_record_keeps_order_and_replaces() {
        let mut store = ResultStore::new();
        store.record(result("sqlite", "Small", 1.0));
        store.record(result("sqlite", "Medium", 2.0));
        store.record(result("memory", "Small", 0.5));
        store.record(result("sqlite", "Small", 1.5));

        assert_eq!(store.len(), 3);
        assert_eq!(store.test_names().collect::<Vec<_>>(), vec!["sqlite", "memory"]);
        let tiers: Vec<_> = store.tiers("sqlite").iter().map(|r| r.tier_name.as_str()).collect();
        assert_eq!(tiers, vec!["Small", "Medium"]);
        assert_eq!(store.get("sqlite", "Small").unwrap().elapsed_seconds, 1.5);
        assert!(store.get("sled", "Small").is_none());
        assert!(store.tiers("sled").is_empty());
    }

    #[test]
    fn test_render() {
        let mut store = ResultStore::new();
        store.record(result("sled", "Small", 1.23456));
        store.record(result("sled", "Large", 10.0));
        store.record(result("memory", "Small", 0.1));

        assert_eq!(
            store.render(),
            "sled\n\
             Small           1.235s\n\
             Large           10.000s\n\
             \n\
             memory\n\
             Small           0.100s\n"
        );
    }

    #[test]
    fn test_empty_store() {
        let store = ResultStore::new();
        assert!(store.is_empty());
        assert_eq!(store.render(), "");
    }
}

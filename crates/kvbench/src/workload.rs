//! Synthetic workload generation.
//!
//! Keys and records have a fixed shape; only their contents are random.
//! Seeded generators (`WorkloadGenerator::with_seed`) are reproducible and are
//! what tests and benches use.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Username pool, indexed by insertion order modulo its length.
pub const NAME_POOL: [&str; 6] = ["Jake", "Smally", "Amy", "Foo", "Bar", "Apolly"];

/// The three hobby lists a record can carry.
pub const HOBBY_LISTS: [&[&str]; 3] = [
    &["Sleep", "Programming"],
    &["Eating", "Yoga"],
    &["Skating"],
];

/// Random bytes behind a key (16 hex characters).
pub const KEY_BYTES: usize = 8;

/// Random bytes behind a password (64 hex characters).
pub const PASSWORD_BYTES: usize = 32;

/// How a record's hobby list is picked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HobbySelection {
    /// Unbiased three-way choice.
    #[default]
    Uniform,
    /// Round a uniform draw over `[0, 2]`: the outer lists get ~25% each and
    /// the middle one ~50%.
    Rounded,
}

/// Storage key: lowercase hex of [`KEY_BYTES`] random bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Wrap an existing key string, e.g. one read back from a backend.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A synthetic user record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
    #[serde(rename = "Hobbies")]
    pub hobbies: Vec<String>,
}

impl Record {
    /// Encode as JSON, the stored value format of the persistent backends.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Produces keys and records for the population phase.
pub struct WorkloadGenerator {
    rng: StdRng,
    hobbies: HobbySelection,
}

impl WorkloadGenerator {
    /// Create a generator seeded from OS entropy.
    pub fn new(hobbies: HobbySelection) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            hobbies,
        }
    }

    /// Create a reproducible generator.
    pub fn with_seed(seed: u64, hobbies: HobbySelection) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            hobbies,
        }
    }

    /// Generate a random key. Collisions are neither detected nor avoided.
    pub fn generate_key(&mut self) -> Key {
        Key(self.random_hex::<KEY_BYTES>())
    }

    /// Generate the record inserted at position `index` of a tier.
    pub fn generate_record(&mut self, index: usize) -> Record {
        let username = NAME_POOL[index % NAME_POOL.len()].to_string();
        let password = self.random_hex::<PASSWORD_BYTES>();
        let hobbies = HOBBY_LISTS[self.pick_hobby_list()]
            .iter()
            .map(|h| h.to_string())
            .collect();

        Record {
            username,
            password,
            hobbies,
        }
    }

    /// Generate the `(key, record)` pair for position `index`.
    pub fn generate(&mut self, index: usize) -> (Key, Record) {
        let key = self.generate_key();
        let record = self.generate_record(index);
        (key, record)
    }

    fn pick_hobby_list(&mut self) -> usize {
        match self.hobbies {
            HobbySelection::Uniform => self.rng.gen_range(0..HOBBY_LISTS.len()),
            HobbySelection::Rounded => {
                let draw: f64 = self.rng.gen::<f64>() * 2.0;
                draw.round() as usize
            }
        }
    }

    fn random_hex<const N: usize>(&mut self) -> String {
        let mut bytes = [0u8; N];
        self.rng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

impl Default for WorkloadGenerator {
    fn default() -> Self {
        Self::new(HobbySelection::default())
    }
}

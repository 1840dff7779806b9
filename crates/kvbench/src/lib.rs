//! kvbench: tiered populate/fetch benchmark for key-value backends.
//!
//! A run walks every registered backend through two phases:
//!
//! - **Population**: reset the backend's store, then for each tier insert
//!   `target_size` generated records one at a time and time the loop.
//! - **Fetch**: for each tier, open the stored key index and time a fixed
//!   number of uniformly sampled lookups.
//!
//! Fetch timings are collected in a [`ResultStore`] and rendered as a
//! plain-text comparison once all backends finish.
//!
//! # Backends
//!
//! - **sled**: one sled tree per tier
//! - **sqlite**: one table per tier in a rusqlite database file
//! - **memory**: in-process reference backend

pub mod adapter;
pub mod backends;
pub mod config;
pub mod error;
pub mod harness;
pub mod report;
pub mod workload;

pub use adapter::{Adapter, AdapterRegistry, TableHandle};
pub use backends::{MemoryAdapter, SledAdapter, SqliteAdapter};
pub use config::{Args, BenchConfig, Tier};
pub use error::{Error, ErrorKind, Result};
pub use harness::{fetch, populate, Harness, PopulationOutcome};
pub use report::{format_seconds, BenchmarkResult, ResultStore};
pub use workload::{HobbySelection, Key, Record, WorkloadGenerator};

//! The adapter contract between the harness and a storage backend.
//!
//! A backend implements [`Adapter`] to open table-scoped [`TableHandle`]s.
//! The harness drives handles strictly one call at a time; each call must
//! complete before it returns.

use std::path::Path;

use crate::backends::{MemoryAdapter, SledAdapter, SqliteAdapter};
use crate::error::{Error, Result};
use crate::workload::{Key, Record};

/// A storage backend under test.
pub trait Adapter {
    /// Test name used in progress lines and the report.
    fn name(&self) -> &str;

    /// Destructively wipe the backend's whole physical store, every table
    /// included. Called once before the first tier is populated.
    fn reset(&mut self) -> Result<()>;

    /// Create or open the table named `table` for population.
    fn open(&mut self, table: &str) -> Result<Box<dyn TableHandle>>;

    /// Open `table` for reading and return every stored key. The order is
    /// arbitrary but stable for the life of the handle.
    fn open_for_fetch(&mut self, table: &str) -> Result<(Box<dyn TableHandle>, Vec<Key>)>;
}

/// A connection scoped to one table.
pub trait TableHandle {
    /// Upsert `record` under `key`.
    fn insert(&mut self, key: &Key, record: &Record) -> Result<()>;

    /// Number of entries currently stored.
    fn size(&mut self) -> Result<usize>;

    /// Look up `key`. A missing entry is `Ok(None)`.
    fn fetch(&mut self, key: &Key) -> Result<Option<Record>>;

    /// Release the handle.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Ordered, named set of adapters the harness iterates.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn Adapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock backends, each keeping its artifact under `data_dir`.
    pub fn standard(data_dir: &Path) -> Self {
        let mut registry = Self::new();
        registry.register(SledAdapter::new(data_dir.join(SledAdapter::FILE_NAME)));
        registry.register(SqliteAdapter::new(data_dir.join(SqliteAdapter::FILE_NAME)));
        registry.register(MemoryAdapter::new());
        registry
    }

    /// Append an adapter. Registration order is execution order.
    pub fn register<A: Adapter + 'static>(&mut self, adapter: A) -> &mut Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Keep only the named adapters. An empty selection keeps everything.
    ///
    /// Fails if a name matches no registered adapter.
    pub fn retain_named(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(unknown) = names
            .iter()
            .find(|n| !self.adapters.iter().any(|a| a.name() == n.as_str()))
        {
            return Err(Error::Config(format!(
                "unknown backend '{}' (available: {})",
                unknown,
                self.names().join(", ")
            )));
        }
        self.adapters
            .retain(|a| names.iter().any(|n| n.as_str() == a.name()));
        Ok(())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn Adapter + 'static)> {
        self.adapters.iter_mut().map(|a| a.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_order() {
        let dir = tempfile::tempdir().unwrap();
        let registry = AdapterRegistry::standard(dir.path());
        assert_eq!(registry.names(), vec!["sled", "sqlite", "memory"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_retain_named() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = AdapterRegistry::standard(dir.path());
        registry
            .retain_named(&["memory".to_string(), "sled".to_string()])
            .unwrap();
        // Registration order wins over selection order.
        assert_eq!(registry.names(), vec!["sled", "memory"]);
    }

    #[test]
    fn test_retain_named_unknown() {
        let mut registry = AdapterRegistry::new();
        registry.register(MemoryAdapter::new());
        let err = registry.retain_named(&["redis".to_string()]).unwrap_err();
        assert!(err.to_string().contains("redis"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_retain_empty_keeps_all() {
        let mut registry = AdapterRegistry::new();
        registry.register(MemoryAdapter::new());
        registry.retain_named(&[]).unwrap();
        assert!(!registry.is_empty());
    }
}

//! In-process reference backend.
//!
//! Tables live in a shared map of maps, so a reset drops every table at once,
//! the same as the persistent backends.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::adapter::{Adapter, TableHandle};
use crate::error::{Error, Result};
use crate::workload::{Key, Record};

type Table = HashMap<Key, Record>;
type Store = Arc<RwLock<HashMap<String, Table>>>;

/// Backend keeping every table in memory.
#[derive(Clone, Default)]
pub struct MemoryAdapter {
    store: Store,
}

impl MemoryAdapter {
    pub const NAME: &'static str = "memory";

    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the tables currently held, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.store.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Adapter for MemoryAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn reset(&mut self) -> Result<()> {
        self.store.write().clear();
        Ok(())
    }

    fn open(&mut self, table: &str) -> Result<Box<dyn TableHandle>> {
        self.store.write().entry(table.to_string()).or_default();
        Ok(Box::new(MemoryTable {
            store: Arc::clone(&self.store),
            table: table.to_string(),
        }))
    }

    fn open_for_fetch(&mut self, table: &str) -> Result<(Box<dyn TableHandle>, Vec<Key>)> {
        let keys = match self.store.read().get(table) {
            Some(entries) => entries.keys().cloned().collect(),
            None => return Err(Error::open(Self::NAME, table, "no such table")),
        };
        let handle: Box<dyn TableHandle> = Box::new(MemoryTable {
            store: Arc::clone(&self.store),
            table: table.to_string(),
        });
        Ok((handle, keys))
    }
}

struct MemoryTable {
    store: Store,
    table: String,
}

impl TableHandle for MemoryTable {
    fn insert(&mut self, key: &Key, record: &Record) -> Result<()> {
        let mut store = self.store.write();
        match store.get_mut(&self.table) {
            Some(entries) => {
                entries.insert(key.clone(), record.clone());
            }
            None => {
                store
                    .entry(self.table.clone())
                    .or_default()
                    .insert(key.clone(), record.clone());
            }
        }
        Ok(())
    }

    fn size(&mut self) -> Result<usize> {
        Ok(self.store.read().get(&self.table).map_or(0, HashMap::len))
    }

    fn fetch(&mut self, key: &Key) -> Result<Option<Record>> {
        Ok(self
            .store
            .read()
            .get(&self.table)
            .and_then(|entries| entries.get(key).cloned()))
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

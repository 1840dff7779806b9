//! sled backend: one sled tree per tier.

use std::path::PathBuf;

use ::sled::{Db, Tree};
use tracing::debug;

use crate::adapter::{Adapter, TableHandle};
use crate::error::{Error, Result};
use crate::workload::{Key, Record};

/// Name of sled's built-in default tree, which cannot be dropped.
const DEFAULT_TREE: &[u8] = b"__sled__default";

/// Backend storing each table as a tree of one sled database.
pub struct SledAdapter {
    path: PathBuf,
    db: Option<Db>,
}

impl SledAdapter {
    pub const NAME: &'static str = "sled";

    /// Artifact name under the data directory.
    pub const FILE_NAME: &'static str = "kvbench.sled";

    /// Create an adapter for the database at `path`. Nothing is opened until
    /// the first call that needs the database.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            db: None,
        }
    }

    fn db(&mut self) -> ::sled::Result<&Db> {
        let db = match self.db.take() {
            Some(db) => db,
            None => {
                debug!(path = %self.path.display(), "opening sled database");
                ::sled::open(&self.path)?
            }
        };
        Ok(self.db.insert(db))
    }

    fn open_table(&mut self, table: &str) -> Result<SledTable> {
        let tree = self
            .db()
            .and_then(|db| db.open_tree(table))
            .map_err(|e| Error::open(Self::NAME, table, e))?;
        Ok(SledTable {
            tree,
            table: table.to_string(),
        })
    }
}

impl Adapter for SledAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn reset(&mut self) -> Result<()> {
        let db = self.db().map_err(|e| Error::reset(Self::NAME, e))?;
        for name in db.tree_names() {
            if &*name == DEFAULT_TREE {
                continue;
            }
            db.drop_tree(&name)
                .map_err(|e| Error::reset(Self::NAME, e))?;
        }
        db.clear().map_err(|e| Error::reset(Self::NAME, e))?;
        db.flush().map_err(|e| Error::reset(Self::NAME, e))?;
        Ok(())
    }

    fn open(&mut self, table: &str) -> Result<Box<dyn TableHandle>> {
        Ok(Box::new(self.open_table(table)?))
    }

    fn open_for_fetch(&mut self, table: &str) -> Result<(Box<dyn TableHandle>, Vec<Key>)> {
        let table_handle = self.open_table(table)?;
        let keys = table_handle
            .tree
            .iter()
            .keys()
            .map(|key| {
                let key = key.map_err(|e| Error::open(Self::NAME, table, e))?;
                String::from_utf8(key.to_vec())
                    .map(Key::from)
                    .map_err(|e| Error::open(Self::NAME, table, e))
            })
            .collect::<Result<Vec<_>>>()?;
        let handle: Box<dyn TableHandle> = Box::new(table_handle);
        Ok((handle, keys))
    }
}

struct SledTable {
    tree: Tree,
    table: String,
}

impl TableHandle for SledTable {
    fn insert(&mut self, key: &Key, record: &Record) -> Result<()> {
        let value = record
            .to_json()
            .map_err(|e| Error::insert(SledAdapter::NAME, &self.table, e))?;
        self.tree
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| Error::insert(SledAdapter::NAME, &self.table, e))?;
        Ok(())
    }

    fn size(&mut self) -> Result<usize> {
        Ok(self.tree.len())
    }

    fn fetch(&mut self, key: &Key) -> Result<Option<Record>> {
        let value = self
            .tree
            .get(key.as_bytes())
            .map_err(|e| Error::fetch(SledAdapter::NAME, &self.table, e))?;
        value
            .map(|bytes| Record::from_json(&bytes))
            .transpose()
            .map_err(|e| Error::fetch(SledAdapter::NAME, &self.table, e))
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.tree
            .flush()
            .map_err(|e| Error::close(SledAdapter::NAME, &self.table, e))?;
        Ok(())
    }
}

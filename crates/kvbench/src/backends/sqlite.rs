//! SQLite backend (via rusqlite): one SQL table per tier in a single file.
//!
//! Values are stored as JSON text. Inserts are `INSERT OR REPLACE`, so a
//! repeated key overwrites the earlier row.

use std::path::PathBuf;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::adapter::{Adapter, TableHandle};
use crate::error::{Error, Result};
use crate::workload::{Key, Record};

/// Backend storing every tier as a table of one SQLite database file.
pub struct SqliteAdapter {
    path: PathBuf,
}

impl SqliteAdapter {
    pub const NAME: &'static str = "sqlite";

    /// Artifact name under the data directory.
    pub const FILE_NAME: &'static str = "kvbench.sqlite";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(conn)
    }

    fn open_table(&self, table: &str) -> rusqlite::Result<SqliteTable> {
        let conn = self.connect()?;
        let ident = quote_ident(table);
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {ident} (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );"
        ))?;
        Ok(SqliteTable::new(conn, table))
    }
}

impl Adapter for SqliteAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn reset(&mut self) -> Result<()> {
        let conn = self.connect().map_err(|e| Error::reset(Self::NAME, e))?;
        let tables = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            )
            .and_then(|mut stmt| {
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<rusqlite::Result<Vec<_>>>();
                names
            })
            .map_err(|e| Error::reset(Self::NAME, e))?;

        for table in &tables {
            debug!(table = %table, "dropping sqlite table");
            conn.execute_batch(&format!("DROP TABLE {};", quote_ident(table)))
                .map_err(|e| Error::reset(Self::NAME, e))?;
        }

        conn.close().map_err(|(_, e)| Error::reset(Self::NAME, e))?;
        Ok(())
    }

    fn open(&mut self, table: &str) -> Result<Box<dyn TableHandle>> {
        let handle = self
            .open_table(table)
            .map_err(|e| Error::open(Self::NAME, table, e))?;
        Ok(Box::new(handle))
    }

    fn open_for_fetch(&mut self, table: &str) -> Result<(Box<dyn TableHandle>, Vec<Key>)> {
        let conn = self
            .connect()
            .map_err(|e| Error::open(Self::NAME, table, e))?;
        let keys = conn
            .prepare(&format!("SELECT key FROM {} ORDER BY rowid", quote_ident(table)))
            .and_then(|mut stmt| {
                let keys = stmt
                    .query_map([], |row| row.get::<_, String>(0).map(Key::from))?
                    .collect::<rusqlite::Result<Vec<_>>>();
                keys
            })
            .map_err(|e| Error::open(Self::NAME, table, e))?;
        let handle: Box<dyn TableHandle> = Box::new(SqliteTable::new(conn, table));
        Ok((handle, keys))
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

struct SqliteTable {
    conn: Connection,
    table: String,
    insert_sql: String,
    select_sql: String,
    count_sql: String,
}

impl SqliteTable {
    fn new(conn: Connection, table: &str) -> Self {
        let ident = quote_ident(table);
        Self {
            conn,
            table: table.to_string(),
            insert_sql: format!("INSERT OR REPLACE INTO {ident} (key, value) VALUES (?1, ?2)"),
            select_sql: format!("SELECT value FROM {ident} WHERE key = ?1"),
            count_sql: format!("SELECT COUNT(*) FROM {ident}"),
        }
    }
}

impl TableHandle for SqliteTable {
    fn insert(&mut self, key: &Key, record: &Record) -> Result<()> {
        let value = record
            .to_json()
            .map_err(|e| Error::insert(SqliteAdapter::NAME, &self.table, e))?;
        self.conn
            .prepare_cached(&self.insert_sql)
            .and_then(|mut stmt| stmt.execute(params![key.as_str(), value]))
            .map_err(|e| Error::insert(SqliteAdapter::NAME, &self.table, e))?;
        Ok(())
    }

    fn size(&mut self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&self.count_sql, [], |row| row.get(0))
            .map_err(|e| Error::size(SqliteAdapter::NAME, &self.table, e))?;
        Ok(count as usize)
    }

    fn fetch(&mut self, key: &Key) -> Result<Option<Record>> {
        let value: Option<String> = self
            .conn
            .prepare_cached(&self.select_sql)
            .and_then(|mut stmt| {
                stmt.query_row(params![key.as_str()], |row| row.get(0))
                    .optional()
            })
            .map_err(|e| Error::fetch(SqliteAdapter::NAME, &self.table, e))?;
        value
            .map(|json| Record::from_json(json.as_bytes()))
            .transpose()
            .map_err(|e| Error::fetch(SqliteAdapter::NAME, &self.table, e))
    }

    fn close(self: Box<Self>) -> Result<()> {
        let SqliteTable { conn, table, .. } = *self;
        conn.close()
            .map_err(|(_, e)| Error::close(SqliteAdapter::NAME, &table, e))
    }
}

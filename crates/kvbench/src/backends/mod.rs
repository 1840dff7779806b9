//! Storage backends exercised by the harness.
//!
//! Each backend implements [`crate::adapter::Adapter`] and keeps its persisted
//! artifact (if any) at a path chosen by the registry.

pub mod memory;
pub mod sled;
pub mod sqlite;

pub use self::memory::MemoryAdapter;
pub use self::sled::SledAdapter;
pub use self::sqlite::SqliteAdapter;

//! Response store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the append/list contract every response store honors.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Stores are the only component that assigns ids and timestamps.
//! - All implementations list newest-first by `created_at`, ties by `id`.

pub mod memory_repo;
pub mod response_repo;

use crate::config::StorageConfig;
use crate::db::open_db;
use memory_repo::MemoryResponseStore;
use response_repo::{ResponseStore, SqliteResponseStore, StoreResult};

/// Opens the store selected by configuration.
pub fn open_store(config: &StorageConfig) -> StoreResult<Box<dyn ResponseStore>> {
    let store: Box<dyn ResponseStore> = match config {
        StorageConfig::Sqlite(path) => Box::new(SqliteResponseStore::new(open_db(path)?)),
        StorageConfig::Memory => Box::new(MemoryResponseStore::new()),
    };
    Ok(store)
}

//! Persistence port for best results and in-progress sessions.
//!
//! The engine never touches a concrete backend. It writes JSON strings under
//! fixed keys through [`KeyValueStore`], so tests inject [`MemoryStore`] and
//! the terminal driver uses [`FileStore`].

pub mod errors;
pub mod file;
pub mod memory;

use async_trait::async_trait;

pub use errors::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Keyed string store with `localStorage`-like semantics
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or replace the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`; removing an absent key is not an error
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

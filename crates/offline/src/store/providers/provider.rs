//! # Store Provider
//!
//! The trait every partition storage implementation must follow. A provider
//! owns a set of named partitions; operations on distinct partitions never
//! interfere. `put` is last-writer-wins and refreshes the entry's write
//! sequence, so `keys` always enumerates oldest-written first.

use async_trait::async_trait;

use crate::store::types::{CacheEntry, CacheKey, StoreResult};

/// A provider for named cache partitions and their entries
#[async_trait]
pub trait StoreProvider: Send + Sync {
    /// Create the partition if absent; idempotent.
    async fn open_partition(&self, partition: &str) -> StoreResult<()>;

    /// Delete a partition and everything in it. Absent partitions are not
    /// an error.
    async fn delete_partition(&self, partition: &str) -> StoreResult<()>;

    /// Names of every existing partition.
    async fn partition_names(&self) -> StoreResult<Vec<String>>;

    /// Check if the partition contains an entry for the given key
    async fn contains(&self, partition: &str, key: &CacheKey) -> StoreResult<bool>;

    /// Get an entry from the partition
    async fn get(&self, partition: &str, key: &CacheKey) -> StoreResult<Option<CacheEntry>>;

    /// Put an entry into the partition, overwriting any entry for its key
    async fn put(&self, partition: &str, entry: CacheEntry) -> StoreResult<()>;

    /// Remove an entry from the partition
    async fn remove(&self, partition: &str, key: &CacheKey) -> StoreResult<()>;

    /// Keys in write order, oldest first
    async fn keys(&self, partition: &str) -> StoreResult<Vec<CacheKey>>;

    /// Number of entries in the partition
    async fn len(&self, partition: &str) -> StoreResult<usize>;
}

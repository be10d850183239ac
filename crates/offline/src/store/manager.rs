//! # Cache Store Manager
//!
//! Thin facade over a [`StoreProvider`] that owns every partition. All cache
//! mutation in the worker flows through this type.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::store::providers::{DiskStore, MemoryStore, StoreProvider};
use crate::store::types::{CacheEntry, CacheKey, StoreResult};

/// Owner of all cache partitions
#[derive(Clone)]
pub struct CacheStore {
    provider: Arc<dyn StoreProvider>,
}

impl CacheStore {
    /// In-process store; contents die with the worker.
    pub fn in_memory() -> Self {
        Self::with_provider(Arc::new(MemoryStore::new()))
    }

    /// Durable store rooted at the given directory.
    pub fn on_disk(root: impl Into<PathBuf>) -> Self {
        Self::with_provider(Arc::new(DiskStore::new(root)))
    }

    pub fn with_provider(provider: Arc<dyn StoreProvider>) -> Self {
        Self { provider }
    }

    /// Open a partition, creating it if absent; idempotent.
    pub async fn open(&self, partition: &str) -> StoreResult<()> {
        self.provider.open_partition(partition).await
    }

    /// Delete a partition and everything in it.
    pub async fn delete_partition(&self, partition: &str) -> StoreResult<()> {
        self.provider.delete_partition(partition).await
    }

    /// Names of every existing partition.
    pub async fn partition_names(&self) -> StoreResult<Vec<String>> {
        self.provider.partition_names().await
    }

    pub async fn contains(&self, partition: &str, key: &CacheKey) -> StoreResult<bool> {
        self.provider.contains(partition, key).await
    }

    /// Look up a stored snapshot. Never blocks on the network.
    pub async fn match_entry(
        &self,
        partition: &str,
        key: &CacheKey,
    ) -> StoreResult<Option<CacheEntry>> {
        let entry = self.provider.get(partition, key).await?;
        debug!(partition, url = %key.url, hit = entry.is_some(), "cache lookup");
        Ok(entry)
    }

    /// Store a snapshot, overwriting any entry for its key.
    pub async fn put(&self, partition: &str, entry: CacheEntry) -> StoreResult<()> {
        self.provider.put(partition, entry).await
    }

    pub async fn remove(&self, partition: &str, key: &CacheKey) -> StoreResult<()> {
        self.provider.remove(partition, key).await
    }

    /// Keys in write order, oldest first.
    pub async fn keys(&self, partition: &str) -> StoreResult<Vec<CacheKey>> {
        self.provider.keys(partition).await
    }

    pub async fn len(&self, partition: &str) -> StoreResult<usize> {
        self.provider.len(partition).await
    }
}

//! # Memory Store Provider
//!
//! In-process partition storage. Each partition keeps its entries in a map
//! plus a monotonic write counter, which gives the FIFO enumeration order
//! the eviction job relies on.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::store::providers::provider::StoreProvider;
use crate::store::types::{CacheEntry, CacheKey, StoreResult};

#[derive(Default)]
struct MemoryPartition {
    entries: HashMap<CacheKey, CacheEntry>,
    next_seq: u64,
}

/// Memory-backed store provider
#[derive(Default)]
pub struct MemoryStore {
    partitions: RwLock<HashMap<String, MemoryPartition>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StoreProvider for MemoryStore {
    async fn open_partition(&self, partition: &str) -> StoreResult<()> {
        let mut partitions = self.partitions.write();
        if !partitions.contains_key(partition) {
            debug!(partition, "opened memory partition");
            partitions.insert(partition.to_owned(), MemoryPartition::default());
        }
        Ok(())
    }

    async fn delete_partition(&self, partition: &str) -> StoreResult<()> {
        if self.partitions.write().remove(partition).is_some() {
            debug!(partition, "deleted memory partition");
        }
        Ok(())
    }

    async fn partition_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.partitions.read().keys().cloned().collect())
    }

    async fn contains(&self, partition: &str, key: &CacheKey) -> StoreResult<bool> {
        Ok(self
            .partitions
            .read()
            .get(partition)
            .is_some_and(|p| p.entries.contains_key(key)))
    }

    async fn get(&self, partition: &str, key: &CacheKey) -> StoreResult<Option<CacheEntry>> {
        Ok(self
            .partitions
            .read()
            .get(partition)
            .and_then(|p| p.entries.get(key).cloned()))
    }

    async fn put(&self, partition: &str, mut entry: CacheEntry) -> StoreResult<()> {
        let mut partitions = self.partitions.write();
        let slot = partitions.entry(partition.to_owned()).or_default();

        entry.meta.seq = slot.next_seq;
        slot.next_seq += 1;
        slot.entries.insert(entry.key(), entry);
        Ok(())
    }

    async fn remove(&self, partition: &str, key: &CacheKey) -> StoreResult<()> {
        if let Some(slot) = self.partitions.write().get_mut(partition) {
            slot.entries.remove(key);
        }
        Ok(())
    }

    async fn keys(&self, partition: &str) -> StoreResult<Vec<CacheKey>> {
        let partitions = self.partitions.read();
        let Some(slot) = partitions.get(partition) else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<_> = slot
            .entries
            .values()
            .map(|entry| (entry.meta.seq, entry.key()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);

        Ok(entries.into_iter().map(|(_, key)| key).collect())
    }

    async fn len(&self, partition: &str) -> StoreResult<usize> {
        Ok(self
            .partitions
            .read()
            .get(partition)
            .map_or(0, |p| p.entries.len()))
    }
}

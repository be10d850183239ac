//! # Disk Store Provider
//!
//! Durable partition storage. Each partition is a directory under the store
//! root; each entry is a body file plus a JSON metadata sidecar, written via
//! a temporary file and rename. Write sequences are persisted in the
//! metadata so FIFO enumeration order survives a restart.

use std::collections::HashMap;
use std::path::PathBuf;

use bytes::Bytes;
use tokio::fs;
use tokio::io;
use tracing::{debug, warn};

use crate::store::providers::provider::StoreProvider;
use crate::store::types::{CacheEntry, CacheKey, EntryMetadata, StoreResult};

/// Disk-backed store provider
pub struct DiskStore {
    root: PathBuf,
    /// Next write sequence per partition, rebuilt lazily from metadata.
    seqs: tokio::sync::Mutex<HashMap<String, u64>>,
}

impl DiskStore {
    /// Create a disk store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            seqs: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    fn partition_dir(&self, partition: &str) -> PathBuf {
        self.root.join(partition)
    }

    fn data_path(&self, partition: &str, key: &CacheKey) -> PathBuf {
        self.partition_dir(partition)
            .join(format!("{}.bin", key.to_filename()))
    }

    fn meta_path(&self, partition: &str, key: &CacheKey) -> PathBuf {
        self.partition_dir(partition)
            .join(format!("{}.meta", key.to_filename()))
    }

    /// Claim the next write sequence for a partition, scanning existing
    /// metadata on first use so ordering survives reopen.
    async fn next_seq(&self, partition: &str) -> StoreResult<u64> {
        let mut seqs = self.seqs.lock().await;

        if let Some(next) = seqs.get_mut(partition) {
            let claimed = *next;
            *next += 1;
            return Ok(claimed);
        }

        let mut next = 0;
        for meta in self.read_partition_metadata(partition).await? {
            next = next.max(meta.seq + 1);
        }

        seqs.insert(partition.to_owned(), next + 1);
        Ok(next)
    }

    /// Read every entry's metadata in a partition, discarding unreadable
    /// sidecars together with their body files.
    async fn read_partition_metadata(&self, partition: &str) -> StoreResult<Vec<EntryMetadata>> {
        let dir = self.partition_dir(partition);
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(dirent) = entries.next_entry().await? {
            let path = dirent.path();
            if path.extension().and_then(|e| e.to_str()) != Some("meta") {
                continue;
            }

            let bytes = match fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(error) => {
                    warn!(path = ?path, error = %error, "failed to read cache metadata file");
                    continue;
                }
            };

            match serde_json::from_slice::<EntryMetadata>(&bytes) {
                Ok(meta) => out.push(meta),
                Err(error) => {
                    warn!(path = ?path, error = %error, "discarding corrupt cache metadata");
                    let _ = fs::remove_file(path.with_extension("bin")).await;
                    let _ = fs::remove_file(&path).await;
                }
            }
        }

        Ok(out)
    }
}

#[async_trait::async_trait]
impl StoreProvider for DiskStore {
    async fn open_partition(&self, partition: &str) -> StoreResult<()> {
        fs::create_dir_all(self.partition_dir(partition)).await?;
        debug!(partition, "opened disk partition");
        Ok(())
    }

    async fn delete_partition(&self, partition: &str) -> StoreResult<()> {
        self.seqs.lock().await.remove(partition);

        match fs::remove_dir_all(self.partition_dir(partition)).await {
            Ok(()) => {
                debug!(partition, "deleted disk partition");
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error),
        }
    }

    async fn partition_names(&self) -> StoreResult<Vec<String>> {
        if !fs::try_exists(&self.root).await? {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(dirent) = entries.next_entry().await? {
            let file_name = dirent.file_name();
            if dirent.file_type().await?.is_dir()
                && let Some(name) = file_name.to_str()
            {
                names.push(name.to_owned());
            }
        }
        Ok(names)
    }

    async fn contains(&self, partition: &str, key: &CacheKey) -> StoreResult<bool> {
        let data_exists = fs::try_exists(self.data_path(partition, key)).await?;
        let meta_exists = fs::try_exists(self.meta_path(partition, key)).await?;
        Ok(data_exists && meta_exists)
    }

    async fn get(&self, partition: &str, key: &CacheKey) -> StoreResult<Option<CacheEntry>> {
        let data_path = self.data_path(partition, key);
        let meta_path = self.meta_path(partition, key);

        if !fs::try_exists(&data_path).await? || !fs::try_exists(&meta_path).await? {
            return Ok(None);
        }

        let meta_bytes = match fs::read(&meta_path).await {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(path = ?meta_path, error = %error, "failed to read cache metadata file");
                return Ok(None);
            }
        };

        let meta: EntryMetadata = match serde_json::from_slice(&meta_bytes) {
            Ok(meta) => meta,
            Err(error) => {
                warn!(path = ?meta_path, error = %error, "discarding corrupt cache metadata");
                let _ = fs::remove_file(&data_path).await;
                let _ = fs::remove_file(&meta_path).await;
                return Ok(None);
            }
        };

        let body = match fs::read(&data_path).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(error) => {
                warn!(path = ?data_path, error = %error, "failed to read cache body file");
                return Ok(None);
            }
        };

        Ok(Some(CacheEntry { meta, body }))
    }

    async fn put(&self, partition: &str, mut entry: CacheEntry) -> StoreResult<()> {
        fs::create_dir_all(self.partition_dir(partition)).await?;
        entry.meta.seq = self.next_seq(partition).await?;

        let key = entry.key();
        let data_path = self.data_path(partition, &key);
        let meta_path = self.meta_path(partition, &key);

        let meta_json = serde_json::to_vec(&entry.meta).map_err(|error| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to serialize cache metadata: {error}"),
            )
        })?;

        // Write through temp files, then rename into place.
        let temp_data = data_path.with_extension("bin.tmp");
        let temp_meta = meta_path.with_extension("meta.tmp");

        fs::write(&temp_data, &entry.body).await?;
        if let Err(error) = fs::write(&temp_meta, &meta_json).await {
            let _ = fs::remove_file(&temp_data).await;
            return Err(error);
        }

        if let Err(error) = fs::rename(&temp_data, &data_path).await {
            let _ = fs::remove_file(&temp_data).await;
            let _ = fs::remove_file(&temp_meta).await;
            return Err(error);
        }
        if let Err(error) = fs::rename(&temp_meta, &meta_path).await {
            let _ = fs::remove_file(&data_path).await;
            let _ = fs::remove_file(&temp_meta).await;
            return Err(error);
        }

        debug!(partition, url = %key.url, "cached entry to disk");
        Ok(())
    }

    async fn remove(&self, partition: &str, key: &CacheKey) -> StoreResult<()> {
        let data_result = fs::remove_file(self.data_path(partition, key)).await;
        let meta_result = fs::remove_file(self.meta_path(partition, key)).await;

        match (data_result, meta_result) {
            (Err(error), _) if error.kind() != io::ErrorKind::NotFound => Err(error),
            (_, Err(error)) if error.kind() != io::ErrorKind::NotFound => Err(error),
            _ => Ok(()),
        }
    }

    async fn keys(&self, partition: &str) -> StoreResult<Vec<CacheKey>> {
        let mut metas = self.read_partition_metadata(partition).await?;
        metas.sort_by_key(|meta| meta.seq);

        Ok(metas
            .into_iter()
            .map(|meta| CacheKey::new(meta.method, meta.url))
            .collect())
    }

    async fn len(&self, partition: &str) -> StoreResult<usize> {
        let dir = self.partition_dir(partition);
        if !fs::try_exists(&dir).await? {
            return Ok(0);
        }

        let mut count = 0;
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(dirent) = entries.next_entry().await? {
            if dirent.path().extension().and_then(|e| e.to_str()) == Some("meta") {
                count += 1;
            }
        }
        Ok(count)
    }
}

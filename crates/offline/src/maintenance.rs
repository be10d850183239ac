//! # Maintenance Jobs
//!
//! Housekeeping over the cache partitions: FIFO eviction for the dynamic
//! partition, forced refreshes, the full wipe behind the host's
//! "clear cache" action, and the connectivity-restored resync. Storage and
//! fetch failures inside a batch are logged and never abort the batch.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::fetch::Fetcher;
use crate::request::WebRequest;
use crate::store::{CacheEntry, CacheKey, CacheStore, StoreResult};

/// Evict oldest-written entries until the partition is back at its ceiling.
/// Pure FIFO: enumeration order is the store's write order.
pub async fn enforce_entry_limit(
    store: &CacheStore,
    partition: &str,
    ceiling: usize,
) -> StoreResult<()> {
    let keys = store.keys(partition).await?;
    if keys.len() <= ceiling {
        return Ok(());
    }

    let excess = keys.len() - ceiling;
    debug!(partition, excess, ceiling, "evicting oldest entries");

    for key in keys.into_iter().take(excess) {
        if let Err(error) = store.remove(partition, &key).await {
            warn!(partition, url = %key.url, error = %error, "failed to evict entry");
        }
    }
    Ok(())
}

/// Refetch each URL bypassing intermediate caches and overwrite its entry in
/// the static partition. Returns how many entries were refreshed.
pub async fn force_refresh(
    store: &CacheStore,
    fetcher: &dyn Fetcher,
    config: &WorkerConfig,
    urls: &[String],
) -> usize {
    let partition = config.static_cache_name();

    let outcomes = join_all(urls.iter().map(|asset| {
        let partition = partition.as_str();
        async move {
            let url = match config.resolve(asset) {
                Ok(url) => url,
                Err(error) => {
                    warn!(asset = asset.as_str(), error = %error, "skipping unresolvable refresh target");
                    return false;
                }
            };

            let request = WebRequest::get(url);
            refresh_one(store, fetcher, partition, &request, true).await
        }
    }))
    .await;

    let refreshed = outcomes.into_iter().filter(|ok| *ok).count();
    info!(refreshed, requested = urls.len(), "forced refresh finished");
    refreshed
}

/// Refetch every configured api-data URL and overwrite its dynamic-partition
/// entry. Best-effort: runs when connectivity returns, stops at nothing.
pub async fn resync_api_data(
    store: &CacheStore,
    fetcher: &dyn Fetcher,
    config: &WorkerConfig,
) -> usize {
    let partition = config.dynamic_cache_name();

    let outcomes = join_all(config.api_urls.iter().map(|endpoint| {
        let partition = partition.as_str();
        async move {
            let url = match config.resolve(endpoint) {
                Ok(url) => url,
                Err(error) => {
                    warn!(endpoint = endpoint.as_str(), error = %error, "skipping unresolvable api url");
                    return false;
                }
            };

            let request = WebRequest::get(url);
            refresh_one(store, fetcher, partition, &request, false).await
        }
    }))
    .await;

    let refreshed = outcomes.into_iter().filter(|ok| *ok).count();
    debug!(refreshed, total = config.api_urls.len(), "background resync finished");
    refreshed
}

async fn refresh_one(
    store: &CacheStore,
    fetcher: &dyn Fetcher,
    partition: &str,
    request: &WebRequest,
    bypass: bool,
) -> bool {
    let fetched = if bypass {
        fetcher.fetch_bypass_cache(request).await
    } else {
        fetcher.fetch(request).await
    };

    match fetched {
        Ok(response) if response.is_ok() => {
            let key = CacheKey::from_request(request);
            match store
                .put(partition, CacheEntry::from_response(&key, &response))
                .await
            {
                Ok(()) => true,
                Err(error) => {
                    warn!(url = %request.url, error = %error, "failed to store refreshed entry");
                    false
                }
            }
        }
        Ok(response) => {
            warn!(url = %request.url, status = %response.status, "refresh skipped non-200 response");
            false
        }
        Err(error) => {
            warn!(url = %request.url, error = %error, "refresh fetch failed");
            false
        }
    }
}

/// Delete every partition unconditionally.
pub async fn clear_all(store: &CacheStore) -> StoreResult<()> {
    let names = store.partition_names().await?;
    info!(count = names.len(), "clearing all cache partitions");

    let mut first_error = None;
    for name in names {
        if let Err(error) = store.delete_partition(&name).await {
            warn!(partition = %name, error = %error, "failed to delete partition");
            first_error.get_or_insert(error);
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

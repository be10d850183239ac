//! # Strategy Router
//!
//! One caching strategy per resource class. Strategies raise; the router's
//! dispatch boundary catches everything and resolves it to the offline
//! fallback, so no request ever surfaces an error to the host.
//!
//! - static: cache-first, with a fire-and-forget revalidation once a hit is
//!   older than the static threshold
//! - api: network-first under a bounded timeout, cache fallback, synthetic
//!   offline JSON as the last resort
//! - dynamic-binary: network-first into the bounded dynamic partition
//! - generic: best-effort network with a silent cache fallback

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::classify::{Classifier, ResourceClass};
use crate::config::WorkerConfig;
use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::maintenance;
use crate::request::{WebRequest, WebResponse};
use crate::store::{CacheEntry, CacheKey, CacheStore};

const OFFLINE_API_MESSAGE: &str = "data unavailable while offline";

/// Routes classified requests through their caching strategies.
pub struct StrategyRouter {
    config: Arc<WorkerConfig>,
    classifier: Classifier,
    store: CacheStore,
    fetcher: Arc<dyn Fetcher>,
}

impl StrategyRouter {
    pub fn new(config: Arc<WorkerConfig>, store: CacheStore, fetcher: Arc<dyn Fetcher>) -> Self {
        let classifier = Classifier::from_config(&config);
        Self {
            config,
            classifier,
            store,
            fetcher,
        }
    }

    /// Resolve a request to a response. Never fails: strategy errors become
    /// the offline fallback.
    pub async fn handle(&self, request: &WebRequest) -> WebResponse {
        if !request.is_http() {
            // Non-HTTP schemes pass straight through, uncached.
            return match self.fetcher.fetch(request).await {
                Ok(response) => response,
                Err(error) => {
                    debug!(url = %request.url, error = %error, "non-http fetch failed");
                    self.offline_fallback(request).await
                }
            };
        }

        let class = self.classifier.classify(request);
        let result = match class {
            ResourceClass::Static => self.static_strategy(request).await,
            ResourceClass::Api => self.api_strategy(request).await,
            ResourceClass::DynamicBinary => self.dynamic_strategy(request).await,
            ResourceClass::Generic => self.generic_strategy(request).await,
        };

        match result {
            Ok(response) => response,
            Err(error) => {
                debug!(url = %request.url, class = ?class, error = %error, "serving offline fallback");
                self.offline_fallback(request).await
            }
        }
    }

    /// Cache-first with stale revalidation.
    async fn static_strategy(&self, request: &WebRequest) -> Result<WebResponse, FetchError> {
        let partition = self.config.static_cache_name();
        let key = CacheKey::from_request(request);

        if let Some(entry) = self.store.match_entry(&partition, &key).await? {
            if entry.is_stale(self.config.max_age.static_assets) {
                self.spawn_background_refresh(request.clone(), partition);
            }
            return Ok(entry.to_response());
        }

        let response = self.fetcher.fetch(request).await?;
        if response.is_ok() {
            let entry = CacheEntry::from_response(&key, &response);
            if let Err(error) = self.store.put(&partition, entry).await {
                warn!(url = %request.url, error = %error, "failed to cache static response");
            }
        }
        Ok(response)
    }

    /// Network-first under a bounded timeout, cache fallback, synthetic
    /// offline JSON when neither is available.
    async fn api_strategy(&self, request: &WebRequest) -> Result<WebResponse, FetchError> {
        let partition = self.config.dynamic_cache_name();
        let key = CacheKey::from_request(request);

        // Probe the fallback up front; the network attempt still always
        // runs first while reachable.
        let cached = match self.store.match_entry(&partition, &key).await {
            Ok(entry) => entry,
            Err(error) => {
                warn!(url = %request.url, error = %error, "api cache probe failed");
                None
            }
        };

        // The store write lives inside the timeout, so an abandoned attempt
        // cannot land a late entry after we have fallen back.
        let attempt = timeout(
            self.config.api_timeout,
            self.fetch_and_store_api(request, &partition, &key),
        )
        .await;

        let error = match attempt {
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(error)) => error,
            Err(_) => FetchError::Timeout(self.config.api_timeout),
        };

        match cached {
            Some(entry) => {
                debug!(url = %request.url, error = %error, "serving cached api data");
                Ok(entry.to_response())
            }
            None => {
                debug!(url = %request.url, error = %error, "synthesizing offline api response");
                Ok(WebResponse::offline_json(OFFLINE_API_MESSAGE))
            }
        }
    }

    async fn fetch_and_store_api(
        &self,
        request: &WebRequest,
        partition: &str,
        key: &CacheKey,
    ) -> Result<WebResponse, FetchError> {
        let response = self.fetcher.fetch(request).await?;
        if !response.is_ok() {
            return Err(FetchError::UpstreamStatus(response.status));
        }

        let entry = CacheEntry::from_response(key, &response);
        if let Err(error) = self.store.put(partition, entry).await {
            warn!(url = %request.url, error = %error, "failed to cache api response");
        }
        Ok(response)
    }

    /// Network-first into the bounded dynamic partition.
    async fn dynamic_strategy(&self, request: &WebRequest) -> Result<WebResponse, FetchError> {
        let partition = self.config.dynamic_cache_name();
        let key = CacheKey::from_request(request);

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    let entry = CacheEntry::from_response(&key, &response);
                    match self.store.put(&partition, entry).await {
                        Ok(()) => {
                            if let Err(error) = maintenance::enforce_entry_limit(
                                &self.store,
                                &partition,
                                self.config.max_entries.dynamic,
                            )
                            .await
                            {
                                warn!(partition = %partition, error = %error, "dynamic eviction failed");
                            }
                        }
                        Err(error) => {
                            warn!(url = %request.url, error = %error, "failed to cache dynamic response");
                        }
                    }
                }
                Ok(response)
            }
            Err(error) => match self.store.match_entry(&partition, &key).await? {
                Some(entry) => Ok(entry.to_response()),
                None => Err(error),
            },
        }
    }

    /// Best-effort network; cache fallback is silent and optional.
    async fn generic_strategy(&self, request: &WebRequest) -> Result<WebResponse, FetchError> {
        match self.fetcher.fetch(request).await {
            Ok(response) => Ok(response),
            Err(error) => {
                let partition = self.config.dynamic_cache_name();
                let key = CacheKey::from_request(request);
                match self.store.match_entry(&partition, &key).await.ok().flatten() {
                    Some(entry) => Ok(entry.to_response()),
                    None => Err(error),
                }
            }
        }
    }

    /// Last line of defense; never fails. Navigations get the cached shell
    /// when one exists, everything else gets the fixed 503.
    pub async fn offline_fallback(&self, request: &WebRequest) -> WebResponse {
        if request.is_navigation() {
            let partition = self.config.static_cache_name();
            for path in ["/index.html", "/"] {
                let Ok(url) = self.config.origin.join(path) else {
                    continue;
                };
                let key = CacheKey::new("GET", url.as_str());
                if let Ok(Some(entry)) = self.store.match_entry(&partition, &key).await {
                    return entry.to_response();
                }
            }
        }

        WebResponse::offline_text()
    }

    /// Fire-and-forget refetch that overwrites the static entry on success.
    /// Failures are logged, never surfaced to the request that triggered it.
    fn spawn_background_refresh(&self, request: WebRequest, partition: String) {
        let store = self.store.clone();
        let fetcher = Arc::clone(&self.fetcher);

        tokio::spawn(async move {
            let key = CacheKey::from_request(&request);
            match fetcher.fetch(&request).await {
                Ok(response) if response.is_ok() => {
                    let entry = CacheEntry::from_response(&key, &response);
                    if let Err(error) = store.put(&partition, entry).await {
                        warn!(url = %request.url, error = %error, "background refresh store failed");
                    } else {
                        debug!(url = %request.url, "background refresh updated static entry");
                    }
                }
                Ok(response) => {
                    debug!(url = %request.url, status = %response.status, "background refresh skipped non-200");
                }
                Err(error) => {
                    warn!(url = %request.url, error = %error, "background refresh failed");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{RequestMode, ServedFrom};
    use crate::test_support::{StubFetcher, init_tracing};
    use bytes::Bytes;
    use reqwest::StatusCode;
    use reqwest::header::HeaderMap;
    use std::time::Duration;
    use url::Url;

    fn router_with(
        config: WorkerConfig,
    ) -> (StrategyRouter, CacheStore, Arc<StubFetcher>) {
        let store = CacheStore::in_memory();
        let fetcher = Arc::new(StubFetcher::new());
        let router = StrategyRouter::new(
            Arc::new(config),
            store.clone(),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        );
        (router, store, fetcher)
    }

    fn router() -> (StrategyRouter, CacheStore, Arc<StubFetcher>) {
        router_with(WorkerConfig::default())
    }

    fn get(url: &str) -> WebRequest {
        WebRequest::get(Url::parse(url).unwrap())
    }

    fn entry(url: &str, body: &str) -> CacheEntry {
        let response = WebResponse::from_network(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from(body.to_owned()),
        );
        CacheEntry::from_response(&CacheKey::new("GET", url), &response)
    }

    #[tokio::test]
    async fn static_second_hit_skips_network() {
        let (router, _store, fetcher) = router();
        fetcher.respond("https://portico.news/styles/main.css", 200, "body {}");

        let request = get("https://portico.news/styles/main.css");
        let first = router.handle(&request).await;
        assert_eq!(first.served_from, ServedFrom::Network);
        assert_eq!(fetcher.fetches(), 1);

        let second = router.handle(&request).await;
        assert_eq!(second.served_from, ServedFrom::Cache);
        assert_eq!(&second.body[..], b"body {}");
        // Fresh cache entry: zero additional network fetches.
        assert_eq!(fetcher.fetches(), 1);
    }

    #[tokio::test]
    async fn static_stale_hit_is_served_and_revalidated() {
        init_tracing();
        let (router, store, fetcher) = router();
        let url = "https://portico.news/js/app.js";
        fetcher.respond(url, 200, "fresh build");

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let mut stale = entry(url, "old build");
        stale.meta.stored_at = now - 8 * 24 * 60 * 60;
        store.put("portico-static-v1.0.0", stale).await.unwrap();

        let response = router.handle(&get(url)).await;
        // The stale copy is served immediately.
        assert_eq!(&response.body[..], b"old build");
        assert_eq!(response.served_from, ServedFrom::Cache);

        // The background refetch lands shortly after.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(fetcher.fetches(), 1);
        let refreshed = store
            .match_entry("portico-static-v1.0.0", &CacheKey::new("GET", url))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&refreshed.body[..], b"fresh build");
    }

    #[tokio::test]
    async fn static_miss_offline_falls_back() {
        let (router, _store, fetcher) = router();
        fetcher.set_online(false);

        let response = router.handle(&get("https://portico.news/styles/main.css")).await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(&response.body[..], b"content unavailable offline");
    }

    #[tokio::test]
    async fn api_network_preferred_and_written_through() {
        let (router, store, fetcher) = router();
        let url = "https://api.bluelytics.com.ar/v2/latest";
        fetcher.respond(url, 200, r#"{"blue":{"value_sell":1440}}"#);

        store
            .put("portico-dynamic-v1.0.0", entry(url, "stale quote"))
            .await
            .unwrap();

        let response = router.handle(&get(url)).await;
        assert_eq!(response.served_from, ServedFrom::Network);
        assert_eq!(fetcher.fetches(), 1);

        let stored = store
            .match_entry("portico-dynamic-v1.0.0", &CacheKey::new("GET", url))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&stored.body[..], br#"{"blue":{"value_sell":1440}}"#);
    }

    #[tokio::test]
    async fn api_offline_serves_cached_entry_unmodified() {
        let (router, store, fetcher) = router();
        let url = "https://dolarapi.com/v1/dolares";
        store
            .put("portico-dynamic-v1.0.0", entry(url, "cached quotes"))
            .await
            .unwrap();
        fetcher.set_online(false);

        let response = router.handle(&get(url)).await;
        assert_eq!(response.served_from, ServedFrom::Cache);
        assert_eq!(&response.body[..], b"cached quotes");
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn api_offline_without_cache_synthesizes_503_json() {
        let (router, _store, fetcher) = router();
        fetcher.set_online(false);

        let response = router.handle(&get("https://dolarapi.com/v1/dolares")).await;
        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.served_from, ServedFrom::Synthetic);

        let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(value["error"], "offline");
        assert_eq!(value["cached"], false);
        assert!(value["message"].is_string());
    }

    #[tokio::test]
    async fn api_non_200_falls_back_to_cache() {
        let (router, store, fetcher) = router();
        let url = "https://api.bluelytics.com.ar/v2/latest";
        fetcher.respond(url, 502, "bad gateway");
        store
            .put("portico-dynamic-v1.0.0", entry(url, "last good quotes"))
            .await
            .unwrap();

        let response = router.handle(&get(url)).await;
        assert_eq!(&response.body[..], b"last good quotes");
        assert_eq!(response.served_from, ServedFrom::Cache);
    }

    #[tokio::test]
    async fn api_timeout_prefers_cache_and_suppresses_late_write() {
        let config = WorkerConfig::builder()
            .with_api_timeout(Duration::from_millis(20))
            .build();
        let (router, store, fetcher) = router_with(config);
        let url = "https://api.bluelytics.com.ar/v2/latest";
        fetcher.respond(url, 200, "too late");
        fetcher.set_delay(Duration::from_millis(200));
        store
            .put("portico-dynamic-v1.0.0", entry(url, "cached quotes"))
            .await
            .unwrap();

        let response = router.handle(&get(url)).await;
        assert_eq!(&response.body[..], b"cached quotes");

        // The abandoned attempt must not overwrite the entry afterwards.
        tokio::time::sleep(Duration::from_millis(300)).await;
        let stored = store
            .match_entry("portico-dynamic-v1.0.0", &CacheKey::new("GET", url))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&stored.body[..], b"cached quotes");
    }

    #[tokio::test]
    async fn dynamic_partition_never_exceeds_ceiling() {
        init_tracing();
        let (router, store, fetcher) = router();
        for index in 0..60 {
            let url = format!("https://images.example.com/photo-{index}.jpg");
            fetcher.respond(&url, 200, "image bytes");
            router.handle(&get(&url)).await;
        }

        assert_eq!(store.len("portico-dynamic-v1.0.0").await.unwrap(), 50);

        // The retained entries are the 50 most recently written.
        let urls: Vec<_> = store
            .keys("portico-dynamic-v1.0.0")
            .await
            .unwrap()
            .into_iter()
            .map(|k| k.url)
            .collect();
        assert_eq!(urls[0], "https://images.example.com/photo-10.jpg");
        assert_eq!(urls[49], "https://images.example.com/photo-59.jpg");
    }

    #[tokio::test]
    async fn dynamic_offline_uses_cache_else_fallback() {
        let (router, store, fetcher) = router();
        let url = "https://images.example.com/banner.png";
        store
            .put("portico-dynamic-v1.0.0", entry(url, "cached image"))
            .await
            .unwrap();
        fetcher.set_online(false);

        let cached = router.handle(&get(url)).await;
        assert_eq!(&cached.body[..], b"cached image");

        // No cache entry: the raw failure reaches the dispatch boundary and
        // resolves to the fixed offline body.
        let missing = router
            .handle(&get("https://images.example.com/uncached.png"))
            .await;
        assert_eq!(missing.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(&missing.body[..], b"content unavailable offline");
    }

    #[tokio::test]
    async fn generic_failure_falls_back_silently() {
        let (router, store, fetcher) = router();
        let url = "https://example.com/articles/123";
        store
            .put("portico-dynamic-v1.0.0", entry(url, "cached article"))
            .await
            .unwrap();
        fetcher.set_online(false);

        let response = router.handle(&get(url)).await;
        assert_eq!(&response.body[..], b"cached article");
    }

    #[tokio::test]
    async fn navigation_fallback_serves_cached_shell() {
        let (router, store, fetcher) = router();
        store
            .put(
                "portico-static-v1.0.0",
                entry("https://portico.news/index.html", "<html>shell</html>"),
            )
            .await
            .unwrap();
        fetcher.set_online(false);

        let request = get("https://portico.news/articles/economia-hoy")
            .with_mode(RequestMode::Navigate);
        let response = router.handle(&request).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(&response.body[..], b"<html>shell</html>");
    }

    #[tokio::test]
    async fn navigation_fallback_without_shell_is_plain_503() {
        let (router, _store, fetcher) = router();
        fetcher.set_online(false);

        let request = get("https://portico.news/articles/economia-hoy")
            .with_mode(RequestMode::Navigate);
        let response = router.handle(&request).await;

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(&response.body[..], b"content unavailable offline");
    }
}

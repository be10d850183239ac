//! # Cache Store Types
//!
//! Request identity, stored-entry metadata, and the captured response
//! snapshot shared by every store provider.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::request::{ServedFrom, WebRequest, WebResponse};

/// Result of a store operation
pub type StoreResult<T> = std::result::Result<T, std::io::Error>;

/// Normalized request identity: method plus absolute URL. Vary headers are
/// deliberately not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: String,
    pub url: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            url: url.into(),
        }
    }

    pub fn from_request(request: &WebRequest) -> Self {
        Self::new(request.method.as_str(), request.url.as_str())
    }

    /// Convert to a filename-safe string
    pub fn to_filename(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(&self.method);
        hasher.update(" ");
        hasher.update(&self.url);

        let hash = hasher.finalize();
        format!("{hash:x}")
    }
}

/// Seconds since the unix epoch
pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Metadata stored alongside an entry's body snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// When the snapshot was captured (unix seconds).
    pub stored_at: u64,
    /// Per-partition write sequence; eviction order follows it.
    pub seq: u64,
}

/// A captured response stored under a [`CacheKey`].
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub meta: EntryMetadata,
    pub body: Bytes,
}

impl CacheEntry {
    /// Snapshot a response for storage. The write sequence is assigned by
    /// the provider when the entry is put.
    pub fn from_response(key: &CacheKey, response: &WebResponse) -> Self {
        let headers = response
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();

        Self {
            meta: EntryMetadata {
                method: key.method.clone(),
                url: key.url.clone(),
                status: response.status.as_u16(),
                headers,
                stored_at: now_secs(),
                seq: 0,
            },
            body: response.body.clone(),
        }
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.meta.method.clone(), self.meta.url.clone())
    }

    /// Whether the snapshot is older than the given freshness threshold.
    /// Staleness never deletes an entry; it only triggers revalidation.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        now_secs().saturating_sub(self.meta.stored_at) > max_age.as_secs()
    }

    /// Replay the snapshot as a response.
    pub fn to_response(&self) -> WebResponse {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.meta.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        WebResponse {
            status: StatusCode::from_u16(self.meta.status).unwrap_or(StatusCode::OK),
            headers,
            body: self.body.clone(),
            served_from: ServedFrom::Cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::CONTENT_TYPE;
    use url::Url;

    fn response(body: &str) -> WebResponse {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        WebResponse::from_network(
            StatusCode::OK,
            headers,
            Bytes::from(body.to_owned()),
        )
    }

    #[test]
    fn key_normalizes_method() {
        let a = CacheKey::new("get", "https://portico.news/");
        let b = CacheKey::new("GET", "https://portico.news/");
        assert_eq!(a, b);
        assert_eq!(a.to_filename(), b.to_filename());
    }

    #[test]
    fn key_from_request_uses_full_url() {
        let url = Url::parse("https://portico.news/index.html?ref=home").unwrap();
        let key = CacheKey::from_request(&WebRequest::get(url));
        assert_eq!(key.url, "https://portico.news/index.html?ref=home");
        assert_eq!(key.method, "GET");
    }

    #[test]
    fn entry_round_trips_response() {
        let key = CacheKey::new("GET", "https://portico.news/index.html");
        let entry = CacheEntry::from_response(&key, &response("<html></html>"));

        let replayed = entry.to_response();
        assert_eq!(replayed.status, StatusCode::OK);
        assert_eq!(&replayed.body[..], b"<html></html>");
        assert_eq!(replayed.served_from, ServedFrom::Cache);
        assert_eq!(
            replayed.headers.get(CONTENT_TYPE).unwrap(),
            HeaderValue::from_static("text/html")
        );
    }

    #[test]
    fn staleness_is_a_pure_threshold_check() {
        let key = CacheKey::new("GET", "https://portico.news/styles/main.css");
        let mut entry = CacheEntry::from_response(&key, &response("body {}"));

        assert!(!entry.is_stale(Duration::from_secs(60)));

        entry.meta.stored_at = now_secs() - 120;
        assert!(entry.is_stale(Duration::from_secs(60)));
        assert!(!entry.is_stale(Duration::from_secs(600)));
    }
}

//! # Request and Response Types
//!
//! Value types for the requests the host hands to the worker and the
//! responses the worker resolves them to. A `WebResponse` is always a fully
//! buffered snapshot so it can be stored into a cache partition verbatim.

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use url::Url;

/// How the host issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// A full-page document load.
    Navigate,
    /// Any subresource fetch (scripts, styles, images, data).
    #[default]
    Subresource,
}

/// An outbound request intercepted from the host page.
#[derive(Debug, Clone)]
pub struct WebRequest {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
    /// Headers carried through to the network unchanged.
    pub headers: HeaderMap,
}

impl WebRequest {
    /// Create a GET subresource request for the given URL
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            mode: RequestMode::Subresource,
            headers: HeaderMap::new(),
        }
    }

    /// Create a navigation (document load) request for the given URL
    pub fn navigate(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            mode: RequestMode::Navigate,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Whether this request targets an HTTP(S) URL the worker intercepts
    pub fn is_http(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    /// Fresh from the network.
    Network,
    /// Replayed from a cache partition.
    Cache,
    /// Synthesized locally (offline fallback).
    Synthetic,
}

/// A buffered response snapshot.
#[derive(Debug, Clone)]
pub struct WebResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub served_from: ServedFrom,
}

impl WebResponse {
    /// Wrap a network response snapshot
    pub fn from_network(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            served_from: ServedFrom::Network,
        }
    }

    /// The deterministic offline reply for api-class requests with no cached
    /// data: a 503 with a small JSON body.
    pub fn offline_json(message: &str) -> Self {
        let body = serde_json::json!({
            "error": "offline",
            "message": message,
            "cached": false,
        });

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            headers,
            body: Bytes::from(body.to_string()),
            served_from: ServedFrom::Synthetic,
        }
    }

    /// The fixed plain-text offline reply for everything else.
    pub fn offline_text() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            headers,
            body: Bytes::from_static(b"content unavailable offline"),
            served_from: ServedFrom::Synthetic,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }
}

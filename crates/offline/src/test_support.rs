//! Shared doubles for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::clients::ClientGateway;
use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::message::ClientMessage;
use crate::request::{WebRequest, WebResponse};

#[inline]
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer() // Write to test output
        .try_init();
}

/// Scripted fetcher: canned responses per URL, a connectivity switch, and an
/// optional per-request delay to exercise the timeout path. Unstubbed URLs
/// answer 404.
pub(crate) struct StubFetcher {
    online: AtomicBool,
    delay: Mutex<Option<Duration>>,
    responses: Mutex<HashMap<String, (u16, String)>>,
    fetches: AtomicUsize,
    bypass_fetches: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self {
            online: AtomicBool::new(true),
            delay: Mutex::new(None),
            responses: Mutex::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
            bypass_fetches: AtomicUsize::new(0),
        }
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.responses
            .lock()
            .insert(url.to_owned(), (status, body.to_owned()));
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn bypass_fetches(&self) -> usize {
        self.bypass_fetches.load(Ordering::SeqCst)
    }

    async fn answer(&self, request: &WebRequest) -> Result<WebResponse, FetchError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if !self.online.load(Ordering::SeqCst) {
            return Err(FetchError::Timeout(Duration::from_millis(5)));
        }

        let responses = self.responses.lock();
        match responses.get(request.url.as_str()) {
            Some((status, body)) => Ok(WebResponse::from_network(
                StatusCode::from_u16(*status).unwrap(),
                HeaderMap::new(),
                Bytes::from(body.clone()),
            )),
            None => Ok(WebResponse::from_network(
                StatusCode::NOT_FOUND,
                HeaderMap::new(),
                Bytes::new(),
            )),
        }
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &WebRequest) -> Result<WebResponse, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.answer(request).await
    }

    async fn fetch_bypass_cache(&self, request: &WebRequest) -> Result<WebResponse, FetchError> {
        self.bypass_fetches.fetch_add(1, Ordering::SeqCst);
        self.answer(request).await
    }
}

/// Gateway double that records what the worker sends.
#[derive(Default)]
pub(crate) struct RecordingGateway {
    broadcasts: Mutex<Vec<ClientMessage>>,
    claims: AtomicUsize,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broadcasts(&self) -> Vec<ClientMessage> {
        self.broadcasts.lock().clone()
    }

    pub fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientGateway for RecordingGateway {
    async fn broadcast(&self, message: &ClientMessage) {
        self.broadcasts.lock().push(message.clone());
    }

    async fn claim(&self) {
        self.claims.fetch_add(1, Ordering::SeqCst);
    }
}

//! # Network Fetcher
//!
//! The worker's only road to the network. Strategies and lifecycle jobs go
//! through the [`Fetcher`] trait so hosts and tests can substitute their own
//! transport; [`HttpFetcher`] is the reqwest-backed implementation used in
//! production.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use rustls::ClientConfig;
use rustls_platform_verifier::BuilderVerifierExt;
use tracing::debug;

use crate::error::FetchError;
use crate::request::{WebRequest, WebResponse};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Asynchronous transport for outbound requests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a request over the network.
    async fn fetch(&self, request: &WebRequest) -> Result<WebResponse, FetchError>;

    /// Fetch while bypassing any intermediate HTTP cache, for install-time
    /// freshness and forced refreshes.
    async fn fetch_bypass_cache(&self, request: &WebRequest) -> Result<WebResponse, FetchError>;
}

/// Create a reqwest Client for the worker
pub fn create_client(user_agent: &str) -> Result<Client, FetchError> {
    // Create the crypto provider
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());

    // Build platform default TLS configuration
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("Failed to configure default TLS protocol versions")
        .with_platform_verifier()
        .expect("Failed to configure platform certificate verifier")
        .with_no_client_auth();

    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        reqwest::header::ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate"),
    );
    default_headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );

    Client::builder()
        .pool_max_idle_per_host(5)
        .user_agent(user_agent)
        .default_headers(default_headers)
        .use_preconfigured_tls(tls_config)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(FetchError::from)
}

/// Reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: create_client(DEFAULT_USER_AGENT)?,
        })
    }

    /// Use an externally configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn execute(&self, request: &WebRequest, bypass: bool) -> Result<WebResponse, FetchError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if bypass {
            builder = builder
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache");
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        debug!(url = %request.url, status = %status, bytes = body.len(), bypass, "fetched");
        Ok(WebResponse::from_network(status, headers, body))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &WebRequest) -> Result<WebResponse, FetchError> {
        self.execute(request, false).await
    }

    async fn fetch_bypass_cache(&self, request: &WebRequest) -> Result<WebResponse, FetchError> {
        self.execute(request, true).await
    }
}

//! # Builder for WorkerConfig
//!
//! Fluent construction of [`WorkerConfig`] instances for hosts that deviate
//! from the stock deployment (different origin, manifest, or policy knobs).
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use portico_offline::WorkerConfig;
//!
//! let config = WorkerConfig::builder()
//!     .with_namespace("portal")
//!     .with_version("2.1.0")
//!     .with_api_timeout(Duration::from_secs(3))
//!     .build();
//!
//! assert_eq!(config.static_cache_name(), "portal-static-v2.1.0");
//! ```

use std::time::Duration;

use url::Url;

use crate::config::{EntryLimits, MaxAgePolicy, WorkerConfig};

/// Builder for creating WorkerConfig instances with a fluent API
#[derive(Debug, Clone)]
pub struct WorkerConfigBuilder {
    /// Internal config being built
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: WorkerConfig::default(),
        }
    }

    /// Set the partition-name namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set the deployed version string
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Set the origin the app shell is served from
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.config.origin = origin;
        self
    }

    /// Replace the static-asset manifest
    pub fn with_static_manifest<I, S>(mut self, manifest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.static_manifest = manifest.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the set of api-data hosts
    pub fn with_api_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.api_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the list of api-data URLs the resync job refreshes
    pub fn with_api_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.api_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Set the per-class freshness thresholds
    pub fn with_max_age(mut self, max_age: MaxAgePolicy) -> Self {
        self.config.max_age = max_age;
        self
    }

    /// Set the static-asset freshness threshold only
    pub fn with_static_max_age(mut self, max_age: Duration) -> Self {
        self.config.max_age.static_assets = max_age;
        self
    }

    /// Set the entry-count ceilings
    pub fn with_max_entries(mut self, limits: EntryLimits) -> Self {
        self.config.max_entries = limits;
        self
    }

    /// Set the dynamic-partition entry ceiling only
    pub fn with_dynamic_max_entries(mut self, ceiling: usize) -> Self {
        self.config.max_entries.dynamic = ceiling;
        self
    }

    /// Set the timeout bound for api-class network attempts
    pub fn with_api_timeout(mut self, timeout: Duration) -> Self {
        self.config.api_timeout = timeout;
        self
    }

    /// Build the WorkerConfig instance
    pub fn build(self) -> WorkerConfig {
        self.config
    }
}

impl Default for WorkerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

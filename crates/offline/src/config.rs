use std::time::Duration;

use url::Url;

use crate::error::FetchError;

const DEFAULT_NAMESPACE: &str = "portico";
const DEFAULT_VERSION: &str = "1.0.0";
const DEFAULT_ORIGIN: &str = "https://portico.news";

/// Per-class freshness thresholds. Only the static threshold drives the
/// revalidation trigger; the others are policy the host can inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxAgePolicy {
    pub static_assets: Duration,
    pub dynamic: Duration,
    pub api: Duration,
}

impl Default for MaxAgePolicy {
    fn default() -> Self {
        Self {
            static_assets: Duration::from_secs(7 * 24 * 60 * 60),
            dynamic: Duration::from_secs(24 * 60 * 60),
            api: Duration::from_secs(5 * 60),
        }
    }
}

/// Entry-count ceilings for the opportunistic partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLimits {
    pub dynamic: usize,
    pub api: usize,
}

impl Default for EntryLimits {
    fn default() -> Self {
        Self {
            dynamic: 50,
            api: 20,
        }
    }
}

/// Configurable options for the offline worker
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Partition-name prefix owned by this worker.
    pub namespace: String,

    /// Deployed version, stamped into partition names.
    pub version: String,

    /// Origin the app shell is served from; root-relative manifest entries
    /// resolve against it.
    pub origin: Url,

    /// The app shell: every path/URL pre-populated into the static partition
    /// at install time.
    pub static_manifest: Vec<String>,

    /// Hosts whose requests are classified as api-data.
    pub api_hosts: Vec<String>,

    /// The api-data URLs refreshed by the background resync job.
    pub api_urls: Vec<String>,

    /// Freshness thresholds per resource class.
    pub max_age: MaxAgePolicy,

    /// Entry-count ceilings.
    pub max_entries: EntryLimits,

    /// Bound on api-class network attempts before falling back to cache.
    pub api_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            version: DEFAULT_VERSION.to_owned(),
            origin: Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL"),
            static_manifest: WorkerConfig::default_manifest(),
            api_hosts: vec!["bluelytics.com.ar".to_owned(), "dolarapi.com".to_owned()],
            api_urls: vec![
                "https://api.bluelytics.com.ar/v2/latest".to_owned(),
                "https://dolarapi.com/v1/dolares".to_owned(),
            ],
            max_age: MaxAgePolicy::default(),
            max_entries: EntryLimits::default(),
            api_timeout: Duration::from_secs(5),
        }
    }
}

impl WorkerConfig {
    pub fn builder() -> crate::builder::WorkerConfigBuilder {
        crate::builder::WorkerConfigBuilder::new()
    }

    /// The application shell shipped with the portal, plus the two external
    /// stylesheet URLs it links.
    pub fn default_manifest() -> Vec<String> {
        [
            "/",
            "/index.html",
            "/manifest.json",
            "/styles/main.css",
            "/js/app.js",
            "/js/data.js",
            "/js/rates.js",
            "/js/pwa.js",
            "https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap",
            "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect()
    }

    /// Name of the versioned static partition
    pub fn static_cache_name(&self) -> String {
        format!("{}-static-v{}", self.namespace, self.version)
    }

    /// Name of the versioned dynamic partition
    pub fn dynamic_cache_name(&self) -> String {
        format!("{}-dynamic-v{}", self.namespace, self.version)
    }

    /// Umbrella identity of this install, reported to clients
    pub fn worker_tag(&self) -> String {
        format!("{}-v{}", self.namespace, self.version)
    }

    /// Prefix that marks a partition as owned by this worker's namespace
    pub fn cache_prefix(&self) -> String {
        format!("{}-", self.namespace)
    }

    /// Resolve a manifest entry or refresh target to an absolute URL
    pub fn resolve(&self, path_or_url: &str) -> Result<Url, FetchError> {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            Ok(Url::parse(path_or_url)?)
        } else {
            Ok(self.origin.join(path_or_url)?)
        }
    }
}

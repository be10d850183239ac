//! # Resource Classifier
//!
//! Buckets every intercepted request into exactly one [`ResourceClass`] so
//! the strategy router can pick a caching strategy. Classification is pure
//! and order-sensitive: the static rules win over the api rule, which wins
//! over the binary-extension rule; everything else is generic.

use url::Url;

use crate::config::WorkerConfig;
use crate::request::WebRequest;

/// Extensions always treated as shell/static assets, regardless of host.
const STATIC_EXTENSIONS: &[&str] = &["css", "js", "woff", "woff2", "ttf", "eot", "svg", "ico"];

/// Extensions cached opportunistically into the dynamic partition.
const BINARY_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// The category a request is bucketed into for strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    /// App-shell asset: cache-first with stale revalidation.
    Static,
    /// Exchange-rate data: network-first with bounded timeout.
    Api,
    /// Image-like runtime resource: network-first, bounded partition.
    DynamicBinary,
    /// Anything else: best-effort network with silent cache fallback.
    Generic,
}

/// A manifest entry prepared for matching.
#[derive(Debug, Clone)]
enum ManifestTarget {
    /// Root-relative shell path, compared against the request path.
    Path(String),
    /// Absolute external URL, compared by host and path.
    Absolute { host: String, path: String },
}

/// Pure request classifier derived from the worker configuration.
#[derive(Debug, Clone)]
pub struct Classifier {
    manifest: Vec<ManifestTarget>,
    api_hosts: Vec<String>,
}

impl Classifier {
    pub fn from_config(config: &WorkerConfig) -> Self {
        let manifest = config
            .static_manifest
            .iter()
            .filter_map(|entry| {
                if entry.starts_with("http://") || entry.starts_with("https://") {
                    let url = Url::parse(entry).ok()?;
                    let host = url.host_str()?.to_ascii_lowercase();
                    Some(ManifestTarget::Absolute {
                        host,
                        path: url.path().to_owned(),
                    })
                } else {
                    Some(ManifestTarget::Path(entry.clone()))
                }
            })
            .collect();

        let api_hosts = config
            .api_hosts
            .iter()
            .map(|host| host.to_ascii_lowercase())
            .collect();

        Self {
            manifest,
            api_hosts,
        }
    }

    /// Assign the request to exactly one resource class.
    pub fn classify(&self, request: &WebRequest) -> ResourceClass {
        if self.is_static(&request.url) {
            ResourceClass::Static
        } else if self.is_api(&request.url) {
            ResourceClass::Api
        } else if has_extension(&request.url, BINARY_EXTENSIONS) {
            ResourceClass::DynamicBinary
        } else {
            ResourceClass::Generic
        }
    }

    fn is_static(&self, url: &Url) -> bool {
        let path = url.path();
        let host = url.host_str().map(str::to_ascii_lowercase);

        let in_manifest = self.manifest.iter().any(|target| match target {
            ManifestTarget::Path(asset) => path == asset,
            ManifestTarget::Absolute {
                host: asset_host,
                path: asset_path,
            } => host.as_deref() == Some(asset_host.as_str()) && path == asset_path,
        });

        in_manifest || has_extension(url, STATIC_EXTENSIONS)
    }

    fn is_api(&self, url: &Url) -> bool {
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return false;
        };

        self.api_hosts
            .iter()
            .any(|api| host == *api || host.ends_with(&format!(".{api}")))
    }
}

/// Lower-cased extension of the last path segment, if any.
fn path_extension(url: &Url) -> Option<String> {
    let segment = url.path().rsplit('/').next()?;
    let (_, extension) = segment.rsplit_once('.')?;
    if extension.is_empty() {
        None
    } else {
        Some(extension.to_ascii_lowercase())
    }
}

fn has_extension(url: &Url, set: &[&str]) -> bool {
    path_extension(url).is_some_and(|ext| set.iter().any(|candidate| *candidate == ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::WebRequest;

    fn classifier() -> Classifier {
        Classifier::from_config(&WorkerConfig::default())
    }

    fn classify(url: &str) -> ResourceClass {
        let request = WebRequest::get(Url::parse(url).unwrap());
        classifier().classify(&request)
    }

    #[test]
    fn static_extensions_win_regardless_of_host() {
        assert_eq!(classify("https://portico.news/styles/main.css"), ResourceClass::Static);
        assert_eq!(classify("https://somewhere.else/vendor/lib.js"), ResourceClass::Static);
        assert_eq!(classify("https://cdn.example.com/fonts/inter.woff2"), ResourceClass::Static);
        // Even on an api host, the static extension set takes priority.
        assert_eq!(classify("https://dolarapi.com/widget/embed.js"), ResourceClass::Static);
    }

    #[test]
    fn manifest_paths_are_static() {
        assert_eq!(classify("https://portico.news/"), ResourceClass::Static);
        assert_eq!(classify("https://portico.news/index.html"), ResourceClass::Static);
        assert_eq!(classify("https://portico.news/manifest.json"), ResourceClass::Static);
    }

    #[test]
    fn external_manifest_urls_match_by_host_and_path() {
        assert_eq!(
            classify("https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap"),
            ResourceClass::Static
        );
        // Same host, different path: not part of the shell.
        assert_eq!(classify("https://fonts.googleapis.com/other"), ResourceClass::Generic);
    }

    #[test]
    fn api_hosts_take_priority_over_binary_extensions() {
        assert_eq!(classify("https://api.bluelytics.com.ar/v2/latest"), ResourceClass::Api);
        assert_eq!(classify("https://dolarapi.com/v1/dolares"), ResourceClass::Api);
        // A binary extension on an api host still classifies as api.
        assert_eq!(classify("https://dolarapi.com/charts/today.png"), ResourceClass::Api);
    }

    #[test]
    fn binary_extensions_are_dynamic() {
        assert_eq!(classify("https://images.example.com/photo.jpg"), ResourceClass::DynamicBinary);
        assert_eq!(classify("https://portico.news/media/banner.webp"), ResourceClass::DynamicBinary);
    }

    #[test]
    fn everything_else_is_generic() {
        assert_eq!(classify("https://example.com/articles/123"), ResourceClass::Generic);
        assert_eq!(classify("https://example.com/feed.xml"), ResourceClass::Generic);
    }

    #[test]
    fn classification_is_total() {
        // No extension, no host match: still gets a class.
        assert_eq!(classify("https://example.com/"), ResourceClass::Generic);
    }
}

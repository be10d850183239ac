//! # Lifecycle Controller
//!
//! Drives a deployed worker version through `parsed → installing →
//! installed → activating → active`. Install pre-populates the static
//! partition from the manifest; activation evicts every partition left over
//! from other installs of this namespace and claims the open client pages.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::clients::ClientGateway;
use crate::config::WorkerConfig;
use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::message::ClientMessage;
use crate::request::WebRequest;
use crate::store::{CacheEntry, CacheKey, CacheStore};

/// Lifecycle state of a worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Constructed, not yet installing.
    Parsed,
    Installing,
    /// Installed and waiting to activate.
    Installed,
    Activating,
    Active,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
        };
        f.write_str(name)
    }
}

/// Install/activate/update driver for one worker version.
pub struct LifecycleController {
    config: Arc<WorkerConfig>,
    store: CacheStore,
    fetcher: Arc<dyn Fetcher>,
    clients: Arc<dyn ClientGateway>,
    state: RwLock<WorkerState>,
}

impl LifecycleController {
    pub fn new(
        config: Arc<WorkerConfig>,
        store: CacheStore,
        fetcher: Arc<dyn Fetcher>,
        clients: Arc<dyn ClientGateway>,
    ) -> Self {
        Self {
            config,
            store,
            fetcher,
            clients,
            state: RwLock::new(WorkerState::Parsed),
        }
    }

    pub fn state(&self) -> WorkerState {
        *self.state.read()
    }

    fn transition(&self, next: WorkerState) {
        let mut state = self.state.write();
        info!(from = %*state, to = %next, "lifecycle transition");
        *state = next;
    }

    /// Pre-populate the static partition with every manifest entry, fetched
    /// bypassing intermediate caches, then open the dynamic partition. Any
    /// manifest failure aborts the install.
    pub async fn install(&self) -> Result<(), FetchError> {
        self.transition(WorkerState::Installing);

        let static_name = self.config.static_cache_name();
        self.store.open(&static_name).await?;

        info!(
            assets = self.config.static_manifest.len(),
            partition = %static_name,
            "populating static partition"
        );
        for asset in &self.config.static_manifest {
            let url = self.config.resolve(asset)?;
            let request = WebRequest::get(url);

            let response = self.fetcher.fetch_bypass_cache(&request).await?;
            if !response.is_ok() {
                return Err(FetchError::UpstreamStatus(response.status));
            }

            let key = CacheKey::from_request(&request);
            self.store
                .put(&static_name, CacheEntry::from_response(&key, &response))
                .await?;
        }

        self.store.open(&self.config.dynamic_cache_name()).await?;
        self.transition(WorkerState::Installed);
        Ok(())
    }

    /// Evict partitions belonging to other installs of this namespace, then
    /// claim the already-open client pages.
    pub async fn activate(&self) -> Result<(), FetchError> {
        self.transition(WorkerState::Activating);

        let keep = [
            self.config.static_cache_name(),
            self.config.dynamic_cache_name(),
        ];
        let prefix = self.config.cache_prefix();

        for name in self.store.partition_names().await? {
            if name.starts_with(&prefix) && !keep.contains(&name) {
                info!(partition = %name, "removing stale partition");
                if let Err(error) = self.store.delete_partition(&name).await {
                    warn!(partition = %name, error = %error, "failed to remove stale partition");
                }
            }
        }

        self.clients.claim().await;
        self.transition(WorkerState::Active);
        Ok(())
    }

    /// Activate an installed-and-waiting worker immediately instead of
    /// waiting for every client page to close.
    pub async fn skip_waiting(&self) -> Result<(), FetchError> {
        if self.state() == WorkerState::Installed {
            self.activate().await?;
        }
        Ok(())
    }

    /// Tell every connected client that this freshly installed version is
    /// waiting; the host UI decides whether to prompt the user.
    pub async fn announce_update(&self) {
        let version = self.config.worker_tag();
        info!(version = %version, "announcing update to clients");
        self.clients
            .broadcast(&ClientMessage::UpdateAvailable { version })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingGateway, StubFetcher};

    fn small_config() -> WorkerConfig {
        WorkerConfig::builder()
            .with_static_manifest(["/", "/index.html", "/styles/main.css"])
            .build()
    }

    fn controller(
        config: WorkerConfig,
    ) -> (
        LifecycleController,
        CacheStore,
        Arc<StubFetcher>,
        Arc<RecordingGateway>,
    ) {
        let store = CacheStore::in_memory();
        let fetcher = Arc::new(StubFetcher::new());
        let gateway = Arc::new(RecordingGateway::new());
        let controller = LifecycleController::new(
            Arc::new(config),
            store.clone(),
            Arc::clone(&fetcher) as Arc<dyn Fetcher>,
            Arc::clone(&gateway) as Arc<dyn ClientGateway>,
        );
        (controller, store, fetcher, gateway)
    }

    fn stub_shell(fetcher: &StubFetcher) {
        fetcher.respond("https://portico.news/", 200, "<html>root</html>");
        fetcher.respond("https://portico.news/index.html", 200, "<html>shell</html>");
        fetcher.respond("https://portico.news/styles/main.css", 200, "body {}");
    }

    #[tokio::test]
    async fn install_populates_static_partition_bypassing_caches() {
        let (controller, store, fetcher, _gateway) = controller(small_config());
        stub_shell(&fetcher);

        controller.install().await.unwrap();

        assert_eq!(controller.state(), WorkerState::Installed);
        assert_eq!(store.len("portico-static-v1.0.0").await.unwrap(), 3);
        // Every manifest entry was a forced-reload fetch.
        assert_eq!(fetcher.bypass_fetches(), 3);
        assert_eq!(fetcher.fetches(), 0);

        // The dynamic partition is opened but left empty.
        assert_eq!(store.len("portico-dynamic-v1.0.0").await.unwrap(), 0);
        let mut names = store.partition_names().await.unwrap();
        names.sort();
        assert_eq!(
            names,
            vec![
                "portico-dynamic-v1.0.0".to_owned(),
                "portico-static-v1.0.0".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn install_aborts_when_a_manifest_entry_fails() {
        let (controller, _store, fetcher, _gateway) = controller(small_config());
        fetcher.respond("https://portico.news/", 200, "<html>root</html>");
        // "/index.html" is unstubbed and answers 404.

        let result = controller.install().await;
        assert!(matches!(result, Err(FetchError::UpstreamStatus(_))));
        assert_eq!(controller.state(), WorkerState::Installing);
    }

    #[tokio::test]
    async fn activation_evicts_only_this_namespaces_stale_partitions() {
        let (controller, store, _fetcher, gateway) = controller(small_config());

        for name in [
            "portico-static-v0.9.0",
            "portico-dynamic-v0.9.0",
            "portico-static-v1.0.0",
            "portico-dynamic-v1.0.0",
            "other-app-cache",
        ] {
            store.open(name).await.unwrap();
        }

        controller.activate().await.unwrap();

        let mut names = store.partition_names().await.unwrap();
        names.sort();
        assert_eq!(
            names,
            vec![
                "other-app-cache".to_owned(),
                "portico-dynamic-v1.0.0".to_owned(),
                "portico-static-v1.0.0".to_owned(),
            ]
        );
        assert_eq!(controller.state(), WorkerState::Active);
        assert_eq!(gateway.claims(), 1);
    }

    #[tokio::test]
    async fn skip_waiting_only_promotes_an_installed_worker() {
        let (controller, _store, _fetcher, gateway) = controller(small_config());

        controller.skip_waiting().await.unwrap();
        assert_eq!(controller.state(), WorkerState::Parsed);
        assert_eq!(gateway.claims(), 0);
    }

    #[tokio::test]
    async fn skip_waiting_activates_a_waiting_worker() {
        let (controller, _store, fetcher, gateway) = controller(small_config());
        stub_shell(&fetcher);

        controller.install().await.unwrap();
        controller.skip_waiting().await.unwrap();

        assert_eq!(controller.state(), WorkerState::Active);
        assert_eq!(gateway.claims(), 1);
    }

    #[tokio::test]
    async fn announce_update_broadcasts_the_version() {
        let (controller, _store, _fetcher, gateway) = controller(small_config());

        controller.announce_update().await;

        assert_eq!(
            gateway.broadcasts(),
            vec![ClientMessage::UpdateAvailable {
                version: "portico-v1.0.0".to_owned(),
            }]
        );
    }
}

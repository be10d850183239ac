//! # Offline Worker
//!
//! The facade the host dispatcher talks to. It owns the strategy router and
//! the lifecycle controller over one shared cache store, answers every
//! intercepted request with a response, and services the host's control
//! messages and connectivity-restored signal.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::ClientGateway;
use crate::config::WorkerConfig;
use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::lifecycle::{LifecycleController, WorkerState};
use crate::maintenance;
use crate::message::{ControlMessage, MessageReply};
use crate::request::{WebRequest, WebResponse};
use crate::store::CacheStore;
use crate::strategy::StrategyRouter;

/// One deployed version of the offline caching worker.
pub struct OfflineWorker {
    config: Arc<WorkerConfig>,
    store: CacheStore,
    fetcher: Arc<dyn Fetcher>,
    router: StrategyRouter,
    lifecycle: LifecycleController,
}

impl OfflineWorker {
    pub fn new(
        config: WorkerConfig,
        store: CacheStore,
        fetcher: Arc<dyn Fetcher>,
        clients: Arc<dyn ClientGateway>,
    ) -> Self {
        let config = Arc::new(config);

        let router = StrategyRouter::new(
            Arc::clone(&config),
            store.clone(),
            Arc::clone(&fetcher),
        );
        let lifecycle = LifecycleController::new(
            Arc::clone(&config),
            store.clone(),
            Arc::clone(&fetcher),
            clients,
        );

        info!(
            version = %config.worker_tag(),
            static_assets = config.static_manifest.len(),
            api_urls = config.api_urls.len(),
            "offline worker loaded"
        );

        Self {
            config,
            store,
            fetcher,
            router,
            lifecycle,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn state(&self) -> WorkerState {
        self.lifecycle.state()
    }

    /// Install this version: pre-populate the static partition.
    pub async fn install(&self) -> Result<(), FetchError> {
        self.lifecycle.install().await
    }

    /// Activate this version: evict stale partitions and claim clients.
    pub async fn activate(&self) -> Result<(), FetchError> {
        self.lifecycle.activate().await
    }

    /// Broadcast that this installed version is waiting to take over.
    pub async fn announce_update(&self) {
        self.lifecycle.announce_update().await;
    }

    /// Resolve one intercepted request. Never fails.
    pub async fn handle_fetch(&self, request: &WebRequest) -> WebResponse {
        self.router.handle(request).await
    }

    /// Service a control message from a client page. `None` means the
    /// message has no reply.
    pub async fn handle_message(&self, message: ControlMessage) -> Option<MessageReply> {
        match message {
            ControlMessage::SkipWaiting => {
                if let Err(error) = self.lifecycle.skip_waiting().await {
                    warn!(error = %error, "skip-waiting activation failed");
                }
                None
            }
            ControlMessage::GetVersion => Some(MessageReply::Version {
                version: self.config.worker_tag(),
            }),
            ControlMessage::ClearCache => {
                let success = maintenance::clear_all(&self.store).await.is_ok();
                Some(MessageReply::Completed { success })
            }
            ControlMessage::ForceUpdate { urls } => {
                maintenance::force_refresh(&self.store, self.fetcher.as_ref(), &self.config, &urls)
                    .await;
                Some(MessageReply::Completed { success: true })
            }
        }
    }

    /// Connectivity returned: refresh the known api-data URLs in the
    /// background. Fire-and-forget; completion is never awaited by callers.
    pub fn handle_sync(&self) {
        let store = self.store.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let config = Arc::clone(&self.config);

        info!("connectivity restored, scheduling api resync");
        tokio::spawn(async move {
            maintenance::resync_api_data(&store, fetcher.as_ref(), &config).await;
        });
    }
}
